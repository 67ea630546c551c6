//! Converter description and code/voltage conversions.
//!
//! A [`RawSample`] is the integer code an R-bit converter returns, in
//! `[0, 2^R - 1]`. The voltage it stands for is
//! `code / (2^R - 1) * vref`.

use libm::round;

/// One converter code. Immutable once read.
pub type RawSample = u16;

/// Resolution and reference voltage of a single-ended ADC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdcSpec {
    /// Resolution in bits (10 for the MCP3008).
    pub bits: u8,
    /// Reference voltage in volts.
    pub vref: f64,
}

impl Default for AdcSpec {
    fn default() -> Self {
        Self {
            bits: 10,
            vref: 3.3,
        }
    }
}

impl AdcSpec {
    /// Create a spec for the given resolution and reference voltage.
    ///
    /// Resolution is clamped to 1..=16 so codes always fit a [`RawSample`].
    pub fn new(bits: u8, vref: f64) -> Self {
        Self {
            bits: bits.clamp(1, 16),
            vref,
        }
    }

    /// Largest code the converter can return (`2^bits - 1`).
    #[inline]
    pub fn full_scale(&self) -> RawSample {
        ((1u32 << u32::from(self.bits.clamp(1, 16))) - 1) as RawSample
    }

    /// [`full_scale`](Self::full_scale) as a float, for normalizer thresholds.
    #[inline]
    pub fn full_scale_f64(&self) -> f64 {
        f64::from(self.full_scale())
    }

    /// Whether `code` is a value this converter can produce.
    #[inline]
    pub fn contains(&self, code: RawSample) -> bool {
        code <= self.full_scale()
    }

    /// Convert a code to volts.
    #[inline]
    pub fn code_to_volts(&self, code: RawSample) -> f64 {
        f64::from(code) / self.full_scale_f64() * self.vref
    }

    /// Quantize a voltage to the nearest code, clamping to the converter range.
    pub fn volts_to_code(&self, volts: f64) -> RawSample {
        if !volts.is_finite() || self.vref <= 0.0 {
            return 0;
        }
        let full = self.full_scale_f64();
        let code = round(volts / self.vref * full);
        code.clamp(0.0, full) as RawSample
    }
}
