//! Capture windows and achieved sample rate.
//!
//! Sampling on a general-purpose OS is not hard real-time, so a window
//! carries the rate that was *measured* while filling it. All frequency math
//! downstream uses [`CaptureWindow::measured_fs`], never the requested rate.

use core::time::Duration;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::adc::{AdcSpec, RawSample};

/// Achieved sample rate for `n` samples read over `elapsed`.
///
/// The first sample marks the start and the last marks the end, so `n`
/// samples span `n - 1` intervals. Degenerate captures (fewer than two
/// samples, or no measurable elapsed time) fall back to `target_fs`.
///
/// # Example
///
/// ```rust
/// use core::time::Duration;
/// use wavecap_core::measured_rate;
///
/// let fs = measured_rate(1001, Duration::from_millis(200), 5000.0);
/// assert!((fs - 5000.0).abs() < 1e-9);
/// assert_eq!(measured_rate(100, Duration::ZERO, 5000.0), 5000.0);
/// ```
pub fn measured_rate(n: usize, elapsed: Duration, target_fs: f64) -> f64 {
    let secs = elapsed.as_secs_f64();
    if n < 2 || secs <= 0.0 {
        return target_fs;
    }
    let fs = (n - 1) as f64 / secs;
    if fs.is_finite() && fs > 0.0 { fs } else { target_fs }
}

/// A fixed-length window of raw samples in acquisition order.
///
/// Owned by exactly one capture cycle and dropped after classification.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureWindow {
    samples: Vec<RawSample>,
    measured_fs: f64,
    target_fs: f64,
}

impl CaptureWindow {
    /// Wrap already-acquired samples with the rates observed for them.
    pub fn new(samples: Vec<RawSample>, measured_fs: f64, target_fs: f64) -> Self {
        Self {
            samples,
            measured_fs,
            target_fs,
        }
    }

    /// Build a window from samples and the elapsed acquisition time.
    pub fn from_elapsed(samples: Vec<RawSample>, elapsed: Duration, target_fs: f64) -> Self {
        let measured_fs = measured_rate(samples.len(), elapsed, target_fs);
        Self::new(samples, measured_fs, target_fs)
    }

    /// Raw codes in acquisition order.
    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }

    /// Consume the window, returning the raw codes.
    pub fn into_samples(self) -> Vec<RawSample> {
        self.samples
    }

    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample rate actually achieved while filling the window (Hz).
    pub fn measured_fs(&self) -> f64 {
        self.measured_fs
    }

    /// Sample rate that was requested (Hz).
    pub fn target_fs(&self) -> f64 {
        self.target_fs
    }

    /// Wall-clock span of the window implied by the measured rate.
    pub fn duration_secs(&self) -> f64 {
        if self.samples.len() < 2 || self.measured_fs <= 0.0 {
            return 0.0;
        }
        (self.samples.len() - 1) as f64 / self.measured_fs
    }

    /// Codes as floats, for the normalizer.
    pub fn to_f64(&self) -> Vec<f64> {
        self.samples.iter().map(|&c| f64::from(c)).collect()
    }

    /// Codes converted to volts.
    pub fn to_volts(&self, adc: &AdcSpec) -> Vec<f64> {
        self.samples.iter().map(|&c| adc.code_to_volts(c)).collect()
    }
}
