//! Signal normalizer: DC removal and peak scaling.
//!
//! ```text
//! mean      = sum(x) / n
//! centered  = x - mean
//! peak      = max(|centered|), floored at PEAK_FLOOR
//! output    = centered / peak          ⊆ [-1, 1]
//! ```
//!
//! A signal whose raw peak deviation is below `FLATNESS_EPSILON * full_scale`
//! is reported flat instead of being blown up to unit range. Downstream stages
//! short-circuit on [`NormalizedSignal::is_flat`].

use libm::fabs;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Smallest divisor used when scaling by the peak.
pub const PEAK_FLOOR: f64 = 1e-9;

/// Flatness threshold relative to the converter's full-scale code.
pub const FLATNESS_EPSILON: f64 = 1e-6;

/// A DC-free signal scaled so that its largest magnitude is 1.0.
///
/// Derived once from a capture and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSignal {
    values: Vec<f64>,
    mean: f64,
    peak: f64,
    flat: bool,
}

impl NormalizedSignal {
    /// Normalized values, each in [-1, 1].
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the signal, returning its values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// DC level that was removed, in input units.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Peak deviation from the mean, in input units (1.0 if flat).
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Whether the input carried no usable variation.
    pub fn is_flat(&self) -> bool {
        self.flat
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Remove DC and scale into [-1, 1].
///
/// `full_scale` is the input's nominal span (1023 for a 10-bit code stream,
/// 2.0 for float audio in [-1, 1]); it only sets the flatness threshold.
///
/// Pure function: the input is not modified.
///
/// # Example
///
/// ```rust
/// use wavecap_core::normalize;
///
/// let s = normalize(&[10.0, 20.0, 30.0], 1023.0);
/// assert_eq!(s.values(), &[-1.0, 0.0, 1.0]);
///
/// let flat = normalize(&[512.0; 64], 1023.0);
/// assert!(flat.is_flat());
/// ```
pub fn normalize(samples: &[f64], full_scale: f64) -> NormalizedSignal {
    if samples.is_empty() {
        return NormalizedSignal {
            values: Vec::new(),
            mean: 0.0,
            peak: 1.0,
            flat: true,
        };
    }

    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let raw_peak = samples
        .iter()
        .map(|&s| fabs(s - mean))
        .fold(0.0_f64, f64::max);

    if raw_peak < FLATNESS_EPSILON * fabs(full_scale) || raw_peak < PEAK_FLOOR {
        return NormalizedSignal {
            values: samples.iter().map(|&s| s - mean).collect(),
            mean,
            peak: 1.0,
            flat: true,
        };
    }

    let peak = raw_peak.max(PEAK_FLOOR);
    NormalizedSignal {
        values: samples.iter().map(|&s| (s - mean) / peak).collect(),
        mean,
        peak,
        flat: false,
    }
}
