//! Taper windows for the spectral estimator.
//!
//! Windows are periodic (`w[i]` uses `i / n`), which keeps Hann's scalloping
//! loss symmetric around each bin when the window length equals the FFT size.
//! The enum is plain data so configuration can name a window in builds
//! without the `spectral` feature.

use std::f64::consts::TAU;

/// Taper applied to a capture before transforming it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// No taper.
    Rectangular,
    /// Raised cosine; the default for single-tone peaks.
    #[default]
    Hann,
    /// Hamming.
    Hamming,
    /// Three-term Blackman; widest main lobe, lowest leakage.
    Blackman,
}

impl Window {
    /// Weight of sample `i` in a window of `n` samples.
    #[inline]
    pub fn weight(self, i: usize, n: usize) -> f64 {
        let x = TAU * i as f64 / n.max(1) as f64;
        match self {
            Window::Rectangular => 1.0,
            Window::Hann => 0.5 - 0.5 * x.cos(),
            Window::Hamming => 0.54 - 0.46 * x.cos(),
            Window::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
        }
    }

    /// Taper `samples` in place.
    pub fn apply(self, samples: &mut [f64]) {
        if self == Window::Rectangular {
            return;
        }
        let n = samples.len();
        for (i, s) in samples.iter_mut().enumerate() {
            *s *= self.weight(i, n);
        }
    }
}
