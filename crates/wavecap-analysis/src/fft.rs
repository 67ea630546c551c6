//! Real-input FFT for the spectral estimator.

use rustfft::{FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// Planned forward transform of a fixed length.
pub struct Fft {
    plan: Arc<dyn rustfft::Fft<f64>>,
    size: usize,
}

impl Fft {
    /// Plan a transform of `size` points.
    pub fn new(size: usize) -> Self {
        let plan = FftPlanner::new().plan_fft_forward(size);
        Self { plan, size }
    }

    /// Transform length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// One-sided spectrum of real `input`: bins 0 through `size / 2`.
    ///
    /// Short input is zero-padded, long input truncated.
    pub fn forward(&self, input: &[f64]) -> Vec<Complex<f64>> {
        let mut bins = vec![Complex::new(0.0, 0.0); self.size];
        for (bin, &x) in bins.iter_mut().zip(input) {
            bin.re = x;
        }
        self.plan.process(&mut bins);
        bins.truncate(self.size / 2 + 1);
        bins
    }
}

impl std::fmt::Debug for Fft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft").field("size", &self.size).finish_non_exhaustive()
    }
}
