//! One-sided magnitude spectrum and peak interpolation.

#[cfg(feature = "spectral")]
use crate::fft::Fft;
#[cfg(feature = "spectral")]
use crate::window::Window;

/// Vertex offset of the parabola through three equally spaced points.
///
/// `a`, `b`, `c` are magnitudes at bins `k-1`, `k`, `k+1`. Returns the
/// fractional offset of the true peak from `k`, clamped to `[-0.5, 0.5]`.
/// A degenerate (collinear) triple yields `0.0`.
///
/// ```rust
/// use wavecap_analysis::parabolic_offset;
///
/// assert_eq!(parabolic_offset(1.0, 2.0, 1.0), 0.0);
/// assert!(parabolic_offset(1.0, 3.0, 2.0) > 0.0);
/// ```
pub fn parabolic_offset(a: f64, b: f64, c: f64) -> f64 {
    let denom = a - 2.0 * b + c;
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    let delta = 0.5 * (a - c) / denom;
    if delta.is_finite() {
        delta.clamp(-0.5, 0.5)
    } else {
        0.0
    }
}

/// Magnitudes of bins `0..=N/2` of an `N`-point transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumEstimate {
    magnitudes: Vec<f64>,
    bin_hz: f64,
    fft_size: usize,
}

impl SpectrumEstimate {
    /// Wrap precomputed one-sided magnitudes.
    pub fn from_magnitudes(magnitudes: Vec<f64>, bin_hz: f64, fft_size: usize) -> Self {
        Self {
            magnitudes,
            bin_hz,
            fft_size,
        }
    }

    /// Window `samples`, zero-pad to the next power of two and transform.
    ///
    /// Returns `None` for empty input or a non-positive sample rate.
    #[cfg(feature = "spectral")]
    pub fn compute(samples: &[f64], sample_rate: f64, window: Window) -> Option<Self> {
        if samples.is_empty() || !(sample_rate > 0.0) || !sample_rate.is_finite() {
            return None;
        }
        let fft_size = samples.len().next_power_of_two().max(2);

        let mut buffer = samples.to_vec();
        window.apply(&mut buffer);

        let fft = Fft::new(fft_size);
        let magnitudes = fft.forward(&buffer).iter().map(|c| c.norm()).collect();

        Some(Self {
            magnitudes,
            bin_hz: sample_rate / fft_size as f64,
            fft_size,
        })
    }

    /// Transform length after padding.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Frequency resolution in Hz.
    pub fn bin_hz(&self) -> f64 {
        self.bin_hz
    }

    /// Number of bins (`fft_size / 2 + 1`).
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    /// True when there are no bins.
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Raw magnitudes.
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    /// Center frequency of bin `k`.
    pub fn frequency(&self, k: usize) -> f64 {
        k as f64 * self.bin_hz
    }

    /// `(frequency, magnitude)` pairs.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.magnitudes
            .iter()
            .enumerate()
            .map(|(k, &m)| (self.frequency(k), m))
    }

    /// Bin nearest to `hz`, or `None` if it lies above Nyquist or `hz` is invalid.
    pub fn nearest_bin(&self, hz: f64) -> Option<usize> {
        if !(hz >= 0.0) || !hz.is_finite() || self.bin_hz <= 0.0 {
            return None;
        }
        let k = (hz / self.bin_hz).round() as usize;
        (k < self.magnitudes.len()).then_some(k)
    }

    /// Magnitude of the bin nearest to `hz`, zero when out of range.
    pub fn magnitude_near(&self, hz: f64) -> f64 {
        self.nearest_bin(hz).map_or(0.0, |k| self.magnitudes[k])
    }

    /// Largest bin at or above `first_bin`, if it carries any energy.
    pub fn peak_from(&self, first_bin: usize) -> Option<usize> {
        let (offset, &max) = self
            .magnitudes
            .get(first_bin..)?
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))?;
        (max > 0.0).then_some(first_bin + offset)
    }

    /// Interpolated frequency of the peak at bin `k`.
    ///
    /// Edge bins have no neighbor on one side and are returned uncorrected.
    pub fn refined_frequency(&self, k: usize) -> f64 {
        if k == 0 || k + 1 >= self.magnitudes.len() {
            return self.frequency(k);
        }
        let delta = parabolic_offset(
            self.magnitudes[k - 1],
            self.magnitudes[k],
            self.magnitudes[k + 1],
        );
        (k as f64 + delta) * self.bin_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parabola_vertex_is_recovered() {
        // y = -(x - 0.3)^2 sampled at -1, 0, 1
        let y = |x: f64| -(x - 0.3) * (x - 0.3);
        let d = parabolic_offset(y(-1.0), y(0.0), y(1.0));
        assert!((d - 0.3).abs() < 1e-12);
    }

    #[test]
    fn collinear_triple_is_zero() {
        assert_eq!(parabolic_offset(1.0, 1.0, 1.0), 0.0);
        assert_eq!(parabolic_offset(1.0, 2.0, 3.0), 0.0);
    }

    #[test]
    fn offset_is_clamped() {
        let d = parabolic_offset(0.0, 1.0, 1.0);
        assert!(d.abs() <= 0.5);
    }

    #[test]
    fn nearest_bin_respects_nyquist() {
        let s = SpectrumEstimate::from_magnitudes(vec![0.0, 1.0, 2.0, 1.0, 0.5], 10.0, 8);
        assert_eq!(s.nearest_bin(19.0), Some(2));
        assert_eq!(s.nearest_bin(40.0), Some(4));
        assert_eq!(s.nearest_bin(46.0), None);
        assert_eq!(s.magnitude_near(46.0), 0.0);
        assert_eq!(s.nearest_bin(-1.0), None);
    }

    #[test]
    fn peak_search_skips_low_bins() {
        let s = SpectrumEstimate::from_magnitudes(vec![9.0, 8.0, 1.0, 3.0, 2.0], 1.0, 8);
        assert_eq!(s.peak_from(0), Some(0));
        assert_eq!(s.peak_from(2), Some(3));
        assert_eq!(s.peak_from(5), None);
    }

    #[test]
    fn silent_spectrum_has_no_peak() {
        let s = SpectrumEstimate::from_magnitudes(vec![0.0; 9], 1.0, 16);
        assert_eq!(s.peak_from(1), None);
    }

    #[cfg(feature = "spectral")]
    #[test]
    fn padded_to_power_of_two() {
        let x: Vec<f64> = (0..1000)
            .map(|i| (2.0 * std::f64::consts::PI * 50.0 * i as f64 / 1000.0).sin())
            .collect();
        let s = SpectrumEstimate::compute(&x, 1000.0, Window::Hann).unwrap();
        assert_eq!(s.fft_size(), 1024);
        assert_eq!(s.len(), 513);
        let k = s.peak_from(2).unwrap();
        assert!((s.refined_frequency(k) - 50.0).abs() < 0.2);
    }
}
