//! Fundamental-frequency estimation.
//!
//! Four strategies over a normalized (zero-mean, unit-peak) signal:
//!
//! - **Spectral**: Hann-windowed FFT peak above a low cutoff, refined by
//!   parabolic interpolation. Available with the `spectral` feature.
//! - **Hysteresis crossings**: rising crossings of `+h` that must be preceded
//!   by a dip below `-h`. Tolerates noise near zero.
//! - **Zero crossings**: plain rising crossings, `x[i] <= 0 && x[i+1] > 0`.
//! - **Autocorrelation**: first local maximum of the normalized
//!   autocorrelation above a threshold.
//!
//! [`FrequencyEstimator::estimate`] runs them in that order of preference and
//! records every strategy's result in a [`FrequencyReport`].

use wavecap_core::FrequencyEstimate;

use crate::spectrum::{SpectrumEstimate, parabolic_offset};
use crate::window::Window;

/// Whether this build can run the spectral estimator.
pub const fn spectral_available() -> bool {
    cfg!(feature = "spectral")
}

/// Strategy that produced the selected estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// FFT peak with parabolic refinement.
    Spectral,
    /// Rising crossings with a hysteresis band.
    Hysteresis,
    /// Plain rising zero crossings.
    ZeroCrossing,
    /// First autocorrelation peak.
    Autocorrelation,
}

impl Method {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Spectral => "spectral",
            Method::Hysteresis => "hysteresis",
            Method::ZeroCrossing => "zero_crossing",
            Method::Autocorrelation => "autocorrelation",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Tuning for [`FrequencyEstimator`].
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// Use the FFT estimator when the feature is compiled in.
    pub spectral: bool,
    /// Ignore spectral content below this frequency.
    pub min_frequency_hz: f64,
    /// Always skip this many lowest bins (DC leakage).
    pub skip_bins: usize,
    /// Fewest samples the spectral estimator will accept.
    pub min_spectral_samples: usize,
    /// Fewest samples the crossing estimators will accept.
    pub min_time_domain_samples: usize,
    /// Half-width of the hysteresis band, in normalized units.
    pub hysteresis: f64,
    /// Minimum normalized autocorrelation for a period candidate.
    pub autocorrelation_threshold: f64,
    /// Window applied before the FFT. Ignored without the `spectral` feature.
    pub window: Window,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            spectral: true,
            min_frequency_hz: 1.0,
            skip_bins: 2,
            min_spectral_samples: 64,
            min_time_domain_samples: 30,
            hysteresis: 0.08,
            autocorrelation_threshold: 0.2,
            window: Window::Hann,
        }
    }
}

/// Every strategy's estimate for one window, plus the selected one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrequencyReport {
    /// FFT estimate (indeterminate when not run).
    pub spectral: FrequencyEstimate,
    /// Hysteresis-crossing estimate.
    pub hysteresis: FrequencyEstimate,
    /// Zero-crossing estimate.
    pub zero_crossing: FrequencyEstimate,
    /// Autocorrelation estimate (only run when needed).
    pub autocorrelation: FrequencyEstimate,
    /// Preferred determinate estimate, or indeterminate.
    pub selected: FrequencyEstimate,
    /// Strategy behind `selected`.
    pub method: Option<Method>,
}

/// Runs the estimation strategies and applies the preference order.
#[derive(Debug, Clone, Default)]
pub struct FrequencyEstimator {
    config: EstimatorConfig,
}

impl FrequencyEstimator {
    /// Create an estimator with the given tuning.
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Current tuning.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Whether [`estimate`](Self::estimate) will try the spectral strategy.
    pub fn uses_spectral(&self) -> bool {
        spectral_available() && self.config.spectral
    }

    /// Estimate the fundamental of a normalized signal sampled at `sample_rate`.
    pub fn estimate(&self, x: &[f64], sample_rate: f64) -> FrequencyReport {
        self.estimate_with_spectrum(x, sample_rate).0
    }

    /// Like [`estimate`](Self::estimate), also returning the spectrum when one
    /// was computed so harmonic features can reuse it.
    pub fn estimate_with_spectrum(
        &self,
        x: &[f64],
        sample_rate: f64,
    ) -> (FrequencyReport, Option<SpectrumEstimate>) {
        let mut report = FrequencyReport::default();
        if x.len() < 2 || !(sample_rate > 0.0) || !sample_rate.is_finite() {
            return (report, None);
        }

        let mut spectrum = None;
        if self.uses_spectral() && x.len() >= self.config.min_spectral_samples {
            let (estimate, s) = self.spectral(x, sample_rate);
            report.spectral = estimate;
            spectrum = s;
        }

        if x.len() >= self.config.min_time_domain_samples {
            report.hysteresis = hysteresis(x, sample_rate, self.config.hysteresis);
            report.zero_crossing = zero_crossing(x, sample_rate);
        }

        let candidates = [
            (report.spectral, Method::Spectral),
            (report.hysteresis, Method::Hysteresis),
            (report.zero_crossing, Method::ZeroCrossing),
        ];
        if let Some(&(estimate, method)) = candidates.iter().find(|(e, _)| e.is_determinate()) {
            report.selected = estimate;
            report.method = Some(method);
        } else {
            report.autocorrelation =
                autocorrelation(x, sample_rate, self.config.autocorrelation_threshold);
            if report.autocorrelation.is_determinate() {
                report.selected = report.autocorrelation;
                report.method = Some(Method::Autocorrelation);
            }
        }

        tracing::trace!(
            n = x.len(),
            fs = sample_rate,
            spectral = %report.spectral,
            hysteresis = %report.hysteresis,
            zero_crossing = %report.zero_crossing,
            selected = %report.selected,
            "frequency estimate"
        );

        (report, spectrum)
    }

    #[cfg(feature = "spectral")]
    fn spectral(&self, x: &[f64], sample_rate: f64) -> (FrequencyEstimate, Option<SpectrumEstimate>) {
        let Some(spectrum) = SpectrumEstimate::compute(x, sample_rate, self.config.window) else {
            return (FrequencyEstimate::Indeterminate, None);
        };
        let estimate = spectral_peak(&spectrum, self.config.min_frequency_hz, self.config.skip_bins);
        (estimate, Some(spectrum))
    }

    #[cfg(not(feature = "spectral"))]
    fn spectral(&self, _x: &[f64], _sample_rate: f64) -> (FrequencyEstimate, Option<SpectrumEstimate>) {
        (FrequencyEstimate::Indeterminate, None)
    }
}

/// Refined peak frequency of `spectrum`, ignoring bins below
/// `max(skip_bins, ceil(min_frequency_hz / bin_hz))`.
pub fn spectral_peak(spectrum: &SpectrumEstimate, min_frequency_hz: f64, skip_bins: usize) -> FrequencyEstimate {
    let cutoff_bin = if spectrum.bin_hz() > 0.0 && min_frequency_hz > 0.0 {
        (min_frequency_hz / spectrum.bin_hz()).ceil() as usize
    } else {
        0
    };
    spectrum
        .peak_from(skip_bins.max(cutoff_bin))
        .map_or(FrequencyEstimate::Indeterminate, |k| {
            FrequencyEstimate::from_hz(spectrum.refined_frequency(k))
        })
}

/// Frequency from the mean spacing of crossing indices.
///
/// Needs at least two crossings.
fn from_crossings(crossings: &[usize], sample_rate: f64) -> FrequencyEstimate {
    let (Some(&first), Some(&last)) = (crossings.first(), crossings.last()) else {
        return FrequencyEstimate::Indeterminate;
    };
    if crossings.len() < 2 || last == first {
        return FrequencyEstimate::Indeterminate;
    }
    let period_samples = (last - first) as f64 / (crossings.len() - 1) as f64;
    FrequencyEstimate::from_hz(sample_rate / period_samples)
}

/// Rising zero-crossing estimator.
///
/// A crossing is recorded at `i + 1` whenever `x[i] <= 0 && x[i + 1] > 0`.
pub fn zero_crossing(x: &[f64], sample_rate: f64) -> FrequencyEstimate {
    let crossings: Vec<usize> = x
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] <= 0.0 && w[1] > 0.0)
        .map(|(i, _)| i + 1)
        .collect();
    from_crossings(&crossings, sample_rate)
}

/// Rising-crossing estimator with a `±band` dead zone.
///
/// Starts disarmed; a sample below `-band` arms it and the next sample above
/// `+band` records a crossing and disarms it again.
pub fn hysteresis(x: &[f64], sample_rate: f64, band: f64) -> FrequencyEstimate {
    let band = band.abs();
    let mut armed = false;
    let mut crossings = Vec::new();
    for (i, &v) in x.iter().enumerate() {
        if armed {
            if v > band {
                crossings.push(i);
                armed = false;
            }
        } else if v < -band {
            armed = true;
        }
    }
    from_crossings(&crossings, sample_rate)
}

/// Autocorrelation estimator.
///
/// Lags run up to `min(n - 1, sample_rate / 2)`. The first local maximum from
/// lag 2 whose normalized correlation exceeds `threshold` is taken as the
/// period, refined by parabolic interpolation.
pub fn autocorrelation(x: &[f64], sample_rate: f64, threshold: f64) -> FrequencyEstimate {
    let n = x.len();
    if n < 4 || !(sample_rate > 0.0) {
        return FrequencyEstimate::Indeterminate;
    }
    let max_lag = (n - 1).min((sample_rate / 2.0) as usize);
    if max_lag < 3 {
        return FrequencyEstimate::Indeterminate;
    }

    let energy: f64 = x.iter().map(|v| v * v).sum();
    if energy < 1e-12 {
        return FrequencyEstimate::Indeterminate;
    }

    let corr: Vec<f64> = (0..=max_lag)
        .map(|lag| {
            x[..n - lag]
                .iter()
                .zip(&x[lag..])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / energy
        })
        .collect();

    for lag in 2..max_lag {
        let (prev, here, next) = (corr[lag - 1], corr[lag], corr[lag + 1]);
        if here > threshold && here > prev && here >= next {
            let refined = lag as f64 + parabolic_offset(prev, here, next);
            return FrequencyEstimate::from_hz(sample_rate / refined);
        }
    }
    FrequencyEstimate::Indeterminate
}
