//! Shape features of a normalized signal.

use wavecap_core::{HarmonicRatios, ShapeFeatures};

use crate::spectrum::SpectrumEstimate;

/// Floor for the median slope so a mostly-flat signal still gets a band.
const MIN_MEDIAN_SLOPE: f64 = 1e-6;

/// Time-domain features of normalized `x`.
///
/// - `plateau_frac`: share of samples with `|x| >= plateau_level`.
/// - `const_slope_frac`: share of `|dx|` within `slope_band * median(|dx|)`
///   of the median.
/// - `sign_change_rate`: share of adjacent `dx` pairs that change sign
///   (zero counts as non-negative).
/// - `slope_cv`: `std(|dx|) / mean(|dx|)`.
///
/// Fewer than two samples give all-zero features.
pub fn shape_features(x: &[f64], plateau_level: f64, slope_band: f64) -> ShapeFeatures {
    if x.is_empty() {
        return ShapeFeatures::default();
    }

    let plateau = x.iter().filter(|v| v.abs() >= plateau_level).count();
    let plateau_frac = plateau as f64 / x.len() as f64;

    let dx: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    if dx.is_empty() {
        return ShapeFeatures {
            plateau_frac,
            ..ShapeFeatures::default()
        };
    }

    let mut slopes: Vec<f64> = dx.iter().map(|d| d.abs()).collect();
    let mean_slope = slopes.iter().sum::<f64>() / slopes.len() as f64;
    let variance = slopes
        .iter()
        .map(|s| (s - mean_slope) * (s - mean_slope))
        .sum::<f64>()
        / slopes.len() as f64;
    let slope_cv = if mean_slope > 0.0 {
        variance.sqrt() / mean_slope
    } else {
        0.0
    };

    slopes.sort_by(f64::total_cmp);
    let median = slopes[slopes.len() / 2].max(MIN_MEDIAN_SLOPE);
    let band = slope_band * median;
    let constant = slopes.iter().filter(|s| (*s - median).abs() <= band).count();
    let const_slope_frac = constant as f64 / slopes.len() as f64;

    let changes = dx
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    let sign_change_rate = changes as f64 / dx.len() as f64;

    ShapeFeatures {
        plateau_frac,
        const_slope_frac,
        sign_change_rate,
        slope_cv,
    }
}

/// Second, third and fifth harmonic magnitudes relative to the fundamental,
/// each read from the bin nearest `k * fundamental_hz`.
///
/// Harmonics above Nyquist read as zero. Returns `None` when the fundamental
/// bin itself is out of range or silent.
pub fn harmonic_ratios(spectrum: &SpectrumEstimate, fundamental_hz: f64) -> Option<HarmonicRatios> {
    let fundamental = spectrum.magnitude_near(fundamental_hz);
    if spectrum.nearest_bin(fundamental_hz).is_none() || fundamental <= 0.0 {
        return None;
    }
    let ratio = |k: f64| spectrum.magnitude_near(k * fundamental_hz) / fundamental;
    Some(HarmonicRatios {
        r2: ratio(2.0),
        r3: ratio(3.0),
        r5: ratio(5.0),
    })
}
