//! Waveform shape classifier.
//!
//! Two views vote on the shape of a normalized window:
//!
//! - the **harmonic view** reads `r2`, `r3`, `r5` from the spectrum at
//!   multiples of the fundamental;
//! - the **time view** looks at plateau dwell, slope constancy and the
//!   sign-change rate of the first difference.
//!
//! Agreement boosts confidence. On disagreement the harmonic view wins only
//! when it is confident on its own, otherwise the result is `unknown`. A
//! lone time-domain `sine` vote does not survive harmonics that are clearly
//! not sine-like; noise on a triangle breaks up its slopes long before it
//! moves `r3`.
//!
//! A clean sine spends about 29% of its samples above 0.9 of peak, which is
//! past the plateau cutoff. The time view therefore checks for a smooth wave
//! (one slope reversal per half cycle, mixed slope magnitudes, moderate
//! dwell) before looking at plateaus.

use wavecap_core::{
    ClassificationResult, FrequencyEstimate, HarmonicRatios, NormalizedSignal, ShapeFeatures,
    WaveformLabel,
};

use crate::features::{harmonic_ratios, shape_features};
use crate::spectrum::SpectrumEstimate;

/// Threshold constants for [`ShapeClassifier`].
///
/// Every cutoff the decision uses lives here so behavioral variants are
/// configuration rather than code.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Fewest samples worth classifying.
    pub min_samples: usize,
    /// `|x|` at or above this counts as plateau.
    pub plateau_level: f64,
    /// Plateau fraction above which the time view says square.
    pub plateau_fraction: f64,
    /// Tolerance band around the median slope, relative to the median.
    pub slope_band: f64,
    /// Constant-slope fraction above which the time view says triangle.
    pub const_slope_fraction: f64,
    /// Sign-change rate below which a constant slope counts as triangle.
    pub triangle_sign_change_max: f64,
    /// Sign-change rate at or above which the time view says sine.
    pub sine_sign_change_min: f64,
    /// Smooth sine: sign-change rate ceiling. Zero disables the check.
    pub smooth_sign_change_max: f64,
    /// Smooth sine: plateau fraction ceiling.
    pub smooth_plateau_max: f64,
    /// Smooth sine: constant-slope fraction ceiling.
    pub smooth_const_slope_max: f64,
    /// Slope dispersion ceiling for a harmonic triangle vote.
    pub slope_cv_max: f64,
    /// Harmonic square: `r3` floor.
    pub square_r3_min: f64,
    /// Harmonic square: `r5` floor.
    pub square_r5_min: f64,
    /// Harmonic triangle: `r3` floor.
    pub triangle_r3_min: f64,
    /// Harmonic triangle: `r5` ceiling.
    pub triangle_r5_max: f64,
    /// Harmonic triangle: `r5 / r3` ceiling.
    pub triangle_decay_max: f64,
    /// Harmonic sine: `r2` ceiling.
    pub sine_r2_max: f64,
    /// Harmonic sine: `r3` ceiling.
    pub sine_r3_max: f64,
    /// Harmonic sine: `r5` ceiling.
    pub sine_r5_max: f64,
    /// Harmonic confidence needed to overrule a disagreeing time view.
    pub min_harmonic_confidence: f64,
    /// Confidence multiplier when the harmonic view overrules.
    pub disagreement_penalty: f64,
    /// Confidence reported with `unknown`.
    pub unknown_confidence: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_samples: 30,
            plateau_level: 0.90,
            plateau_fraction: 0.25,
            slope_band: 0.35,
            const_slope_fraction: 0.38,
            triangle_sign_change_max: 0.20,
            sine_sign_change_min: 0.18,
            smooth_sign_change_max: 0.25,
            smooth_plateau_max: 0.50,
            smooth_const_slope_max: 0.65,
            slope_cv_max: 0.60,
            square_r3_min: 0.18,
            square_r5_min: 0.10,
            triangle_r3_min: 0.08,
            triangle_r5_max: 0.08,
            triangle_decay_max: 0.65,
            sine_r2_max: 0.08,
            sine_r3_max: 0.08,
            sine_r5_max: 0.05,
            min_harmonic_confidence: 0.60,
            disagreement_penalty: 0.75,
            unknown_confidence: 0.35,
        }
    }
}

/// Confidence boost when both views agree.
const AGREEMENT_BONUS: f64 = 0.15;

/// One view's verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Vote {
    label: WaveformLabel,
    confidence: f64,
}

impl Vote {
    fn new(label: WaveformLabel, confidence: f64) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Classifies normalized windows as sine, triangle, square, flat or unknown.
#[derive(Debug, Clone, Default)]
pub struct ShapeClassifier {
    config: ClassifierConfig,
}

impl ShapeClassifier {
    /// Create a classifier with the given thresholds.
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Current thresholds.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify `signal`.
    ///
    /// `frequency` is carried into the result and, together with `spectrum`,
    /// enables the harmonic view. Undecidable windows come back as data
    /// (`flat` or `unknown`), never as errors.
    pub fn classify(
        &self,
        signal: &NormalizedSignal,
        frequency: FrequencyEstimate,
        spectrum: Option<&SpectrumEstimate>,
    ) -> ClassificationResult {
        let cfg = &self.config;

        if signal.is_flat() {
            return ClassificationResult::undecided(WaveformLabel::Flat, "flat input");
        }
        if signal.len() < cfg.min_samples {
            return ClassificationResult {
                frequency,
                ..ClassificationResult::undecided(WaveformLabel::Unknown, "insufficient samples")
            };
        }

        let features = shape_features(signal.values(), cfg.plateau_level, cfg.slope_band);
        let harmonics = match (frequency.hz(), spectrum) {
            (Some(f0), Some(spectrum)) => harmonic_ratios(spectrum, f0),
            _ => None,
        };

        let (label, confidence, note) = self.decide(harmonics.as_ref(), &features);

        ClassificationResult {
            label,
            frequency,
            confidence,
            features,
            harmonics,
            note,
        }
    }

    fn decide(
        &self,
        harmonics: Option<&HarmonicRatios>,
        features: &ShapeFeatures,
    ) -> (WaveformLabel, f64, Option<&'static str>) {
        let harmonic_vote = harmonics.and_then(|h| self.harmonic_vote(h, features));
        let time_vote = self.time_vote(features);

        match (harmonics, harmonic_vote, time_vote) {
            (Some(h), None, Some(t)) if t.label == WaveformLabel::Sine && !self.sine_like(h) => (
                WaveformLabel::Unknown,
                self.config.unknown_confidence.clamp(0.0, 1.0),
                Some("harmonics contradict sine"),
            ),
            _ => self.combine(harmonic_vote, time_vote),
        }
    }

    fn sine_like(&self, h: &HarmonicRatios) -> bool {
        let cfg = &self.config;
        h.r2 < cfg.sine_r2_max && h.r3 < cfg.sine_r3_max && h.r5 < cfg.sine_r5_max
    }

    fn harmonic_vote(&self, h: &HarmonicRatios, features: &ShapeFeatures) -> Option<Vote> {
        let cfg = &self.config;

        if h.r3 > cfg.square_r3_min && h.r5 > cfg.square_r5_min {
            return Some(Vote::new(
                WaveformLabel::Square,
                0.6 + 2.0 * (h.r3 - cfg.square_r3_min),
            ));
        }

        let decay = h.odd_decay();
        if h.r3 > cfg.triangle_r3_min && h.r5 < cfg.triangle_r5_max && decay < cfg.triangle_decay_max {
            let mut confidence = 0.55 + (cfg.triangle_decay_max - decay);
            // noisy slopes weaken the vote but keep the odd-harmonic verdict
            if features.slope_cv >= cfg.slope_cv_max {
                confidence *= cfg.disagreement_penalty;
            }
            return Some(Vote::new(WaveformLabel::Triangle, confidence));
        }

        if self.sine_like(h) {
            let worst = (h.r2 / cfg.sine_r2_max)
                .max(h.r3 / cfg.sine_r3_max)
                .max(h.r5 / cfg.sine_r5_max);
            return Some(Vote::new(WaveformLabel::Sine, 0.5 + 0.5 * (1.0 - worst)));
        }

        None
    }

    fn time_vote(&self, f: &ShapeFeatures) -> Option<Vote> {
        let cfg = &self.config;

        if f.sign_change_rate < cfg.smooth_sign_change_max
            && f.plateau_frac < cfg.smooth_plateau_max
            && f.const_slope_frac < cfg.smooth_const_slope_max
        {
            Some(Vote::new(
                WaveformLabel::Sine,
                0.5 + 0.5 * (1.0 - f.sign_change_rate / cfg.smooth_sign_change_max),
            ))
        } else if f.plateau_frac > cfg.plateau_fraction {
            Some(Vote::new(
                WaveformLabel::Square,
                0.6 + 0.8 * (f.plateau_frac - cfg.plateau_fraction),
            ))
        } else if f.const_slope_frac > cfg.const_slope_fraction
            && f.sign_change_rate < cfg.triangle_sign_change_max
        {
            Some(Vote::new(
                WaveformLabel::Triangle,
                0.55 + 0.9 * (f.const_slope_frac - cfg.const_slope_fraction),
            ))
        } else if f.sign_change_rate >= cfg.sine_sign_change_min {
            Some(Vote::new(
                WaveformLabel::Sine,
                0.45 + 0.8 * (f.sign_change_rate - cfg.sine_sign_change_min),
            ))
        } else {
            None
        }
    }

    fn combine(
        &self,
        harmonic: Option<Vote>,
        time: Option<Vote>,
    ) -> (WaveformLabel, f64, Option<&'static str>) {
        let cfg = &self.config;
        let unknown = cfg.unknown_confidence.clamp(0.0, 1.0);

        match (harmonic, time) {
            (Some(h), Some(t)) if h.label == t.label => (
                h.label,
                (h.confidence.max(t.confidence) + AGREEMENT_BONUS).min(1.0),
                None,
            ),
            (Some(h), Some(_)) if h.confidence >= cfg.min_harmonic_confidence => (
                h.label,
                (h.confidence * cfg.disagreement_penalty).clamp(0.0, 1.0),
                Some("time-domain view disagreed"),
            ),
            (Some(_), Some(_)) => (WaveformLabel::Unknown, unknown, Some("views disagree")),
            (Some(v), None) | (None, Some(v)) => (v.label, v.confidence, None),
            (None, None) => (WaveformLabel::Unknown, unknown, Some("no shape matched")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavecap_core::normalize;

    fn harmonics(r2: f64, r3: f64, r5: f64) -> HarmonicRatios {
        HarmonicRatios { r2, r3, r5 }
    }

    #[test]
    fn flat_before_sample_count() {
        let c = ShapeClassifier::default();
        let r = c.classify(&normalize(&[512.0; 5], 1023.0), FrequencyEstimate::Hz(10.0), None);
        assert_eq!(r.label, WaveformLabel::Flat);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.frequency, FrequencyEstimate::Indeterminate);
    }

    #[test]
    fn short_window_is_unknown() {
        let c = ShapeClassifier::default();
        let x: Vec<f64> = (0..20).map(|i| f64::from(i % 4)).collect();
        let r = c.classify(&normalize(&x, 1023.0), FrequencyEstimate::Indeterminate, None);
        assert_eq!(r.label, WaveformLabel::Unknown);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.note, Some("insufficient samples"));
    }

    #[test]
    fn harmonic_votes() {
        let c = ShapeClassifier::default();
        let smooth = ShapeFeatures::default();

        let v = c.harmonic_vote(&harmonics(0.01, 0.33, 0.2), &smooth).unwrap();
        assert_eq!(v.label, WaveformLabel::Square);
        assert!((v.confidence - 0.9).abs() < 1e-9);

        let v = c.harmonic_vote(&harmonics(0.0, 0.11, 0.04), &smooth).unwrap();
        assert_eq!(v.label, WaveformLabel::Triangle);

        let v = c.harmonic_vote(&harmonics(0.0, 0.0, 0.0), &smooth).unwrap();
        assert_eq!(v.label, WaveformLabel::Sine);
        assert_eq!(v.confidence, 1.0);

        // triangle-like ratios but jagged slope
        let jagged = ShapeFeatures {
            slope_cv: 2.0,
            ..ShapeFeatures::default()
        };
        let clean = c.harmonic_vote(&harmonics(0.0, 0.11, 0.04), &smooth).unwrap();
        let v = c.harmonic_vote(&harmonics(0.0, 0.11, 0.04), &jagged).unwrap();
        assert_eq!(v.label, WaveformLabel::Triangle);
        assert!((v.confidence - clean.confidence * 0.75).abs() < 1e-12);

        // between the sine and triangle cutoffs
        assert!(c.harmonic_vote(&harmonics(0.0, 0.06, 0.07), &smooth).is_none());
    }

    #[test]
    fn lone_time_sine_needs_sine_like_harmonics() {
        let c = ShapeClassifier::default();
        let noisy = ShapeFeatures {
            plateau_frac: 0.05,
            const_slope_frac: 0.2,
            sign_change_rate: 0.4,
            slope_cv: 0.7,
        };
        assert_eq!(c.time_vote(&noisy).unwrap().label, WaveformLabel::Sine);

        // r5 too strong for a triangle, r3 too strong for a sine
        let (label, conf, note) = c.decide(Some(&harmonics(0.0, 0.12, 0.09)), &noisy);
        assert_eq!(label, WaveformLabel::Unknown);
        assert_eq!(conf, 0.35);
        assert_eq!(note, Some("harmonics contradict sine"));

        let (label, _, _) = c.decide(Some(&harmonics(0.01, 0.01, 0.01)), &noisy);
        assert_eq!(label, WaveformLabel::Sine);

        // no spectrum: the time view stands alone
        let (label, _, _) = c.decide(None, &noisy);
        assert_eq!(label, WaveformLabel::Sine);
    }

    #[test]
    fn time_votes_follow_order() {
        let c = ShapeClassifier::default();
        let f = ShapeFeatures {
            plateau_frac: 0.9,
            const_slope_frac: 0.9,
            sign_change_rate: 0.0,
            slope_cv: 0.0,
        };
        assert_eq!(c.time_vote(&f).unwrap().label, WaveformLabel::Square);

        let f = ShapeFeatures {
            plateau_frac: 0.1,
            ..f
        };
        let v = c.time_vote(&f).unwrap();
        assert_eq!(v.label, WaveformLabel::Triangle);
        assert_eq!(v.confidence, 1.0);

        let f = ShapeFeatures {
            const_slope_frac: 0.1,
            sign_change_rate: 0.3,
            ..f
        };
        assert_eq!(c.time_vote(&f).unwrap().label, WaveformLabel::Sine);

        // crest dwell of a clean sine is not a plateau
        let crest = ShapeFeatures {
            plateau_frac: 0.29,
            const_slope_frac: 0.49,
            sign_change_rate: 0.02,
            slope_cv: 0.48,
        };
        let v = c.time_vote(&crest).unwrap();
        assert_eq!(v.label, WaveformLabel::Sine);
        assert!((v.confidence - 0.96).abs() < 1e-9);

        let strict = ShapeClassifier::new(ClassifierConfig {
            smooth_sign_change_max: 0.0,
            ..ClassifierConfig::default()
        });
        assert_eq!(strict.time_vote(&crest).unwrap().label, WaveformLabel::Square);
        let f = ShapeFeatures {
            sign_change_rate: 0.1,
            ..f
        };
        assert!(strict.time_vote(&f).is_none());
    }

    #[test]
    fn combination_rules() {
        let c = ShapeClassifier::default();
        let sq = |conf| Some(Vote::new(WaveformLabel::Square, conf));
        let sine = |conf| Some(Vote::new(WaveformLabel::Sine, conf));

        let (label, conf, note) = c.combine(sq(0.7), sq(0.8));
        assert_eq!(label, WaveformLabel::Square);
        assert!((conf - 0.95).abs() < 1e-9);
        assert!(note.is_none());

        let (label, conf, _) = c.combine(sine(0.9), sq(0.8));
        assert_eq!(label, WaveformLabel::Sine);
        assert!((conf - 0.675).abs() < 1e-9);

        let (label, conf, note) = c.combine(sine(0.5), sq(0.8));
        assert_eq!(label, WaveformLabel::Unknown);
        assert_eq!(conf, 0.35);
        assert_eq!(note, Some("views disagree"));

        let (label, conf, _) = c.combine(None, sq(0.8));
        assert_eq!((label, conf), (WaveformLabel::Square, 0.8));

        let (label, conf, _) = c.combine(None, None);
        assert_eq!((label, conf), (WaveformLabel::Unknown, 0.35));
    }
}
