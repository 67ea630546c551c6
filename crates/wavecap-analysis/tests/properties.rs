//! Property-based tests for the estimators and peak interpolation.

use proptest::prelude::*;
use wavecap_analysis::{EstimatorConfig, FrequencyEstimator, hysteresis, parabolic_offset, zero_crossing};
use wavecap_core::{Shape, SignalGenerator};

const FS: f64 = 5000.0;

fn shape_strategy() -> impl Strategy<Value = Shape> {
    prop_oneof![Just(Shape::Sine), Just(Shape::Triangle)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Crossing estimators agree with the spectral estimate on clean input.
    #[cfg(feature = "spectral")]
    #[test]
    fn crossing_estimators_agree_with_spectral(
        shape in shape_strategy(),
        freq in 10.0f64..500.0,
    ) {
        let x = SignalGenerator::new(shape, freq).render(FS as usize, FS);
        let report = FrequencyEstimator::default().estimate(&x, FS);

        let spectral = report.spectral.hz().expect("spectral estimate");
        prop_assert!((spectral - freq).abs() / freq < 0.01, "spectral {} vs {}", spectral, freq);

        for (name, estimate) in [("zero_crossing", report.zero_crossing), ("hysteresis", report.hysteresis)] {
            let hz = estimate.hz().expect("time-domain estimate");
            prop_assert!(
                (hz - spectral).abs() / spectral < 0.05,
                "{} {} vs spectral {}", name, hz, spectral
            );
        }
    }

    /// Without a spectrum the crossing estimators still land on the tone.
    #[test]
    fn crossing_estimators_track_frequency(
        shape in shape_strategy(),
        freq in 10.0f64..500.0,
        phase in 0.0f64..1.0,
    ) {
        let x = SignalGenerator::new(shape, freq).with_phase(phase).render(FS as usize, FS);
        for hz in [zero_crossing(&x, FS).hz(), hysteresis(&x, FS, 0.08).hz()] {
            let hz = hz.expect("determinate");
            prop_assert!((hz - freq).abs() / freq < 0.05, "{} vs {}", hz, freq);
        }
    }

    /// Symmetric neighbors put the vertex on the center bin.
    #[test]
    fn parabolic_symmetric_is_centered(side in 0.0f64..10.0, lift in 0.001f64..10.0) {
        prop_assert_eq!(parabolic_offset(side, side + lift, side), 0.0);
    }

    /// The vertex moves toward the larger neighbor and stays within half a bin.
    #[test]
    fn parabolic_leans_toward_larger_neighbor(
        a in 0.0f64..10.0,
        c in 0.0f64..10.0,
        lift in 0.001f64..10.0,
    ) {
        prop_assume!(a != c);
        let d = parabolic_offset(a, a.max(c) + lift, c);
        prop_assert!((-0.5..=0.5).contains(&d));
        if c > a {
            prop_assert!(d > 0.0);
        } else {
            prop_assert!(d < 0.0);
        }
    }

    /// Any finite triple gives a bounded offset.
    #[test]
    fn parabolic_is_bounded(a in -1e6f64..1e6, b in -1e6f64..1e6, c in -1e6f64..1e6) {
        let d = parabolic_offset(a, b, c);
        prop_assert!((-0.5..=0.5).contains(&d));
    }

    /// Disabling the spectral strategy never leaves a clean tone indeterminate.
    #[test]
    fn fallback_is_determinate(freq in 10.0f64..500.0) {
        let estimator = FrequencyEstimator::new(EstimatorConfig {
            spectral: false,
            ..EstimatorConfig::default()
        });
        let x = SignalGenerator::new(Shape::Sine, freq).render(FS as usize, FS);
        let report = estimator.estimate(&x, FS);
        prop_assert!(report.selected.is_determinate());
        prop_assert!(report.method.is_some());
    }
}
