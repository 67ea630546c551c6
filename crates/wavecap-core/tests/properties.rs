//! Property-based tests for wavecap-core conditioning and timing math.

use std::time::Duration;

use proptest::prelude::*;
use wavecap_core::{AdcSpec, Shape, SignalGenerator, measured_rate, normalize};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Normalizing an already-normalized signal returns it unchanged.
    #[test]
    fn normalize_is_idempotent(
        samples in prop::collection::vec(0.0f64..1023.0, 8..256),
    ) {
        let once = normalize(&samples, 1023.0);
        prop_assume!(!once.is_flat());
        let twice = normalize(once.values(), 1023.0);
        prop_assert!(!twice.is_flat());
        for (a, b) in once.values().iter().zip(twice.values()) {
            prop_assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
        }
    }

    /// Output of a non-flat normalization is bounded by 1 and touches it.
    #[test]
    fn normalize_is_unit_bounded(
        samples in prop::collection::vec(-5.0f64..5.0, 2..256),
    ) {
        let s = normalize(&samples, 10.0);
        prop_assume!(!s.is_flat());
        let max = s.values().iter().fold(0.0f64, |m, v| m.max(v.abs()));
        prop_assert!(max <= 1.0 + 1e-12);
        prop_assert!((max - 1.0).abs() < 1e-9);
        let mean = s.values().iter().sum::<f64>() / s.len() as f64;
        prop_assert!(mean.abs() < 1e-9);
    }

    /// Any capture of two or more samples over nonzero time has a positive, finite rate.
    #[test]
    fn measured_rate_positive_and_finite(
        n in 2usize..100_000,
        micros in 1u64..10_000_000,
        target in 1.0f64..100_000.0,
    ) {
        let fs = measured_rate(n, Duration::from_micros(micros), target);
        prop_assert!(fs.is_finite());
        prop_assert!(fs > 0.0);
    }

    /// Quantizing a generated waveform stays inside the converter range.
    #[test]
    fn quantized_codes_in_range(
        freq in 1.0f64..500.0,
        amplitude in 0.0f64..3.0,
        offset in -1.0f64..4.0,
    ) {
        let adc = AdcSpec::default();
        let mut g = SignalGenerator::new(Shape::Sine, freq)
            .with_amplitude(amplitude)
            .with_offset(offset);
        for v in g.render(256, 5000.0) {
            prop_assert!(adc.contains(adc.volts_to_code(v)));
        }
    }
}

#[test]
fn zero_elapsed_capture_uses_nominal_rate() {
    assert_eq!(measured_rate(400, Duration::ZERO, 5000.0), 5000.0);
}
