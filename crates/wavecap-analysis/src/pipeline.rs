//! Normalize, estimate and classify one capture window.

use wavecap_core::{AdcSpec, CaptureWindow, ClassificationResult, normalize};

use crate::classifier::{ClassifierConfig, ShapeClassifier};
use crate::frequency::{EstimatorConfig, FrequencyEstimator, FrequencyReport};

/// Everything computed from one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analysis {
    /// Sample rate the analysis assumed.
    pub measured_fs: f64,
    /// Samples analyzed.
    pub samples: usize,
    /// Per-strategy frequency estimates.
    pub frequency: FrequencyReport,
    /// Shape verdict.
    pub classification: ClassificationResult,
}

/// Stateless analysis pipeline.
///
/// # Example
///
/// ```rust
/// use wavecap_analysis::Analyzer;
/// use wavecap_core::{Shape, SignalGenerator, WaveformLabel};
///
/// let x = SignalGenerator::new(Shape::Square, 100.0).render(4000, 10_000.0);
/// let analysis = Analyzer::default().analyze_samples(&x, 10_000.0, 2.0);
/// assert_eq!(analysis.classification.label, WaveformLabel::Square);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    adc: AdcSpec,
    estimator: FrequencyEstimator,
    classifier: ShapeClassifier,
}

impl Analyzer {
    /// Build a pipeline from its parts.
    pub fn new(adc: AdcSpec, estimator: EstimatorConfig, classifier: ClassifierConfig) -> Self {
        Self {
            adc,
            estimator: FrequencyEstimator::new(estimator),
            classifier: ShapeClassifier::new(classifier),
        }
    }

    /// Converter the windows come from.
    pub fn adc(&self) -> &AdcSpec {
        &self.adc
    }

    /// The frequency estimator.
    pub fn estimator(&self) -> &FrequencyEstimator {
        &self.estimator
    }

    /// The shape classifier.
    pub fn classifier(&self) -> &ShapeClassifier {
        &self.classifier
    }

    /// Analyze a captured window of raw codes at its measured rate.
    pub fn analyze(&self, window: &CaptureWindow) -> Analysis {
        self.analyze_samples(&window.to_f64(), window.measured_fs(), self.adc.full_scale_f64())
    }

    /// Analyze arbitrary samples.
    ///
    /// `full_scale` is the span the samples are drawn from; it only sets the
    /// flatness threshold.
    pub fn analyze_samples(&self, samples: &[f64], sample_rate: f64, full_scale: f64) -> Analysis {
        let signal = normalize(samples, full_scale);

        let (frequency, classification) = if signal.is_flat() {
            (
                FrequencyReport::default(),
                self.classifier.classify(&signal, Default::default(), None),
            )
        } else {
            let (report, spectrum) = self.estimator.estimate_with_spectrum(signal.values(), sample_rate);
            let result = self.classifier.classify(&signal, report.selected, spectrum.as_ref());
            (report, result)
        };

        tracing::debug!(
            n = samples.len(),
            fs = sample_rate,
            label = %classification.label,
            confidence = classification.confidence,
            frequency = %frequency.selected,
            method = ?frequency.method,
            "analyzed window"
        );

        Analysis {
            measured_fs: sample_rate,
            samples: samples.len(),
            frequency,
            classification,
        }
    }

    /// Classify samples at `measured_fs`, using the converter's full scale.
    pub fn classify(&self, samples: &[f64], measured_fs: f64) -> ClassificationResult {
        self.analyze_samples(samples, measured_fs, self.adc.full_scale_f64())
            .classification
    }
}
