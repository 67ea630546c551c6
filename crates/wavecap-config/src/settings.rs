//! The `wavecap.toml` file format.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use wavecap_analysis::{Analyzer, ClassifierConfig, EstimatorConfig};
use wavecap_core::AdcSpec;
use wavecap_io::{CaptureConfig, MAX_CHANNEL, Pacing};

use crate::error::ConfigError;
use crate::paths::{ensure_dir, resolve_config_path};
use crate::validation::{ValidationError, ValidationResult, Validator};

/// Complete configuration for capture, analysis and reporting.
///
/// Every field has a default, so a partial file (or an empty one) is valid.
///
/// # TOML Format
///
/// ```toml
/// [capture]
/// channel = 0
/// sample_rate_hz = 5000.0
/// duration_secs = 0.4
/// pacing = "deadline"
///
/// [adc]
/// vref = 3.3
///
/// [classifier]
/// plateau_fraction = 0.25
///
/// [report]
/// on_change_only = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Sampling window.
    pub capture: CaptureSection,
    /// Converter characteristics.
    pub adc: AdcSection,
    /// SPI bus for the hardware source.
    pub spi: SpiSection,
    /// Frequency estimator tuning.
    pub estimator: EstimatorSection,
    /// Classifier thresholds.
    pub classifier: ClassifierSection,
    /// Reporting loop behavior.
    pub report: ReportSection,
}

/// How reads are spaced.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PacingMode {
    /// Hold reads to an additive deadline schedule.
    #[default]
    Deadline,
    /// Read as fast as possible.
    Free,
}

/// `[capture]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureSection {
    /// Converter channel, 0..=7.
    pub channel: u8,
    /// Target sample rate in Hz.
    pub sample_rate_hz: f64,
    /// Window length in seconds.
    pub duration_secs: f64,
    /// Lower bound on samples per window.
    pub min_samples: usize,
    /// Read spacing.
    pub pacing: PacingMode,
    /// Busy-wait stretch before each deadline, in microseconds.
    pub spin_margin_us: u64,
}

impl Default for CaptureSection {
    fn default() -> Self {
        Self {
            channel: 0,
            sample_rate_hz: 5000.0,
            duration_secs: 0.4,
            min_samples: 10,
            pacing: PacingMode::Deadline,
            spin_margin_us: 500,
        }
    }
}

/// `[adc]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdcSection {
    /// Resolution in bits.
    pub bits: u8,
    /// Reference voltage.
    pub vref: f64,
}

impl Default for AdcSection {
    fn default() -> Self {
        let spec = AdcSpec::default();
        Self {
            bits: spec.bits,
            vref: spec.vref,
        }
    }
}

/// `[spi]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SpiSection {
    /// spidev node.
    pub device: String,
    /// Clock ceiling in Hz.
    pub max_speed_hz: u32,
    /// SPI mode 0..=3.
    pub mode: u8,
}

impl Default for SpiSection {
    fn default() -> Self {
        Self {
            device: "/dev/spidev0.0".to_string(),
            max_speed_hz: 1_350_000,
            mode: 0,
        }
    }
}

/// Window applied before the FFT.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// No taper.
    Rectangular,
    /// Raised cosine.
    #[default]
    Hann,
    /// Hamming.
    Hamming,
    /// Blackman.
    Blackman,
}

/// `[estimator]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EstimatorSection {
    /// Use the FFT estimator when available.
    pub spectral: bool,
    /// FFT window.
    pub window: WindowKind,
    /// Ignore spectral peaks below this frequency.
    pub min_frequency_hz: f64,
    /// Always skip this many lowest bins.
    pub skip_bins: usize,
    /// Fewest samples for the FFT estimator.
    pub min_spectral_samples: usize,
    /// Fewest samples for crossing estimators.
    pub min_time_domain_samples: usize,
    /// Hysteresis half-band on the normalized scale.
    pub hysteresis: f64,
    /// Autocorrelation peak threshold.
    pub autocorrelation_threshold: f64,
}

impl Default for EstimatorSection {
    fn default() -> Self {
        let d = EstimatorConfig::default();
        Self {
            spectral: d.spectral,
            window: WindowKind::Hann,
            min_frequency_hz: d.min_frequency_hz,
            skip_bins: d.skip_bins,
            min_spectral_samples: d.min_spectral_samples,
            min_time_domain_samples: d.min_time_domain_samples,
            hysteresis: d.hysteresis,
            autocorrelation_threshold: d.autocorrelation_threshold,
        }
    }
}

/// `[classifier]`, mirroring [`ClassifierConfig`] field for field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ClassifierSection {
    pub min_samples: usize,
    pub plateau_level: f64,
    pub plateau_fraction: f64,
    pub slope_band: f64,
    pub const_slope_fraction: f64,
    pub triangle_sign_change_max: f64,
    pub sine_sign_change_min: f64,
    pub smooth_sign_change_max: f64,
    pub smooth_plateau_max: f64,
    pub smooth_const_slope_max: f64,
    pub slope_cv_max: f64,
    pub square_r3_min: f64,
    pub square_r5_min: f64,
    pub triangle_r3_min: f64,
    pub triangle_r5_max: f64,
    pub triangle_decay_max: f64,
    pub sine_r2_max: f64,
    pub sine_r3_max: f64,
    pub sine_r5_max: f64,
    pub min_harmonic_confidence: f64,
    pub disagreement_penalty: f64,
    pub unknown_confidence: f64,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        ClassifierConfig::default().into()
    }
}

impl From<ClassifierConfig> for ClassifierSection {
    fn from(c: ClassifierConfig) -> Self {
        Self {
            min_samples: c.min_samples,
            plateau_level: c.plateau_level,
            plateau_fraction: c.plateau_fraction,
            slope_band: c.slope_band,
            const_slope_fraction: c.const_slope_fraction,
            triangle_sign_change_max: c.triangle_sign_change_max,
            sine_sign_change_min: c.sine_sign_change_min,
            smooth_sign_change_max: c.smooth_sign_change_max,
            smooth_plateau_max: c.smooth_plateau_max,
            smooth_const_slope_max: c.smooth_const_slope_max,
            slope_cv_max: c.slope_cv_max,
            square_r3_min: c.square_r3_min,
            square_r5_min: c.square_r5_min,
            triangle_r3_min: c.triangle_r3_min,
            triangle_r5_max: c.triangle_r5_max,
            triangle_decay_max: c.triangle_decay_max,
            sine_r2_max: c.sine_r2_max,
            sine_r3_max: c.sine_r3_max,
            sine_r5_max: c.sine_r5_max,
            min_harmonic_confidence: c.min_harmonic_confidence,
            disagreement_penalty: c.disagreement_penalty,
            unknown_confidence: c.unknown_confidence,
        }
    }
}

impl From<&ClassifierSection> for ClassifierConfig {
    fn from(s: &ClassifierSection) -> Self {
        Self {
            min_samples: s.min_samples,
            plateau_level: s.plateau_level,
            plateau_fraction: s.plateau_fraction,
            slope_band: s.slope_band,
            const_slope_fraction: s.const_slope_fraction,
            triangle_sign_change_max: s.triangle_sign_change_max,
            sine_sign_change_min: s.sine_sign_change_min,
            smooth_sign_change_max: s.smooth_sign_change_max,
            smooth_plateau_max: s.smooth_plateau_max,
            smooth_const_slope_max: s.smooth_const_slope_max,
            slope_cv_max: s.slope_cv_max,
            square_r3_min: s.square_r3_min,
            square_r5_min: s.square_r5_min,
            triangle_r3_min: s.triangle_r3_min,
            triangle_r5_max: s.triangle_r5_max,
            triangle_decay_max: s.triangle_decay_max,
            sine_r2_max: s.sine_r2_max,
            sine_r3_max: s.sine_r3_max,
            sine_r5_max: s.sine_r5_max,
            min_harmonic_confidence: s.min_harmonic_confidence,
            disagreement_penalty: s.disagreement_penalty,
            unknown_confidence: s.unknown_confidence,
        }
    }
}

/// `[report]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportSection {
    /// Pause between cycles, in milliseconds.
    pub interval_ms: u64,
    /// Print only when the label changes.
    pub on_change_only: bool,
    /// Consecutive failed cycles before the loop gives up.
    pub max_consecutive_errors: u32,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            interval_ms: 200,
            on_change_only: false,
            max_consecutive_errors: 3,
        }
    }
}

impl ReportSection {
    /// Pause between cycles.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl AnalyzerConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `explicit`, else the user file if present, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match resolve_config_path(explicit) {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("no configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse and validate TOML text.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            ensure_dir(parent)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Check every value against its allowed range.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut v = Validator::new();

        let c = &self.capture;
        if c.channel > MAX_CHANNEL {
            v.push(ValidationError::InvalidChannel(c.channel));
        }
        v.range("capture.sample_rate_hz", c.sample_rate_hz, 1.0, 200_000.0)
            .range("capture.duration_secs", c.duration_secs, 0.001, 60.0)
            .count("capture.min_samples", c.min_samples, 1, 10_000_000)
            .range("capture.spin_margin_us", c.spin_margin_us as f64, 0.0, 100_000.0);

        v.range("adc.bits", f64::from(self.adc.bits), 1.0, 16.0)
            .range("adc.vref", self.adc.vref, 0.01, 10.0);

        v.range("spi.mode", f64::from(self.spi.mode), 0.0, 3.0)
            .range("spi.max_speed_hz", f64::from(self.spi.max_speed_hz), 10_000.0, 3_600_000.0);
        if self.spi.device.trim().is_empty() {
            v.push(ValidationError::InvalidValue {
                param: "spi.device".into(),
                reason: "device path is empty".into(),
            });
        }

        let e = &self.estimator;
        v.range("estimator.min_frequency_hz", e.min_frequency_hz, 0.0, 100_000.0)
            .count("estimator.skip_bins", e.skip_bins, 0, 4096)
            .count("estimator.min_spectral_samples", e.min_spectral_samples, 4, 10_000_000)
            .count("estimator.min_time_domain_samples", e.min_time_domain_samples, 2, 10_000_000)
            .range("estimator.hysteresis", e.hysteresis, 0.0, 0.99)
            .range("estimator.autocorrelation_threshold", e.autocorrelation_threshold, 0.0, 1.0);

        let k = &self.classifier;
        v.count("classifier.min_samples", k.min_samples, 2, 10_000_000)
            .range("classifier.plateau_level", k.plateau_level, 0.01, 1.0);
        for (name, value) in [
            ("classifier.plateau_fraction", k.plateau_fraction),
            ("classifier.const_slope_fraction", k.const_slope_fraction),
            ("classifier.triangle_sign_change_max", k.triangle_sign_change_max),
            ("classifier.sine_sign_change_min", k.sine_sign_change_min),
            ("classifier.smooth_sign_change_max", k.smooth_sign_change_max),
            ("classifier.smooth_plateau_max", k.smooth_plateau_max),
            ("classifier.smooth_const_slope_max", k.smooth_const_slope_max),
            ("classifier.min_harmonic_confidence", k.min_harmonic_confidence),
            ("classifier.disagreement_penalty", k.disagreement_penalty),
            ("classifier.unknown_confidence", k.unknown_confidence),
        ] {
            v.range(name, value, 0.0, 1.0);
        }
        for (name, value) in [
            ("classifier.slope_band", k.slope_band),
            ("classifier.slope_cv_max", k.slope_cv_max),
            ("classifier.square_r3_min", k.square_r3_min),
            ("classifier.square_r5_min", k.square_r5_min),
            ("classifier.triangle_r3_min", k.triangle_r3_min),
            ("classifier.triangle_r5_max", k.triangle_r5_max),
            ("classifier.triangle_decay_max", k.triangle_decay_max),
            ("classifier.sine_r2_max", k.sine_r2_max),
            ("classifier.sine_r3_max", k.sine_r3_max),
            ("classifier.sine_r5_max", k.sine_r5_max),
        ] {
            v.range(name, value, 0.0, 10.0);
        }
        for (name, value) in [
            ("classifier.sine_r2_max", k.sine_r2_max),
            ("classifier.sine_r3_max", k.sine_r3_max),
            ("classifier.sine_r5_max", k.sine_r5_max),
        ] {
            if value <= 0.0 {
                v.push(ValidationError::InvalidValue {
                    param: name.into(),
                    reason: "sine cutoffs must be positive".into(),
                });
            }
        }

        v.range("report.interval_ms", self.report.interval_ms as f64, 0.0, 3_600_000.0)
            .range(
                "report.max_consecutive_errors",
                f64::from(self.report.max_consecutive_errors),
                1.0,
                1_000_000.0,
            );

        v.finish()
    }

    /// Converter description.
    pub fn adc_spec(&self) -> AdcSpec {
        AdcSpec::new(self.adc.bits, self.adc.vref)
    }

    /// Runtime capture settings.
    pub fn capture_config(&self) -> CaptureConfig {
        let c = &self.capture;
        CaptureConfig {
            channel: c.channel,
            sample_rate_hz: c.sample_rate_hz,
            duration_secs: c.duration_secs,
            min_samples: c.min_samples,
            pacing: match c.pacing {
                PacingMode::Free => Pacing::Free,
                PacingMode::Deadline => Pacing::Deadline {
                    spin_margin: Duration::from_micros(c.spin_margin_us),
                },
            },
        }
    }

    /// Runtime estimator settings.
    pub fn estimator_config(&self) -> EstimatorConfig {
        let e = &self.estimator;
        EstimatorConfig {
            spectral: e.spectral,
            min_frequency_hz: e.min_frequency_hz,
            skip_bins: e.skip_bins,
            min_spectral_samples: e.min_spectral_samples,
            min_time_domain_samples: e.min_time_domain_samples,
            hysteresis: e.hysteresis,
            autocorrelation_threshold: e.autocorrelation_threshold,
            window: match e.window {
                WindowKind::Rectangular => wavecap_analysis::Window::Rectangular,
                WindowKind::Hann => wavecap_analysis::Window::Hann,
                WindowKind::Hamming => wavecap_analysis::Window::Hamming,
                WindowKind::Blackman => wavecap_analysis::Window::Blackman,
            },
        }
    }

    /// Runtime classifier thresholds.
    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig::from(&self.classifier)
    }

    /// Analysis pipeline built from this configuration.
    pub fn analyzer(&self) -> Analyzer {
        Analyzer::new(self.adc_spec(), self.estimator_config(), self.classifier_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavecap_analysis::Window;

    #[test]
    fn defaults_validate() {
        AnalyzerConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_file_is_defaults() {
        let config = AnalyzerConfig::from_toml("").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = AnalyzerConfig::from_toml(
            r#"
            [capture]
            sample_rate_hz = 2000.0
            pacing = "free"

            [classifier]
            plateau_fraction = 0.3
            "#,
        )
        .unwrap();
        assert_eq!(config.capture.sample_rate_hz, 2000.0);
        assert_eq!(config.capture.duration_secs, 0.4);
        assert_eq!(config.capture.pacing, PacingMode::Free);
        assert_eq!(config.classifier.plateau_fraction, 0.3);
        assert_eq!(config.classifier.min_samples, 30);
        assert_eq!(config.capture_config().pacing, Pacing::Free);
    }

    #[test]
    fn toml_round_trip() {
        let mut config = AnalyzerConfig::default();
        config.report.on_change_only = true;
        config.estimator.window = WindowKind::Blackman;
        let text = config.to_toml().unwrap();
        assert!(text.contains("[classifier]"));
        assert!(text.contains("window = \"blackman\""));
        assert_eq!(AnalyzerConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn bad_values_are_all_reported() {
        let err = AnalyzerConfig::from_toml(
            r#"
            [capture]
            channel = 9
            sample_rate_hz = -5.0
            "#,
        )
        .unwrap_err();
        match err {
            ConfigError::Validation(ValidationError::Multiple(errors)) => {
                assert!(errors.contains(&ValidationError::InvalidChannel(9)));
                assert!(errors.iter().any(|e| matches!(
                    e,
                    ValidationError::OutOfRange { param, .. } if param == "capture.sample_rate_hz"
                )));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unknown_pacing_is_parse_error() {
        let err = AnalyzerConfig::from_toml("[capture]\npacing = \"sometimes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn conversions_carry_values() {
        let mut config = AnalyzerConfig::default();
        config.capture.spin_margin_us = 250;
        config.adc.vref = 5.0;
        config.classifier.slope_cv_max = 0.4;
        config.estimator.spectral = false;

        assert_eq!(
            config.capture_config().pacing,
            Pacing::Deadline {
                spin_margin: Duration::from_micros(250)
            }
        );
        assert_eq!(config.adc_spec(), AdcSpec::new(10, 5.0));
        assert_eq!(config.classifier_config().slope_cv_max, 0.4);
        assert!(!config.estimator_config().spectral);
        assert!(!config.analyzer().estimator().uses_spectral());
    }

    #[test]
    fn window_reaches_estimator() {
        let mut config = AnalyzerConfig::default();
        assert_eq!(config.estimator_config().window, Window::Hann);
        config.estimator.window = WindowKind::Blackman;
        assert_eq!(config.estimator_config().window, Window::Blackman);
        config.estimator.window = WindowKind::Rectangular;
        assert_eq!(config.estimator_config().window, Window::Rectangular);
    }

    #[test]
    fn smooth_sine_thresholds_from_toml() {
        let config = AnalyzerConfig::from_toml("[classifier]\nsmooth_sign_change_max = 0.0\n").unwrap();
        assert_eq!(config.classifier_config().smooth_sign_change_max, 0.0);
        assert_eq!(config.classifier_config().smooth_plateau_max, 0.5);
        assert!(AnalyzerConfig::from_toml("[classifier]\nsmooth_plateau_max = 1.5\n").is_err());
    }

    #[test]
    fn defaults_match_runtime_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.capture_config(), CaptureConfig::default());
        assert_eq!(config.estimator_config(), EstimatorConfig::default());
        assert_eq!(config.classifier_config(), ClassifierConfig::default());
    }
}
