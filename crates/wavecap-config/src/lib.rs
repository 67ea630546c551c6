//! Configuration file support for wavecap.
//!
//! One TOML file, `wavecap.toml`, carries every tunable of the pipeline:
//! capture window and pacing, converter reference, SPI bus, estimator
//! tuning, classifier thresholds and the reporting loop. Missing keys fall
//! back to defaults, and [`AnalyzerConfig::validate`] reports every bad value
//! in a single pass.
//!
//! # Example
//!
//! ```rust,no_run
//! use wavecap_config::{AnalyzerConfig, user_config_path};
//!
//! let config = AnalyzerConfig::discover(None).unwrap();
//! let analyzer = config.analyzer();
//! let capture = config.capture_config();
//! assert!(capture.sample_count() > 0);
//!
//! config.save(user_config_path()).unwrap();
//! # let _ = analyzer;
//! ```

mod error;
mod settings;

/// Platform-specific configuration paths.
pub mod paths;

/// Range checks for configuration values.
pub mod validation;

pub use error::ConfigError;
pub use paths::{ensure_user_config_dir, resolve_config_path, user_config_dir, user_config_path};
pub use settings::{
    AdcSection, AnalyzerConfig, CaptureSection, ClassifierSection, EstimatorSection, PacingMode,
    ReportSection, SpiSection, WindowKind,
};
pub use validation::{ValidationError, ValidationResult, Validator};
