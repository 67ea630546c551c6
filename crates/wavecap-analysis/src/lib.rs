//! Wavecap Analysis - frequency estimation and shape classification
//!
//! This crate turns a captured window into a fundamental-frequency estimate
//! and a shape verdict:
//!
//! - [`fft`] - FFT wrapper (`spectral` feature)
//! - [`window`] - Taper windows applied before the FFT
//! - [`spectrum`] - One-sided magnitude spectrum and parabolic peak refinement
//! - [`frequency`] - Spectral, hysteresis, zero-crossing and autocorrelation estimators
//! - [`features`] - Plateau, slope and harmonic-ratio features
//! - [`classifier`] - Two-view shape classifier with tunable thresholds
//! - [`pipeline`] - [`Analyzer`], which runs all of the above on one window
//!
//! ## Spectral Capability
//!
//! The FFT path is behind the default `spectral` feature. Without it,
//! [`spectral_available`] returns `false`, the estimator falls back to the
//! time-domain strategies and the classifier votes on time-domain features
//! alone.
//!
//! ## Example
//!
//! ```rust
//! use wavecap_analysis::Analyzer;
//! use wavecap_core::{CaptureWindow, WaveformLabel};
//!
//! // 20 cycles of a 10-bit triangle, 50 samples per cycle
//! let codes: Vec<u16> = (0..1000)
//!     .map(|i| {
//!         let p = (i % 50) as i32;
//!         let tri = if p < 25 { p } else { 50 - p };
//!         (112 + tri * 32) as u16
//!     })
//!     .collect();
//! let window = CaptureWindow::new(codes, 5000.0, 5000.0);
//!
//! let analysis = Analyzer::default().analyze(&window);
//! assert_eq!(analysis.classification.label, WaveformLabel::Triangle);
//! ```

pub mod classifier;
pub mod features;
#[cfg(feature = "spectral")]
pub mod fft;
pub mod frequency;
pub mod pipeline;
pub mod spectrum;
pub mod window;

pub use classifier::{ClassifierConfig, ShapeClassifier};
pub use features::{harmonic_ratios, shape_features};
#[cfg(feature = "spectral")]
pub use fft::Fft;
pub use frequency::{
    EstimatorConfig, FrequencyEstimator, FrequencyReport, Method, autocorrelation, hysteresis,
    spectral_available, spectral_peak, zero_crossing,
};
pub use pipeline::{Analysis, Analyzer};
pub use spectrum::{SpectrumEstimate, parabolic_offset};
pub use window::Window;
