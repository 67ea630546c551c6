//! Wavecap Core - data model for waveform capture and classification
//!
//! This crate holds the types every other wavecap crate speaks in, plus the
//! pure math that does not need an FFT:
//!
//! # Acquisition
//!
//! - [`AdcSpec`] - Resolution and reference voltage of the converter
//! - [`RawSample`] - One integer code as read from the converter
//! - [`CaptureWindow`] - An ordered window of codes plus the *measured* sample rate
//! - [`measured_rate`] - Achieved rate from sample count and elapsed time
//!
//! # Conditioning
//!
//! - [`normalize`] - DC removal and peak scaling into [-1, 1]
//! - [`NormalizedSignal`] - The derived signal, or a flat verdict
//!
//! # Results
//!
//! - [`FrequencyEstimate`] - A frequency in Hz, or indeterminate
//! - [`WaveformLabel`] / [`ClassificationResult`] - Shape verdict with confidence
//! - [`ShapeFeatures`] / [`HarmonicRatios`] - Diagnostic feature values
//!
//! # Synthesis
//!
//! - [`SignalGenerator`] - Ideal sine / triangle / square with optional noise,
//!   used by simulated sources, test fixtures and benchmarks
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible so the data model can travel with an
//! embedded front end. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! wavecap-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use wavecap_core::{normalize, AdcSpec, CaptureWindow};
//!
//! let adc = AdcSpec::default();
//! let window = CaptureWindow::new(vec![512, 800, 512, 224], 4000.0, 4000.0);
//! let signal = normalize(&window.to_f64(), adc.full_scale_f64());
//! assert!(!signal.is_flat());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod adc;
pub mod estimate;
pub mod generator;
pub mod normalize;
pub mod waveform;
pub mod window;

pub use adc::{AdcSpec, RawSample};
pub use estimate::FrequencyEstimate;
pub use generator::{NoiseSource, Shape, SignalGenerator};
pub use normalize::{FLATNESS_EPSILON, NormalizedSignal, PEAK_FLOOR, normalize};
pub use waveform::{ClassificationResult, HarmonicRatios, ShapeFeatures, WaveformLabel};
pub use window::{CaptureWindow, measured_rate};
