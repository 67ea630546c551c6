//! Acquisition layer for wavecap.
//!
//! This crate provides:
//!
//! - **Sample sources**: the [`SampleSource`] trait, the [`Mcp3008`] SPI
//!   driver and a [`SimulatedSource`] for running without hardware
//! - **Paced capture**: [`CaptureBuffer`] fills a [`CaptureWindow`] at a
//!   target rate with a drift-free deadline pacer and cooperative
//!   cancellation between samples
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] for offline analysis
//!   and test signals
//!
//! ## Quick Start
//!
//! ```rust
//! use wavecap_core::{AdcSpec, Shape, SignalGenerator};
//! use wavecap_io::{CaptureBuffer, CaptureConfig, Pacing, SimulatedSource};
//!
//! let source = SimulatedSource::stepped(
//!     SignalGenerator::new(Shape::Sine, 50.0).with_amplitude(1.5).with_offset(1.65),
//!     AdcSpec::default(),
//!     2000.0,
//! );
//! let config = CaptureConfig {
//!     sample_rate_hz: 2000.0,
//!     duration_secs: 0.05,
//!     pacing: Pacing::Free,
//!     ..CaptureConfig::default()
//! };
//! let mut buffer = CaptureBuffer::new(source, config);
//! let window = buffer.capture()?;
//! assert_eq!(window.len(), 100);
//! # Ok::<(), wavecap_io::Error>(())
//! ```

mod capture;
mod mcp3008;
mod sim;
mod source;
mod wav;

pub use capture::{CancelToken, CaptureBuffer, CaptureConfig, DeadlinePacer, Pacing, next_deadline};
#[cfg(feature = "linux-spi")]
pub use mcp3008::{SpiSettings, open_spidev};
pub use mcp3008::Mcp3008;
pub use sim::SimulatedSource;
pub use source::{MAX_CHANNEL, SampleSource, check_channel};
pub use wav::{RECORDING_FULL_SCALE, Recording, WavSpec, read_wav, write_wav};

pub use wavecap_core::CaptureWindow;

/// Error types for acquisition and file I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Channel outside 0..=7, rejected before any bus activity.
    #[error("invalid channel {0}: expected 0..={max}", max = MAX_CHANNEL)]
    InvalidChannel(u8),

    /// Bus or read failure reported by the device.
    #[error("device error: {0}")]
    Device(String),

    /// Capture aborted between samples by a cancellation request.
    #[error("capture cancelled")]
    Cancelled,

    /// Capture parameters that cannot produce a window.
    #[error("invalid capture settings: {0}")]
    InvalidCapture(String),

    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested capability not compiled into this build.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Convenience result type for acquisition operations.
pub type Result<T> = std::result::Result<T, Error>;
