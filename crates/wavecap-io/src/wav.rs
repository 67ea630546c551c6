//! Recordings on disk.
//!
//! Offline analysis works on mono `f64` samples in `[-1, 1]`: integer PCM is
//! scaled by its bit depth and multi-channel frames are averaged.

use crate::Result;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Span of samples in a [`Recording`], for flatness checks.
pub const RECORDING_FULL_SCALE: f64 = 2.0;

/// A WAV file mixed down to mono.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// Mono samples in `[-1, 1]`.
    pub samples: Vec<f64>,
    /// Frames per second.
    pub sample_rate: u32,
    /// Channels in the file before mixing.
    pub channels: u16,
    /// Stored bit depth.
    pub bits_per_sample: u16,
    /// IEEE float storage rather than integer PCM.
    pub is_float: bool,
}

impl Recording {
    /// Sample rate as used by the estimators.
    pub fn sample_rate_hz(&self) -> f64 {
        f64::from(self.sample_rate)
    }

    /// Length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate.max(1))
    }

    /// Consecutive windows of `len` samples; the last may be shorter.
    pub fn windows(&self, len: usize) -> std::slice::Chunks<'_, f64> {
        self.samples.chunks(len.max(1))
    }
}

/// Format for [`write_wav`]. 32-bit is written as float, 16 and 24 as PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Channel count; every channel gets the same signal.
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 5000,
            bits_per_sample: 16,
        }
    }
}

impl WavSpec {
    fn to_hound(self) -> hound::WavSpec {
        let sample_format = match self.bits_per_sample {
            32 => SampleFormat::Float,
            _ => SampleFormat::Int,
        };
        hound::WavSpec {
            channels: self.channels.max(1),
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format,
        }
    }
}

/// Load a WAV file as a mono [`Recording`].
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<Recording> {
    let reader = WavReader::open(path)?;
    let format = reader.spec();
    let channels = usize::from(format.channels.max(1));

    let interleaved: Vec<f64> = if format.sample_format == SampleFormat::Float {
        reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()?
    } else {
        let scale = f64::from(1u32 << (format.bits_per_sample.clamp(1, 32) - 1));
        reader
            .into_samples::<i32>()
            .map(|s| s.map(|v| f64::from(v) / scale))
            .collect::<std::result::Result<_, _>>()?
    };

    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f64>() / channels as f64)
            .collect()
    };

    tracing::debug!(
        frames = samples.len(),
        sample_rate = format.sample_rate,
        channels = format.channels,
        "read WAV"
    );

    Ok(Recording {
        samples,
        sample_rate: format.sample_rate,
        channels: format.channels,
        bits_per_sample: format.bits_per_sample,
        is_float: format.sample_format == SampleFormat::Float,
    })
}

/// Write `samples` (nominally `[-1, 1]`) to every channel. PCM output clips.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f64], spec: WavSpec) -> Result<()> {
    let format = spec.to_hound();
    let mut writer = WavWriter::create(path, format)?;

    for &x in samples {
        for _ in 0..format.channels {
            if format.sample_format == SampleFormat::Float {
                writer.write_sample(x as f32)?;
            } else {
                let scale = f64::from(1u32 << (spec.bits_per_sample.clamp(2, 31) - 1));
                let code = (x * scale).round().clamp(-scale, scale - 1.0) as i32;
                writer.write_sample(code)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
