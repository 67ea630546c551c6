//! Test signal generation command.

use super::common::ShapeArg;
use clap::Args;
use std::path::PathBuf;
use wavecap_core::{NoiseSource, SignalGenerator};
use wavecap_io::{WavSpec, write_wav};

#[derive(Args)]
pub struct GenerateArgs {
    /// Waveform shape
    #[arg(value_enum)]
    shape: ShapeArg,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Frequency in Hz
    #[arg(long, default_value = "50.0")]
    freq: f64,

    /// Duration in seconds
    #[arg(long, default_value = "2.0")]
    duration: f64,

    /// Sample rate
    #[arg(long, default_value = "5000")]
    sample_rate: u32,

    /// Amplitude (0-1)
    #[arg(long, default_value = "0.8")]
    amplitude: f64,

    /// Gaussian noise sigma, relative to full scale
    #[arg(long, default_value = "0.0")]
    noise: f64,

    /// Noise seed
    #[arg(long)]
    seed: Option<u32>,

    /// Bits per sample (16, 24, or 32 for float)
    #[arg(long, default_value = "16")]
    bits: u16,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    if !matches!(args.bits, 16 | 24 | 32) {
        anyhow::bail!("unsupported bit depth {} (use 16, 24 or 32)", args.bits);
    }
    if !(args.duration.is_finite() && args.duration > 0.0) {
        anyhow::bail!("duration must be positive, got {}", args.duration);
    }
    if args.sample_rate == 0 {
        anyhow::bail!("sample rate must be positive");
    }

    let fs = f64::from(args.sample_rate);
    let n = (args.duration * fs).round() as usize;

    let mut generator =
        SignalGenerator::new(args.shape.into(), args.freq).with_amplitude(args.amplitude);
    if args.noise > 0.0 {
        let mut noise = NoiseSource::gaussian(args.noise);
        if let Some(seed) = args.seed {
            noise = noise.with_seed(seed);
        }
        generator = generator.with_noise(noise);
    }
    let samples = generator.render(n, fs);

    let spec = WavSpec {
        channels: 1,
        sample_rate: args.sample_rate,
        bits_per_sample: args.bits,
    };
    write_wav(&args.output, &samples, spec)?;

    println!(
        "Generated {:?} at {} Hz: {} samples ({:.2} s) -> {}",
        args.shape,
        args.freq,
        n,
        args.duration,
        args.output.display()
    );
    Ok(())
}
