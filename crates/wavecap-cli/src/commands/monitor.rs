//! Capture-analyze-report loop.

use super::common::{CycleReport, ShapeArg, load_config};
use clap::{Args, ValueEnum};
use std::path::Path;
use std::time::{Duration, Instant};
use wavecap_config::{AnalyzerConfig, PacingMode};
use wavecap_core::{CaptureWindow, NoiseSource, SignalGenerator, WaveformLabel};
use wavecap_io::{CancelToken, CaptureBuffer, Error, SampleSource, SimulatedSource};

/// Where samples come from.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum SourceKind {
    /// Synthetic waveform quantized through the configured ADC
    #[default]
    Sim,
    /// MCP3008 on the configured spidev node
    Spi,
}

#[derive(Args)]
pub struct MonitorArgs {
    /// Sample source
    #[arg(long, value_enum, default_value = "sim")]
    source: SourceKind,

    /// ADC channel (overrides config)
    #[arg(long)]
    channel: Option<u8>,

    /// Target sample rate in Hz (overrides config)
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Window length in seconds (overrides config)
    #[arg(long)]
    duration: Option<f64>,

    /// Pause between cycles in milliseconds (overrides config)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Read as fast as possible instead of pacing to the target rate
    #[arg(long)]
    free: bool,

    /// Only print when the label changes
    #[arg(long)]
    on_change: bool,

    /// Emit one JSON object per cycle
    #[arg(long)]
    json: bool,

    /// Stop after this many cycles
    #[arg(long)]
    cycles: Option<u64>,

    /// Simulated waveform shape
    #[arg(long, value_enum, default_value = "sine")]
    shape: ShapeArg,

    /// Simulated frequency in Hz
    #[arg(long, default_value = "50.0")]
    freq: f64,

    /// Simulated peak amplitude in volts
    #[arg(long, default_value = "1.0")]
    amplitude: f64,

    /// Simulated DC offset in volts
    #[arg(long, default_value = "1.65")]
    offset: f64,

    /// Simulated Gaussian noise sigma in volts
    #[arg(long, default_value = "0.0")]
    noise: f64,

    /// Noise seed
    #[arg(long)]
    seed: Option<u32>,

    /// Advance the simulated clock one sample period per read instead of
    /// following wall time
    #[arg(long)]
    stepped: bool,
}

impl MonitorArgs {
    fn apply(&self, config: &mut AnalyzerConfig) {
        if let Some(channel) = self.channel {
            config.capture.channel = channel;
        }
        if let Some(rate) = self.sample_rate {
            config.capture.sample_rate_hz = rate;
        }
        if let Some(duration) = self.duration {
            config.capture.duration_secs = duration;
        }
        if let Some(interval) = self.interval_ms {
            config.report.interval_ms = interval;
        }
        if self.free {
            config.capture.pacing = PacingMode::Free;
        }
        if self.on_change {
            config.report.on_change_only = true;
        }
    }

    fn generator(&self) -> SignalGenerator {
        let mut generator = SignalGenerator::new(self.shape.into(), self.freq)
            .with_amplitude(self.amplitude)
            .with_offset(self.offset);
        if self.noise > 0.0 {
            let mut noise = NoiseSource::gaussian(self.noise);
            if let Some(seed) = self.seed {
                noise = noise.with_seed(seed);
            }
            generator = generator.with_noise(noise);
        }
        generator
    }
}

/// Loop settings resolved from config and flags.
struct LoopSettings {
    interval: Duration,
    on_change_only: bool,
    max_consecutive_errors: u32,
    cycles: Option<u64>,
    json: bool,
    /// Analyze at the target rate instead of the measured one.
    synthetic_clock: bool,
}

pub fn run(args: MonitorArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.apply(&mut config);
    config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    let settings = LoopSettings {
        interval: config.report.interval(),
        on_change_only: config.report.on_change_only,
        max_consecutive_errors: config.report.max_consecutive_errors,
        cycles: args.cycles,
        json: args.json,
        synthetic_clock: matches!(args.source, SourceKind::Sim) && args.stepped,
    };

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())?;

    match args.source {
        SourceKind::Sim => {
            let adc = config.adc_spec();
            let source = if args.stepped {
                SimulatedSource::stepped(args.generator(), adc, config.capture.sample_rate_hz)
            } else {
                SimulatedSource::new(args.generator(), adc)
            };
            tracing::info!(
                shape = ?args.shape,
                freq = args.freq,
                stepped = args.stepped,
                "simulated source"
            );
            run_loop(source, &config, &settings, cancel)
        }
        SourceKind::Spi => run_spi(&config, &settings, cancel),
    }
}

#[cfg(feature = "linux-spi")]
fn run_spi(
    config: &AnalyzerConfig,
    settings: &LoopSettings,
    cancel: CancelToken,
) -> anyhow::Result<()> {
    let spi = wavecap_io::SpiSettings {
        device: config.spi.device.clone(),
        max_speed_hz: config.spi.max_speed_hz,
        mode: config.spi.mode,
    };
    let adc = wavecap_io::open_spidev(&spi, config.adc.vref)?;
    run_loop(adc, config, settings, cancel)
}

#[cfg(not(feature = "linux-spi"))]
fn run_spi(
    _config: &AnalyzerConfig,
    _settings: &LoopSettings,
    _cancel: CancelToken,
) -> anyhow::Result<()> {
    Err(Error::Unsupported("SPI source requires a build with the linux-spi feature".into()).into())
}

/// Own `source` for the whole loop; it is dropped (and the bus released)
/// on every return path.
fn run_loop<S: SampleSource>(
    source: S,
    config: &AnalyzerConfig,
    settings: &LoopSettings,
    cancel: CancelToken,
) -> anyhow::Result<()> {
    let analyzer = config.analyzer();
    let capture = config.capture_config();
    let target_fs = capture.sample_rate_hz;
    let mut buffer = CaptureBuffer::new(source, capture).with_cancel(cancel.clone());

    tracing::info!(
        channel = config.capture.channel,
        target_fs,
        samples = buffer.config().sample_count(),
        "monitor started"
    );

    let mut cycle: u64 = 0;
    let mut consecutive_errors: u32 = 0;
    let mut last_label: Option<WaveformLabel> = None;

    loop {
        if cancel.is_cancelled() || settings.cycles.is_some_and(|max| cycle >= max) {
            break;
        }

        let window = match buffer.capture() {
            Ok(window) => {
                consecutive_errors = 0;
                window
            }
            Err(Error::Cancelled) => break,
            Err(e) => {
                consecutive_errors += 1;
                tracing::warn!(error = %e, consecutive_errors, "capture failed");
                if consecutive_errors >= settings.max_consecutive_errors {
                    anyhow::bail!("{consecutive_errors} consecutive capture failures, last: {e}");
                }
                pause(settings.interval, &cancel);
                continue;
            }
        };

        cycle += 1;
        let window = if settings.synthetic_clock {
            CaptureWindow::new(window.into_samples(), target_fs, target_fs)
        } else {
            window
        };
        let analysis = analyzer.analyze(&window);

        let label = analysis.classification.label;
        if !settings.on_change_only || last_label != Some(label) {
            let report = CycleReport::new(cycle, &analysis);
            if settings.json {
                println!("{}", report.to_json()?);
            } else {
                println!("{report}");
            }
        }
        last_label = Some(label);

        pause(settings.interval, &cancel);
    }

    tracing::info!(cycles = cycle, "monitor stopped");
    Ok(())
}

/// Sleep for `interval`, waking early on cancellation.
fn pause(interval: Duration, cancel: &CancelToken) {
    const SLICE: Duration = Duration::from_millis(20);
    let end = Instant::now() + interval;
    while !cancel.is_cancelled() {
        let now = Instant::now();
        if now >= end {
            break;
        }
        std::thread::sleep((end - now).min(SLICE));
    }
}
