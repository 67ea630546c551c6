//! Offline classification of WAV recordings.

use super::common::{CycleReport, load_config};
use clap::Args;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use wavecap_io::{RECORDING_FULL_SCALE, read_wav};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Window length in seconds (defaults to the configured capture duration)
    #[arg(long)]
    window: Option<f64>,

    /// Emit one JSON object per window
    #[arg(long)]
    json: bool,
}

pub fn run(args: AnalyzeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let analyzer = config.analyzer();

    let recording = read_wav(&args.input)?;
    let fs = recording.sample_rate_hz();

    let window_secs = args.window.unwrap_or(config.capture.duration_secs);
    if !(window_secs.is_finite() && window_secs > 0.0) {
        anyhow::bail!("window length must be positive, got {window_secs}");
    }
    let window_len = ((window_secs * fs).round() as usize).max(1);

    if !args.json {
        println!("Analyzing: {}", args.input.display());
        println!(
            "  {} Hz, {} ch, {} bit{}, {:.2} s",
            recording.sample_rate,
            recording.channels,
            recording.bits_per_sample,
            if recording.is_float { " float" } else { "" },
            recording.duration_secs()
        );
        println!("  {} samples per window\n", window_len);
    }

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut windows: u64 = 0;

    for chunk in recording.windows(window_len) {
        windows += 1;
        let analysis = analyzer.analyze_samples(chunk, fs, RECORDING_FULL_SCALE);
        let report = CycleReport::new(windows, &analysis);
        *counts.entry(report.label).or_default() += 1;

        if args.json {
            println!("{}", report.to_json()?);
        } else {
            println!("{report}");
        }
    }

    if !args.json {
        println!("\nSummary: {} window(s)", windows);
        for (label, count) in &counts {
            println!("  {:<10} {}", label, count);
        }
    }

    tracing::debug!(windows, window_len, "analysis complete");
    Ok(())
}
