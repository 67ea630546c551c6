//! wavecap CLI - capture, classify and report periodic waveforms.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wavecap")]
#[command(author, version, about = "Waveform capture and classification", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture and classify in a loop
    Monitor(commands::monitor::MonitorArgs),

    /// Classify a WAV recording window by window
    Analyze(commands::analyze::AnalyzeArgs),

    /// Write a synthetic test waveform to a WAV file
    Generate(commands::generate::GenerateArgs),

    /// Show or create the configuration file
    Config(commands::config::ConfigArgs),
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
    tracing_log::LogTracer::init().ok();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Monitor(args) => commands::monitor::run(args, config),
        Commands::Analyze(args) => commands::analyze::run(args, config),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Config(args) => commands::config::run(args, config),
    }
}
