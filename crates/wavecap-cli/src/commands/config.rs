//! Configuration file management.

use super::common::load_config;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use wavecap_config::{AnalyzerConfig, user_config_path};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Write the default configuration to a file
    Init {
        /// Destination (defaults to the user config path)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the user configuration path
    Path,
}

pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = load_config(config_path)?;
            print!("{}", config.to_toml()?);
        }

        ConfigCommand::Init { path, force } => {
            let path = path.unwrap_or_else(user_config_path);
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            AnalyzerConfig::default().save(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }

        ConfigCommand::Path => {
            println!("{}", user_config_path().display());
        }
    }
    Ok(())
}
