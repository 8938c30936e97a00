//! Config command - manage configuration.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use serde_json::json;
use tracing::info;
use wifigate_core::ClientConfig;

use super::load_config;
use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,

    /// Show the configuration file path.
    Path,

    /// Write the default configuration.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli) -> Result<ExitCode> {
    let path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);

    match &args.action {
        ConfigAction::Show => {
            let config = load_config(cli)?;
            let formatter = JsonFormatter::new(cli.pretty || cli.format == OutputFormat::Text);
            println!("{}", formatter.format(&config)?);
        }
        ConfigAction::Path => match cli.format {
            OutputFormat::Text => println!("{}", path.display()),
            OutputFormat::Json => {
                let formatter = JsonFormatter::new(cli.pretty);
                println!(
                    "{}",
                    formatter.format(&json!({ "path": path, "exists": path.exists() }))?
                );
            }
        },
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            ClientConfig::default()
                .save_to(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote default configuration");
            if !cli.quiet {
                println!("Wrote {}", path.display());
            }
        }
    }

    Ok(ExitCode::Success)
}
