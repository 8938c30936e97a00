// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! wifigate CLI - sign up and log in to a hotspot from behind its portal.
//!
//! # Examples
//!
//! ```bash
//! # Create an account (plan defaults to the configured one)
//! wifigate register alice --password s3cret --phone +15550100
//!
//! # Log in and print the token
//! wifigate login alice --password s3cret
//!
//! # Remaining quota, with the per-bridge trail
//! wifigate usage --token <TOKEN> --show-log
//!
//! # Phone verification
//! wifigate otp request --token <TOKEN>
//! wifigate otp verify --token <TOKEN> 123456
//!
//! # Try bridges one at a time instead of racing them
//! wifigate --mode sequential login alice --password s3cret
//!
//! # Gateway logon URL
//! wifigate handoff alice --password s3cret
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use wifigate_core::DispatchMode;

use commands::{account, bridges, config, handoff, otp, usage};

// ============================================================================
// CLI Definition
// ============================================================================

/// wifigate CLI - hotspot sign-up and login.
#[derive(Parser)]
#[command(name = "wifigate")]
#[command(about = "Hotspot sign-up and login client")]
#[command(long_about = r"
wifigate talks to the hotspot provider's API from inside the hotspot's
walled garden. Each request is tried over several network paths (bridges):
a direct call and a handful of public relays. The first path that gets a
genuine answer wins; when none does, the per-bridge trail says why.

Examples:
  wifigate register alice --password s3cret
  wifigate login alice --password s3cret
  wifigate usage --token <TOKEN>
  wifigate bridges
  wifigate --format json --show-log login alice --password s3cret
")]
#[command(version)]
#[command(author = "wifigate contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the platform config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Dispatch mode override.
    #[arg(long, short, global = true)]
    pub mode: Option<ModeArg>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Show the per-bridge trail even when a request succeeds.
    #[arg(long, global = true)]
    pub show_log: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create an account.
    #[command(visible_alias = "r")]
    Register(account::RegisterArgs),

    /// Log in and print the issued token.
    #[command(visible_alias = "l")]
    Login(account::LoginArgs),

    /// Show remaining quota.
    #[command(visible_alias = "u")]
    Usage(usage::UsageArgs),

    /// Phone verification with a one-time code.
    Otp(otp::OtpArgs),

    /// List the configured bridges.
    #[command(visible_alias = "b")]
    Bridges,

    /// Print the gateway logon URL.
    Handoff(handoff::HandoffArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// Dispatch mode as a CLI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Try every bridge at once.
    Race,
    /// Try bridges in order.
    Sequential,
}

impl From<ModeArg> for DispatchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Race => DispatchMode::Race,
            ModeArg::Sequential => DispatchMode::Sequential,
        }
    }
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// No bridge reached the API.
    Unreachable = 2,
    /// The API answered with a client error.
    Rejected = 3,
    /// The API's answer could not be understood.
    InvalidResponse = 4,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("wifigate=debug,info")
    } else {
        EnvFilter::new("wifigate=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Register(args) => account::run_register(args, &cli).await,
        Commands::Login(args) => account::run_login(args, &cli).await,
        Commands::Usage(args) => usage::run(args, &cli).await,
        Commands::Otp(args) => otp::run(args, &cli).await,
        Commands::Bridges => bridges::run(&cli),
        Commands::Handoff(args) => handoff::run(args, &cli),
        Commands::Config(args) => config::run(args, &cli),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::Error
        }
    };

    if code != ExitCode::Success {
        std::process::exit(code as i32);
    }

    Ok(())
}
