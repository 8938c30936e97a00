//! CLI command implementations.

pub mod account;
pub mod bridges;
pub mod config;
pub mod handoff;
pub mod otp;
pub mod usage;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;
use wifigate_api::{ApiError, ApiErrorBody, HotspotApi};
use wifigate_core::{ApiResponse, ClientConfig};
use wifigate_fetch::{BridgeRegistry, DispatchOutcome, DispatchSettings, Dispatcher};

use crate::output::{Detail, JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Loads the configuration named by `--config`, or the default one.
pub fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ClientConfig::load().context("Failed to load configuration")?,
    };

    if let Some(mode) = cli.mode {
        config.dispatch.mode = mode.into();
    }

    Ok(config)
}

/// Builds the dispatch settings for the effective configuration.
pub fn settings(config: &ClientConfig) -> DispatchSettings {
    DispatchSettings::from(&config.dispatch)
}

/// Builds the API facade over the built-in bridges.
pub fn build_api(cli: &Cli) -> Result<HotspotApi> {
    let config = load_config(cli)?;
    debug!(mode = %config.dispatch.mode, base = %config.api_base_url, "Building dispatcher");

    let dispatcher = Dispatcher::builder()
        .registry(BridgeRegistry::default())
        .settings(settings(&config))
        .build()
        .context("Failed to create HTTP client")?;

    Ok(HotspotApi::new(Arc::new(dispatcher), config))
}

/// Renders a dispatch outcome and picks the exit code.
///
/// `interpret` only sees responses the API did not reject; client errors are
/// shown as the API's validation messages.
pub fn report<F>(outcome: &DispatchOutcome, cli: &Cli, interpret: F) -> Result<ExitCode>
where
    F: FnOnce(&ApiResponse) -> Result<Detail, ApiError>,
{
    let (code, detail, problem) = match &outcome.result {
        Err(err) => (ExitCode::Unreachable, None, Some(err.to_string())),
        Ok(response) if response.is_client_error() => {
            let rejection = ApiErrorBody::from_response(response).into_error(response.status);
            (ExitCode::Rejected, None, Some(rejection.to_string()))
        }
        Ok(response) => match interpret(response) {
            Ok(detail) => (ExitCode::Success, Some(detail), None),
            Err(err) => (ExitCode::InvalidResponse, None, Some(err.to_string())),
        },
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            if !cli.quiet {
                println!("{}", formatter.format_outcome(outcome));
            }
            if let Some(detail) = &detail {
                println!("{}", formatter.format_detail(detail));
            }
            if let Some(problem) = &problem {
                eprintln!("{}", formatter.format_error(problem));
            }
            if cli.show_log || code != ExitCode::Success {
                let trail = formatter.format_trail(outcome);
                if !trail.is_empty() {
                    println!("{trail}");
                }
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = formatter.outcome_output(outcome, detail.as_ref(), problem.as_deref());
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(code)
}
