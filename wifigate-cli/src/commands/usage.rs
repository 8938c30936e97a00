//! Usage command - show remaining quota.

use anyhow::Result;
use clap::Args;
use tracing::info;
use wifigate_api::parse_usage;

use super::{build_api, report};
use crate::output::Detail;
use crate::{Cli, ExitCode};

/// Arguments for the usage command.
#[derive(Args)]
pub struct UsageArgs {
    /// Token from `register` or `login`.
    #[arg(long, short)]
    pub token: String,
}

/// Runs the usage command.
pub async fn run(args: &UsageArgs, cli: &Cli) -> Result<ExitCode> {
    info!("Fetching usage");

    let api = build_api(cli)?;
    let outcome = api.get_usage(&args.token).await?;
    report(&outcome, cli, |response| parse_usage(response).map(Detail::Usage))
}
