//! Handoff command - print the gateway logon URL.

use anyhow::Result;
use clap::Args;
use serde_json::json;
use wifigate_api::RouterHandoff;

use super::load_config;
use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the handoff command.
#[derive(Args)]
pub struct HandoffArgs {
    /// Account username.
    pub username: String,

    /// Account password.
    #[arg(long, short)]
    pub password: String,

    /// CHAP challenge issued by the gateway, if any.
    #[arg(long)]
    pub challenge: Option<String>,

    /// Page to open after logon.
    #[arg(long)]
    pub dst: Option<String>,
}

/// Runs the handoff command.
pub fn run(args: &HandoffArgs, cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let mut handoff = RouterHandoff::from_config(&config)?;
    if let Some(dst) = &args.dst {
        handoff = handoff.with_destination(dst);
    }

    let url = handoff.logon_url(&args.username, &args.password, args.challenge.as_deref());

    match cli.format {
        OutputFormat::Text => println!("{url}"),
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&json!({ "logonUrl": url.as_str() }))?);
        }
    }

    Ok(ExitCode::Success)
}
