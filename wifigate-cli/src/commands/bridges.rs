//! Bridges command - list network paths.

use anyhow::Result;
use tracing::info;
use wifigate_fetch::BridgeRegistry;

use super::{load_config, settings};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Runs the bridges command.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    info!("Listing bridges");

    let config = load_config(cli)?;
    let settings = settings(&config);
    let registry = BridgeRegistry::default();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            println!("{}", formatter.format_bridges_header());
            println!("{}", "─".repeat(70));

            for bridge in registry.bridges() {
                println!("{}", formatter.format_bridge_line(bridge, settings.timeout_for(bridge)));
            }

            println!();
            println!(
                "Mode: {}, worst case {:.0}s",
                settings.mode,
                settings.worst_case(registry.bridges()).as_secs_f64()
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = formatter.bridges_output(registry.bridges(), &settings);
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(ExitCode::Success)
}
