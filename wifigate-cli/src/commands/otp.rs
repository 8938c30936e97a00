//! OTP commands - phone verification.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{build_api, report};
use crate::output::Detail;
use crate::{Cli, ExitCode};

/// Arguments for the otp command.
#[derive(Args)]
pub struct OtpArgs {
    #[command(subcommand)]
    pub action: OtpAction,
}

/// OTP subcommands.
#[derive(Subcommand)]
pub enum OtpAction {
    /// Text a one-time code to the account's phone.
    Request {
        /// Token from `register` or `login`.
        #[arg(long, short)]
        token: String,
    },

    /// Verify a one-time code.
    Verify {
        /// Token from `register` or `login`.
        #[arg(long, short)]
        token: String,

        /// The code received by SMS.
        code: String,
    },
}

/// Runs the otp command.
pub async fn run(args: &OtpArgs, cli: &Cli) -> Result<ExitCode> {
    let api = build_api(cli)?;

    match &args.action {
        OtpAction::Request { token } => {
            let outcome = api.request_otp(token).await?;
            report(&outcome, cli, |_| Ok(Detail::Message("Code sent".to_string())))
        }
        OtpAction::Verify { token, code } => {
            let outcome = api.verify_otp(token, code).await?;
            report(&outcome, cli, |_| Ok(Detail::Message("Phone verified".to_string())))
        }
    }
}
