//! Register and login commands.

use anyhow::Result;
use clap::Args;
use tracing::info;
use wifigate_api::{ApiError, Credentials, RegistrationPayload, extract_token};

use super::{build_api, report};
use crate::output::Detail;
use crate::{Cli, ExitCode};

/// Arguments for the register command.
#[derive(Args)]
pub struct RegisterArgs {
    /// Username for the new account.
    pub username: String,

    /// Password for the new account.
    #[arg(long, short)]
    pub password: String,

    /// Contact email.
    #[arg(long)]
    pub email: Option<String>,

    /// Phone number for one-time codes.
    #[arg(long)]
    pub phone: Option<String>,

    /// First name.
    #[arg(long, requires = "last_name")]
    pub first_name: Option<String>,

    /// Last name.
    #[arg(long, requires = "first_name")]
    pub last_name: Option<String>,

    /// Plan identifier (defaults to the configured plan).
    #[arg(long)]
    pub plan: Option<String>,
}

impl RegisterArgs {
    fn payload(&self) -> RegistrationPayload {
        let mut payload = RegistrationPayload::new(&self.username, &self.password);
        if let Some(email) = &self.email {
            payload = payload.with_email(email);
        }
        if let Some(phone) = &self.phone {
            payload = payload.with_phone(phone);
        }
        if let (Some(first), Some(last)) = (&self.first_name, &self.last_name) {
            payload = payload.with_name(first, last);
        }
        if let Some(plan) = &self.plan {
            payload = payload.with_plan(plan);
        }
        payload
    }
}

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Account username.
    pub username: String,

    /// Account password.
    #[arg(long, short)]
    pub password: String,
}

fn token_detail(response: &wifigate_core::ApiResponse) -> Result<Detail, ApiError> {
    extract_token(response).map(Detail::Token).ok_or(ApiError::NoToken)
}

/// Runs the register command.
pub async fn run_register(args: &RegisterArgs, cli: &Cli) -> Result<ExitCode> {
    info!(username = %args.username, "Registering account");

    let api = build_api(cli)?;
    let outcome = api.register(&args.payload()).await?;
    report(&outcome, cli, token_detail)
}

/// Runs the login command.
pub async fn run_login(args: &LoginArgs, cli: &Cli) -> Result<ExitCode> {
    info!(username = %args.username, "Logging in");

    let api = build_api(cli)?;
    let outcome = api
        .login(&Credentials::new(&args.username, &args.password))
        .await?;
    report(&outcome, cli, token_detail)
}
