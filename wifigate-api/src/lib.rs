// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # wifigate API
//!
//! Thin facade over the hotspot provider's REST API.
//!
//! Every operation builds a [`LogicalRequest`](wifigate_core::LogicalRequest)
//! and hands it to the [`Dispatcher`](wifigate_fetch::Dispatcher); the
//! [`DispatchOutcome`](wifigate_fetch::DispatchOutcome) comes back untouched
//! so the caller can show the winning bridge or the failure trail.
//!
//! Interpreting responses (tokens, usage, validation errors) lives in
//! [`parser`], and the last step of getting online, the gateway logon, in
//! [`handoff`].

pub mod client;
pub mod endpoints;
pub mod error;
pub mod handoff;
pub mod parser;
pub mod payload;

pub use client::HotspotApi;
pub use error::ApiError;
pub use handoff::RouterHandoff;
pub use parser::{ApiErrorBody, extract_token, parse_usage};
pub use payload::{Credentials, OtpCode, RegistrationPayload};
