// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `wifigate` Core
//!
//! Core types, models, and configuration for the `wifigate` hotspot client.
//!
//! This crate provides the foundational abstractions used across all other
//! `wifigate` crates, including:
//!
//! - Domain models (bridges, logical requests, responses, failures)
//! - Usage models (quota checks and the computed summary)
//! - Error types
//! - Static client configuration
//!
//! ## Key Types
//!
//! ### Network Paths
//! - [`Bridge`] - A named network path to the remote API
//! - [`BridgeStyle`] - How a bridge relays a request
//!
//! ### Requests & Responses
//! - [`LogicalRequest`] - What the caller wants to send, before any rewriting
//! - [`HttpMethod`] - The two methods the hotspot API uses
//! - [`ApiResponse`] - A completed response, already unwrapped
//!
//! ### Diagnostics
//! - [`BridgeFailure`] - One failed attempt on one bridge
//! - [`FailureReason`] - Why an attempt failed
//! - [`SkippedBridge`] - A bridge left out as incompatible
//!
//! ### Usage
//! - [`UsageCheck`] - One allotment/consumed pair from the usage endpoint
//! - [`UsageSummary`] - Remaining quota computed over all checks

pub mod config;
pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export configuration
pub use config::{ClientConfig, DispatchConfig, DispatchMode, PostEncoding};

// Re-export all model types
pub use models::{
    // Network paths
    Bridge,
    BridgeStyle,
    // Requests & responses
    ApiResponse,
    HttpMethod,
    LogicalRequest,
    // Diagnostics
    BridgeFailure,
    FailureReason,
    SkippedBridge,
    // Usage
    UsageCheck,
    UsageSummary,
};
