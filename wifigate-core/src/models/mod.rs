//! Domain models for `wifigate`.
//!
//! ## Submodules
//!
//! - [`bridge`] - Network paths (Bridge, BridgeStyle)
//! - [`request`] - Logical requests and completed responses
//! - [`failure`] - Per-attempt diagnostics (BridgeFailure, FailureReason)
//! - [`usage`] - Quota checks and the computed summary

mod bridge;
mod failure;
mod request;
mod usage;

// Re-export everything at the models level
pub use bridge::{Bridge, BridgeStyle};
pub use failure::{BridgeFailure, FailureReason, SkippedBridge};
pub use request::{ApiResponse, HttpMethod, LogicalRequest};
pub use usage::{MIN_DATA_FLOOR_BYTES, UsageCheck, UsageSummary};
