//! Fetch error types.

use std::time::Duration;
use thiserror::Error;
use wifigate_core::{BridgeFailure, FailureReason, HttpMethod, SkippedBridge};

// ============================================================================
// Dispatch Error
// ============================================================================

/// Error type for a whole dispatch.
///
/// Individual attempt failures never surface on their own; they are
/// collected into the variants below.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Every compatible bridge was tried and none was accepted.
    #[error("{summary}")]
    AllBridgesFailed {
        /// Human-readable summary with remediation guidance.
        summary: String,
        /// One entry per failed bridge.
        failures: Vec<BridgeFailure>,
    },

    /// No bridge in the registry can carry this request.
    #[error("No bridge can carry a {method} request")]
    NoCompatibleBridge {
        /// Method of the rejected request.
        method: HttpMethod,
        /// Every bridge, with the reason it was left out.
        skipped: Vec<SkippedBridge>,
    },

    /// An attempt failed in a way every other bridge would repeat.
    #[error("Request abandoned: {0}")]
    Abandoned(BridgeFailure),
}

impl DispatchError {
    /// Per-bridge failures carried by this error.
    pub fn failures(&self) -> &[BridgeFailure] {
        match self {
            Self::AllBridgesFailed { failures, .. } => failures,
            Self::Abandoned(failure) => std::slice::from_ref(failure),
            Self::NoCompatibleBridge { .. } => &[],
        }
    }
}

// ============================================================================
// Transport Error
// ============================================================================

/// Transport-level error for a single outbound request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request error from the HTTP client.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Could not connect or the connection broke.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Header name or value rejected by the HTTP stack.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl TransportError {
    /// Maps this error onto the diagnostic taxonomy.
    ///
    /// `deadline` is reported when the client's own timeout fired.
    pub fn into_reason(self, deadline: Duration) -> FailureReason {
        match self {
            Self::Request(err) if err.is_timeout() => FailureReason::Timeout(deadline),
            Self::Request(err) if err.is_builder() => FailureReason::InvalidRequest(err.to_string()),
            Self::Request(err) => FailureReason::NetworkError(err.to_string()),
            Self::Connect(detail) => FailureReason::NetworkError(detail),
            Self::InvalidUrl(detail) | Self::InvalidHeader(detail) => {
                FailureReason::InvalidRequest(detail)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
