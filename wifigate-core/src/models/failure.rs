//! Per-attempt diagnostics.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

// ============================================================================
// Failure Reason
// ============================================================================

/// Why an attempt on one bridge failed.
///
/// Client errors (4xx) from the API are not failures: the server answered,
/// and the caller handles the application-level error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The attempt exceeded its deadline and was aborted.
    Timeout(Duration),
    /// The hotspot gateway answered instead of the API.
    Interception,
    /// The path was reachable but returned a blocking status.
    HttpError(u16),
    /// DNS, TLS, connection, or relay envelope failure.
    NetworkError(String),
    /// The request could not be expressed at all; every bridge would fail.
    InvalidRequest(String),
}

impl FailureReason {
    /// Short label for tables and JSON output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Interception => "interception",
            Self::HttpError(_) => "http_error",
            Self::NetworkError(_) => "network_error",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Returns true if trying further bridges is pointless.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(after) => write!(f, "timed out after {:.1}s", after.as_secs_f64()),
            Self::Interception => f.write_str("intercepted by the hotspot gateway"),
            Self::HttpError(status) => write!(f, "HTTP {status}"),
            Self::NetworkError(detail) => write!(f, "network error: {detail}"),
            Self::InvalidRequest(detail) => write!(f, "invalid request: {detail}"),
        }
    }
}

// ============================================================================
// Bridge Failure
// ============================================================================

/// Record of one failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeFailure {
    /// Name of the bridge that failed.
    pub bridge: String,
    /// What went wrong.
    pub reason: FailureReason,
    /// When the failure was recorded.
    pub at: DateTime<Utc>,
    /// How long the attempt ran.
    pub elapsed: Duration,
}

impl BridgeFailure {
    /// Creates a failure record stamped with the current time.
    pub fn new(bridge: impl Into<String>, reason: FailureReason, elapsed: Duration) -> Self {
        Self {
            bridge: bridge.into(),
            reason,
            at: Utc::now(),
            elapsed,
        }
    }
}

impl fmt::Display for BridgeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.bridge, self.reason)
    }
}

// ============================================================================
// Skipped Bridge
// ============================================================================

/// A bridge left out of a dispatch because it cannot carry the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBridge {
    /// Name of the skipped bridge.
    pub bridge: String,
    /// Why it was skipped.
    pub reason: String,
}

impl SkippedBridge {
    /// Creates a skip record.
    pub fn new(bridge: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            bridge: bridge.into(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
