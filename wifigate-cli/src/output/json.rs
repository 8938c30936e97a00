//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;
use wifigate_core::{Bridge, UsageSummary};
use wifigate_fetch::{DispatchOutcome, DispatchSettings};

use super::Detail;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one dispatched command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeOutput {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub attempts: Vec<AttemptOutput>,
    pub skipped: Vec<SkippedOutput>,
}

/// One failed attempt.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutput {
    pub bridge: String,
    pub reason: String,
    pub detail: String,
    pub elapsed_ms: u64,
    pub at: String,
}

/// One skipped bridge.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedOutput {
    pub bridge: String,
    pub reason: String,
}

/// Remaining quota.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageOutput {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub remaining_bytes: u64,
    pub remaining_kb: f64,
    pub remaining_mb: f64,
    pub remaining_percent: f64,
    pub has_data: bool,
}

/// Bridge info output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeOutput {
    pub name: String,
    pub style: String,
    pub relay_prefix: String,
    pub supports_post: bool,
    pub forwards_headers: bool,
    pub timeout_ms: u64,
}

/// Bridge list output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgesOutput {
    pub mode: String,
    pub worst_case_ms: u64,
    pub bridges: Vec<BridgeOutput>,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable data.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        Ok(if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        })
    }

    /// Builds the output for a dispatched command.
    pub fn outcome_output(
        &self,
        outcome: &DispatchOutcome,
        detail: Option<&Detail>,
        problem: Option<&str>,
    ) -> OutcomeOutput {
        let (token, usage, message) = match detail {
            Some(Detail::Token(token)) => (Some(token.clone()), None, None),
            Some(Detail::Usage(summary)) => (None, Some(usage_output(summary)), None),
            Some(Detail::Message(message)) => (None, None, Some(message.clone())),
            None => (None, None, None),
        };

        OutcomeOutput {
            ok: problem.is_none(),
            winner: outcome.winner.clone(),
            status: outcome.response().map(|r| r.status),
            duration_ms: millis(outcome.duration),
            token,
            usage,
            message,
            error: problem.map(str::to_string),
            attempts: outcome
                .log
                .iter()
                .map(|f| AttemptOutput {
                    bridge: f.bridge.clone(),
                    reason: f.reason.label().to_string(),
                    detail: f.reason.to_string(),
                    elapsed_ms: millis(f.elapsed),
                    at: f.at.to_rfc3339(),
                })
                .collect(),
            skipped: outcome
                .skipped
                .iter()
                .map(|s| SkippedOutput {
                    bridge: s.bridge.clone(),
                    reason: s.reason.clone(),
                })
                .collect(),
        }
    }

    /// Builds the output for the bridge list.
    pub fn bridges_output(&self, bridges: &[Bridge], settings: &DispatchSettings) -> BridgesOutput {
        BridgesOutput {
            mode: settings.mode.to_string(),
            worst_case_ms: millis(settings.worst_case(bridges)),
            bridges: bridges
                .iter()
                .map(|b| BridgeOutput {
                    name: b.name.clone(),
                    style: b.style.display_name().to_string(),
                    relay_prefix: b.relay_prefix.clone(),
                    supports_post: b.supports_post,
                    forwards_headers: b.forwards_headers,
                    timeout_ms: millis(settings.timeout_for(b)),
                })
                .collect(),
        }
    }
}

fn usage_output(summary: &UsageSummary) -> UsageOutput {
    UsageOutput {
        total_bytes: summary.total_bytes,
        used_bytes: summary.used_bytes,
        remaining_bytes: summary.remaining_bytes,
        remaining_kb: summary.remaining_kb(),
        remaining_mb: summary.remaining_mb(),
        remaining_percent: summary.remaining_percent,
        has_data: summary.has_data,
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
