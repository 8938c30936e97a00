//! Response parsers.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use wifigate_core::{ApiResponse, UsageCheck, UsageSummary};

use crate::error::ApiError;

/// Field names the API has used for an issued token.
const TOKEN_FIELDS: &[&str] = &["token", "access", "access_token", "auth_token", "key"];

// ============================================================================
// Tokens
// ============================================================================

/// Finds the issued token in a registration or login response.
///
/// Looks at the top level first, then inside a `data` object.
pub fn extract_token(response: &ApiResponse) -> Option<String> {
    let value: Value = serde_json::from_str(&response.body).ok()?;
    token_in(&value).or_else(|| value.get("data").and_then(token_in))
}

fn token_in(value: &Value) -> Option<String> {
    TOKEN_FIELDS.iter().find_map(|field| match value.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}

// ============================================================================
// Usage
// ============================================================================

#[derive(Debug, Deserialize)]
struct UsageResponse {
    #[serde(default)]
    checks: Vec<UsageCheck>,
}

/// Parses the usage endpoint's `checks` into a summary.
pub fn parse_usage(response: &ApiResponse) -> Result<UsageSummary, ApiError> {
    debug!(len = response.body.len(), "Parsing usage response");

    let usage: UsageResponse = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::InvalidResponse(format!("Invalid usage JSON: {e}")))?;

    Ok(UsageSummary::from_checks(&usage.checks))
}

// ============================================================================
// Error Bodies
// ============================================================================

/// A client-error payload flattened into display lines.
///
/// Handles `{"detail": ...}`, `{"message": ...}` and field validation maps
/// such as `{"username": ["already taken"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiErrorBody {
    /// One line per message.
    pub messages: Vec<String>,
}

impl ApiErrorBody {
    /// Reads the error lines from `response`. Non-JSON bodies become a
    /// single line if non-empty.
    pub fn from_response(response: &ApiResponse) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(&response.body) else {
            let text = response.body.trim();
            return Self {
                messages: if text.is_empty() { Vec::new() } else { vec![text.to_string()] },
            };
        };

        let mut messages = Vec::new();
        match &value {
            Value::Object(fields) => {
                for key in ["detail", "message", "error"] {
                    if let Some(text) = fields.get(key).and_then(Value::as_str) {
                        messages.push(text.to_string());
                    }
                }
                for (field, errors) in fields {
                    if matches!(field.as_str(), "detail" | "message" | "error") {
                        continue;
                    }
                    for text in texts(errors) {
                        if field == "non_field_errors" {
                            messages.push(text);
                        } else {
                            messages.push(format!("{field}: {text}"));
                        }
                    }
                }
            }
            other => messages.extend(texts(other)),
        }

        Self { messages }
    }

    /// All messages on one line.
    pub fn summary(&self) -> String {
        self.messages.join("; ")
    }

    /// Converts to an [`ApiError::Rejected`].
    pub fn into_error(self, status: u16) -> ApiError {
        ApiError::Rejected {
            status,
            message: if self.messages.is_empty() {
                "no details".to_string()
            } else {
                self.summary()
            },
        }
    }
}

fn texts(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(texts).collect(),
        Value::Null => Vec::new(),
        Value::Object(_) => vec![value.to_string()],
        other => vec![other.to_string()],
    }
}
