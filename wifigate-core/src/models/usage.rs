//! Usage-related types.
//!
//! The usage endpoint reports one or more "checks", each an allotment
//! (`value`) and how much of it has been consumed (`result`), both in bytes.
//! The API is inconsistent about numbers vs numeric strings, so both are
//! accepted.

use serde::{Deserialize, Deserializer, Serialize};

/// Remaining quota at or below this many bytes counts as "no data left".
pub const MIN_DATA_FLOOR_BYTES: u64 = 10 * 1024;

const BYTES_PER_KB: f64 = 1024.0;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// ============================================================================
// Usage Check
// ============================================================================

/// One allotment/consumed pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCheck {
    /// Allotted bytes.
    #[serde(deserialize_with = "lenient_u64", default)]
    pub value: u64,
    /// Consumed bytes.
    #[serde(deserialize_with = "lenient_u64", default)]
    pub result: u64,
}

impl UsageCheck {
    /// Creates a check.
    pub fn new(value: u64, result: u64) -> Self {
        Self { value, result }
    }

    /// Unconsumed bytes, floored at zero.
    pub fn remaining(&self) -> u64 {
        self.value.saturating_sub(self.result)
    }
}

/// Accepts `123`, `123.7`, `"123"`, `"123.7"`, or `null`; negatives become 0.
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let number = match &value {
        serde_json::Value::Null => 0.0,
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            serde::de::Error::custom(format!("expected a numeric string, got {s:?}"))
        })?,
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected a number, got {other}"
            )));
        }
    };

    if !number.is_finite() || number <= 0.0 {
        return Ok(0);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(number.floor() as u64)
}

// ============================================================================
// Usage Summary
// ============================================================================

/// Remaining quota computed over every check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    /// Sum of all allotments, in bytes.
    pub total_bytes: u64,
    /// Sum of all consumption, in bytes.
    pub used_bytes: u64,
    /// Sum of per-check remaining bytes.
    pub remaining_bytes: u64,
    /// Remaining percentage of the total allotment (0-100).
    pub remaining_percent: f64,
    /// Whether enough quota is left to be worth connecting.
    pub has_data: bool,
}

impl UsageSummary {
    /// Builds a summary from the checks reported by the API.
    pub fn from_checks(checks: &[UsageCheck]) -> Self {
        // Values come from the remote API; totals saturate instead of overflowing.
        let total_bytes = checks.iter().map(|c| c.value).fold(0, u64::saturating_add);
        let used_bytes = checks.iter().map(|c| c.result).fold(0, u64::saturating_add);
        let remaining_bytes = checks
            .iter()
            .map(UsageCheck::remaining)
            .fold(0, u64::saturating_add);

        #[allow(clippy::cast_precision_loss)]
        let remaining_percent = if total_bytes == 0 {
            0.0
        } else {
            (remaining_bytes as f64 / total_bytes as f64 * 100.0).clamp(0.0, 100.0)
        };

        Self {
            total_bytes,
            used_bytes,
            remaining_bytes,
            remaining_percent,
            has_data: remaining_bytes > MIN_DATA_FLOOR_BYTES,
        }
    }

    /// Remaining quota in kilobytes.
    #[allow(clippy::cast_precision_loss)]
    pub fn remaining_kb(&self) -> f64 {
        self.remaining_bytes as f64 / BYTES_PER_KB
    }

    /// Remaining quota in megabytes.
    #[allow(clippy::cast_precision_loss)]
    pub fn remaining_mb(&self) -> f64 {
        self.remaining_bytes as f64 / BYTES_PER_MB
    }

    /// Used percentage (100 - remaining).
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        100.0 - self.remaining_percent
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_used_megabyte() {
        let summary = UsageSummary::from_checks(&[UsageCheck::new(1_048_576, 524_288)]);

        assert_eq!(summary.remaining_bytes, 524_288);
        assert!((summary.remaining_kb() - 512.0).abs() < f64::EPSILON);
        assert!((summary.remaining_mb() - 0.5).abs() < f64::EPSILON);
        assert!((summary.remaining_percent - 50.0).abs() < f64::EPSILON);
        assert!(summary.has_data);
    }

    #[test]
    fn test_overdrawn_check_floors_at_zero() {
        let summary = UsageSummary::from_checks(&[UsageCheck::new(1000, 5000)]);
        assert_eq!(summary.remaining_bytes, 0);
        assert!(!summary.has_data);
        assert!(summary.remaining_percent.abs() < f64::EPSILON);
    }

    #[test]
    fn test_below_floor_has_no_data() {
        let summary = UsageSummary::from_checks(&[UsageCheck::new(
            1_048_576,
            1_048_576 - MIN_DATA_FLOOR_BYTES,
        )]);
        assert_eq!(summary.remaining_bytes, MIN_DATA_FLOOR_BYTES);
        assert!(!summary.has_data);
    }

    #[test]
    fn test_huge_checks_saturate() {
        let checks: Vec<UsageCheck> = serde_json::from_str(
            r#"[{"value": 1e19, "result": 0}, {"value": 1e19, "result": 0}]"#,
        )
        .unwrap();
        let summary = UsageSummary::from_checks(&checks);

        assert_eq!(summary.total_bytes, u64::MAX);
        assert_eq!(summary.remaining_bytes, u64::MAX);
        assert_eq!(summary.used_bytes, 0);
        assert!((summary.remaining_percent - 100.0).abs() < f64::EPSILON);
        assert!(summary.has_data);
    }

    #[test]
    fn test_empty_checks() {
        let summary = UsageSummary::from_checks(&[]);
        assert_eq!(summary.total_bytes, 0);
        assert!(summary.used_percent().abs() < f64::EPSILON);
        assert!(!summary.has_data);
    }

    #[test]
    fn test_lenient_numbers() {
        let checks: Vec<UsageCheck> = serde_json::from_str(
            r#"[{"value": "2048", "result": 1024.9}, {"value": null, "result": -5}, {}]"#,
        )
        .unwrap();

        assert_eq!(checks[0], UsageCheck::new(2048, 1024));
        assert_eq!(checks[1], UsageCheck::new(0, 0));
        assert_eq!(checks[2], UsageCheck::new(0, 0));
    }

    #[test]
    fn test_rejects_non_numeric_string() {
        let parsed: Result<UsageCheck, _> =
            serde_json::from_str(r#"{"value": "lots", "result": 0}"#);
        assert!(parsed.is_err());
    }
}
