//! Dispatch settings.

use std::time::Duration;
use wifigate_core::{Bridge, DispatchConfig, DispatchMode, PostEncoding};

use crate::intercept::InterceptionDetector;

/// Settings for dispatch operations.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Race or sequential scheduling.
    pub mode: DispatchMode,
    /// Deadline for the direct bridge.
    pub direct_timeout: Duration,
    /// Deadline for relayed bridges.
    pub relay_timeout: Duration,
    /// POST body encoding for body-carrying bridges.
    pub post_encoding: PostEncoding,
    /// Float a successful bridge to the front (sequential mode only).
    pub promote_winner: bool,
    /// Interception detector.
    pub detector: InterceptionDetector,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

impl From<&DispatchConfig> for DispatchSettings {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            mode: config.mode,
            direct_timeout: config.direct_timeout(),
            relay_timeout: config.relay_timeout(),
            post_encoding: config.post_encoding,
            promote_winner: config.promote_winner,
            detector: if config.portal_markers {
                InterceptionDetector::with_portal_markers()
            } else {
                InterceptionDetector::default()
            },
        }
    }
}

impl DispatchSettings {
    /// Sequential settings with default timeouts.
    pub fn sequential() -> Self {
        Self {
            mode: DispatchMode::Sequential,
            ..Default::default()
        }
    }

    /// Sets the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets both style deadlines.
    #[must_use]
    pub fn with_timeouts(mut self, direct: Duration, relay: Duration) -> Self {
        self.direct_timeout = direct;
        self.relay_timeout = relay;
        self
    }

    /// The deadline that applies to `bridge`.
    pub fn timeout_for(&self, bridge: &Bridge) -> Duration {
        bridge.timeout.unwrap_or(if bridge.is_relayed() {
            self.relay_timeout
        } else {
            self.direct_timeout
        })
    }

    /// Upper bound on how long one dispatch can take over `bridges`.
    pub fn worst_case(&self, bridges: &[Bridge]) -> Duration {
        let deadlines = bridges.iter().map(|b| self.timeout_for(b));
        match self.mode {
            DispatchMode::Race => deadlines.max().unwrap_or_default(),
            DispatchMode::Sequential => deadlines.sum(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_config() {
        let settings = DispatchSettings::default();
        assert_eq!(settings.mode, DispatchMode::Race);
        assert_eq!(settings.direct_timeout, Duration::from_secs(5));
        assert_eq!(settings.relay_timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_portal_markers_from_config() {
        assert!(DispatchSettings::default().detector.body_markers.is_empty());

        let config = DispatchConfig {
            portal_markers: true,
            ..Default::default()
        };
        let settings = DispatchSettings::from(&config);
        assert!(!settings.detector.body_markers.is_empty());
    }

    #[test]
    fn test_timeout_for_bridge() {
        let settings = DispatchSettings::default();
        let relay = Bridge::header_relay("R", "https://relay.example/?url=");

        assert_eq!(settings.timeout_for(&Bridge::direct()), Duration::from_secs(5));
        assert_eq!(settings.timeout_for(&relay), Duration::from_secs(20));

        let fast = relay.with_timeout(Duration::from_millis(300));
        assert_eq!(settings.timeout_for(&fast), Duration::from_millis(300));
    }

    #[test]
    fn test_worst_case() {
        let bridges = vec![
            Bridge::direct(),
            Bridge::header_relay("R", "https://relay.example/?url="),
        ];

        let race = DispatchSettings::default();
        assert_eq!(race.worst_case(&bridges), Duration::from_secs(20));

        let sequential = DispatchSettings::sequential();
        assert_eq!(sequential.worst_case(&bridges), Duration::from_secs(25));
    }
}
