//! Bridge types.
//!
//! A bridge is one way of getting a request to the API: straight there, or
//! through a third-party relay that works around cross-origin restrictions
//! and the hotspot's filtering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ============================================================================
// Bridge Style
// ============================================================================

/// How a bridge carries a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeStyle {
    /// No relay; the request goes to the API host.
    Direct,
    /// A proxy that forwards method, headers, and body and answers with the
    /// upstream response as-is.
    HeaderRelay,
    /// A GET-only proxy that wraps the upstream response in a JSON envelope.
    /// POST bodies are tunnelled through a query parameter.
    GetTunnel,
    /// A GET-only proxy that returns the upstream body unchanged.
    RawPassthrough,
}

impl BridgeStyle {
    /// Returns the display name for this style.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::HeaderRelay => "Header Relay",
            Self::GetTunnel => "GET Tunnel",
            Self::RawPassthrough => "Raw Passthrough",
        }
    }

    /// Whether this style can carry a POST (possibly by downgrading it).
    pub fn supports_post(&self) -> bool {
        !matches!(self, Self::RawPassthrough)
    }

    /// Whether this style passes request headers through to the API.
    pub fn forwards_headers(&self) -> bool {
        matches!(self, Self::Direct | Self::HeaderRelay)
    }
}

impl fmt::Display for BridgeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Bridge
// ============================================================================

/// A named network path to the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bridge {
    /// Unique display label.
    pub name: String,
    /// Relay address the encoded target URL is appended to. Empty for direct.
    pub relay_prefix: String,
    /// Relay style.
    pub style: BridgeStyle,
    /// Whether POST requests may be sent over this bridge.
    pub supports_post: bool,
    /// Whether request headers (notably `Authorization`) reach the API.
    pub forwards_headers: bool,
    /// Per-bridge deadline overriding the style default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl Bridge {
    /// Creates a bridge with the capability flags implied by its style.
    pub fn new(name: impl Into<String>, relay_prefix: impl Into<String>, style: BridgeStyle) -> Self {
        Self {
            name: name.into(),
            relay_prefix: relay_prefix.into(),
            style,
            supports_post: style.supports_post(),
            forwards_headers: style.forwards_headers(),
            timeout: None,
        }
    }

    /// The direct path, named "Direct".
    pub fn direct() -> Self {
        Self::new("Direct", "", BridgeStyle::Direct)
    }

    /// A header-forwarding relay.
    pub fn header_relay(name: impl Into<String>, relay_prefix: impl Into<String>) -> Self {
        Self::new(name, relay_prefix, BridgeStyle::HeaderRelay)
    }

    /// A GET tunnel returning a JSON envelope.
    pub fn get_tunnel(name: impl Into<String>, relay_prefix: impl Into<String>) -> Self {
        Self::new(name, relay_prefix, BridgeStyle::GetTunnel)
    }

    /// A raw GET-only passthrough relay.
    pub fn raw_passthrough(name: impl Into<String>, relay_prefix: impl Into<String>) -> Self {
        Self::new(name, relay_prefix, BridgeStyle::RawPassthrough)
    }

    /// Sets a per-bridge deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns true if requests go through a third party.
    pub fn is_relayed(&self) -> bool {
        self.style != BridgeStyle::Direct
    }
}

impl fmt::Display for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.style)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_capabilities() {
        assert!(BridgeStyle::Direct.supports_post());
        assert!(BridgeStyle::GetTunnel.supports_post());
        assert!(!BridgeStyle::RawPassthrough.supports_post());

        assert!(BridgeStyle::HeaderRelay.forwards_headers());
        assert!(!BridgeStyle::GetTunnel.forwards_headers());
    }

    #[test]
    fn test_constructors_follow_style() {
        let raw = Bridge::raw_passthrough("Raw", "https://relay.example/raw?url=");
        assert!(!raw.supports_post);
        assert!(!raw.forwards_headers);
        assert!(raw.is_relayed());

        let direct = Bridge::direct();
        assert!(!direct.is_relayed());
        assert!(direct.relay_prefix.is_empty());
    }

    #[test]
    fn test_display() {
        let bridge = Bridge::get_tunnel("AllOrigins", "https://api.allorigins.win/get?url=");
        assert_eq!(bridge.to_string(), "AllOrigins (GET Tunnel)");
    }
}
