//! Bridge registry.
//!
//! An ordered list of bridges. Order is a preference hint for sequential
//! dispatch and is ignored when racing.

use std::collections::HashSet;
use tracing::debug;
use wifigate_core::{Bridge, CoreError, HttpMethod, LogicalRequest, SkippedBridge};

// ============================================================================
// Built-in Bridges
// ============================================================================

/// The bridges used when nothing else is configured.
///
/// Direct first, then the header relays, then the GET-only relays.
fn builtin_bridges() -> Vec<Bridge> {
    vec![
        Bridge::direct(),
        Bridge::header_relay("CorsProxy", "https://corsproxy.io/?url="),
        Bridge::header_relay("CorsLol", "https://api.cors.lol/?url="),
        Bridge::get_tunnel("AllOrigins", "https://api.allorigins.win/get?url="),
        Bridge::raw_passthrough("AllOrigins Raw", "https://api.allorigins.win/raw?url="),
        Bridge::raw_passthrough("CodeTabs", "https://api.codetabs.com/v1/proxy/?quest="),
    ]
}

// ============================================================================
// Bridge Registry
// ============================================================================

/// Ordered collection of uniquely named bridges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeRegistry {
    bridges: Vec<Bridge>,
}

impl BridgeRegistry {
    /// Creates a registry, rejecting duplicate names.
    pub fn try_new(bridges: Vec<Bridge>) -> Result<Self, CoreError> {
        let mut seen = HashSet::new();
        for bridge in &bridges {
            if !seen.insert(bridge.name.as_str()) {
                return Err(CoreError::DuplicateBridge(bridge.name.clone()));
            }
        }
        Ok(Self { bridges })
    }

    /// Returns all bridges in preference order.
    pub fn bridges(&self) -> &[Bridge] {
        &self.bridges
    }

    /// Looks up a bridge by name.
    pub fn get(&self, name: &str) -> Option<&Bridge> {
        self.bridges.iter().find(|b| b.name == name)
    }

    /// Returns the number of bridges.
    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }

    /// Splits the registry into bridges that can carry `request` and the
    /// ones that cannot, preserving order.
    pub fn compatible_with(&self, request: &LogicalRequest) -> (Vec<Bridge>, Vec<SkippedBridge>) {
        let mut usable = Vec::with_capacity(self.bridges.len());
        let mut skipped = Vec::new();

        for bridge in &self.bridges {
            match incompatibility(bridge, request) {
                Some(reason) => {
                    debug!(bridge = %bridge.name, reason, "Skipping bridge");
                    skipped.push(SkippedBridge::new(&bridge.name, reason));
                }
                None => usable.push(bridge.clone()),
            }
        }

        (usable, skipped)
    }

    /// Moves the named bridge to the front. Returns false if it is unknown.
    pub fn promote(&mut self, name: &str) -> bool {
        let Some(index) = self.bridges.iter().position(|b| b.name == name) else {
            return false;
        };
        if index > 0 {
            let bridge = self.bridges.remove(index);
            self.bridges.insert(0, bridge);
        }
        true
    }
}

impl Default for BridgeRegistry {
    fn default() -> Self {
        Self {
            bridges: builtin_bridges(),
        }
    }
}

fn incompatibility(bridge: &Bridge, request: &LogicalRequest) -> Option<&'static str> {
    if request.method == HttpMethod::Post && !(bridge.supports_post && bridge.style.supports_post())
    {
        return Some("GET-only relay cannot carry a POST");
    }
    if request.requires_header_forwarding() && !bridge.forwards_headers {
        return Some("relay drops the Authorization header");
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
