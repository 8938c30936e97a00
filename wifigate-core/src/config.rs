//! Static client configuration.
//!
//! The client needs very little: where the API lives, which plan new
//! accounts sign up for, where the hotspot gateway's logon page is, and how
//! the dispatcher should behave. Everything has a default so a missing
//! config file is not an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::CoreError;

// ============================================================================
// Dispatch Configuration
// ============================================================================

/// How the dispatcher schedules attempts across bridges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Launch every compatible bridge at once; first accepted response wins.
    #[default]
    Race,
    /// Try bridges one at a time in registry order.
    Sequential,
}

impl DispatchMode {
    /// Returns the display name for this mode.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Race => "race",
            Self::Sequential => "sequential",
        }
    }
}

impl std::fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Body encoding used for POST requests on bridges that forward a body.
///
/// Both encodings keep the request "simple" in the CORS sense, so no
/// preflight round trip is issued by browser-like intermediaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostEncoding {
    /// JSON text sent as `text/plain;charset=UTF-8`.
    #[default]
    PlainText,
    /// Top-level JSON fields sent as `application/x-www-form-urlencoded`.
    FormUrlEncoded,
}

/// Dispatcher settings as stored in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Race or sequential scheduling.
    #[serde(default)]
    pub mode: DispatchMode,
    /// Per-attempt deadline for the direct bridge, in seconds.
    #[serde(default = "default_direct_timeout")]
    pub direct_timeout_secs: u64,
    /// Per-attempt deadline for relayed bridges, in seconds.
    #[serde(default = "default_relay_timeout")]
    pub relay_timeout_secs: u64,
    /// POST body encoding.
    #[serde(default)]
    pub post_encoding: PostEncoding,
    /// Float the last successful bridge to the front (sequential mode).
    #[serde(default)]
    pub promote_winner: bool,
    /// Only treat HTML as interception when it looks like a hotspot login
    /// page. Off means any HTML 2xx or 3xx is interception.
    #[serde(default)]
    pub portal_markers: bool,
}

fn default_direct_timeout() -> u64 {
    5
}

fn default_relay_timeout() -> u64 {
    20
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mode: DispatchMode::default(),
            direct_timeout_secs: default_direct_timeout(),
            relay_timeout_secs: default_relay_timeout(),
            post_encoding: PostEncoding::default(),
            promote_winner: false,
            portal_markers: false,
        }
    }
}

impl DispatchConfig {
    /// Deadline for the direct bridge.
    pub fn direct_timeout(&self) -> Duration {
        Duration::from_secs(self.direct_timeout_secs)
    }

    /// Deadline for relayed bridges.
    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_secs)
    }
}

// ============================================================================
// Client Configuration
// ============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base address of the hotspot provider's API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Plan identifier attached to new registrations.
    #[serde(default = "default_plan")]
    pub default_plan: String,
    /// Logon endpoint of the local hotspot gateway.
    #[serde(default = "default_gateway_login_url")]
    pub gateway_login_url: String,
    /// Dispatcher settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

fn default_api_base_url() -> String {
    "https://api.hotspot.example/api/v1/".to_string()
}

fn default_plan() -> String {
    "free".to_string()
}

fn default_gateway_login_url() -> String {
    "http://10.0.0.1/login".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            default_plan: default_plan(),
            gateway_login_url: default_gateway_login_url(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wifigate")
            .join("config.json")
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks the values that would otherwise fail much later, mid-dispatch.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [
            ("api_base_url", &self.api_base_url),
            ("gateway_login_url", &self.gateway_login_url),
        ] {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(CoreError::InvalidConfig(format!(
                    "{field} must be an http(s) URL, got {value:?}"
                )));
            }
        }

        if self.dispatch.direct_timeout_secs == 0 || self.dispatch.relay_timeout_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "bridge timeouts must be at least one second".to_string(),
            ));
        }

        Ok(())
    }

    /// The API base with a guaranteed trailing slash, ready for joining
    /// relative endpoint paths.
    pub fn api_base(&self) -> String {
        if self.api_base_url.ends_with('/') {
            self.api_base_url.clone()
        } else {
            format!("{}/", self.api_base_url)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
