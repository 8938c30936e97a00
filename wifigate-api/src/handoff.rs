//! Gateway logon hand-off.
//!
//! Once the account exists and has quota, the device is let through by a
//! plain GET to the hotspot gateway's login page with the credentials in
//! the query string. The gateway is on the local network, so this never
//! goes through the dispatcher.

use url::Url;
use wifigate_core::ClientConfig;

use crate::error::ApiError;

/// Builds the gateway logon URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterHandoff {
    login_url: Url,
    destination: Option<String>,
}

impl RouterHandoff {
    /// Creates a hand-off for the gateway at `login_url`.
    pub fn new(login_url: &str) -> Result<Self, ApiError> {
        let login_url =
            Url::parse(login_url).map_err(|e| ApiError::InvalidGatewayUrl(format!("{login_url}: {e}")))?;
        Ok(Self {
            login_url,
            destination: None,
        })
    }

    /// Creates a hand-off for the configured gateway.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.gateway_login_url)
    }

    /// Sets the page the gateway should send the browser to afterwards.
    #[must_use]
    pub fn with_destination(mut self, dst: impl Into<String>) -> Self {
        self.destination = Some(dst.into());
        self
    }

    /// The logon URL for `username`/`password`, with the gateway's CHAP
    /// challenge when it issued one.
    pub fn logon_url(&self, username: &str, password: &str, challenge: Option<&str>) -> Url {
        let mut url = self.login_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("username", username);
            query.append_pair("password", password);
            if let Some(challenge) = challenge.filter(|c| !c.is_empty()) {
                query.append_pair("chap-challenge", challenge);
            }
            if let Some(dst) = &self.destination {
                query.append_pair("dst", dst);
            }
        }
        url
    }
}
