//! The hotspot API facade.

use std::sync::Arc;
use tracing::{info, instrument};
use wifigate_core::{ClientConfig, LogicalRequest};
use wifigate_fetch::{DispatchOutcome, Dispatcher};

use crate::endpoints;
use crate::error::ApiError;
use crate::payload::{Credentials, OtpCode, RegistrationPayload};

/// Five thin operations over the dispatcher.
///
/// Nothing here retries or caches; each call is one dispatch and the
/// outcome is returned as-is.
#[derive(Debug, Clone)]
pub struct HotspotApi {
    dispatcher: Arc<Dispatcher>,
    config: ClientConfig,
}

impl HotspotApi {
    /// Creates a facade.
    pub fn new(dispatcher: Arc<Dispatcher>, config: ClientConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        endpoints::join(&self.config.api_base(), endpoint)
    }

    /// Creates an account. The plan defaults to the configured one.
    #[instrument(skip_all, fields(username = %payload.username))]
    pub async fn register(&self, payload: &RegistrationPayload) -> Result<DispatchOutcome, ApiError> {
        let payload = payload.resolved(&self.config.default_plan);
        info!(plan = payload.plan.as_deref().unwrap_or_default(), "Registering");
        let request = LogicalRequest::post_json(self.url(endpoints::REGISTER), &payload)?;
        Ok(self.dispatcher.dispatch(&request).await)
    }

    /// Exchanges credentials for a token.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<DispatchOutcome, ApiError> {
        let request = LogicalRequest::post_json(self.url(endpoints::TOKEN), credentials)?;
        Ok(self.dispatcher.dispatch(&request).await)
    }

    /// Fetches the account's usage.
    #[instrument(skip_all)]
    pub async fn get_usage(&self, token: &str) -> Result<DispatchOutcome, ApiError> {
        let request = LogicalRequest::get(self.url(endpoints::USAGE)).with_bearer(token);
        Ok(self.dispatcher.dispatch(&request).await)
    }

    /// Asks the API to text a one-time code to the account's phone.
    #[instrument(skip_all)]
    pub async fn request_otp(&self, token: &str) -> Result<DispatchOutcome, ApiError> {
        let request = LogicalRequest::post(self.url(endpoints::PHONE_TOKEN), None).with_bearer(token);
        Ok(self.dispatcher.dispatch(&request).await)
    }

    /// Verifies a one-time code.
    #[instrument(skip_all)]
    pub async fn verify_otp(&self, token: &str, code: &str) -> Result<DispatchOutcome, ApiError> {
        let body = OtpCode {
            code: code.to_string(),
        };
        let request =
            LogicalRequest::post_json(self.url(endpoints::PHONE_VERIFY), &body)?.with_bearer(token);
        Ok(self.dispatcher.dispatch(&request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let dispatcher = Dispatcher::builder().build().unwrap();
        let config = ClientConfig {
            api_base_url: "https://api.hotspot.example/api/v1".to_string(),
            ..ClientConfig::default()
        };
        let api = HotspotApi::new(Arc::new(dispatcher), config);

        assert_eq!(api.url(endpoints::USAGE), "https://api.hotspot.example/api/v1/usage/");
        assert_eq!(
            api.url(endpoints::PHONE_VERIFY),
            "https://api.hotspot.example/api/v1/phone/verify/"
        );
    }
}
