//! Interception detection and response acceptance.
//!
//! A captive portal that has not yet let the client through answers every
//! request itself, usually with its login page and a 200. Such a response
//! must not be mistaken for the API's answer.

use wifigate_core::{ApiResponse, FailureReason};

/// Substrings (lower-case) found on common hotspot login pages.
const PORTAL_MARKERS: &[&str] = &[
    "mikrotik",
    "hotspot",
    "link-login",
    "chap-challenge",
    "chap-id",
    "captive portal",
    "login.html",
];

// ============================================================================
// Interception Detector
// ============================================================================

/// Whether a response came from the API or from the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The API (or a relay speaking for it) answered.
    Genuine,
    /// The hotspot gateway answered instead.
    Intercepted,
}

/// Classifies completed responses as genuine or intercepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptionDetector {
    /// Treat an HTML redirect as interception, not just an HTML 2xx.
    pub redirects_are_interception: bool,
    /// When non-empty, an HTML response only counts as interception if its
    /// body contains one of these (case-insensitive).
    pub body_markers: Vec<String>,
}

impl InterceptionDetector {
    /// Detector that flags HTML 2xx and 3xx responses regardless of body.
    pub fn new() -> Self {
        Self {
            redirects_are_interception: true,
            body_markers: Vec::new(),
        }
    }

    /// Detector that additionally requires a known portal marker in the body.
    pub fn with_portal_markers() -> Self {
        Self {
            redirects_are_interception: true,
            body_markers: PORTAL_MARKERS.iter().map(|m| (*m).to_string()).collect(),
        }
    }

    /// Inspects a completed response.
    pub fn inspect(&self, response: &ApiResponse) -> Verdict {
        if !response.is_html() {
            return Verdict::Genuine;
        }

        let suspicious_status = response.is_success()
            || (self.redirects_are_interception && response.is_redirect());
        if !suspicious_status {
            return Verdict::Genuine;
        }

        if self.body_markers.is_empty() {
            return Verdict::Intercepted;
        }

        let body = response.body.to_lowercase();
        if self
            .body_markers
            .iter()
            .any(|marker| body.contains(&marker.to_lowercase()))
        {
            Verdict::Intercepted
        } else {
            Verdict::Genuine
        }
    }
}

impl Default for InterceptionDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Acceptance
// ============================================================================

/// Decides whether a non-intercepted response counts as "the server
/// answered".
///
/// Any status is accepted, client errors included, except:
/// - 0, meaning no real response;
/// - 5xx and above;
/// - 405 and 429, which the hotspot's relays use to refuse service;
/// - unfollowed redirects, which carry no answer;
/// - when `relay_attributable`, any non-JSON 4xx (403 included). This API
///   answers client errors in JSON and relays do not, so a JSON 403 is the
///   API's own answer passed through.
pub fn accept_status(response: &ApiResponse, relay_attributable: bool) -> Result<(), FailureReason> {
    let status = response.status;

    if status == 0 {
        return Err(FailureReason::NetworkError(
            "response carried no status".to_string(),
        ));
    }
    if status >= 500 || status == 405 || status == 429 || response.is_redirect() {
        return Err(FailureReason::HttpError(status));
    }
    if relay_attributable && response.is_client_error() && !response.is_json() {
        return Err(FailureReason::HttpError(status));
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
