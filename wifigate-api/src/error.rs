//! API facade errors.

use thiserror::Error;
use wifigate_core::CoreError;
use wifigate_fetch::DispatchError;

/// Errors from building requests and reading responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A payload could not be serialized.
    #[error("Could not encode request: {0}")]
    Payload(#[from] CoreError),

    /// The API could not be reached.
    #[error(transparent)]
    Unreachable(#[from] DispatchError),

    /// The API answered with an error.
    #[error("API returned HTTP {status}: {message}")]
    Rejected {
        /// HTTP status.
        status: u16,
        /// Flattened error message.
        message: String,
    },

    /// The response was not in the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A success response carried no token.
    #[error("No token in response")]
    NoToken,

    /// The gateway URL is not usable.
    #[error("Invalid gateway URL: {0}")]
    InvalidGatewayUrl(String),
}
