//! Output formatting for CLI.

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use wifigate_core::UsageSummary;

/// What a command read out of an accepted response.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    /// An issued token.
    Token(String),
    /// Remaining quota.
    Usage(UsageSummary),
    /// A one-line confirmation.
    Message(String),
}
