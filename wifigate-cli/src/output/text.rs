//! Text output formatting with progress bars and colors.

use std::time::Duration;
use wifigate_core::{Bridge, UsageSummary};
use wifigate_fetch::DispatchOutcome;

use super::Detail;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    /// One line: which bridge answered, or that none did.
    pub fn format_outcome(&self, outcome: &DispatchOutcome) -> String {
        let elapsed = format_duration(outcome.duration);
        match (&outcome.winner, outcome.response()) {
            (Some(winner), Some(response)) => format!(
                "{} via {} {}",
                self.green("✓"),
                self.bold(winner),
                self.dim(&format!("(HTTP {}, {elapsed})", response.status))
            ),
            _ => format!(
                "{} No bridge got through {}",
                self.red("✗"),
                self.dim(&format!(
                    "({} attempted, {} skipped, {elapsed})",
                    outcome.log.len(),
                    outcome.skipped.len()
                ))
            ),
        }
    }

    /// The command-specific result.
    pub fn format_detail(&self, detail: &Detail) -> String {
        match detail {
            Detail::Token(token) => format!("Token:   {}", self.cyan(token)),
            Detail::Usage(summary) => self.format_usage(summary),
            Detail::Message(message) => message.clone(),
        }
    }

    /// Remaining quota with a progress bar.
    pub fn format_usage(&self, summary: &UsageSummary) -> String {
        let bar = self.progress_bar(summary.remaining_percent);
        let pct = self.color_for_percent(
            summary.remaining_percent,
            &format!("{:.1}% left", summary.remaining_percent),
        );

        let mut lines = vec![
            format!("{:<9}{bar} {pct}", "Quota:"),
            format!(
                "{:<9}{} of {}",
                "Left:",
                format_bytes(summary.remaining_bytes),
                format_bytes(summary.total_bytes)
            ),
        ];
        if !summary.has_data {
            lines.push(self.yellow("Out of data: top up before connecting."));
        }

        lines.join("\n")
    }

    /// The per-bridge trail: failures in settle order, then skips.
    pub fn format_trail(&self, outcome: &DispatchOutcome) -> String {
        let mut lines = Vec::new();

        for failure in &outcome.log {
            lines.push(format!(
                "  {} {:<14} {} {}",
                self.red("✗"),
                failure.bridge,
                failure.reason,
                self.dim(&format!("({})", format_duration(failure.elapsed)))
            ));
        }
        for skipped in &outcome.skipped {
            lines.push(format!(
                "  {} {:<14} {}",
                self.dim("-"),
                skipped.bridge,
                self.dim(&format!("skipped: {}", skipped.reason))
            ));
        }

        if lines.is_empty() {
            return String::new();
        }

        lines.insert(0, self.bold("Bridge trail:"));
        lines.join("\n")
    }

    /// Formats the bridges table header.
    pub fn format_bridges_header(&self) -> String {
        format!(
            "{:<16} {:<16} {:<6} {:<8} {}",
            self.bold("Bridge"),
            self.bold("Style"),
            self.bold("POST"),
            self.bold("Headers"),
            self.bold("Timeout")
        )
    }

    /// Formats one bridge row.
    pub fn format_bridge_line(&self, bridge: &Bridge, timeout: Duration) -> String {
        format!(
            "{:<16} {:<16} {:<6} {:<8} {}",
            bridge.name,
            bridge.style.display_name(),
            self.yes_no(bridge.supports_post),
            self.yes_no(bridge.forwards_headers),
            format_duration(timeout)
        )
    }

    /// Formats an error line.
    pub fn format_error(&self, message: &str) -> String {
        format!("{} {}", self.red("Error:"), message)
    }

    /// Formats a progress bar.
    pub fn progress_bar(&self, percent_remaining: f64) -> String {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let filled = ((percent_remaining.clamp(0.0, 100.0) / 100.0) * self.bar_width as f64)
            .round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent_remaining, &bar)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn yes_no(&self, value: bool) -> String {
        if value {
            self.green("yes")
        } else {
            self.dim("no")
        }
    }

    fn color_for_percent(&self, percent: f64, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if percent < 20.0 {
            self.red(text)
        } else if percent < 50.0 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn format_bytes(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes >= 1024.0 * 1024.0 * 1024.0 {
        format!("{:.2} GB", bytes / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024.0 * 1024.0 {
        format!("{:.1} MB", bytes / (1024.0 * 1024.0))
    } else if bytes >= 1024.0 {
        format!("{:.0} KB", bytes / 1024.0)
    } else {
        format!("{bytes:.0} B")
    }
}
