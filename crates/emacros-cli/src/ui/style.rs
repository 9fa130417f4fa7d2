//! Message styling for CLI output.
//!
//! | Prefix   | Meaning     | Color  |
//! |----------|-------------|--------|
//! | `[ok]`   | Success     | Green  |
//! | `[err]`  | Error       | Red    |
//! | `[warn]` | Warning     | Yellow |
//! | `[info]` | Information | Blue   |
//! | `[hint]` | Suggestion  | Cyan   |
//! | `[skip]` | Skipped     | Dim    |

use owo_colors::OwoColorize;

use emacros_core::Scope;

use super::color::ColorMode;

/// Message severity/type for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Operation completed.
    Ok,
    /// Operation failed.
    Err,
    /// Completed with caveats.
    Warn,
    /// Neutral status.
    Info,
    /// Actionable next step.
    Hint,
    /// Intentionally not processed.
    Skip,
}

impl MessageType {
    /// Returns the prefix text for this message type.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Ok => "[ok]",
            Self::Err => "[err]",
            Self::Warn => "[warn]",
            Self::Info => "[info]",
            Self::Hint => "[hint]",
            Self::Skip => "[skip]",
        }
    }
}

/// Styling interface for CLI output.
#[derive(Debug, Clone, Default)]
pub struct Style {
    color_mode: ColorMode,
}

impl Style {
    /// Create a Style with an explicit color mode.
    pub fn new(color_mode: ColorMode) -> Self {
        Self { color_mode }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(&self) -> bool {
        self.color_mode.is_enabled()
    }

    /// Format a message with a type prefix, e.g. `[ok] Saved`.
    pub fn message(&self, msg_type: MessageType, text: &str) -> String {
        let prefix = msg_type.prefix();
        if !self.colors_enabled() {
            return format!("{} {}", prefix, text);
        }
        let colored_prefix = match msg_type {
            MessageType::Ok => prefix.green().to_string(),
            MessageType::Err => prefix.red().to_string(),
            MessageType::Warn => prefix.yellow().to_string(),
            MessageType::Info => prefix.blue().to_string(),
            MessageType::Hint => prefix.cyan().to_string(),
            MessageType::Skip => prefix.dimmed().to_string(),
        };
        format!("{} {}", colored_prefix, text)
    }

    /// Format a detail line under a message.
    pub fn message_detail(&self, label: &str, value: &str) -> String {
        format!("     {}: {}", label, value)
    }

    /// Format an error with optional cause and hint lines.
    pub fn error_with_context(&self, msg: &str, cause: Option<&str>, hint: Option<&str>) -> String {
        let mut output = self.message(MessageType::Err, msg);
        if let Some(cause) = cause {
            output.push_str(&format!("\n      Cause: {}", cause));
        }
        if let Some(hint) = hint {
            output.push_str(&format!("\n      Hint: {}", hint));
        }
        output
    }

    /// Format a macro name (bold).
    pub fn macro_name(&self, name: &str) -> String {
        if self.colors_enabled() {
            name.bold().to_string()
        } else {
            name.to_string()
        }
    }

    /// Format a scope label; global is magenta, local green.
    pub fn scope(&self, scope: Scope) -> String {
        let label = scope.to_string();
        if !self.colors_enabled() {
            return label;
        }
        match scope {
            Scope::Local => label.green().to_string(),
            Scope::Global => label.magenta().to_string(),
        }
    }

    /// Format a file path (cyan).
    pub fn file_path(&self, path: &str) -> String {
        if self.colors_enabled() {
            path.cyan().to_string()
        } else {
            path.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_no_color() {
        let style = Style::new(ColorMode::Never);
        assert_eq!(style.message(MessageType::Ok, "Saved"), "[ok] Saved");
        assert_eq!(style.message(MessageType::Skip, "x"), "[skip] x");
    }

    #[test]
    fn test_error_with_context() {
        let style = Style::new(ColorMode::Never);
        let output = style.error_with_context("Move failed", Some("same file"), Some("use --dir"));
        assert_eq!(
            output,
            "[err] Move failed\n      Cause: same file\n      Hint: use --dir"
        );
    }

    #[test]
    fn test_plain_labels() {
        let style = Style::new(ColorMode::Never);
        assert_eq!(style.scope(Scope::Global), "global");
        assert_eq!(style.macro_name("greet"), "greet");
        assert_eq!(style.message_detail("File", "a.el"), "     File: a.el");
    }
}
