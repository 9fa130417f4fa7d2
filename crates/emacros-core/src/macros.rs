//! Macro data model.
//!
//! A macro is a named payload: either literal text or an ordered sequence of
//! key events as captured by the recorder. This module holds the value types
//! and the pure name validation used by prompters while the operator types.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::PLACEHOLDER_GLYPH;
use crate::errors::MacroError;
use crate::registry::MacroRegistry;

// ============================================================================
// Name Validation
// ============================================================================

/// Outcome of validating a candidate macro name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameValidation {
    /// The name can be used.
    Valid,
    /// Nothing was entered.
    Empty,
    /// The name contains a character outside `[A-Za-z0-9_-]`.
    IllegalChar(char),
    /// The name reads as an integer literal.
    Numeric,
    /// The name shadows a non-macro binding of the host.
    Reserved,
}

impl NameValidation {
    /// Whether the candidate was accepted.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Operator-facing explanation, `None` when valid.
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Valid => None,
            Self::Empty => Some("name is empty".to_string()),
            Self::IllegalChar(c) => Some(format!(
                "character `{}` is not allowed; use letters, digits, `-` and `_`",
                c.escape_default()
            )),
            Self::Numeric => Some("name must not be a number".to_string()),
            Self::Reserved => Some("name is already bound to a command".to_string()),
        }
    }

    /// Convert into a `Result`, attaching the candidate for error messages.
    pub fn into_result(self, candidate: &str) -> Result<(), MacroError> {
        match self.reason() {
            None => Ok(()),
            Some(reason) => Err(MacroError::InvalidName {
                name: candidate.to_string(),
                reason,
            }),
        }
    }
}

/// Check the syntax of a candidate name, without consulting bindings.
pub fn check_name_syntax(candidate: &str) -> NameValidation {
    if candidate.is_empty() {
        return NameValidation::Empty;
    }
    if let Some(c) = candidate.chars().find(|c| !is_name_char(*c)) {
        return NameValidation::IllegalChar(c);
    }
    if is_integer_literal(candidate) {
        return NameValidation::Numeric;
    }
    NameValidation::Valid
}

/// Validate a candidate name against syntax and the host's own bindings.
///
/// Prompters call this after every input increment or on submission; it
/// never blocks and never mutates.
pub fn validate_name(candidate: &str, registry: &MacroRegistry) -> NameValidation {
    match check_name_syntax(candidate) {
        NameValidation::Valid if registry.is_reserved(candidate) => NameValidation::Reserved,
        other => other,
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

// ============================================================================
// MacroName
// ============================================================================

/// A syntactically valid macro name.
///
/// # Example
///
/// ```
/// use emacros_core::MacroName;
///
/// assert!(MacroName::try_new("greet").is_ok());
/// assert!(MacroName::try_new("hello_fn-2").is_ok());
/// assert!(MacroName::try_new("42").is_err());
/// assert!(MacroName::try_new("two words").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacroName(String);

impl MacroName {
    /// Create a name, checking its syntax.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::InvalidName`] for empty, numeric, or
    /// ill-formed names.
    pub fn try_new(name: impl Into<String>) -> Result<Self, MacroError> {
        let name = name.into();
        check_name_syntax(&name).into_result(&name)?;
        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacroName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MacroName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MacroName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// KeyEvent / MacroCode
// ============================================================================

/// One element of a recorded event sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyEvent {
    /// A character event. Values above 255 carry modifier bits and are kept
    /// exactly as recorded.
    Char(u32),
    /// A symbolic key such as `return` or `f5`.
    Key(String),
}

impl KeyEvent {
    /// Build a symbolic key event, checking that it can be stored.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::InvalidName`] if the token is empty, reads as an
    /// integer, or contains characters the record format reserves.
    pub fn key(token: impl Into<String>) -> Result<Self, MacroError> {
        let token = token.into();
        if !is_key_token(&token) {
            return Err(MacroError::InvalidName {
                name: token,
                reason: "not a storable key token".to_string(),
            });
        }
        Ok(Self::Key(token))
    }

    /// Parse one token the way it appears in a stored sequence.
    pub fn parse_token(token: &str) -> Result<Self, MacroError> {
        match token.parse::<u32>() {
            Ok(value) => Ok(Self::Char(value)),
            Err(_) => Self::key(token),
        }
    }

    /// Render for display. Stored values are never altered.
    pub fn render(&self) -> String {
        match self {
            Self::Char(value) => render_char(*value),
            Self::Key(token) => format!("<{}>", token),
        }
    }
}

/// Whether a token can be stored as a symbolic key.
pub(crate) fn is_key_token(token: &str) -> bool {
    !token.is_empty()
        && token.parse::<i64>().is_err()
        && token.chars().all(|c| {
            c.is_ascii_alphanumeric() || "-_+*<>=/!?$%&~^:.@".contains(c)
        })
}

fn render_char(value: u32) -> String {
    match value {
        0x20..=0x7e => char::from_u32(value)
            .map(String::from)
            .unwrap_or_else(|| PLACEHOLDER_GLYPH.to_string()),
        0x00..=0x1f => format!("^{}", char::from(b'@' + value as u8)),
        0x7f => "^?".to_string(),
        0x80..=0xff => char::from_u32(value)
            .map(String::from)
            .unwrap_or_else(|| PLACEHOLDER_GLYPH.to_string()),
        _ => PLACEHOLDER_GLYPH.to_string(),
    }
}

/// The executable payload of a macro.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum MacroCode {
    /// Literal text to insert.
    Text(String),
    /// Recorded key events, in order.
    Events(Vec<KeyEvent>),
}

impl MacroCode {
    /// Parse whitespace separated event tokens (`"97 98 return"`).
    pub fn parse_events(input: &str) -> Result<Self, MacroError> {
        let events = input
            .split_whitespace()
            .map(KeyEvent::parse_token)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::Events(events))
    }

    /// Display form used by listings.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => format!("{:?}", text),
            Self::Events(events) => events
                .iter()
                .map(KeyEvent::render)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// A named, persisted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroRecord {
    /// Unique name within a definition file.
    pub name: MacroName,
    /// The payload.
    pub code: MacroCode,
}

impl MacroRecord {
    /// Create a new record.
    pub fn new(name: MacroName, code: MacroCode) -> Self {
        Self { name, code }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_name_syntax() {
        assert_eq!(check_name_syntax("greet"), NameValidation::Valid);
        assert_eq!(check_name_syntax("a-b_c9"), NameValidation::Valid);
        assert_eq!(check_name_syntax(""), NameValidation::Empty);
        assert_eq!(check_name_syntax("12"), NameValidation::Numeric);
        assert_eq!(check_name_syntax("-12"), NameValidation::Numeric);
        assert_eq!(check_name_syntax("foo bar"), NameValidation::IllegalChar(' '));
        assert_eq!(check_name_syntax("x.y"), NameValidation::IllegalChar('.'));
        // A lone dash is not a number.
        assert_eq!(check_name_syntax("-"), NameValidation::Valid);
        assert_eq!(check_name_syntax("12a"), NameValidation::Valid);
    }

    #[test]
    fn test_validate_name_reserved() {
        let registry = MacroRegistry::with_reserved(["save-buffer".to_string()]);
        assert_eq!(
            validate_name("save-buffer", &registry),
            NameValidation::Reserved
        );
        assert!(validate_name("my-save", &registry).is_valid());
    }

    #[test]
    fn test_key_event_parse_token() {
        assert_eq!(KeyEvent::parse_token("97").unwrap(), KeyEvent::Char(97));
        assert_eq!(
            KeyEvent::parse_token("134217825").unwrap(),
            KeyEvent::Char(134_217_825)
        );
        assert_eq!(
            KeyEvent::parse_token("return").unwrap(),
            KeyEvent::Key("return".into())
        );
        assert!(KeyEvent::parse_token("-3").is_err());
        assert!(KeyEvent::parse_token("a\"b").is_err());
    }

    #[test]
    fn test_render_uses_placeholder_above_byte_range() {
        let code = MacroCode::Events(vec![
            KeyEvent::Char(104),
            KeyEvent::Char(1),
            KeyEvent::Char(300),
            KeyEvent::Key("return".into()),
        ]);
        assert_eq!(code.render(), "h ^A ? <return>");
        // Rendering must not alter the value.
        if let MacroCode::Events(events) = &code {
            assert_eq!(events[2], KeyEvent::Char(300));
        }
    }

    #[test]
    fn test_render_text() {
        assert_eq!(MacroCode::Text("Hi \"x\"".into()).render(), "\"Hi \\\"x\\\"\"");
    }
}
