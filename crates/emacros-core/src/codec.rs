//! On-disk record format.
//!
//! A definition file is a sequence of record blocks, one per macro:
//!
//! ```text
//! (emacros-new-macro 'greet "Hello")
//! (emacros-new-macro 'wrap [40 return 134217825 41])
//! ```
//!
//! A block starts at a header line (the marker, the quoted name, and a
//! separator) and runs up to the line before the next header or to the end
//! of the file. Text payloads are quoted strings; event payloads are
//! bracketed sequences of integers and symbolic keys. Lines before the
//! first header and `;` comments after a record are preserved but ignored.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{RECORD_CLOSE, RECORD_MARKER};
use crate::errors::MacroError;
use crate::macros::{is_key_token, KeyEvent, MacroCode, MacroName, MacroRecord};

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^{}([A-Za-z0-9_-]+)(?:\s|$)",
        regex::escape(RECORD_MARKER)
    ))
    .expect("header pattern is valid")
});

// ============================================================================
// Headers
// ============================================================================

/// A record header found while scanning a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    /// Name token of the record.
    pub name: String,
    /// Byte offset of the header line start.
    pub start: usize,
    /// 1-based line number.
    pub line: usize,
}

/// Extract the record name from a header line, if the line is a header.
///
/// The name must be a full token followed by whitespace or end of line, so
/// `foo` never matches a header for `foo2`.
pub fn header_name(line: &str) -> Option<&str> {
    HEADER_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// List every header in `text`, in file order.
pub fn scan_headers(text: &str) -> Vec<HeaderLine> {
    let mut headers = Vec::new();
    let mut offset = 0;
    for (idx, line) in text.split_inclusive('\n').enumerate() {
        if let Some(name) = header_name(line) {
            headers.push(HeaderLine {
                name: name.to_string(),
                start: offset,
                line: idx + 1,
            });
        }
        offset += line.len();
    }
    headers
}

/// Marker plus name: the part of a header a rename rewrites.
pub fn header_prefix(name: &str) -> String {
    format!("{}{}", RECORD_MARKER, name)
}

// ============================================================================
// Encoding
// ============================================================================

/// Serialize a record as a single line, without the trailing newline.
pub fn encode_record(record: &MacroRecord) -> String {
    format!(
        "{} {}{}",
        header_prefix(record.name.as_str()),
        encode_code(&record.code),
        RECORD_CLOSE
    )
}

/// Serialize a payload datum.
pub fn encode_code(code: &MacroCode) -> String {
    match code {
        MacroCode::Text(text) => encode_string(text),
        MacroCode::Events(events) => {
            let items: Vec<String> = events
                .iter()
                .map(|event| match event {
                    KeyEvent::Char(value) => value.to_string(),
                    KeyEvent::Key(token) => token.clone(),
                })
                .collect();
            format!("[{}]", items.join(" "))
        }
    }
}

fn encode_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode one record block.
///
/// `line` is the header's 1-based line number, used in error messages.
pub fn decode_block(block: &str, path: &Path, line: usize) -> Result<MacroRecord, MacroError> {
    let parse_err = |message: String| MacroError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    };

    let rest = block
        .strip_prefix(RECORD_MARKER)
        .ok_or_else(|| parse_err("missing record marker".to_string()))?;
    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    let name = MacroName::try_new(&rest[..name_len]).map_err(|e| parse_err(e.to_string()))?;

    let mut reader = Reader::new(&rest[name_len..]);
    reader.skip_space();
    let code = match reader.peek() {
        Some('"') => MacroCode::Text(reader.read_string().map_err(parse_err)?),
        Some('[') => MacroCode::Events(reader.read_events().map_err(parse_err)?),
        Some(c) => return Err(parse_err(format!("unexpected `{}` before payload", c))),
        None => return Err(parse_err("missing payload".to_string())),
    };

    reader.skip_space();
    if reader.next() != Some(RECORD_CLOSE) {
        return Err(parse_err("record is not closed".to_string()));
    }
    reader.skip_trailing_comments().map_err(parse_err)?;

    Ok(MacroRecord::new(name, code))
}

struct Reader<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn next(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn skip_space(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.chars.next();
        }
    }

    fn skip_trailing_comments(&mut self) -> Result<(), String> {
        loop {
            self.skip_space();
            match self.peek() {
                None => return Ok(()),
                Some(';') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.chars.next();
                    }
                }
                Some(c) => return Err(format!("unexpected `{}` after record", c)),
            }
        }
    }

    fn read_string(&mut self) -> Result<String, String> {
        self.chars.next();
        let mut out = String::new();
        loop {
            match self.chars.next() {
                None => return Err("unterminated string".to_string()),
                Some('"') => return Ok(out),
                Some('\\') => {
                    if let Some(c) = self.read_escape()? {
                        out.push(c);
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn read_escape(&mut self) -> Result<Option<char>, String> {
        let c = self
            .chars
            .next()
            .ok_or_else(|| "unterminated escape".to_string())?;
        let decoded = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'f' => '\x0c',
            'a' => '\x07',
            'b' => '\x08',
            'e' => '\x1b',
            's' => ' ',
            'd' => '\x7f',
            '\n' => return Ok(None),
            '0'..='7' => {
                let mut value = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            self.chars.next();
                        }
                        None => break,
                    }
                }
                char::from_u32(value).ok_or_else(|| format!("bad octal escape {}", value))?
            }
            'x' => {
                let mut value: u32 = 0;
                let mut digits = 0;
                while let Some(d) = self.peek().and_then(|d| d.to_digit(16)) {
                    value = value
                        .checked_mul(16)
                        .and_then(|v| v.checked_add(d))
                        .ok_or_else(|| "hex escape overflows".to_string())?;
                    digits += 1;
                    self.chars.next();
                }
                if digits == 0 {
                    return Err("empty hex escape".to_string());
                }
                // `\ ` terminates a hex escape without producing a character.
                if self.peek() == Some('\\') {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek() == Some(&' ') {
                        self.chars.next();
                        self.chars.next();
                    }
                }
                char::from_u32(value).ok_or_else(|| format!("bad hex escape {:x}", value))?
            }
            other => other,
        };
        Ok(Some(decoded))
    }

    fn read_events(&mut self) -> Result<Vec<KeyEvent>, String> {
        self.chars.next();
        let mut events = Vec::new();
        loop {
            self.skip_space();
            match self.peek() {
                None => return Err("unterminated event sequence".to_string()),
                Some(']') => {
                    self.chars.next();
                    return Ok(events);
                }
                Some(_) => {
                    let mut token = String::new();
                    while let Some(c) = self.peek() {
                        if c.is_whitespace() || c == ']' {
                            break;
                        }
                        token.push(c);
                        self.chars.next();
                    }
                    events.push(decode_event(&token)?);
                }
            }
        }
    }
}

fn decode_event(token: &str) -> Result<KeyEvent, String> {
    if token.chars().all(|c| c.is_ascii_digit()) {
        return token
            .parse::<u32>()
            .map(KeyEvent::Char)
            .map_err(|_| format!("event value `{}` is out of range", token));
    }
    if is_key_token(token) {
        Ok(KeyEvent::Key(token.to_string()))
    } else {
        Err(format!("`{}` is not a valid event", token))
    }
}

// ============================================================================
// Tests
// ============================================================================
