//! State-machine scanner for flat JSON objects
//!
//! One left-to-right pass over the line's bytes. Every delimiter the scanner
//! cares about is ASCII, so slicing at those byte offsets always lands on a
//! UTF-8 boundary and keys/values can be borrowed straight from the line.
//!
//! The scanner is lenient: it never fails. Malformed scalars degrade to
//! strings, a missing closing brace just ends the record, and nested values
//! produce unspecified fields rather than an error.

use super::{Record, Scalar};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    Key,
    Value { quoted: bool },
    Done,
}

/// Parse one line into a [`Record`]
///
/// # Examples
///
/// ```
/// use tripagg::record::{parse_line, Scalar};
///
/// let record = parse_line(r#"{"a":"x","b":1,"c":2.5}"#);
/// assert_eq!(record.get("a"), Some(&Scalar::Str("x".to_string())));
/// assert_eq!(record.get("b"), Some(&Scalar::Int(1)));
/// assert_eq!(record.get("c"), Some(&Scalar::Float(2.5)));
/// ```
pub fn parse_line(line: &str) -> Record {
    let bytes = line.as_bytes();
    let mut record = Record::new();
    let mut state = ScanState::Outside;
    let mut key = "";
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() && state != ScanState::Done {
        let b = bytes[i];
        match state {
            ScanState::Outside => match b {
                b'"' => {
                    state = ScanState::Key;
                    start = i + 1;
                }
                b'}' => state = ScanState::Done,
                _ => {}
            },
            ScanState::Key => {
                if b == b'"' {
                    key = &line[start..i];
                    i += 1;
                    while i < bytes.len() && matches!(bytes[i], b' ' | b':') {
                        i += 1;
                    }
                    if i < bytes.len() && bytes[i] == b'"' {
                        state = ScanState::Value { quoted: true };
                        start = i + 1;
                    } else {
                        // Re-examine the current byte as the first value byte
                        state = ScanState::Value { quoted: false };
                        start = i;
                        continue;
                    }
                }
            }
            ScanState::Value { quoted: true } => {
                if b == b'"' {
                    record.insert(key, Scalar::Str(line[start..i].to_string()));
                    state = ScanState::Outside;
                }
            }
            ScanState::Value { quoted: false } => {
                if b == b',' || b == b'}' {
                    record.insert(key, classify_token(&line[start..i]));
                    state = if b == b'}' {
                        ScanState::Done
                    } else {
                        ScanState::Outside
                    };
                }
            }
            ScanState::Done => {}
        }
        i += 1;
    }

    record
}

/// Type an unquoted token: float if it has a `.`, integer otherwise, raw
/// string when neither conversion succeeds.
pub(crate) fn classify_token(raw: &str) -> Scalar {
    // Stray quotes inside an unquoted token are not part of its value
    let token: Cow<'_, str> = if raw.contains('"') {
        Cow::Owned(raw.replace('"', ""))
    } else {
        Cow::Borrowed(raw)
    };

    let trimmed = token.trim();
    let parsed = if token.contains('.') {
        trimmed.parse::<f64>().ok().map(Scalar::Float)
    } else {
        trimmed.parse::<i64>().ok().map(Scalar::Int)
    };

    parsed.unwrap_or_else(|| Scalar::Str(token.into_owned()))
}
