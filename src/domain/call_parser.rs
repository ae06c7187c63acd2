//! Function-call line parser.
//!
//! Extracts a [`RawCall`] from a model reply of the form
//! `FUNCTION: name(key=value, ...)`. Only the first line after the marker is
//! read. Parameters are split on commas (quoted commas are not supported),
//! each pair on its first `=`, and values are stripped of quotes and coerced
//! to integers where possible. Replies without a marker may instead carry a
//! JSON object `{"function": ..., "arguments": {...}}`.
//!
//! Error positions are byte offsets into the full reply.

use crate::domain::error::ParseError;
use crate::domain::function_call::{ParamValue, RawCall};

pub const MARKER: &str = "FUNCTION:";

/// Prefix the marker to a bare call such as `get_all_funds()`. Lines that
/// already carry the marker, and JSON objects, are returned unchanged.
pub fn with_marker(line: &str) -> String {
    let trimmed = line.trim_start();
    if line.contains(MARKER) || trimmed.starts_with('{') {
        line.to_string()
    } else {
        format!("{} {}", MARKER, trimmed)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, pos: usize) -> Self {
        Self { input, pos }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.remaining();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// The rest of the current line, without its terminator.
    fn take_line(&mut self) -> (usize, &'a str) {
        let start = self.pos;
        let rest = self.remaining();
        let end = rest.find('\n').unwrap_or(rest.len());
        self.pos += end;
        (start, rest[..end].trim_end())
    }

    fn parse_call_line(&mut self) -> Result<RawCall, ParseError> {
        self.skip_whitespace();
        let (line_start, line) = self.take_line();

        if line.is_empty() {
            return Err(ParseError::new(
                "expected function call after FUNCTION:",
                line_start,
            ));
        }

        let open = line.find('(').ok_or_else(|| {
            ParseError::new("expected '(' after function name", line_start + line.len())
        })?;
        let close = line
            .rfind(')')
            .filter(|&close| close > open)
            .ok_or_else(|| ParseError::new("expected ')' to close call", line_start + line.len()))?;

        let name = line[..open].trim().trim_matches('`').trim();
        if name.is_empty() {
            return Err(ParseError::new("expected function name", line_start));
        }

        let mut call = RawCall::new(name);
        let body_start = line_start + open + 1;
        let body = &line[open + 1..close];
        if body.trim().is_empty() {
            return Ok(call);
        }

        let mut offset = body_start;
        for piece in body.split(',') {
            if let Some((key, value)) = piece.split_once('=') {
                let key = key.trim();
                if key.is_empty() {
                    let lead = piece.len() - piece.trim_start().len();
                    return Err(ParseError::new("expected parameter name before '='", offset + lead));
                }
                let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                call.params.push((key.to_string(), ParamValue::coerce(value)));
            }
            offset += piece.len() + 1;
        }

        Ok(call)
    }
}

/// Parse a model reply into an unvalidated call.
pub fn parse(input: &str) -> Result<RawCall, ParseError> {
    if let Some(at) = input.find(MARKER) {
        let mut parser = Parser::new(input, at + MARKER.len());
        return parser.parse_call_line();
    }

    if let Some(call) = parse_json_call(input) {
        return Ok(call);
    }

    Err(ParseError::new(
        format!("reply does not contain '{}'", MARKER),
        0,
    ))
}

fn parse_json_call(input: &str) -> Option<RawCall> {
    let start = input.find('{')?;
    let end = input.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(&input[start..=end]).ok()?;
    RawCall::from_json(&value).filter(|call| !call.name.is_empty())
}
