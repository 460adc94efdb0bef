//! Placeholder markers inside document text
//!
//! A marker is `prefix payload suffix`, `${Name params}` by default. Finding
//! a marker balances braces and brackets and skips quoted strings, so a
//! payload may contain nested objects such as `${If and:{a:1, b:2}}`.

use crate::ast::{CommandInvocation, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delimiters {
    pub prefix: String,
    pub suffix: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            prefix: "${".to_string(),
            suffix: "}".to_string(),
        }
    }
}

/// Location of one marker in a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatch {
    /// Whole marker including delimiters
    pub range: Range<usize>,
    /// Payload between the delimiters
    pub payload: Range<usize>,
}

impl MarkerMatch {
    pub fn payload_str<'a>(&self, text: &'a str) -> &'a str {
        &text[self.payload.clone()]
    }
}

impl Delimiters {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// First marker starting at or after byte `from`.
    ///
    /// An unterminated marker is not a match; scanning continues after its
    /// prefix.
    pub fn find_marker(&self, text: &str, from: usize) -> Option<MarkerMatch> {
        let mut search = from;
        while search <= text.len() {
            let start = search + text.get(search..)?.find(&self.prefix)?;
            let payload_start = start + self.prefix.len();
            if let Some(payload_end) = self.find_suffix(text, payload_start) {
                return Some(MarkerMatch {
                    range: start..payload_end + self.suffix.len(),
                    payload: payload_start..payload_end,
                });
            }
            search = payload_start;
        }
        None
    }

    pub fn find_markers(&self, text: &str) -> Vec<MarkerMatch> {
        let mut markers = Vec::new();
        let mut from = 0;
        while let Some(marker) = self.find_marker(text, from) {
            from = marker.range.end;
            markers.push(marker);
        }
        markers
    }

    /// Whether `text` is exactly one marker.
    pub fn is_marker(&self, text: &str) -> bool {
        self.find_marker(text, 0)
            .map_or(false, |m| m.range == (0..text.len()))
    }

    fn find_suffix(&self, text: &str, from: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        let mut escaped = false;

        for (offset, c) in text.get(from..)?.char_indices() {
            let i = from + offset;
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                continue;
            }

            if depth == 0 && text[i..].starts_with(&self.suffix) {
                return Some(i);
            }
            match c {
                '"' | '\'' => quote = Some(c),
                '{' | '[' => depth += 1,
                '}' | ']' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        None
    }

    /// Write a single invocation as a marker.
    pub fn encode(&self, invocation: &CommandInvocation) -> String {
        format!("{}{}{}", self.prefix, encode_command(invocation), self.suffix)
    }

    /// Write every invocation of a payload into one marker.
    pub fn encode_payload(&self, payload: &Payload) -> String {
        let body: Vec<String> = payload.commands.iter().map(encode_command).collect();
        format!("{}{}{}", self.prefix, body.join("; "), self.suffix)
    }
}

/// `Name key:value, ...` with bare keys where the syntax allows them.
pub fn encode_command(invocation: &CommandInvocation) -> String {
    let mut out = invocation.name.clone();
    for (i, (key, value)) in invocation.params.iter().enumerate() {
        out.push_str(if i == 0 { " " } else { ", " });
        out.push_str(&encode_key(key));
        out.push(':');
        out.push_str(&encode_value(value));
    }
    out
}

fn encode_key(key: &str) -> String {
    let mut chars = key.chars();
    let first = match chars.next() {
        Some('$') | Some('@') => chars.next(),
        other => other,
    };
    let bare = matches!(first, Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !matches!(key, "true" | "false" | "null");
    if bare {
        key.to_string()
    } else {
        Value::String(key.to_string()).to_string()
    }
}

fn encode_value(value: &Value) -> String {
    value.to_string()
}
