//! Cursor over the delimiter-separated segments of one log line.

use crate::error::ParseError;
use crate::{FIELD_DELIMITER, PROTOCOL_PREFIX};
use std::iter::FusedIterator;

/// Lazily yields the tokens that follow the protocol prefix.
///
/// Every token must be closed by a delimiter. Whatever trails the last
/// delimiter (a newline, a NUL, nothing at all) is never yielded, so a line
/// with zero fields stops right after its command and version.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    line: &'a str,
    cursor: usize,
}

impl<'a> Tokens<'a> {
    /// Starts tokenizing right after the default `HW->` marker.
    pub fn new(line: &'a str) -> Result<Self, ParseError> {
        Self::with_prefix(line, PROTOCOL_PREFIX)
    }

    /// Starts tokenizing right after the first occurrence of `prefix`.
    ///
    /// Returns [`ParseError::NotThisProtocol`] when the marker is absent.
    pub fn with_prefix(line: &'a str, prefix: &str) -> Result<Self, ParseError> {
        let start = line.find(prefix).ok_or(ParseError::NotThisProtocol)?;
        Ok(Tokens {
            line,
            cursor: start + prefix.len(),
        })
    }

    /// The unread part of the line.
    pub fn remainder(&self) -> &'a str {
        &self.line[self.cursor..]
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.remainder();
        let end = rest.find(FIELD_DELIMITER)?;
        self.cursor += end + FIELD_DELIMITER.len();
        Some(&rest[..end])
    }
}

impl FusedIterator for Tokens<'_> {}
