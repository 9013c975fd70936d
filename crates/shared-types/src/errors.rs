//! Error types shared across crates.

use thiserror::Error;

/// A string did not name a known identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} identifier: '{value}'")]
pub struct ParseIdError {
    pub what: &'static str,
    pub value: String,
}

impl ParseIdError {
    pub fn new(what: &'static str, value: impl Into<String>) -> Self {
        Self {
            what,
            value: value.into(),
        }
    }
}
