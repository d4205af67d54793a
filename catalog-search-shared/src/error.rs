//! Validation error returned for malformed caller input.

use thiserror::Error;

/// A caller-supplied value failed validation.
///
/// This is the only error class the search layer reports to its callers;
/// every index or consistency problem is recovered internally.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid {field}: {message}")]
pub struct ValidationError {
    /// The offending input key (e.g. `dateFrom`).
    pub field: &'static str,
    /// Human readable reason.
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for the given input key.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
