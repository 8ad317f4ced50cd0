//! Error types for stridemark operations.
//!
//! This module provides the main error type [`StridemarkError`] which wraps
//! the failures that can occur while loading, annotating and saving a model.
//! Per-element finding problems are not errors at this level; they surface as
//! diagnostics on the validation result.

use std::io;

use thiserror::Error;

use stridemark_core::document::DocumentError;

use crate::response::ResponseError;

/// The main error type for stridemark operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the JSON error so that
/// callers can point at the offending line and column.
#[derive(Debug, Error)]
pub enum StridemarkError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid JSON in {what}: {err}")]
    Parse {
        err: serde_json::Error,
        src: String,
        what: &'static str,
    },

    #[error("Invalid threat model: {0}")]
    Document(#[from] DocumentError),

    #[error("Invalid response: {0}")]
    Response(#[from] ResponseError),

    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Finding generation failed: {0}")]
    Generate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Response shares no element ids with the threat model ({} response ids)", response_ids.len())]
    ScopeMismatch { response_ids: Vec<String> },
}

impl StridemarkError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: serde_json::Error, src: impl Into<String>, what: &'static str) -> Self {
        Self::Parse {
            err,
            src: src.into(),
            what,
        }
    }
}
