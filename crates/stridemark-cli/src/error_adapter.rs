//! Error adapter for converting StridemarkError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! JSON syntax errors carry their source text, so they are rendered with a
//! labeled span at the offending line and column. Every other variant is
//! rendered as a plain report with a stable `stridemark::<kind>` code.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use stridemark::StridemarkError;

/// Adapter for a JSON syntax error with its source text.
pub struct JsonErrorAdapter<'a> {
    err: &'a serde_json::Error,
    src: &'a str,
    what: &'static str,
}

impl<'a> JsonErrorAdapter<'a> {
    /// Create a new JSON error adapter.
    pub fn new(err: &'a serde_json::Error, src: &'a str, what: &'static str) -> Self {
        Self { err, src, what }
    }

    /// Location of the error in the source text.
    fn span(&self) -> SourceSpan {
        let offset = byte_offset(self.src, self.err.line(), self.err.column());
        let len = self.src[offset..].chars().next().map_or(0, char::len_utf8);
        SourceSpan::new(offset.into(), len)
    }
}

impl fmt::Debug for JsonErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonErrorAdapter")
            .field("err", &self.err)
            .field("what", &self.what)
            .finish()
    }
}

impl fmt::Display for JsonErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid JSON in {}", self.what)
    }
}

impl std::error::Error for JsonErrorAdapter<'_> {}

impl MietteDiagnostic for JsonErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("stridemark::parse"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new_primary_with_span(Some(self.err.to_string()), self.span());
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for [`StridemarkError`] variants without source text.
pub struct ErrorAdapter<'a>(pub &'a StridemarkError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            StridemarkError::Io(_) => "stridemark::io",
            StridemarkError::Parse { .. } => "stridemark::parse",
            StridemarkError::Document(_) => "stridemark::document",
            StridemarkError::Response(_) => "stridemark::response",
            StridemarkError::Serialize(_) => "stridemark::serialize",
            StridemarkError::Generate(_) => "stridemark::generate",
            StridemarkError::Config(_) => "stridemark::config",
            StridemarkError::ScopeMismatch { .. } => "stridemark::scope_mismatch",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            StridemarkError::ScopeMismatch { .. } => Some(Box::new(
                "the response was probably generated for a different threat model",
            )),
            StridemarkError::Response(_) => Some(Box::new(
                "expected {\"<element id>\": [findings]} or [{\"id\": \"<element id>\", \"threats\": [findings]}]",
            )),
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A JSON syntax error with source location information.
    Json(JsonErrorAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Json(j) => fmt::Display::fmt(j, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Json(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Json(j) => j.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Json(j) => j.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Json(j) => j.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Json(j) => j.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a 1-based line and column to a byte offset into `src`.
///
/// The result is clamped to the source length and to a char boundary.
fn byte_offset(src: &str, line: usize, column: usize) -> usize {
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let mut offset = (line_start + column.saturating_sub(1)).min(src.len());
    while !src.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Convert a [`StridemarkError`] into a reportable error.
pub fn to_reportable(err: &StridemarkError) -> Reportable<'_> {
    match err {
        StridemarkError::Parse { err, src, what } => {
            Reportable::Json(JsonErrorAdapter::new(err, src, what))
        }
        _ => Reportable::Error(ErrorAdapter(err)),
    }
}
