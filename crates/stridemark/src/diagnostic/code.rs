//! Diagnostic codes for reconciliation results.
//!
//! Codes are organized by severity:
//! - `I0xx` - Informational
//! - `W1xx` - Warnings
//! - `E2xx` - Errors

use std::fmt;

/// Codes for categorizing reconciliation diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // =========================================================================
    // Informational (I0xx)
    // =========================================================================
    /// In-scope element without findings.
    ///
    /// The response did not cover an element that is eligible for findings.
    /// Generators may legitimately skip low-risk elements.
    I001,

    // =========================================================================
    // Warnings (W1xx)
    // =========================================================================
    /// Finding for an ineligible element.
    ///
    /// The response names an element that is out of scope, a trust boundary,
    /// or not present in the model. Its findings are never merged.
    W101,

    /// Discarded finding batch.
    ///
    /// A finding for this element violated the finding schema, so every
    /// finding for the element was dropped.
    W102,

    /// Empty mitigation.
    ///
    /// A finding has no mitigation text, or only whitespace.
    W103,

    // =========================================================================
    // Errors (E2xx)
    // =========================================================================
    /// Unrelated response.
    ///
    /// None of the response's element ids occur in the model. The generator
    /// was most likely given a different document.
    E201,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
