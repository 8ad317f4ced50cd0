//! Diagnostics produced while reconciling a response against a model.
//!
//! Each discrepancy found by the reconciler becomes a [`Diagnostic`] carrying a
//! [`Severity`], a [`DiagnosticCode`], a human-readable message and, where it
//! applies, the element id it refers to.
//!
//! # Example
//!
//! ```
//! # use stridemark::diagnostic::{Diagnostic, DiagnosticCode};
//! let diag = Diagnostic::warning(DiagnosticCode::W103, "Element db finding 1 has empty mitigation")
//!     .with_element("db");
//!
//! assert_eq!(diag.to_string(), "warning[W103]: Element db finding 1 has empty mitigation");
//! ```

mod code;
mod collector;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use code::DiagnosticCode;
pub use severity::Severity;

use std::fmt;

use stridemark_core::finding::ElementId;

/// A single reconciliation finding about the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: DiagnosticCode,
    message: String,
    element_id: Option<ElementId>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Create an informational diagnostic.
    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    /// Attach the element id this diagnostic refers to.
    pub fn with_element(mut self, element_id: impl Into<ElementId>) -> Self {
        self.element_id = Some(element_id.into());
        self
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the diagnostic code.
    pub fn code(&self) -> DiagnosticCode {
        self.code
    }

    /// Get the message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the element id, if any.
    pub fn element_id(&self) -> Option<&str> {
        self.element_id.as_deref()
    }

    fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            element_id: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_constructors() {
        let diag = Diagnostic::error(DiagnosticCode::E201, "unrelated");

        assert!(diag.severity().is_error());
        assert_eq!(diag.code(), DiagnosticCode::E201);
        assert_eq!(diag.message(), "unrelated");
        assert!(diag.element_id().is_none());
    }

    #[test]
    fn test_diagnostic_with_element() {
        let diag = Diagnostic::info(DiagnosticCode::I001, "missing").with_element("web");

        assert!(diag.severity().is_info());
        assert_eq!(diag.element_id(), Some("web"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::warning(DiagnosticCode::W101, "not eligible");

        assert_eq!(diag.to_string(), "warning[W101]: not eligible");
    }
}
