//! Collector for accumulating diagnostics during reconciliation.
//!
//! Every emitted diagnostic is also forwarded to the `log` facade as a
//! structured event, so hosts see discrepancies as they are found without the
//! engine configuring any sink.

use log::{error, info, warn};

use crate::diagnostic::{Diagnostic, Severity};

/// A collector for accumulating diagnostics.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        let code = diagnostic.code().to_string();
        let element_id = diagnostic.element_id().unwrap_or("-");
        match diagnostic.severity() {
            Severity::Error => {
                self.has_errors = true;
                error!(code, element_id; "{}", diagnostic.message());
            }
            Severity::Warning => warn!(code, element_id; "{}", diagnostic.message()),
            Severity::Info => info!(code, element_id; "{}", diagnostic.message()),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if an error-severity diagnostic was emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection and return the diagnostics in emission order.
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCode;

    #[test]
    fn test_collector_new_has_no_errors() {
        let collector = DiagnosticCollector::new();
        assert!(!collector.has_errors());
        assert!(collector.finish().is_empty());
    }

    #[test]
    fn test_collector_warnings_do_not_set_errors() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::warning(DiagnosticCode::W103, "blank"));
        collector.emit(Diagnostic::info(DiagnosticCode::I001, "missing"));

        assert!(!collector.has_errors());
        assert_eq!(collector.finish().len(), 2);
    }

    #[test]
    fn test_collector_error_sets_flag_and_keeps_order() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::info(DiagnosticCode::I001, "first"));
        collector.emit(Diagnostic::error(DiagnosticCode::E201, "second"));

        assert!(collector.has_errors());
        let diagnostics = collector.finish();
        assert_eq!(diagnostics[0].message(), "first");
        assert_eq!(diagnostics[1].message(), "second");
    }
}
