//! Reconciliation of a normalized response against a model's scope.
//!
//! Severity policy:
//!
//! | Condition                                        | Severity | Code   |
//! |--------------------------------------------------|----------|--------|
//! | eligible element without findings                | info     | `I001` |
//! | response names an ineligible element             | warning  | `W101` |
//! | element batch discarded by the normalizer        | warning  | `W102` |
//! | finding with blank mitigation                    | warning  | `W103` |
//! | response shares no element id with the model     | error    | `E201` |
//!
//! Only `E201` makes a result invalid. Partial mismatches are common (a
//! generator may skip low-risk elements or invent a stray key) and are
//! recoverable; a wholesale mismatch means the response belongs to another
//! document.

use indexmap::IndexSet;
use log::info;

use stridemark_core::finding::ElementId;

use crate::{
    diagnostic::{Diagnostic, DiagnosticCode, DiagnosticCollector, Severity},
    normalize::NormalizedResponse,
    scope::Scope,
};

/// Coverage and volume figures of one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    /// Number of eligible elements in the model.
    pub in_scope_count: usize,
    /// Number of elements with an accepted finding batch.
    pub responded_count: usize,
    /// Number of accepted findings across all elements.
    pub total_findings: usize,
    /// Share of eligible elements with accepted findings, in percent, rounded
    /// to one decimal place.
    pub coverage_percent: f64,
}

/// Outcome of reconciling one response against one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    is_valid: bool,
    missing_element_ids: Vec<ElementId>,
    out_of_scope_response_ids: Vec<ElementId>,
    response_ids: Vec<ElementId>,
    diagnostics: Vec<Diagnostic>,
    stats: Stats,
}

impl ValidationResult {
    /// `false` only when the response is unrelated to the model.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Eligible elements that received no accepted findings, in document order.
    pub fn missing_element_ids(&self) -> &[ElementId] {
        &self.missing_element_ids
    }

    /// Accepted response elements that are not eligible, in response order.
    pub fn out_of_scope_response_ids(&self) -> &[ElementId] {
        &self.out_of_scope_response_ids
    }

    /// Every element id named by the response, accepted ones first.
    pub fn response_ids(&self) -> &[ElementId] {
        &self.response_ids
    }

    /// All diagnostics in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Error messages.
    pub fn errors(&self) -> Vec<&str> {
        self.messages(Severity::Error)
    }

    /// Warning messages.
    pub fn warnings(&self) -> Vec<&str> {
        self.messages(Severity::Warning)
    }

    /// Informational messages.
    pub fn info_messages(&self) -> Vec<&str> {
        self.messages(Severity::Info)
    }

    /// Returns `true` if the result is valid and carries no warnings.
    pub fn is_clean(&self) -> bool {
        self.is_valid && !self.diagnostics.iter().any(|d| d.severity().is_warning())
    }

    /// Coverage and volume figures.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    fn messages(&self, severity: Severity) -> Vec<&str> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity() == severity)
            .map(Diagnostic::message)
            .collect()
    }
}

/// Reconciles a normalized response against the model scope.
///
/// Ids of rejected batches count as part of the response when judging whether
/// it is related to the model at all, but not for coverage or missing-element
/// detection, since nothing of theirs will be merged.
pub fn reconcile(scope: &Scope, response: &NormalizedResponse) -> ValidationResult {
    let mut collector = DiagnosticCollector::new();
    let responded: IndexSet<&str> = response.findings().keys().map(String::as_str).collect();

    let missing_element_ids: Vec<ElementId> = scope
        .eligible()
        .iter()
        .filter(|id| !responded.contains(id.as_str()))
        .cloned()
        .collect();
    for id in &missing_element_ids {
        collector.emit(
            Diagnostic::info(
                DiagnosticCode::I001,
                format!("Element {id} is in scope but has no findings"),
            )
            .with_element(id.as_str()),
        );
    }

    let out_of_scope_response_ids: Vec<ElementId> = responded
        .iter()
        .filter(|id| !scope.is_eligible(id))
        .map(|id| id.to_string())
        .collect();
    for id in &out_of_scope_response_ids {
        collector.emit(
            Diagnostic::warning(
                DiagnosticCode::W101,
                format!("Element {id} has findings but is not eligible for findings"),
            )
            .with_element(id.as_str()),
        );
    }

    for (id, violation) in response.rejected() {
        collector.emit(
            Diagnostic::warning(
                DiagnosticCode::W102,
                format!("Element {id} findings discarded: {violation}"),
            )
            .with_element(id.as_str()),
        );
    }

    let response_ids: Vec<ElementId> = response.all_element_ids().map(str::to_string).collect();
    let overlaps = response_ids.iter().any(|id| scope.contains(id));
    if !response_ids.is_empty() && !overlaps {
        collector.emit(Diagnostic::error(
            DiagnosticCode::E201,
            "Response element ids have no overlap with the model's elements",
        ));
    }

    for (id, findings) in response.findings() {
        for (idx, _) in findings
            .iter()
            .enumerate()
            .filter(|(_, finding)| finding.has_blank_mitigation())
        {
            collector.emit(
                Diagnostic::warning(
                    DiagnosticCode::W103,
                    format!("Element {id} finding {} has empty mitigation", idx + 1),
                )
                .with_element(id.as_str()),
            );
        }
    }

    let covered = responded
        .iter()
        .filter(|id| scope.is_eligible(id))
        .count();
    let stats = Stats {
        in_scope_count: scope.eligible().len(),
        responded_count: responded.len(),
        total_findings: response.total_findings(),
        coverage_percent: coverage_percent(covered, scope.eligible().len()),
    };

    let is_valid = !collector.has_errors();
    info!(
        is_valid,
        in_scope = stats.in_scope_count,
        responded = stats.responded_count,
        findings = stats.total_findings,
        coverage = stats.coverage_percent;
        "Response reconciled"
    );

    ValidationResult {
        is_valid,
        missing_element_ids,
        out_of_scope_response_ids,
        response_ids,
        diagnostics: collector.finish(),
        stats,
    }
}

/// `covered / eligible * 100` rounded to one decimal place; `0` when nothing
/// is eligible.
fn coverage_percent(covered: usize, eligible: usize) -> f64 {
    if eligible == 0 {
        return 0.0;
    }
    let percent = covered as f64 / eligible as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}


#[cfg(test)]
mod proptest_tests {
    use indexmap::IndexMap;
    use proptest::prelude::*;

    use stridemark_core::finding::{Finding, ModelType, Severity as FindingSeverity, Status};

    use super::*;

    const IDS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

    // ===================
    // Strategies
    // ===================

    fn ids_strategy() -> impl Strategy<Value = Vec<&'static str>> {
        proptest::sample::subsequence(IDS.to_vec(), 0..=IDS.len())
    }

    fn findings_for(ids: &[&str]) -> NormalizedResponse {
        let findings: IndexMap<ElementId, Vec<Finding>> = ids
            .iter()
            .map(|id| {
                let finding = Finding {
                    id: format!("finding-{id}"),
                    title: "Repudiation".to_string(),
                    status: Status::Open,
                    severity: FindingSeverity::Medium,
                    kind: "Repudiation".to_string(),
                    description: "No audit trail".to_string(),
                    mitigation: "Audit log".to_string(),
                    model_type: ModelType::Stride,
                };
                (id.to_string(), vec![finding])
            })
            .collect();
        findings.into()
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Coverage equals the rounded share of eligible ids present in the response.
    fn check_coverage_formula(
        eligible: &[&str],
        responded: &[&str],
    ) -> Result<(), TestCaseError> {
        let scope = Scope::new(eligible.iter().copied(), IDS);
        let result = reconcile(&scope, &findings_for(responded));

        let coverage = result.stats().coverage_percent;
        if eligible.is_empty() {
            prop_assert_eq!(coverage, 0.0);
        } else {
            let covered = responded.iter().filter(|id| eligible.contains(id)).count();
            let expected = (covered as f64 / eligible.len() as f64 * 100.0 * 10.0).round() / 10.0;
            prop_assert!((coverage - expected).abs() < 1e-9, "{coverage} != {expected}");
            prop_assert!((0.0..=100.0).contains(&coverage));
        }
        Ok(())
    }

    /// Missing and out-of-scope ids partition exactly as set differences.
    fn check_set_differences(eligible: &[&str], responded: &[&str]) -> Result<(), TestCaseError> {
        let scope = Scope::new(eligible.iter().copied(), IDS);
        let result = reconcile(&scope, &findings_for(responded));

        for id in result.missing_element_ids() {
            prop_assert!(eligible.contains(&id.as_str()) && !responded.contains(&id.as_str()));
        }
        for id in result.out_of_scope_response_ids() {
            prop_assert!(responded.contains(&id.as_str()) && !eligible.contains(&id.as_str()));
        }
        let covered = responded.len() - result.out_of_scope_response_ids().len();
        prop_assert_eq!(result.missing_element_ids().len() + covered, eligible.len());
        // every id is known to the universe, so the response is never unrelated
        prop_assert!(result.is_valid());
        Ok(())
    }

    proptest! {
        #[test]
        fn coverage_formula(eligible in ids_strategy(), responded in ids_strategy()) {
            check_coverage_formula(&eligible, &responded)?;
        }

        #[test]
        fn set_differences(eligible in ids_strategy(), responded in ids_strategy()) {
            check_set_differences(&eligible, &responded)?;
        }
    }
}
