//! Scope extraction.
//!
//! Determines which cells of a [`ThreatModel`] may carry findings (the
//! *eligible* set) and which cell ids exist at all (the *universe*). Both sets
//! keep document order so downstream reports are deterministic.

use indexmap::IndexSet;
use log::debug;
use serde_json::Value;

use stridemark_core::{document::ThreatModel, finding::ElementId};

/// Eligible and universe id sets of one threat model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    eligible: IndexSet<ElementId>,
    universe: IndexSet<ElementId>,
}

impl Scope {
    /// Creates a scope from explicit sets.
    ///
    /// Eligible ids missing from `universe` are added to it, so the eligible
    /// set is always a subset of the universe.
    pub fn new(
        eligible: impl IntoIterator<Item = impl Into<ElementId>>,
        universe: impl IntoIterator<Item = impl Into<ElementId>>,
    ) -> Self {
        let eligible: IndexSet<ElementId> = eligible.into_iter().map(Into::into).collect();
        let mut universe: IndexSet<ElementId> = universe.into_iter().map(Into::into).collect();
        universe.extend(eligible.iter().cloned());
        Self { eligible, universe }
    }

    /// Extracts both sets from a model in a single pass.
    pub fn extract(model: &ThreatModel) -> Self {
        let mut scope = Self::default();
        for cell in model.cells() {
            let Some(id) = cell.id() else {
                continue;
            };
            if cell.is_in_scope() {
                scope.eligible.insert(id.to_string());
            }
            scope.universe.insert(id.to_string());
        }

        debug!(
            eligible = scope.eligible.len(),
            universe = scope.universe.len();
            "Scope extracted"
        );
        scope
    }

    /// Ids of cells that may carry findings.
    pub fn eligible(&self) -> &IndexSet<ElementId> {
        &self.eligible
    }

    /// Ids of every cell in the model.
    pub fn universe(&self) -> &IndexSet<ElementId> {
        &self.universe
    }

    /// Returns `true` if findings may be attached to `id`.
    pub fn is_eligible(&self, id: &str) -> bool {
        self.eligible.contains(id)
    }

    /// Returns `true` if `id` names any cell of the model.
    pub fn contains(&self, id: &str) -> bool {
        self.universe.contains(id)
    }
}

/// Ids of cells eligible for findings, in document order.
pub fn extract_eligible(model: &ThreatModel) -> IndexSet<ElementId> {
    Scope::extract(model).eligible
}

/// Ids of every cell with a non-empty id, in document order.
pub fn extract_universe(model: &ThreatModel) -> IndexSet<ElementId> {
    Scope::extract(model).universe
}

/// Returns a copy of the model's JSON with out-of-scope cells removed.
///
/// This is the view handed to a finding generator. Trust boundaries are kept
/// because they give the generator context about where data crosses zones.
pub fn scoped_view(model: &ThreatModel) -> Value {
    let mut view = model.as_value().clone();
    let diagrams = view
        .get_mut("detail")
        .and_then(|detail| detail.get_mut("diagrams"))
        .and_then(Value::as_array_mut);

    for diagram in diagrams.into_iter().flatten() {
        if let Some(cells) = diagram.get_mut("cells").and_then(Value::as_array_mut) {
            cells.retain(|cell| {
                cell.get("data")
                    .and_then(|data| data.get("outOfScope"))
                    .and_then(Value::as_bool)
                    != Some(true)
            });
        }
    }

    view
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    const SHAPES: [&str; 5] = [
        "process",
        "store",
        "flow",
        "trust-boundary-box",
        "trust-boundary-curve",
    ];

    // ===================
    // Strategies
    // ===================

    fn cell_strategy() -> impl Strategy<Value = Value> {
        (
            proptest::option::of("[a-z]{2,4}"),
            proptest::sample::select(SHAPES.to_vec()),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(id, shape, out_of_scope)| {
                let mut cell = json!({ "shape": shape });
                if let Some(id) = id {
                    cell["id"] = json!(id);
                }
                if let Some(flag) = out_of_scope {
                    cell["data"] = json!({ "outOfScope": flag });
                }
                cell
            })
    }

    fn model_strategy() -> impl Strategy<Value = ThreatModel> {
        proptest::collection::vec(proptest::collection::vec(cell_strategy(), 0..8), 0..3)
            .prop_map(|diagrams| {
                let diagrams: Vec<_> = diagrams
                    .into_iter()
                    .map(|cells| json!({ "cells": cells }))
                    .collect();
                ThreatModel::from_value(json!({ "detail": { "diagrams": diagrams } }))
                    .expect("generated model is well-formed")
            })
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Every eligible id is part of the universe.
    fn check_eligible_subset_of_universe(model: &ThreatModel) -> Result<(), TestCaseError> {
        let universe = extract_universe(model);
        for id in extract_eligible(model) {
            prop_assert!(universe.contains(&id), "eligible id `{id}` missing from universe");
        }
        Ok(())
    }

    /// A cell whose only appearance is a trust boundary is never eligible.
    fn check_trust_boundaries_excluded(model: &ThreatModel) -> Result<(), TestCaseError> {
        let eligible = extract_eligible(model);
        for cell in model.cells().filter(|cell| cell.is_trust_boundary()) {
            let Some(id) = cell.id() else { continue };
            let eligible_elsewhere = model
                .cells()
                .any(|other| other.id() == Some(id) && other.is_in_scope());
            prop_assert_eq!(eligible.contains(id), eligible_elsewhere);
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn eligible_subset_of_universe(model in model_strategy()) {
            check_eligible_subset_of_universe(&model)?;
        }

        #[test]
        fn trust_boundaries_excluded(model in model_strategy()) {
            check_trust_boundaries_excluded(&model)?;
        }
    }
}
