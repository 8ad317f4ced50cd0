//! Merging accepted findings into the model document.
//!
//! For every in-scope cell named in the findings map, the cell's
//! `data.threats` is replaced (never unioned) with the new findings,
//! `data.hasOpenThreats` is recomputed when the key already exists, and the
//! has-findings stroke marker is applied. Out-of-scope and trust-boundary
//! cells are skipped even when the response names them.
//!
//! Re-running a merge with the same findings yields the same document.

use indexmap::IndexMap;
use log::{debug, info};

use stridemark_core::{
    document::ThreatModel,
    finding::{ElementId, Finding},
};

/// Merges `findings` into `model` and returns the number of cells updated.
///
/// # Errors
///
/// Returns the serializer error if a finding cannot be written as JSON.
pub fn merge(
    model: &mut ThreatModel,
    findings: &IndexMap<ElementId, Vec<Finding>>,
    marker_color: &str,
) -> Result<usize, serde_json::Error> {
    let mut updated = 0;

    for mut cell in model.cells_mut() {
        let view = cell.as_cell();
        let Some(element_findings) = view.id().and_then(|id| findings.get(id)) else {
            continue;
        };
        if !view.is_in_scope() {
            debug!(
                element_id = view.id().unwrap_or_default();
                "Skipping ineligible cell named by response"
            );
            continue;
        }

        cell.replace_findings(element_findings)?;
        cell.apply_marker(marker_color);
        updated += 1;
    }

    info!(updated_cells = updated; "Findings merged");
    Ok(updated)
}
