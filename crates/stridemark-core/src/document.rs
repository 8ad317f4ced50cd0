//! Threat model document access.
//!
//! A Threat Dragon document is kept as an order-preserving JSON tree so that
//! every field the engine does not understand (geometry, rendering attributes,
//! free-form metadata) survives a load/save round trip byte-for-byte in key
//! order. The engine only reads and writes the handful of cell fields that
//! matter for scope and finding attachment, through the [`Cell`] and
//! [`CellMut`] views.
//!
//! # Example
//!
//! ```
//! # use stridemark_core::document::ThreatModel;
//! let value = serde_json::json!({
//!     "version": "2.2.0",
//!     "summary": { "title": "Demo" },
//!     "detail": { "diagrams": [ { "cells": [
//!         { "id": "web-app", "shape": "process", "data": { "name": "Web" } }
//!     ] } ] }
//! });
//!
//! let model = ThreatModel::from_value(value).unwrap();
//! assert_eq!(model.cells().count(), 1);
//! assert!(model.cells().all(|cell| cell.is_in_scope()));
//! ```

use log::trace;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    finding::Finding,
    stroke::{self, StrokeTarget},
};

/// Shape tags of structural grouping elements that never carry findings.
pub const TRUST_BOUNDARY_SHAPES: [&str; 2] = ["trust-boundary-box", "trust-boundary-curve"];

/// Structural problems found while wrapping a JSON value as a [`ThreatModel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("threat model root must be a JSON object")]
    NotAnObject,

    #[error("`{path}` must be {expected}")]
    InvalidField {
        path: String,
        expected: &'static str,
    },
}

/// A loaded threat model document.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreatModel {
    root: Value,
}

impl ThreatModel {
    /// Wraps a parsed JSON value, checking the structure the engine walks.
    ///
    /// A missing `detail` or `detail.diagrams` is accepted and yields a model
    /// without cells. Present-but-mistyped containers are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the root is not an object, if
    /// `detail.diagrams` or any diagram's `cells` is not an array, or if a
    /// cell is not an object.
    pub fn from_value(root: Value) -> Result<Self, DocumentError> {
        let Some(object) = root.as_object() else {
            return Err(DocumentError::NotAnObject);
        };

        if let Some(detail) = object.get("detail") {
            let detail = detail.as_object().ok_or(DocumentError::InvalidField {
                path: "detail".to_string(),
                expected: "an object",
            })?;
            if let Some(diagrams) = detail.get("diagrams") {
                check_diagrams(diagrams)?;
            }
        }

        Ok(Self { root })
    }

    /// Returns the underlying JSON tree.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Consumes the model and returns the underlying JSON tree.
    pub fn into_value(self) -> Value {
        self.root
    }

    /// Returns the document `version` string, if present.
    pub fn version(&self) -> Option<&str> {
        self.root.get("version").and_then(Value::as_str)
    }

    /// Returns `summary.title`, if present.
    pub fn title(&self) -> Option<&str> {
        self.root
            .get("summary")
            .and_then(|summary| summary.get("title"))
            .and_then(Value::as_str)
    }

    /// Returns the number of diagrams in the document.
    pub fn diagram_count(&self) -> usize {
        self.root
            .get("detail")
            .and_then(|detail| detail.get("diagrams"))
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Iterates over every cell of every diagram in document order.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'_>> {
        self.root
            .get("detail")
            .and_then(|detail| detail.get("diagrams"))
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|diagram| diagram.get("cells").and_then(Value::as_array))
            .flatten()
            .filter_map(Value::as_object)
            .map(Cell::new)
    }

    /// Iterates mutably over every cell of every diagram in document order.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = CellMut<'_>> {
        self.root
            .get_mut("detail")
            .and_then(|detail| detail.get_mut("diagrams"))
            .and_then(Value::as_array_mut)
            .into_iter()
            .flatten()
            .filter_map(|diagram| diagram.get_mut("cells").and_then(Value::as_array_mut))
            .flatten()
            .filter_map(Value::as_object_mut)
            .map(CellMut::new)
    }

    /// Serializes the document with 2-space indentation and `": "` separators.
    ///
    /// Key order is the order read from the source document.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the tree contains a value that cannot
    /// be written as JSON.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.root)
    }
}

impl TryFrom<Value> for ThreatModel {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn check_diagrams(diagrams: &Value) -> Result<(), DocumentError> {
    let diagrams = diagrams.as_array().ok_or(DocumentError::InvalidField {
        path: "detail.diagrams".to_string(),
        expected: "an array",
    })?;

    for (diagram_idx, diagram) in diagrams.iter().enumerate() {
        let Some(cells) = diagram.get("cells") else {
            continue;
        };
        let cells = cells.as_array().ok_or_else(|| DocumentError::InvalidField {
            path: format!("detail.diagrams[{diagram_idx}].cells"),
            expected: "an array",
        })?;
        if let Some(cell_idx) = cells.iter().position(|cell| !cell.is_object()) {
            return Err(DocumentError::InvalidField {
                path: format!("detail.diagrams[{diagram_idx}].cells[{cell_idx}]"),
                expected: "an object",
            });
        }
    }

    Ok(())
}

// =============================================================================
// Cell Views
// =============================================================================

/// Read-only view of a diagram cell.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    object: &'a Map<String, Value>,
}

impl<'a> Cell<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        Self { object }
    }

    /// Returns the cell id, or `None` if it is absent, empty, or not a string.
    pub fn id(&self) -> Option<&'a str> {
        self.object
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Returns the shape tag, or the empty string if absent.
    pub fn shape(&self) -> &'a str {
        self.object
            .get("shape")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Returns the `data` block, if present and an object.
    pub fn data(&self) -> Option<&'a Map<String, Value>> {
        self.object.get("data").and_then(Value::as_object)
    }

    /// Returns `data.name`, if present.
    pub fn name(&self) -> Option<&'a str> {
        self.data()
            .and_then(|data| data.get("name"))
            .and_then(Value::as_str)
    }

    /// Returns `true` if `data.outOfScope` is exactly `true`.
    pub fn is_out_of_scope(&self) -> bool {
        self.data()
            .and_then(|data| data.get("outOfScope"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns `true` if the shape is one of [`TRUST_BOUNDARY_SHAPES`].
    pub fn is_trust_boundary(&self) -> bool {
        TRUST_BOUNDARY_SHAPES.contains(&self.shape())
    }

    /// Returns `true` if findings may be attached to this cell.
    pub fn is_in_scope(&self) -> bool {
        !self.is_out_of_scope() && !self.is_trust_boundary()
    }

    /// Returns `data.hasOpenThreats` if the key holds a boolean.
    pub fn has_open_threats(&self) -> Option<bool> {
        self.data()
            .and_then(|data| data.get("hasOpenThreats"))
            .and_then(Value::as_bool)
    }

    /// Returns the number of entries in `data.threats`.
    pub fn threat_count(&self) -> usize {
        self.data()
            .and_then(|data| data.get("threats"))
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Returns the raw `attrs` block, if present and an object.
    pub fn attrs(&self) -> Option<&'a Map<String, Value>> {
        self.object.get("attrs").and_then(Value::as_object)
    }
}

/// Mutable view of a diagram cell.
#[derive(Debug)]
pub struct CellMut<'a> {
    object: &'a mut Map<String, Value>,
}

impl<'a> CellMut<'a> {
    fn new(object: &'a mut Map<String, Value>) -> Self {
        Self { object }
    }

    /// Returns a read-only view of this cell.
    pub fn as_cell(&self) -> Cell<'_> {
        Cell::new(self.object)
    }

    /// Returns the `data` block, creating an empty one if it is absent or
    /// not an object.
    pub fn data_mut(&mut self) -> &mut Map<String, Value> {
        let data = self
            .object
            .entry("data")
            .or_insert_with(|| Value::Object(Map::new()));
        if !data.is_object() {
            *data = Value::Object(Map::new());
        }
        match data {
            Value::Object(map) => map,
            _ => unreachable!("data was just replaced with an object"),
        }
    }

    /// Replaces `data.threats` with `findings` and refreshes
    /// `data.hasOpenThreats` when that key already exists.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if a finding cannot be converted to JSON;
    /// the cell is left unchanged in that case.
    pub fn replace_findings(&mut self, findings: &[Finding]) -> Result<(), serde_json::Error> {
        let threats = serde_json::to_value(findings)?;
        let data = self.data_mut();
        data.insert("threats".to_string(), threats);

        if let Some(flag) = data.get_mut("hasOpenThreats") {
            *flag = Value::Bool(findings.iter().any(Finding::is_open));
        }
        Ok(())
    }

    /// Applies the has-findings stroke marker and returns the attribute path
    /// that received it.
    pub fn apply_marker(&mut self, color: &str) -> StrokeTarget {
        let target = stroke::apply_marker(self.object, color);
        trace!(path = target.path(), color; "Stroke marker applied");
        target
    }
}
