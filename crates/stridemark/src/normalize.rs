//! Finding normalization.
//!
//! Turns raw finding objects from a generator into validated [`Finding`]s.
//! A batch is all-or-nothing: the first malformed record rejects every finding
//! of that element, so a partially understood answer is never merged.
//!
//! # Defaults
//!
//! In [`NormalizeMode::Lenient`] the following absent (or `null`) fields are
//! back-filled; in [`NormalizeMode::Strict`] their absence is a
//! [`SchemaViolation`]:
//!
//! | Field       | Default   |
//! |-------------|-----------|
//! | `status`    | `Open`    |
//! | `type`      | `Unknown` |
//! | `modelType` | `STRIDE`  |
//!
//! A missing, `null` or empty `id` is replaced by a fresh UUID in both modes.

use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use stridemark_core::finding::{ElementId, Finding, ModelType, Severity, Status};

use crate::response::RawResponse;

/// Default `type` for findings that do not name a category.
pub const DEFAULT_KIND: &str = "Unknown";

/// How absent defaultable fields are treated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    /// Back-fill `status`, `type` and `modelType` with documented defaults.
    #[default]
    Lenient,
    /// Reject any finding lacking one of those fields.
    Strict,
}

/// A raw finding that violates the finding schema.
///
/// `position` is the 1-based index of the offending finding within its batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("finding {position} is not an object")]
    NotAnObject { position: usize },

    #[error("finding {position} is missing required field `{field}`")]
    MissingField {
        position: usize,
        field: &'static str,
    },

    #[error("finding {position} field `{field}` must be {expected}")]
    InvalidType {
        position: usize,
        field: &'static str,
        expected: &'static str,
    },

    #[error("finding {position} field `{field}`: {reason}")]
    InvalidValue {
        position: usize,
        field: &'static str,
        reason: String,
    },
}

impl SchemaViolation {
    /// The 1-based position of the offending finding.
    pub fn position(&self) -> usize {
        match self {
            Self::NotAnObject { position }
            | Self::MissingField { position, .. }
            | Self::InvalidType { position, .. }
            | Self::InvalidValue { position, .. } => *position,
        }
    }
}

/// Validates one element's raw findings.
///
/// Output order matches input order.
///
/// # Errors
///
/// Returns the first [`SchemaViolation`] found; no findings are returned in
/// that case.
pub fn normalize(
    raw_findings: &[Value],
    mode: NormalizeMode,
) -> Result<Vec<Finding>, SchemaViolation> {
    raw_findings
        .iter()
        .enumerate()
        .map(|(idx, raw)| normalize_one(raw, idx + 1, mode))
        .collect()
}

/// Normalized findings of a whole response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedResponse {
    findings: IndexMap<ElementId, Vec<Finding>>,
    rejected: Vec<(ElementId, SchemaViolation)>,
}

impl NormalizedResponse {
    /// Accepted findings keyed by element id, in response order.
    pub fn findings(&self) -> &IndexMap<ElementId, Vec<Finding>> {
        &self.findings
    }

    /// Elements whose batch was discarded, with the violation that caused it.
    pub fn rejected(&self) -> &[(ElementId, SchemaViolation)] {
        &self.rejected
    }

    /// Every element id named by the response, accepted ones first.
    pub fn all_element_ids(&self) -> impl Iterator<Item = &str> {
        self.findings
            .keys()
            .chain(self.rejected.iter().map(|(id, _)| id))
            .map(String::as_str)
    }

    /// Total number of accepted findings.
    pub fn total_findings(&self) -> usize {
        self.findings.values().map(Vec::len).sum()
    }
}

impl From<IndexMap<ElementId, Vec<Finding>>> for NormalizedResponse {
    fn from(findings: IndexMap<ElementId, Vec<Finding>>) -> Self {
        Self {
            findings,
            rejected: Vec::new(),
        }
    }
}

/// Normalizes every element of a response independently.
///
/// A rejected batch does not affect any other element.
pub fn normalize_response(response: &RawResponse, mode: NormalizeMode) -> NormalizedResponse {
    let mut normalized = NormalizedResponse::default();
    for (element_id, raw_findings) in response.iter() {
        match normalize(raw_findings, mode) {
            Ok(findings) => {
                debug!(element_id, count = findings.len(); "Findings normalized");
                normalized.findings.insert(element_id.to_string(), findings);
            }
            Err(violation) => {
                warn!(element_id, violation:%; "Finding batch discarded");
                normalized.rejected.push((element_id.to_string(), violation));
            }
        }
    }
    normalized
}

// =============================================================================
// Field Extraction
// =============================================================================

fn normalize_one(
    raw: &Value,
    position: usize,
    mode: NormalizeMode,
) -> Result<Finding, SchemaViolation> {
    let Some(object) = raw.as_object() else {
        return Err(SchemaViolation::NotAnObject { position });
    };
    let fields = Fields { object, position };

    let id = match fields.optional_str("id")? {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    };

    let title = fields.required_str("title")?;
    if title.is_empty() {
        return Err(SchemaViolation::InvalidValue {
            position,
            field: "title",
            reason: "must not be empty".to_string(),
        });
    }

    let status = match fields.optional_str("status")? {
        Some(status) => fields.parse("status", status)?,
        None => fields.default_for("status", mode, Status::Open)?,
    };
    let severity: Severity = fields.parse("severity", fields.required_str("severity")?)?;
    let kind = match fields.optional_str("type")? {
        Some(kind) => kind.to_string(),
        None => fields.default_for("type", mode, DEFAULT_KIND.to_string())?,
    };
    let model_type = match fields.optional_str("modelType")? {
        Some(model_type) => fields.parse("modelType", model_type)?,
        None => fields.default_for("modelType", mode, ModelType::Stride)?,
    };

    Ok(Finding {
        id,
        title: title.to_string(),
        status,
        severity,
        kind,
        description: fields.required_str("description")?.to_string(),
        mitigation: fields.required_str("mitigation")?.to_string(),
        model_type,
    })
}

/// Typed field access over one raw finding object.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    position: usize,
}

impl<'a> Fields<'a> {
    /// Returns the string value of `field`; absent and `null` both yield `None`.
    fn optional_str(&self, field: &'static str) -> Result<Option<&'a str>, SchemaViolation> {
        match self.object.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value)),
            Some(_) => Err(SchemaViolation::InvalidType {
                position: self.position,
                field,
                expected: "a string",
            }),
        }
    }

    fn required_str(&self, field: &'static str) -> Result<&'a str, SchemaViolation> {
        self.optional_str(field)?
            .ok_or(SchemaViolation::MissingField {
                position: self.position,
                field,
            })
    }

    fn parse<T>(&self, field: &'static str, value: &str) -> Result<T, SchemaViolation>
    where
        T: std::str::FromStr<Err = String>,
    {
        value.parse().map_err(|reason| SchemaViolation::InvalidValue {
            position: self.position,
            field,
            reason,
        })
    }

    fn default_for<T>(
        &self,
        field: &'static str,
        mode: NormalizeMode,
        default: T,
    ) -> Result<T, SchemaViolation> {
        match mode {
            NormalizeMode::Lenient => Ok(default),
            NormalizeMode::Strict => Err(SchemaViolation::MissingField {
                position: self.position,
                field,
            }),
        }
    }
}
