//! Raw generator responses.
//!
//! Generators answer in one of two wire shapes:
//!
//! ```text
//! (a) { "<elementId>": [ { ...finding... }, ... ], ... }
//! (b) [ { "id": "<elementId>", "threats": [ { ...finding... } ] }, ... ]
//! ```
//!
//! [`RawResponse::from_value`] accepts either and produces one ordered
//! mapping from element id to unvalidated finding objects. Findings are left
//! as JSON; the normalizer decides whether they are acceptable.

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use stridemark_core::finding::ElementId;

/// Structural problems with a response that prevent adapting it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("response must be an object keyed by element id or an array of entries")]
    InvalidShape,

    #[error("findings for element `{element_id}` must be an array")]
    FindingsNotArray { element_id: ElementId },

    #[error("entry {position} must be an object")]
    EntryNotObject { position: usize },

    #[error("entry {position} has no string `id`")]
    EntryMissingId { position: usize },
}

/// One element's raw findings, as returned by a generator.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponseItem {
    pub element_id: ElementId,
    pub findings: Vec<Value>,
}

/// Raw findings keyed by element id, in response order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    items: IndexMap<ElementId, Vec<Value>>,
}

impl RawResponse {
    /// Adapts either wire shape into a [`RawResponse`].
    ///
    /// In the array shape a missing `threats` key counts as no findings, and
    /// repeated ids have their findings appended in order.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError`] if the value has neither shape, or if any
    /// entry's findings are not an array.
    pub fn from_value(value: Value) -> Result<Self, ResponseError> {
        match value {
            Value::Object(map) => {
                let mut response = Self::default();
                for (element_id, findings) in map {
                    let Value::Array(findings) = findings else {
                        return Err(ResponseError::FindingsNotArray { element_id });
                    };
                    response.push(RawResponseItem {
                        element_id,
                        findings,
                    });
                }
                Ok(response)
            }
            Value::Array(entries) => {
                let mut response = Self::default();
                for (idx, entry) in entries.into_iter().enumerate() {
                    response.push(entry_from_value(entry, idx + 1)?);
                }
                Ok(response)
            }
            _ => Err(ResponseError::InvalidShape),
        }
    }

    /// Adds one element's findings, appending to any already present.
    pub fn push(&mut self, item: RawResponseItem) {
        self.items
            .entry(item.element_id)
            .or_default()
            .extend(item.findings);
    }

    /// Iterates over `(element id, raw findings)` in response order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.items
            .iter()
            .map(|(id, findings)| (id.as_str(), findings.as_slice()))
    }

    /// Element ids in response order.
    pub fn element_ids(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Number of elements in the response.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the response names no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<RawResponseItem> for RawResponse {
    fn from_iter<I: IntoIterator<Item = RawResponseItem>>(iter: I) -> Self {
        let mut response = Self::default();
        for item in iter {
            response.push(item);
        }
        response
    }
}

fn entry_from_value(entry: Value, position: usize) -> Result<RawResponseItem, ResponseError> {
    let Value::Object(mut entry) = entry else {
        return Err(ResponseError::EntryNotObject { position });
    };
    let element_id = match entry.remove("id") {
        Some(Value::String(id)) => id,
        _ => return Err(ResponseError::EntryMissingId { position }),
    };
    let findings = match entry.remove("threats") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(findings)) => findings,
        Some(_) => return Err(ResponseError::FindingsNotArray { element_id }),
    };

    Ok(RawResponseItem {
        element_id,
        findings,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_object_shape() {
        let response = RawResponse::from_value(json!({
            "web": [ { "title": "a" }, { "title": "b" } ],
            "db": []
        }))
        .unwrap();

        let items: Vec<_> = response.iter().map(|(id, f)| (id, f.len())).collect();
        assert_eq!(items, [("web", 2), ("db", 0)]);
    }

    #[test]
    fn test_array_shape() {
        let response = RawResponse::from_value(json!([
            { "id": "web", "threats": [ { "title": "a" } ] },
            { "id": "db" }
        ]))
        .unwrap();

        let ids: Vec<_> = response.element_ids().collect();
        assert_eq!(ids, ["web", "db"]);
        assert_eq!(response.len(), 2);
    }

    #[test]
    fn test_array_shape_merges_repeated_ids() {
        let response = RawResponse::from_value(json!([
            { "id": "web", "threats": [ { "title": "a" } ] },
            { "id": "web", "threats": [ { "title": "b" } ] }
        ]))
        .unwrap();

        let (_, findings) = response.iter().next().unwrap();
        assert_eq!(findings, [json!({ "title": "a" }), json!({ "title": "b" })]);
    }

    #[test]
    fn test_rejects_scalar() {
        assert_eq!(
            RawResponse::from_value(json!("nope")).unwrap_err(),
            ResponseError::InvalidShape
        );
    }

    #[test]
    fn test_rejects_non_array_findings() {
        let err = RawResponse::from_value(json!({ "web": { "title": "a" } })).unwrap_err();
        assert_eq!(err.to_string(), "findings for element `web` must be an array");
    }

    #[test]
    fn test_rejects_entry_without_id() {
        let err = RawResponse::from_value(json!([ { "threats": [] } ])).unwrap_err();
        assert_eq!(err, ResponseError::EntryMissingId { position: 1 });
    }

    #[test]
    fn test_empty_response() {
        assert!(RawResponse::from_value(json!({})).unwrap().is_empty());
        assert!(RawResponse::from_value(json!([])).unwrap().is_empty());
    }
}
