//! Has-findings stroke marker.
//!
//! Threat Dragon shapes keep their stroke color at different places inside
//! `attrs`, depending on the shape family:
//!
//! | Shape family      | Stroke path                                  |
//! |-------------------|----------------------------------------------|
//! | data flows        | `attrs.line.stroke`                          |
//! | processes, actors | `attrs.body.stroke`                          |
//! | data stores       | `attrs.topLine.stroke`, `attrs.bottomLine.stroke` |
//! | anything else     | `attrs.stroke`                               |
//!
//! [`select_target`] walks [`PREFERENCE`] in order and picks the first target
//! whose anchor exists; [`apply_marker`] then writes the color there. Exactly
//! one target is written per cell.

use serde_json::{Map, Value};

/// Location inside `attrs` that receives the marker color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeTarget {
    /// `attrs.line.stroke`
    Line,
    /// `attrs.body.stroke`
    Body,
    /// `attrs.topLine.stroke`, plus `attrs.bottomLine.stroke` when present
    TopLine,
    /// `attrs.stroke`
    Root,
}

/// Nested targets in the order they are tried. [`StrokeTarget::Root`] is the
/// fallback when none match.
pub const PREFERENCE: [StrokeTarget; 3] =
    [StrokeTarget::Line, StrokeTarget::Body, StrokeTarget::TopLine];

impl StrokeTarget {
    /// Returns the `attrs` key this target is anchored on, if nested.
    pub fn anchor(&self) -> Option<&'static str> {
        match self {
            Self::Line => Some("line"),
            Self::Body => Some("body"),
            Self::TopLine => Some("topLine"),
            Self::Root => None,
        }
    }

    /// Returns a secondary `attrs` key that is written alongside the anchor.
    pub fn companion(&self) -> Option<&'static str> {
        match self {
            Self::TopLine => Some("bottomLine"),
            _ => None,
        }
    }

    /// Returns a dotted path for logs.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Line => "attrs.line.stroke",
            Self::Body => "attrs.body.stroke",
            Self::TopLine => "attrs.topLine.stroke",
            Self::Root => "attrs.stroke",
        }
    }

    fn matches(&self, attrs: &Map<String, Value>) -> bool {
        self.anchor()
            .is_some_and(|anchor| attrs.get(anchor).is_some_and(Value::is_object))
    }
}

/// Picks the stroke target for an `attrs` block.
pub fn select_target(attrs: &Map<String, Value>) -> StrokeTarget {
    PREFERENCE
        .into_iter()
        .find(|target| target.matches(attrs))
        .unwrap_or(StrokeTarget::Root)
}

/// Writes `color` to the stroke target of a cell object.
///
/// If the cell has no `attrs` object, one is created holding only `stroke`.
pub fn apply_marker(cell: &mut Map<String, Value>, color: &str) -> StrokeTarget {
    if !cell.get("attrs").is_some_and(Value::is_object) {
        let mut attrs = Map::new();
        attrs.insert("stroke".to_string(), Value::from(color));
        cell.insert("attrs".to_string(), Value::Object(attrs));
        return StrokeTarget::Root;
    }
    let Some(Value::Object(attrs)) = cell.get_mut("attrs") else {
        return StrokeTarget::Root;
    };

    let target = select_target(attrs);
    let keys = [target.anchor(), target.companion()];
    if target == StrokeTarget::Root {
        attrs.insert("stroke".to_string(), Value::from(color));
    } else {
        for key in keys.into_iter().flatten() {
            if let Some(Value::Object(nested)) = attrs.get_mut(key) {
                nested.insert("stroke".to_string(), Value::from(color));
            }
        }
    }

    target
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_line_wins_over_body() {
        let mut cell = object(json!({
            "attrs": { "body": { "stroke": "black" }, "line": { "stroke": "black" } }
        }));

        assert_eq!(apply_marker(&mut cell, "red"), StrokeTarget::Line);
        assert_eq!(
            cell["attrs"],
            json!({ "body": { "stroke": "black" }, "line": { "stroke": "red" } })
        );
    }

    #[test]
    fn test_body_target() {
        let mut cell = object(json!({ "attrs": { "body": { "fill": "white" } } }));

        assert_eq!(apply_marker(&mut cell, "red"), StrokeTarget::Body);
        assert_eq!(cell["attrs"]["body"], json!({ "fill": "white", "stroke": "red" }));
    }

    #[test]
    fn test_top_and_bottom_lines_both_updated() {
        let mut cell = object(json!({
            "attrs": { "topLine": { "stroke": "black" }, "bottomLine": { "stroke": "black" } }
        }));

        assert_eq!(apply_marker(&mut cell, "red"), StrokeTarget::TopLine);
        assert_eq!(cell["attrs"]["topLine"]["stroke"], "red");
        assert_eq!(cell["attrs"]["bottomLine"]["stroke"], "red");
        assert!(cell["attrs"].get("stroke").is_none());
    }

    #[test]
    fn test_top_line_without_bottom_line() {
        let mut cell = object(json!({ "attrs": { "topLine": {} } }));

        assert_eq!(apply_marker(&mut cell, "red"), StrokeTarget::TopLine);
        assert_eq!(cell["attrs"], json!({ "topLine": { "stroke": "red" } }));
    }

    #[test]
    fn test_bottom_line_alone_falls_back_to_root() {
        let mut cell = object(json!({ "attrs": { "bottomLine": { "stroke": "black" } } }));

        assert_eq!(apply_marker(&mut cell, "red"), StrokeTarget::Root);
        assert_eq!(cell["attrs"]["stroke"], "red");
        assert_eq!(cell["attrs"]["bottomLine"]["stroke"], "black");
    }

    #[test]
    fn test_missing_attrs_created() {
        let mut cell = object(json!({ "id": "c1" }));

        assert_eq!(apply_marker(&mut cell, "red"), StrokeTarget::Root);
        assert_eq!(cell["attrs"], json!({ "stroke": "red" }));
    }

    #[test]
    fn test_non_object_anchor_is_skipped() {
        let mut cell = object(json!({ "attrs": { "line": "solid", "body": {} } }));

        assert_eq!(apply_marker(&mut cell, "red"), StrokeTarget::Body);
        assert_eq!(cell["attrs"]["line"], "solid");
    }

    #[test]
    fn test_marker_is_idempotent() {
        let mut once = object(json!({ "attrs": { "text": { "text": "db" } } }));
        apply_marker(&mut once, "red");
        let mut twice = once.clone();
        apply_marker(&mut twice, "red");

        assert_eq!(once, twice);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    const KEYS: [&str; 5] = ["line", "body", "topLine", "bottomLine", "text"];

    // ===================
    // Strategies
    // ===================

    fn attrs_strategy() -> impl Strategy<Value = Map<String, Value>> {
        proptest::sample::subsequence(KEYS.to_vec(), 0..=KEYS.len()).prop_map(|keys| {
            keys.into_iter()
                .map(|key| (key.to_string(), Value::Object(Map::new())))
                .collect()
        })
    }

    // ===================
    // Property Test Functions
    // ===================

    /// The selected target is the first anchor of the preference list present in `attrs`.
    fn check_first_match_wins(attrs: Map<String, Value>) -> Result<(), TestCaseError> {
        let expected = PREFERENCE
            .into_iter()
            .find(|target| target.anchor().is_some_and(|anchor| attrs.contains_key(anchor)))
            .unwrap_or(StrokeTarget::Root);

        prop_assert_eq!(select_target(&attrs), expected);
        Ok(())
    }

    /// Only the keys of the selected target change; everything else is untouched.
    fn check_only_target_written(attrs: Map<String, Value>) -> Result<(), TestCaseError> {
        let mut cell = Map::new();
        cell.insert("attrs".to_string(), Value::Object(attrs.clone()));

        let target = apply_marker(&mut cell, "red");
        let written: Vec<&str> = [target.anchor(), target.companion()]
            .into_iter()
            .flatten()
            .collect();

        let Some(Value::Object(after)) = cell.get("attrs") else {
            return Err(TestCaseError::fail("attrs missing after marker"));
        };
        for (key, before) in &attrs {
            if written.contains(&key.as_str()) {
                prop_assert_eq!(&after[key]["stroke"], &Value::from("red"));
            } else {
                prop_assert_eq!(&after[key], before);
            }
        }
        prop_assert_eq!(after.contains_key("stroke"), target == StrokeTarget::Root);
        Ok(())
    }

    proptest! {
        #[test]
        fn first_match_wins(attrs in attrs_strategy()) {
            check_first_match_wins(attrs)?;
        }

        #[test]
        fn only_target_written(attrs in attrs_strategy()) {
            check_only_target_written(attrs)?;
        }
    }
}
