//! Finding (threat) records and their enumerated attributes.
//!
//! # Overview
//!
//! Exported types:
//! - [`Finding`]: A single security-risk record attached to one diagram element.
//! - [`Status`]: Lifecycle state of a finding (`NA`, `Open`, `Mitigated`).
//! - [`Severity`]: Risk rating of a finding (`High`, `Medium`, `Low`).
//! - [`ModelType`]: The threat taxonomy a finding belongs to (`STRIDE`, `LINDDUN`, ...).
//!
//! All enums parse from and serialize to the exact spelling used in Threat
//! Dragon documents. Parsing is case-sensitive.

use std::{fmt, str::FromStr};

use serde::Serialize;

/// Identifier of a diagram element (a cell `id`).
pub type ElementId = String;

// =============================================================================
// Type Definitions
// =============================================================================

/// Lifecycle state of a finding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    /// Not applicable to this element.
    #[serde(rename = "NA")]
    NotApplicable,
    /// Unresolved finding (default for freshly generated findings).
    #[default]
    Open,
    /// A mitigation is in place.
    Mitigated,
}

/// Risk rating of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// Threat categorization taxonomy.
///
/// The core treats these as opaque tags; it never interprets `type` against
/// the taxonomy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModelType {
    #[default]
    #[serde(rename = "STRIDE")]
    Stride,
    #[serde(rename = "LINDDUN")]
    Linddun,
    #[serde(rename = "CIA")]
    Cia,
    #[serde(rename = "DIEF")]
    Dief,
    #[serde(rename = "RANSOM")]
    Ransom,
    #[serde(rename = "PLOT4ai")]
    Plot4ai,
    Generic,
}

/// A validated finding, ready to be attached to a diagram element.
///
/// Findings are created by the normalizer and never mutated after they are
/// merged. The serialized form is what the merger writes into `data.threats`;
/// field order here is the order written to the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Opaque, globally unique identifier.
    pub id: String,
    /// Short human-readable name, never empty.
    pub title: String,
    pub status: Status,
    pub severity: Severity,
    /// Free-form category name, e.g. a STRIDE category such as `Spoofing`.
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    /// Suggested countermeasure. Blank values are a quality defect only.
    pub mitigation: String,
    #[serde(rename = "modelType")]
    pub model_type: ModelType,
}

impl Finding {
    /// Returns `true` if this finding is still open.
    pub fn is_open(&self) -> bool {
        self.status == Status::Open
    }

    /// Returns `true` if the mitigation text is empty or whitespace only.
    pub fn has_blank_mitigation(&self) -> bool {
        self.mitigation.trim().is_empty()
    }
}

// =============================================================================
// String Conversions
// =============================================================================

impl Status {
    /// All accepted spellings, in documentation order.
    pub const VARIANTS: &'static [&'static str] = &["NA", "Open", "Mitigated"];

    /// Returns the document spelling of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotApplicable => "NA",
            Self::Open => "Open",
            Self::Mitigated => "Mitigated",
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NA" => Ok(Self::NotApplicable),
            "Open" => Ok(Self::Open),
            "Mitigated" => Ok(Self::Mitigated),
            _ => Err(format!(
                "invalid status `{s}`, valid values: {}",
                Self::VARIANTS.join(", ")
            )),
        }
    }
}

impl Severity {
    /// All accepted spellings, in documentation order.
    pub const VARIANTS: &'static [&'static str] = &["High", "Medium", "Low"];

    /// Returns the document spelling of this severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Self::High),
            "Medium" => Ok(Self::Medium),
            "Low" => Ok(Self::Low),
            _ => Err(format!(
                "invalid severity `{s}`, valid values: {}",
                Self::VARIANTS.join(", ")
            )),
        }
    }
}

impl ModelType {
    /// All accepted spellings, in documentation order.
    pub const VARIANTS: &'static [&'static str] = &[
        "STRIDE", "LINDDUN", "CIA", "DIEF", "RANSOM", "PLOT4ai", "Generic",
    ];

    /// Returns the document spelling of this model type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stride => "STRIDE",
            Self::Linddun => "LINDDUN",
            Self::Cia => "CIA",
            Self::Dief => "DIEF",
            Self::Ransom => "RANSOM",
            Self::Plot4ai => "PLOT4ai",
            Self::Generic => "Generic",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STRIDE" => Ok(Self::Stride),
            "LINDDUN" => Ok(Self::Linddun),
            "CIA" => Ok(Self::Cia),
            "DIEF" => Ok(Self::Dief),
            "RANSOM" => Ok(Self::Ransom),
            "PLOT4ai" => Ok(Self::Plot4ai),
            "Generic" => Ok(Self::Generic),
            _ => Err(format!(
                "invalid model type `{s}`, valid values: {}",
                Self::VARIANTS.join(", ")
            )),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Finding {
        Finding {
            id: "f-1".to_string(),
            title: "Spoofed client".to_string(),
            status: Status::Open,
            severity: Severity::High,
            kind: "Spoofing".to_string(),
            description: "A client may impersonate another".to_string(),
            mitigation: "Use mutual TLS".to_string(),
            model_type: ModelType::Stride,
        }
    }

    #[test]
    fn test_status_parse_all_variants() {
        for name in Status::VARIANTS {
            let status: Status = name.parse().unwrap();
            assert_eq!(status.as_str(), *name);
        }
    }

    #[test]
    fn test_status_parse_is_case_sensitive() {
        assert!("open".parse::<Status>().is_err());
        assert!("na".parse::<Status>().is_err());
    }

    #[test]
    fn test_severity_parse_error_lists_variants() {
        let err = "Critical".parse::<Severity>().unwrap_err();
        assert_eq!(
            err,
            "invalid severity `Critical`, valid values: High, Medium, Low"
        );
    }

    #[test]
    fn test_model_type_parse_all_variants() {
        for name in ModelType::VARIANTS {
            let model_type: ModelType = name.parse().unwrap();
            assert_eq!(model_type.to_string(), *name);
        }
        assert!("plot4ai".parse::<ModelType>().is_err());
    }

    #[test]
    fn test_finding_serializes_with_document_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "f-1",
                "title": "Spoofed client",
                "status": "Open",
                "severity": "High",
                "type": "Spoofing",
                "description": "A client may impersonate another",
                "mitigation": "Use mutual TLS",
                "modelType": "STRIDE",
            })
        );
    }

    #[test]
    fn test_status_na_serializes_as_na() {
        let value = serde_json::to_value(Status::NotApplicable).unwrap();
        assert_eq!(value, json!("NA"));
    }

    #[test]
    fn test_blank_mitigation() {
        let mut finding = sample();
        assert!(!finding.has_blank_mitigation());

        finding.mitigation = "   \t".to_string();
        assert!(finding.has_blank_mitigation());
    }

    #[test]
    fn test_is_open() {
        let mut finding = sample();
        assert!(finding.is_open());

        finding.status = Status::Mitigated;
        assert!(!finding.is_open());
    }
}
