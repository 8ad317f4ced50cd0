//! Stridemark - Threat model validation and reconciliation.
//!
//! Reconciles generated security findings with a Threat Dragon style threat
//! model: determines which elements may carry findings, validates and
//! normalizes generated findings, reports coverage gaps and mismatches, and
//! merges accepted findings back into the document.

pub mod config;
pub mod diagnostic;
pub mod generate;
pub mod merge;
pub mod normalize;
pub mod reconcile;
pub mod report;
pub mod response;
pub mod scope;

mod error;

pub use stridemark_core::{document, finding, stroke};

pub use error::StridemarkError;

use log::{debug, info, trace};

use stridemark_core::document::ThreatModel;

use config::AppConfig;
use generate::{FindingGenerator, GenerationRequest};
use reconcile::ValidationResult;
use response::RawResponse;
use scope::Scope;

/// Outcome of annotating a model with one response.
#[derive(Debug, Clone)]
pub struct Annotation {
    result: ValidationResult,
    updated_cells: usize,
}

impl Annotation {
    /// The reconciliation result.
    pub fn result(&self) -> &ValidationResult {
        &self.result
    }

    /// Number of cells whose findings were replaced.
    pub fn updated_cells(&self) -> usize {
        self.updated_cells
    }

    /// Consumes the annotation and returns the reconciliation result.
    pub fn into_result(self) -> ValidationResult {
        self.result
    }
}

/// Pipeline for validating and merging findings into threat models.
///
/// # Examples
///
/// ```rust
/// use stridemark::{Annotator, config::AppConfig};
///
/// let annotator = Annotator::new(AppConfig::default());
///
/// let mut model = annotator
///     .parse_model(r#"{"detail": {"diagrams": [{"cells": [
///         {"id": "web", "shape": "process", "attrs": {"body": {}}}
///     ]}]}}"#)
///     .expect("Failed to parse model");
/// let response = annotator
///     .parse_response(r#"{"web": [{"title": "Spoofing", "severity": "High",
///         "description": "d", "mitigation": "m"}]}"#)
///     .expect("Failed to parse response");
///
/// let annotation = annotator
///     .annotate(&mut model, &response)
///     .expect("Failed to annotate model");
/// assert!(annotation.result().is_valid());
/// assert_eq!(annotation.updated_cells(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Annotator {
    config: AppConfig,
}

impl Annotator {
    /// Create a new annotator with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this annotator runs with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse threat model JSON text.
    ///
    /// # Errors
    ///
    /// Returns `StridemarkError::Parse` for invalid JSON and
    /// `StridemarkError::Document` for a structurally invalid model.
    pub fn parse_model(&self, source: &str) -> Result<ThreatModel, StridemarkError> {
        info!("Parsing threat model");

        let value = serde_json::from_str(source)
            .map_err(|err| StridemarkError::new_parse_error(err, source, "threat model"))?;
        let model = ThreatModel::from_value(value)?;

        debug!(
            title = model.title().unwrap_or_default(),
            diagrams = model.diagram_count();
            "Threat model parsed"
        );
        Ok(model)
    }

    /// Parse generator response JSON text in either supported shape.
    ///
    /// # Errors
    ///
    /// Returns `StridemarkError::Parse` for invalid JSON and
    /// `StridemarkError::Response` for an unsupported shape.
    pub fn parse_response(&self, source: &str) -> Result<RawResponse, StridemarkError> {
        info!("Parsing response");

        let value = serde_json::from_str(source)
            .map_err(|err| StridemarkError::new_parse_error(err, source, "response"))?;
        let response = RawResponse::from_value(value)?;

        debug!(elements = response.len(); "Response parsed");
        Ok(response)
    }

    /// Build the request a generator receives for `model`.
    ///
    /// Out-of-scope cells are removed from the document view.
    pub fn request(&self, model: &ThreatModel, model_name: &str) -> GenerationRequest {
        GenerationRequest::new(scope::scoped_view(model), model_name)
    }

    /// Validate `response` against `model` and merge accepted findings.
    ///
    /// Findings are merged even when the result is invalid; with no shared
    /// ids there is nothing to merge.
    ///
    /// # Errors
    ///
    /// Returns `StridemarkError::Serialize` if a finding cannot be written
    /// into the document.
    pub fn annotate(
        &self,
        model: &mut ThreatModel,
        response: &RawResponse,
    ) -> Result<Annotation, StridemarkError> {
        let scope = Scope::extract(model);
        let normalized = normalize::normalize_response(response, self.config.normalize().mode());
        trace!(normalized:?; "Normalized response");

        let result = reconcile::reconcile(&scope, &normalized);
        let updated_cells =
            merge::merge(model, normalized.findings(), self.config.marker().color())
                .map_err(StridemarkError::Serialize)?;

        info!(
            valid = result.is_valid(),
            updated_cells,
            coverage = result.stats().coverage_percent;
            "Annotation complete"
        );
        Ok(Annotation {
            result,
            updated_cells,
        })
    }

    /// Ask `generator` for findings and annotate `model` with them.
    ///
    /// # Errors
    ///
    /// Returns whatever error the generator reports, or
    /// `StridemarkError::Serialize` if merging fails.
    pub fn generate_and_annotate(
        &self,
        model: &mut ThreatModel,
        generator: &impl FindingGenerator,
        model_name: &str,
    ) -> Result<Annotation, StridemarkError> {
        let request = self.request(model, model_name);
        info!(model = model_name; "Requesting findings");

        let response = generator.generate(&request)?;
        self.annotate(model, &response)
    }
}
