//! Finding generator seam.
//!
//! A [`FindingGenerator`] receives the scoped document view and returns raw
//! findings keyed by element id. Prompting, transport and retries belong to
//! the generator; the engine only consumes its answer.
//!
//! [`RecordedResponse`] replays a response captured earlier, which is how the
//! command line tool and the tests drive the pipeline.

use std::{fs, path::PathBuf};

use log::{debug, info};
use serde_json::Value;

use crate::{error::StridemarkError, response::RawResponse};

/// Input handed to a [`FindingGenerator`].
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    document: Value,
    model: String,
}

impl GenerationRequest {
    /// Creates a request for `document`, which should already be scoped.
    pub fn new(document: Value, model: impl Into<String>) -> Self {
        Self {
            document,
            model: model.into(),
        }
    }

    /// The scoped document view.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Name of the model the generator should use.
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Produces raw findings for a threat model.
pub trait FindingGenerator {
    /// Generates findings for the elements of `request`.
    ///
    /// # Errors
    ///
    /// Returns [`StridemarkError::Generate`] or another variant when the
    /// findings could not be produced.
    fn generate(&self, request: &GenerationRequest) -> Result<RawResponse, StridemarkError>;
}

impl<F> FindingGenerator for F
where
    F: Fn(&GenerationRequest) -> Result<RawResponse, StridemarkError>,
{
    fn generate(&self, request: &GenerationRequest) -> Result<RawResponse, StridemarkError> {
        self(request)
    }
}

/// Where a recorded response is read from.
#[derive(Debug, Clone)]
enum Recording {
    File(PathBuf),
    Value(Value),
}

/// Generator that replays a previously captured response.
#[derive(Debug, Clone)]
pub struct RecordedResponse {
    recording: Recording,
}

impl RecordedResponse {
    /// Replays the JSON response stored at `path`.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            recording: Recording::File(path.into()),
        }
    }

    /// Replays an in-memory JSON response.
    pub fn from_value(value: Value) -> Self {
        Self {
            recording: Recording::Value(value),
        }
    }
}

impl FindingGenerator for RecordedResponse {
    fn generate(&self, request: &GenerationRequest) -> Result<RawResponse, StridemarkError> {
        debug!(model = request.model(); "Replaying recorded response");

        let value = match &self.recording {
            Recording::File(path) => {
                info!(path:? = path; "Reading recorded response");
                let source = fs::read_to_string(path)?;
                serde_json::from_str(&source)
                    .map_err(|err| StridemarkError::new_parse_error(err, source, "response"))?
            }
            Recording::Value(value) => value.clone(),
        };

        Ok(RawResponse::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest::new(json!({ "detail": { "diagrams": [] } }), "recorded")
    }

    #[test]
    fn test_recorded_value() {
        let generator = RecordedResponse::from_value(json!({ "web": [ { "title": "t" } ] }));

        let response = generator.generate(&request()).unwrap();
        assert_eq!(response.element_ids().collect::<Vec<_>>(), ["web"]);
    }

    #[test]
    fn test_recorded_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "db", "threats": []}}]"#).unwrap();

        let response = RecordedResponse::from_file(file.path())
            .generate(&request())
            .unwrap();
        assert_eq!(response.len(), 1);
    }

    #[test]
    fn test_recorded_file_with_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = RecordedResponse::from_file(file.path())
            .generate(&request())
            .unwrap_err();
        assert!(matches!(err, StridemarkError::Parse { what: "response", .. }));
    }

    #[test]
    fn test_recorded_wrong_shape() {
        let err = RecordedResponse::from_value(json!("findings"))
            .generate(&request())
            .unwrap_err();
        assert!(matches!(err, StridemarkError::Response(_)));
    }

    #[test]
    fn test_closure_generator() {
        let generator = |request: &GenerationRequest| -> Result<RawResponse, StridemarkError> {
            assert_eq!(request.model(), "recorded");
            Err(StridemarkError::Generate("offline".to_string()))
        };

        let err = generator.generate(&request()).unwrap_err();
        assert_eq!(err.to_string(), "Finding generation failed: offline");
    }
}
