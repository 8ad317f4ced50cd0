//! CLI logic for the Stridemark threat model annotator.
//!
//! This module contains the core CLI logic: it loads configuration, replays a
//! recorded generator response against a threat model, writes the annotated
//! model and its validation log, and prints the console summary.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use stridemark::{
    Annotator, StridemarkError, config::ReportConfig, generate::RecordedResponse,
    reconcile::ValidationResult, report::ReportBuilder,
};

/// Model name recorded in generation requests for replayed responses.
const RECORDED_MODEL: &str = "recorded";

/// Directory that receives annotated models when no output path is given.
const DEFAULT_OUTPUT_DIR: &str = "output";

/// Run the Stridemark CLI application
///
/// The annotated model and the validation log are written even when the
/// response turns out to be unrelated to the model.
///
/// # Errors
///
/// Returns `StridemarkError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Invalid model or response JSON
/// - A written model that no longer parses
/// - A response that shares no element ids with the model
pub fn run(args: &Args) -> Result<(), StridemarkError> {
    let output = output_path(args);
    info!(
        input_path = args.input,
        response_path = args.response,
        output_path = output.display().to_string();
        "Processing threat model"
    );

    let app_config = config::resolve_config(args)?;

    let source = fs::read_to_string(&args.input)?;

    let annotator = Annotator::new(app_config);
    let mut model = annotator.parse_model(&source)?;
    let generator = RecordedResponse::from_file(&args.response);
    let annotation = annotator.generate_and_annotate(&mut model, &generator, RECORDED_MODEL)?;

    let json = model.to_pretty_json().map_err(StridemarkError::Serialize)?;
    write_file(&output, &json)?;
    verify_output(&annotator, &output)?;
    info!(output_file = output.display().to_string(); "Threat model written");

    let result = annotation.result();
    let report_builder = ReportBuilder::new(file_name(&args.input));
    let report = report_builder.build(result);
    write_log(
        annotator.config().report().log_dir(),
        &report_builder,
        report.log_text(),
    )?;

    if should_print_summary(annotator.config().report(), result) {
        println!("{}", report.summary_text());
    }

    if !result.is_valid() {
        return Err(StridemarkError::ScopeMismatch {
            response_ids: result.response_ids().to_vec(),
        });
    }

    Ok(())
}

/// The console summary is suppressed only for a clean run with quiet enabled.
fn should_print_summary(report: &ReportConfig, result: &ValidationResult) -> bool {
    !(report.quiet_when_clean() && result.is_clean())
}

/// Resolve the output path, defaulting to `output/<input file name>`.
fn output_path(args: &Args) -> PathBuf {
    match &args.output {
        Some(output) => PathBuf::from(output),
        None => Path::new(DEFAULT_OUTPUT_DIR).join(file_name(&args.input)),
    }
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |name| name.to_string_lossy().into_owned())
}

fn write_file(path: &Path, contents: &str) -> Result<(), StridemarkError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Re-read the written model and make sure it still parses.
fn verify_output(annotator: &Annotator, path: &Path) -> Result<(), StridemarkError> {
    let written = fs::read_to_string(path)?;
    annotator.parse_model(&written).inspect_err(|err| {
        warn!(path = path.display().to_string(), err:%; "Written threat model failed verification");
    })?;
    debug!("Written threat model verified");
    Ok(())
}

fn write_log(
    log_dir: &Path,
    report_builder: &ReportBuilder,
    text: &str,
) -> Result<PathBuf, StridemarkError> {
    let path = log_dir.join(report_builder.log_file_name());
    write_file(&path, text)?;
    info!(log_file = path.display().to_string(); "Validation log written");
    Ok(path)
}
