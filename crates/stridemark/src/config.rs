//! Configuration types for stridemark.
//!
//! This module provides configuration structures that control how responses
//! are normalized, how merged cells are highlighted, and where reports go.
//! All types implement [`serde::Deserialize`] and every section is optional.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`NormalizeConfig`] - Strict or lenient finding normalization.
//! - [`MarkerConfig`] - Stroke color applied to cells that received findings.
//! - [`ReportConfig`] - Validation log location and console verbosity.
//!
//! # Example
//!
//! ```
//! # use stridemark::config::AppConfig;
//! # use stridemark::normalize::NormalizeMode;
//! let config: AppConfig = toml::from_str(r#"
//!     [normalize]
//!     mode = "strict"
//!
//!     [marker]
//!     color = "orange"
//! "#).unwrap();
//!
//! assert_eq!(config.normalize().mode(), NormalizeMode::Strict);
//! assert_eq!(config.marker().color(), "orange");
//! assert!(!config.report().quiet_when_clean());
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::normalize::NormalizeMode;

/// Default has-findings stroke color.
pub const DEFAULT_MARKER_COLOR: &str = "red";

/// Default directory for validation logs.
pub const DEFAULT_LOG_DIR: &str = "output/logs";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Normalization section.
    #[serde(default)]
    normalize: NormalizeConfig,

    /// Marker section.
    #[serde(default)]
    marker: MarkerConfig,

    /// Report section.
    #[serde(default)]
    report: ReportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(normalize: NormalizeConfig, marker: MarkerConfig, report: ReportConfig) -> Self {
        Self {
            normalize,
            marker,
            report,
        }
    }

    /// Returns the normalization configuration.
    pub fn normalize(&self) -> &NormalizeConfig {
        &self.normalize
    }

    /// Returns the marker configuration.
    pub fn marker(&self) -> &MarkerConfig {
        &self.marker
    }

    /// Returns the report configuration.
    pub fn report(&self) -> &ReportConfig {
        &self.report
    }

    /// Overrides the normalization mode.
    pub fn with_normalize_mode(mut self, mode: NormalizeMode) -> Self {
        self.normalize.mode = mode;
        self
    }

    /// Overrides the validation log directory.
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.report.log_dir = log_dir.into();
        self
    }

    /// Overrides console suppression for clean results.
    pub fn with_quiet_when_clean(mut self, quiet: bool) -> Self {
        self.report.quiet_when_clean = quiet;
        self
    }

    /// Checks values that deserialization alone cannot.
    ///
    /// # Errors
    ///
    /// Returns a message if the marker color is blank.
    pub fn validate(&self) -> Result<(), String> {
        if self.marker.color.trim().is_empty() {
            return Err("marker color must not be empty".to_string());
        }
        Ok(())
    }
}

/// Finding normalization configuration.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct NormalizeConfig {
    #[serde(default)]
    mode: NormalizeMode,
}

impl NormalizeConfig {
    /// Creates a new [`NormalizeConfig`].
    pub fn new(mode: NormalizeMode) -> Self {
        Self { mode }
    }

    /// Returns the normalization mode.
    pub fn mode(&self) -> NormalizeMode {
        self.mode
    }
}

/// Has-findings marker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkerConfig {
    /// Any stroke value the diagram renderer accepts, e.g. `red` or `#ff0000`.
    #[serde(default = "default_marker_color")]
    color: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            color: default_marker_color(),
        }
    }
}

impl MarkerConfig {
    /// Creates a new [`MarkerConfig`].
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
        }
    }

    /// Returns the marker color.
    pub fn color(&self) -> &str {
        &self.color
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_log_dir")]
    log_dir: PathBuf,

    /// Skip the console summary when the result is valid and has no warnings.
    #[serde(default)]
    quiet_when_clean: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            quiet_when_clean: false,
        }
    }
}

impl ReportConfig {
    /// Creates a new [`ReportConfig`].
    pub fn new(log_dir: impl Into<PathBuf>, quiet_when_clean: bool) -> Self {
        Self {
            log_dir: log_dir.into(),
            quiet_when_clean,
        }
    }

    /// Returns the directory validation logs are written to.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Returns `true` if clean results skip the console summary.
    pub fn quiet_when_clean(&self) -> bool {
        self.quiet_when_clean
    }
}

fn default_marker_color() -> String {
    DEFAULT_MARKER_COLOR.to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}
