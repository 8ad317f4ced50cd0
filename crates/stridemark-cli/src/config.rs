//! Configuration resolution for the CLI
//!
//! The effective configuration is built in two layers: a TOML file found by
//! [`discover`] (or the defaults when none exists), then the command-line
//! flags from [`Args`], which always win over the file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use stridemark::{StridemarkError, config::AppConfig, normalize::NormalizeMode};

use crate::Args;

/// Project-local configuration path, relative to the working directory.
const LOCAL_CONFIG: &str = "stridemark/config.toml";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Invalid configuration in {path}: {message}")]
    Validation { path: PathBuf, message: String },
}

impl From<ConfigError> for StridemarkError {
    fn from(err: ConfigError) -> Self {
        StridemarkError::Config(err.to_string())
    }
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigSource {
    /// Named with `--config`; must exist.
    Explicit,
    /// `stridemark/config.toml` in the working directory.
    Local,
    /// `config.toml` in the platform configuration directory.
    System,
}

/// Build the effective configuration for one invocation.
///
/// `--strict`, `--quiet` and `--log-dir` override the corresponding file
/// settings. Flags that are not given leave the file value in place.
///
/// # Errors
///
/// Returns `StridemarkError::Config` if the configuration file is missing,
/// malformed or invalid.
pub fn resolve_config(args: &Args) -> Result<AppConfig, StridemarkError> {
    let mut config = load_config(args.config.as_ref())?;

    if args.strict {
        config = config.with_normalize_mode(NormalizeMode::Strict);
    }
    if args.quiet {
        config = config.with_quiet_when_clean(true);
    }
    if let Some(log_dir) = &args.log_dir {
        config = config.with_log_dir(log_dir);
    }

    debug!(config:?; "Effective configuration");
    Ok(config)
}

/// Load the configuration file chosen by [`discover`], or the defaults.
///
/// # Errors
///
/// Returns error if an explicit path does not exist, or if the chosen file
/// cannot be read, parsed or validated.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, StridemarkError> {
    match discover(explicit_path.as_ref().map(AsRef::as_ref)) {
        Some((source, path)) => {
            info!(source:?, path = path.display().to_string(); "Loading configuration");
            load_config_file(&path)
        }
        None => {
            debug!("No configuration file found, using default configuration");
            Ok(AppConfig::default())
        }
    }
}

/// Pick the configuration file to load.
///
/// An explicit path is returned even if it does not exist, so that a typo in
/// `--config` is reported instead of silently falling back.
fn discover(explicit_path: Option<&Path>) -> Option<(ConfigSource, PathBuf)> {
    if let Some(path) = explicit_path {
        return Some((ConfigSource::Explicit, path.to_path_buf()));
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Some((ConfigSource::Local, local));
    }

    let Some(proj_dirs) = ProjectDirs::from("com", "stridemark", "stridemark") else {
        debug!("Could not determine platform-specific config directory");
        return None;
    };
    let system = proj_dirs.config_dir().join("config.toml");
    if system.exists() {
        return Some((ConfigSource::System, system));
    }
    debug!(path = system.display().to_string(); "System configuration file not found");
    None
}

fn load_config_file(path: &Path) -> Result<AppConfig, StridemarkError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.message().to_string(),
    })?;
    config
        .validate()
        .map_err(|message| ConfigError::Validation {
            path: path.to_path_buf(),
            message,
        })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn args(config: Option<&Path>) -> Args {
        Args {
            input: "model.json".to_string(),
            response: "response.json".to_string(),
            output: None,
            config: config.map(|path| path.to_string_lossy().to_string()),
            log_dir: None,
            strict: false,
            quiet: false,
            log_level: "off".to_string(),
        }
    }

    #[test]
    fn test_discover_explicit_path_wins() {
        let found = discover(Some(Path::new("/nonexistent/stridemark.toml")));
        assert_eq!(
            found,
            Some((
                ConfigSource::Explicit,
                PathBuf::from("/nonexistent/stridemark.toml")
            ))
        );
    }

    #[test]
    fn test_explicit_path() {
        let file = write_config("[normalize]\nmode = \"strict\"\n[marker]\ncolor = \"#ff8800\"\n");

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.normalize().mode(), NormalizeMode::Strict);
        assert_eq!(config.marker().color(), "#ff8800");
    }

    #[test]
    fn test_missing_explicit_path() {
        let err = load_config(Some("/nonexistent/stridemark.toml")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing configuration file: /nonexistent/stridemark.toml"
        );
    }

    #[test]
    fn test_invalid_toml_names_file() {
        let file = write_config("[marker\ncolor = 1");

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, StridemarkError::Config(_)));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_blank_color_fails_validation() {
        let file = write_config("[marker]\ncolor = \"\"\n");

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("marker color must not be empty"));
    }

    #[test]
    fn test_flags_override_file() {
        let file = write_config("[report]\nlog_dir = \"from-file\"\n");
        let args = Args {
            strict: true,
            quiet: true,
            log_dir: Some("from-flag".to_string()),
            ..args(Some(file.path()))
        };

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.normalize().mode(), NormalizeMode::Strict);
        assert!(config.report().quiet_when_clean());
        assert_eq!(config.report().log_dir(), Path::new("from-flag"));
    }

    #[test]
    fn test_absent_flags_keep_file_values() {
        let file = write_config(
            "[normalize]\nmode = \"strict\"\n[report]\nlog_dir = \"from-file\"\nquiet_when_clean = true\n",
        );

        let config = resolve_config(&args(Some(file.path()))).unwrap();
        assert_eq!(config.normalize().mode(), NormalizeMode::Strict);
        assert!(config.report().quiet_when_clean());
        assert_eq!(config.report().log_dir(), Path::new("from-file"));
    }
}
