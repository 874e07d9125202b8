// bs-logviewer - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::dedup::DedupConfig;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for bs-logviewer configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/bs-logviewer/ or %APPDATA%\bs-logviewer\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[view]` section.
    pub view: ViewSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[view]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ViewSection {
    /// Preceding entries searched for duplicates.
    pub dedup_window: Option<usize>,
    /// Run length at which duplicates are collapsed.
    pub collapse_threshold: Option<usize>,
    /// Rows per rendered page.
    pub rows_per_page: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- View --
    /// Duplicate detection tuning.
    pub dedup: DedupConfig,
    /// Rows per rendered page.
    pub rows_per_page: usize,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dedup: DedupConfig::default(),
            rows_per_page: constants::DEFAULT_ROWS_PER_PAGE,
            log_level: None,
            log_file: None,
        }
    }
}

/// Read and validate `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults with one warning: the application
/// still starts but the user is informed.
///
/// Logging is usually not initialised yet when this runs, so callers should
/// surface the returned warnings once it is.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    if !config_path.exists() {
        return (AppConfig::default(), Vec::new());
    }

    match read_config(config_path) {
        Ok(raw) => validate(raw),
        Err(e) => (
            AppConfig::default(),
            vec![format!(
                "{e}. Using defaults. See config.example.toml for the expected format."
            )],
        ),
    }
}

fn read_config(config_path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source: e,
    })
}

/// Check a numeric field against its range, recording a warning on failure.
fn check_range(
    field: &str,
    value: Option<usize>,
    min: usize,
    max: usize,
    default: usize,
    warnings: &mut Vec<String>,
) -> usize {
    match value {
        Some(v) if (min..=max).contains(&v) => v,
        Some(v) => {
            warnings.push(format!(
                "{}. Using default ({default}).",
                ConfigError::ValueOutOfRange {
                    field: field.to_string(),
                    value: v.to_string(),
                    expected: format!("{min}-{max}"),
                }
            ));
            default
        }
        None => default,
    }
}

/// Validate each field against named constants, accumulating all problems.
fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = AppConfig::default();

    config.dedup.window = check_range(
        "[view] dedup_window",
        raw.view.dedup_window,
        constants::MIN_DEDUP_WINDOW,
        constants::MAX_DEDUP_WINDOW,
        constants::DEFAULT_DEDUP_WINDOW,
        &mut warnings,
    );
    config.dedup.collapse_threshold = check_range(
        "[view] collapse_threshold",
        raw.view.collapse_threshold,
        constants::MIN_COLLAPSE_THRESHOLD,
        constants::MAX_COLLAPSE_THRESHOLD,
        constants::DEFAULT_COLLAPSE_THRESHOLD,
        &mut warnings,
    );
    config.rows_per_page = check_range(
        "[view] rows_per_page",
        raw.view.rows_per_page,
        constants::MIN_ROWS_PER_PAGE,
        constants::MAX_ROWS_PER_PAGE,
        constants::DEFAULT_ROWS_PER_PAGE,
        &mut warnings,
    );

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    (config, warnings)
}
