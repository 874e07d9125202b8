// bs-logviewer - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Only the outer surfaces (config, intake, export, CLI rules, toggles by id)
// produce errors; parsing and analysis degrade silently instead.
// ViewError is handed straight back to the caller of a toggle and never
// reaches the top level.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all bs-logviewer operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum AppError {
    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Reading or decompressing the log file failed.
    Input(InputError),

    /// A textual filter rule was malformed.
    Filter(FilterError),

    /// Export operation failed.
    Export(ExportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Input(e) => write!(f, "Input error: {e}"),
            Self::Filter(e) => write!(f, "Filter error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Input(e) => Some(e),
            Self::Filter(e) => Some(e),
            Self::Export(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

/// Errors related to reading a log file from disk.
#[derive(Debug)]
pub enum InputError {
    /// The file could not be opened or read.
    Io { path: PathBuf, source: io::Error },

    /// The file looked like gzip but the stream was corrupt or truncated.
    Decompress { path: PathBuf, source: io::Error },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Cannot read log file '{}': {source}", path.display())
            }
            Self::Decompress { path, source } => {
                write!(
                    f,
                    "Cannot decompress gzip log '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Decompress { source, .. } => Some(source),
        }
    }
}

impl From<InputError> for AppError {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Errors related to filter operations.
#[derive(Debug, PartialEq, Eq)]
pub enum FilterError {
    /// A `SOURCE[:URGENCY]` rule had neither a source nor an urgency.
    EmptyRule { rule: String },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRule { rule } => write!(
                f,
                "Filter rule '{rule}' names neither a source nor an urgency. \
                 Expected SOURCE, SOURCE:URGENCY or :URGENCY"
            ),
        }
    }
}

impl std::error::Error for FilterError {}

impl From<FilterError> for AppError {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

// ---------------------------------------------------------------------------
// View errors
// ---------------------------------------------------------------------------

/// Errors raised by show/hide requests against the display sequence.
#[derive(Debug, PartialEq, Eq)]
pub enum ViewError {
    /// No display item carries this id.
    UnknownId { id: usize, len: usize },

    /// The id belongs to an ordinary log entry, not a run marker.
    NotARunMarker { id: usize },
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownId { id, len } => write!(
                f,
                "Display id {id} does not exist (sequence has {len} items)"
            ),
            Self::NotARunMarker { id } => {
                write!(f, "Display id {id} is a log entry, not a duplicate-run marker")
            }
        }
    }
}

impl std::error::Error for ViewError {}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the output.
    Io { target: String, source: io::Error },

    /// CSV serialisation error.
    Csv { target: String, source: csv::Error },

    /// JSON serialisation error.
    Json {
        target: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { target, source } => {
                write!(f, "Export I/O error '{target}': {source}")
            }
            Self::Csv { target, source } => {
                write!(f, "CSV export error '{target}': {source}")
            }
            Self::Json { target, source } => {
                write!(f, "JSON export error '{target}': {source}")
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

/// Convenience type alias for bs-logviewer results.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_app_error_preserves_source_chain() {
        let err: AppError = InputError::Io {
            path: PathBuf::from("missing.log"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        }
        .into();
        assert!(err.to_string().contains("missing.log"));
        let inner = err.source().expect("input error source");
        assert!(inner.source().is_some(), "io::Error should be reachable");
    }

    #[test]
    fn test_filter_error_reaches_top_level() {
        let err: AppError = FilterError::EmptyRule {
            rule: ":".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("Filter error"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_view_error_display() {
        let err = ViewError::NotARunMarker { id: 4 };
        assert!(err.to_string().contains("id 4"));
        let err = ViewError::UnknownId { id: 9, len: 3 };
        assert!(err.to_string().contains("3 items"));
    }
}
