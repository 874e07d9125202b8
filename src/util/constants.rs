// bs-logviewer - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "BS LogViewer";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "bs-logviewer";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Parsing
// =============================================================================

/// Sentinel stored in urgency, source and time of lines that do not match
/// the `[URGENCY @ TIME | SOURCE] MESSAGE` shape.
pub const UNKNOWN_FIELD: &str = "UNKNOWN";

// =============================================================================
// Duplicate-run detection
// =============================================================================

/// Number of preceding entries (in original order) searched for an
/// identical deduplication key.
pub const DEFAULT_DEDUP_WINDOW: usize = 30;

/// Minimum configurable deduplication window.
pub const MIN_DEDUP_WINDOW: usize = 1;

/// Maximum configurable deduplication window. The detector keeps one key
/// per window slot, so this bounds its memory.
pub const MAX_DEDUP_WINDOW: usize = 1_000;

/// Runs at least this long are collapsed behind a "show duplicates" marker.
pub const DEFAULT_COLLAPSE_THRESHOLD: usize = 10;

/// Minimum configurable collapse threshold. A threshold of 1 would put a
/// marker in front of every single duplicate.
pub const MIN_COLLAPSE_THRESHOLD: usize = 2;

/// Maximum configurable collapse threshold.
pub const MAX_COLLAPSE_THRESHOLD: usize = 10_000;

// =============================================================================
// Pagination
// =============================================================================

/// Rows rendered per page of the display sequence.
pub const DEFAULT_ROWS_PER_PAGE: usize = 200;

/// Minimum configurable rows per page.
pub const MIN_ROWS_PER_PAGE: usize = 10;

/// Maximum configurable rows per page.
pub const MAX_ROWS_PER_PAGE: usize = 10_000;

// =============================================================================
// Analysis: recognised sources and sentinels
// =============================================================================

/// Source emitting "developed for game version" compatibility warnings.
pub const SOURCE_MOD_LOADER: &str = "IPA/Loader";

/// Source emitting the mod inventory and the detected game version.
pub const SOURCE_MOD_MANAGER: &str = "IPA";

/// Source emitting platform user information.
pub const SOURCE_UTILS: &str = "BS_Utils";

/// Player display value when the utility source reports a null UserInfo.
pub const NO_USER_INFO: &str = "No UserInfo found!";

/// Urgency labels in ascending severity, compared case-insensitively.
pub const URGENCY_ORDER: &[&str] = &["notice", "debug", "info", "warning", "error", "critical"];

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Accepted values for `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Leading bytes of every gzip stream (RFC 1952 ID1/ID2).
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
