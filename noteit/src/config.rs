//! Application configuration constants
//!
//! Central location for defaults, resource limits and validation
//! boundaries used throughout the application.

// ===== Files =====

/// Settings file stored in the data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Default SQLite database file, relative to the data directory
pub const DEFAULT_DATABASE_FILE: &str = "notes.db";

/// Name of the data directory under the platform data root
pub const APP_DIR_NAME: &str = "noteit";

// ===== Remote Sources =====

/// User agent sent by HTTP note sources
pub const USER_AGENT: &str = concat!("noteit/", env!("CARGO_PKG_VERSION"));

/// Default request timeout for HTTP note sources in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Maximum request timeout in seconds.
/// The orchestrator has no timeout of its own, so a hung source holds the
/// busy indicator for at most this long.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Maximum number of configured note sources
pub const MAX_SOURCES: usize = 8;

// ===== Rendering =====

/// Date format for note creation labels (day.month.year, UTC)
pub const CREATED_DATE_FORMAT: &str = "%d.%m.%Y";

/// Markup substituted for line breaks in rendered note content
pub const LINE_BREAK_MARKUP: &str = "<br>";
