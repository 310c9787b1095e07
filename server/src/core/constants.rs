// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Classroll";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "classroll";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".classroll";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "classroll.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "CLASSROLL_CONFIG";

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "CLASSROLL_LOG";

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "CLASSROLL_DATA_DIR";

/// Environment variable for SQLite pool size
pub const ENV_DB_MAX_CONNECTIONS: &str = "CLASSROLL_DB_MAX_CONNECTIONS";

/// Environment variable for maximum filter request size in bytes
pub const ENV_FILTER_MAX_JSON_BYTES: &str = "CLASSROLL_FILTER_MAX_JSON_BYTES";

/// Environment variable for maximum filter items per request
pub const ENV_FILTER_MAX_ITEMS: &str = "CLASSROLL_FILTER_MAX_ITEMS";

/// Default log filter when neither env var is set
pub const DEFAULT_LOG_FILTER: &str = "warn,classroll=info,classroll_server=info";

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "classroll.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// Pages written to the WAL before an automatic checkpoint
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

// =============================================================================
// Filter Requests
// =============================================================================

/// Maximum size of a filter request body
pub const FILTER_MAX_JSON_BYTES: usize = 64 * 1024;

/// Maximum number of items across `and`, `andOp` and `or`
pub const FILTER_MAX_ITEMS: usize = 50;
