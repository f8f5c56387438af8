//! Structured logging schema and field name constants for wardrobe.
//!
//! All crates use these names for structured `tracing` fields so log
//! aggregation can query the same keys across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), mutation completions |
//! | DEBUG | Decision points, filter inputs, dropped stale responses |
//! | TRACE | Per-item iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "catalog", "outfits", "db", "storage", "app"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "items", "outfit_repo", "builder", "browser"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "insert", "list", "set_favorite", "save"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Authenticated user the call is made on behalf of.
pub const USER_ID: &str = "user_id";

/// Clothing item UUID being operated on.
pub const ITEM_ID: &str = "item_id";

/// Saved outfit UUID being operated on.
pub const OUTFIT_ID: &str = "outfit_id";

/// Blob storage path.
pub const STORAGE_PATH: &str = "storage_path";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned by a list or filter.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of an uploaded blob.
pub const SIZE_BYTES: &str = "size_bytes";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
