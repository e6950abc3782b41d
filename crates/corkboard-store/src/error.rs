use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted record did not deserialize into the expected shape.
    #[error("Record serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// A referenced record does not exist.
    #[error("Record not found")]
    NotFound,

    /// An operation was invoked with a malformed argument. Returned as a
    /// value instead of letting a fault cross the bridge boundary.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The cross-process channel is gone; the host side has shut down.
    #[error("Store bridge closed")]
    BridgeClosed,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
