use thiserror::Error;

use corkboard_store::StoreError;

/// Errors surfaced to the presentation layer.
///
/// Validation and not-found failures are always recoverable at the point of
/// action: the operation was rejected before any mutation. Storage failures
/// mean memory may be ahead of the persisted record; the documented
/// recovery is a forced [`PostStore::load`].
///
/// [`PostStore::load`]: crate::post_store::PostStore::load
#[derive(Error, Debug)]
pub enum AppError {
    /// Input failed shape or content rules.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced id does not exist at operation time.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The active backend failed to read or write. Not retried
    /// automatically.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
