use thiserror::Error;

use corkboard_shared::constants::MAX_MEDIA_PER_POST;

/// Errors produced by the media layer.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The selected file could not be read at all.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The selected file has no usable name.
    #[error("File has no name: {0}")]
    NoFileName(String),

    /// The compose buffer is full.
    #[error("A post can carry at most {MAX_MEDIA_PER_POST} attachments")]
    TooManyAttachments,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MediaError>;
