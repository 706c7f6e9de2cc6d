//! Error types for the player

use crate::resolver::{MediaError, ResolveError};
use dharma_core::DharmaError;
use thiserror::Error;

/// Player errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Playlist is empty
    #[error("Playlist is empty")]
    PlaylistEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Every playback source for the track failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The media backend rejected an operation
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Persistence failure (library, session)
    #[error(transparent)]
    Gateway(#[from] DharmaError),
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
