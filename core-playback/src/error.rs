//! # Playback Error Types
//!
//! Errors raised while driving the platform playback adapter.

use bridge_traits::BridgeError;
use core_library::LibraryError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Track id is not part of the catalog.
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// The adapter refused a command in its current state.
    #[error("Adapter rejected command: {0}")]
    AdapterRejected(String),

    /// The adapter accepted the command but could not carry it out.
    #[error("Playback operation failed: {0}")]
    PlaybackFailed(String),

    /// Resume was requested but nothing was ever prepared.
    #[error("No track prepared")]
    NoTrackPrepared,

    /// Adapter unavailable or failing at the bridge level.
    #[error("Bridge error: {0}")]
    Bridge(BridgeError),
}

impl PlaybackError {
    /// Returns `true` if the adapter merely declined the command; callers treat
    /// this as a no-op.
    pub fn is_rejection(&self) -> bool {
        matches!(self, PlaybackError::AdapterRejected(_))
    }

    /// Returns `true` if the failure should surface as an `Error` playback
    /// state rather than be swallowed.
    pub fn is_playback_failure(&self) -> bool {
        matches!(
            self,
            PlaybackError::PlaybackFailed(_) | PlaybackError::Bridge(_)
        )
    }
}

impl From<BridgeError> for PlaybackError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::CommandRejected(msg) => PlaybackError::AdapterRejected(msg),
            BridgeError::OperationFailed(msg) => PlaybackError::PlaybackFailed(msg),
            other => PlaybackError::Bridge(other),
        }
    }
}

impl From<LibraryError> for PlaybackError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::TrackNotFound(id) => PlaybackError::TrackNotFound(id),
            other => PlaybackError::PlaybackFailed(other.to_string()),
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
