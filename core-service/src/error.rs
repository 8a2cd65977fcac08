use bridge_traits::BridgeError;
use core_playback::PlaybackError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Track not found: {0}")]
    NotFound(String),

    #[error("Adapter rejected command: {0}")]
    AdapterRejected(String),

    #[error("Session event loop already started")]
    AlreadyStarted,

    #[error("Session is not running")]
    NotStarted,

    #[error("Playback error: {0}")]
    Playback(PlaybackError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Command channel closed")]
    ChannelClosed,
}

impl From<PlaybackError> for CoreError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::TrackNotFound(id) => CoreError::NotFound(id),
            PlaybackError::AdapterRejected(msg) => CoreError::AdapterRejected(msg),
            other => CoreError::Playback(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
