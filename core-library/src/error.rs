use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    #[error("Duplicate track id in catalog: {0}")]
    DuplicateId(String),

    #[error("Invalid track {id}: {message}")]
    InvalidTrack { id: String, message: String },
}

pub type Result<T> = std::result::Result<T, LibraryError>;
