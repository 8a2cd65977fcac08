use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The host accepted the call but the target is in a state that cannot
    /// honour it (e.g. pausing a player that is not playing).
    #[error("Command rejected in current state: {0}")]
    CommandRejected(String),
}

impl BridgeError {
    /// Returns `true` when the error only signals an incompatible state and
    /// the caller may treat the command as a no-op.
    pub fn is_rejection(&self) -> bool {
        matches!(self, BridgeError::CommandRejected(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
