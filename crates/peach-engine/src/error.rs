use thiserror::Error;

use peach_shared::{ChannelId, IdError, UserId};
use peach_store::StoreError;

/// Failures of an engine call.
///
/// Business outcomes such as "already liked" or "quota exhausted" are not
/// errors; they come back as values.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The call itself is invalid (self-like, blank message, banned actor,
    /// outsider writing to a channel). Retrying will not help.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("Unknown channel: {0}")]
    UnknownChannel(ChannelId),

    /// The store failed; see [`EngineError::is_retryable`].
    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl EngineError {
    /// Whether the UI should offer "temporarily unavailable, retry".
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Storage(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidRecord(msg) => EngineError::InvalidArgument(msg),
            StoreError::Id(e) => EngineError::InvalidArgument(e.to_string()),
            other => EngineError::Storage(other),
        }
    }
}

impl From<IdError> for EngineError {
    fn from(e: IdError) -> Self {
        EngineError::InvalidArgument(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
