use thiserror::Error;

use palaver_shared::types::{ChatId, MessageId};

/// Errors produced by the store layer.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// The chat does not exist in the store.
    #[error("Unknown chat {0}")]
    UnknownChat(ChatId),

    /// No message with this id exists in the chat's timeline.
    #[error("Unknown message {0}")]
    UnknownMessage(MessageId),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
