use thiserror::Error;

use palaver_net::NetError;

/// Errors surfaced by session commands.
#[derive(Error, Debug)]
pub enum ClientError {
    /// REST or realtime transport failure.
    #[error("Network error: {0}")]
    Net(#[from] NetError),

    /// The state mutex was poisoned by a panicking holder.
    #[error("State lock poisoned")]
    StatePoisoned,

    /// The realtime channel task has terminated.
    #[error("Realtime channel is gone")]
    ChannelGone,
}
