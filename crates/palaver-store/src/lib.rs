//! # palaver-store
//!
//! The single authoritative in-memory state of the chat client: the chat
//! list, per-chat message timelines, typing and online presence, unread
//! counters and connection status.
//!
//! Every public method is a synchronous, atomic mutation or query; the
//! store never performs I/O. Network callers apply results here as
//! discrete events; the dedup policy in the timeline module reconciles
//! the three message sources (local echo, REST history, realtime push)
//! into one consistent timeline per chat.

pub mod chats;
pub mod error;
pub mod presence;
pub mod store;
pub mod timeline;

pub use error::StoreError;
pub use presence::TypingEntry;
pub use store::ChatStore;
pub use timeline::{Ingest, Notification};
