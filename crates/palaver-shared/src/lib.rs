//! # palaver-shared
//!
//! Types shared by every Palaver crate: strong-typed ids, the domain
//! models handed to the UI layer, the realtime wire protocol, and the
//! constants that tune the client.

pub mod constants;
pub mod model;
pub mod protocol;
pub mod types;

pub use model::{Chat, Message, Participant, User};
pub use protocol::{ClientInvocation, MessagePayload, PresencePayload, ServerEvent, TypingPayload};
pub use types::{ChatId, ChatKind, ConnectionStatus, MessageId, MessageStatus, UserId};
