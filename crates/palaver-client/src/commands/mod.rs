//! Session command surface, grouped by domain.
//!
//! Each sub-module extends [`Session`](crate::session::Session) with the
//! async commands the presentation layer invokes.

mod chats;
mod messaging;
mod typing;
mod users;

pub use users::{login, register};

pub(crate) use typing::TypingDebounce;
