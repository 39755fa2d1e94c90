//! Root aggregate and query surface.
//!
//! The [`ChatStore`] is wrapped in `Arc<Mutex<>>` by the session layer so
//! that commands and the channel bridge mutate it one logical event at a
//! time. No mutation here suspends; atomicity per event follows from the
//! lock discipline of the callers.

use std::collections::HashMap;

use palaver_shared::model::{Chat, Message, User};
use palaver_shared::types::{ChatId, ConnectionStatus, UserId};

use crate::presence::TypingEntry;

/// Central client state.
#[derive(Debug)]
pub struct ChatStore {
    /// The authenticated local user.
    pub(crate) current_user: User,

    /// All chats the user participates in, in server order.
    pub(crate) chats: Vec<Chat>,

    /// The chat currently open in the transcript view, if any.
    pub(crate) active_chat: Option<ChatId>,

    /// Append-ordered message timeline per chat.
    pub(crate) messages: HashMap<ChatId, Vec<Message>>,

    /// Who is currently typing, per chat.
    pub(crate) typing: HashMap<ChatId, Vec<TypingEntry>>,

    /// Unread message count per chat.
    pub(crate) unread: HashMap<ChatId, u32>,

    /// Online users, `user id → username`.
    pub(crate) online: HashMap<UserId, String>,

    /// State of the realtime channel. A disconnect never clears chat or
    /// message state.
    pub(crate) connection: ConnectionStatus,

    /// Whether a chat-list refresh is in flight.
    pub(crate) loading: bool,

    /// Monotonic source of provisional message ids.
    pub(crate) next_provisional_id: u64,
}

impl ChatStore {
    /// Create an empty store for one authenticated session.
    pub fn new(current_user: User) -> Self {
        Self {
            current_user,
            chats: Vec::new(),
            active_chat: None,
            messages: HashMap::new(),
            typing: HashMap::new(),
            unread: HashMap::new(),
            online: HashMap::new(),
            connection: ConnectionStatus::Disconnected,
            loading: false,
            next_provisional_id: 1,
        }
    }

    pub fn current_user(&self) -> &User {
        &self.current_user
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn chat(&self, chat_id: ChatId) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == chat_id)
    }

    pub fn active_chat(&self) -> Option<ChatId> {
        self.active_chat
    }

    /// The timeline of a chat; empty if the chat has no messages loaded.
    pub fn messages(&self, chat_id: ChatId) -> &[Message] {
        self.messages.get(&chat_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn unread(&self, chat_id: ChatId) -> u32 {
        self.unread.get(&chat_id).copied().unwrap_or(0)
    }

    pub fn typing_users(&self, chat_id: ChatId) -> &[TypingEntry] {
        self.typing.get(&chat_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_online(&self, user_id: UserId) -> bool {
        self.online.contains_key(&user_id)
    }

    pub fn online_users(&self) -> impl Iterator<Item = (UserId, &str)> {
        self.online.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection
    }

    /// Update the connection flag. Chat and message state are left
    /// untouched; a disconnect must not blank the UI.
    pub fn set_connection_status(&mut self, status: ConnectionStatus) {
        self.connection = status;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(crate) fn alloc_provisional_id(&mut self) -> u64 {
        let id = self.next_provisional_id;
        self.next_provisional_id += 1;
        id
    }
}
