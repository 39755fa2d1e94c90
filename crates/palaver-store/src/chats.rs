//! Chat list and active-selection mutations.

use palaver_shared::constants::UNKNOWN_USER_PLACEHOLDER;
use palaver_shared::model::Chat;
use palaver_shared::types::{ChatId, ChatKind};
use tracing::debug;

use crate::store::ChatStore;

impl ChatStore {
    /// Replace the full chat list. Timelines and counters of chats no
    /// longer present are left alone; callers that delete a chat go
    /// through [`remove_chat`](Self::remove_chat).
    pub fn set_chats(&mut self, chats: Vec<Chat>) {
        debug!(count = chats.len(), "Replacing chat list");
        self.chats = chats;
    }

    /// Insert a chat, or replace the stored one with the same id.
    pub fn upsert_chat(&mut self, chat: Chat) {
        match self.chats.iter_mut().find(|c| c.id == chat.id) {
            Some(existing) => *existing = chat,
            None => self.chats.push(chat),
        }
    }

    /// Remove a chat and everything hanging off it: timeline, typing set,
    /// unread counter, and the active selection if it pointed here.
    ///
    /// Returns `false` if the chat was not in the list.
    pub fn remove_chat(&mut self, chat_id: ChatId) -> bool {
        let before = self.chats.len();
        self.chats.retain(|c| c.id != chat_id);
        if self.chats.len() == before {
            return false;
        }

        self.messages.remove(&chat_id);
        self.typing.remove(&chat_id);
        self.unread.remove(&chat_id);
        if self.active_chat == Some(chat_id) {
            self.active_chat = None;
        }
        true
    }

    /// Change the active selection and clear the newly active chat's
    /// unread counter.
    pub fn set_active_chat(&mut self, chat_id: Option<ChatId>) {
        self.active_chat = chat_id;
        if let Some(id) = chat_id {
            self.unread.remove(&id);
        }
    }

    /// Display name of a chat: the group name, or for a direct chat the
    /// non-self participant's username.
    pub fn display_name(&self, chat: &Chat) -> String {
        match chat.kind {
            ChatKind::Group => chat.name.clone(),
            ChatKind::Direct => chat
                .participants
                .iter()
                .find(|p| p.user_id != self.current_user.id)
                .map(|p| p.user.username.clone())
                .unwrap_or_else(|| UNKNOWN_USER_PLACEHOLDER.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use palaver_shared::model::{Participant, User};
    use palaver_shared::types::UserId;

    use super::*;

    fn test_user(id: i64) -> User {
        User {
            id: UserId(id),
            username: format!("user{id}"),
            created_at: None,
        }
    }

    fn test_participant(chat_id: ChatId, user: User) -> Participant {
        Participant {
            chat_id,
            user_id: user.id,
            joined_at: Utc::now(),
            user,
        }
    }

    fn test_chat(id: i64, kind: ChatKind, participants: Vec<Participant>) -> Chat {
        Chat {
            id: ChatId(id),
            name: format!("chat{id}"),
            kind,
            created_at: Utc::now(),
            participants,
        }
    }

    #[test]
    fn test_direct_display_name_ignores_participant_order() {
        let store = ChatStore::new(test_user(1));
        let chat_id = ChatId(7);

        let self_first = test_chat(
            7,
            ChatKind::Direct,
            vec![
                test_participant(chat_id, test_user(1)),
                test_participant(chat_id, test_user(2)),
            ],
        );
        let other_first = test_chat(
            7,
            ChatKind::Direct,
            vec![
                test_participant(chat_id, test_user(2)),
                test_participant(chat_id, test_user(1)),
            ],
        );

        assert_eq!(store.display_name(&self_first), "user2");
        assert_eq!(store.display_name(&other_first), "user2");
    }

    #[test]
    fn test_direct_display_name_falls_back_to_placeholder() {
        let store = ChatStore::new(test_user(1));
        let lonely = test_chat(
            7,
            ChatKind::Direct,
            vec![test_participant(ChatId(7), test_user(1))],
        );
        assert_eq!(store.display_name(&lonely), UNKNOWN_USER_PLACEHOLDER);
    }

    #[test]
    fn test_group_display_name_is_the_chat_name() {
        let store = ChatStore::new(test_user(1));
        let chat = test_chat(7, ChatKind::Group, Vec::new());
        assert_eq!(store.display_name(&chat), "chat7");
    }

    #[test]
    fn test_set_active_chat_clears_unread() {
        let mut store = ChatStore::new(test_user(1));
        store.unread.insert(ChatId(7), 5);

        store.set_active_chat(Some(ChatId(7)));

        assert_eq!(store.active_chat(), Some(ChatId(7)));
        assert_eq!(store.unread(ChatId(7)), 0);
    }

    #[test]
    fn test_remove_chat_clears_everything() {
        let mut store = ChatStore::new(test_user(1));
        store.set_chats(vec![test_chat(7, ChatKind::Group, Vec::new())]);
        store.set_active_chat(Some(ChatId(7)));
        store.unread.insert(ChatId(7), 2);
        store.messages.insert(ChatId(7), Vec::new());

        assert!(store.remove_chat(ChatId(7)));

        assert!(store.chats().is_empty());
        assert!(store.active_chat().is_none());
        assert_eq!(store.unread(ChatId(7)), 0);
        assert!(!store.messages.contains_key(&ChatId(7)));
    }

    #[test]
    fn test_remove_unknown_chat_is_a_noop() {
        let mut store = ChatStore::new(test_user(1));
        assert!(!store.remove_chat(ChatId(99)));
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut store = ChatStore::new(test_user(1));
        store.upsert_chat(test_chat(7, ChatKind::Group, Vec::new()));

        let mut renamed = test_chat(7, ChatKind::Group, Vec::new());
        renamed.name = "renamed".to_string();
        store.upsert_chat(renamed);

        assert_eq!(store.chats().len(), 1);
        assert_eq!(store.chats()[0].name, "renamed");
    }
}
