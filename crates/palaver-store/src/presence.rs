//! Online and typing presence.
//!
//! Both sets are ephemeral, valid only for the live session. Typing
//! entries carry the instant they were last refreshed so the session's
//! periodic sweep can expire entries the server never retracted.

use std::time::{Duration, Instant};

use palaver_shared::types::{ChatId, UserId};
use tracing::debug;

use crate::store::ChatStore;

/// One user currently typing in one chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingEntry {
    pub user_id: UserId,
    pub username: String,
    /// When the last `typing = true` event for this user arrived.
    pub seen_at: Instant,
}

impl ChatStore {
    /// Record a user as online. Duplicate events are no-ops.
    pub fn user_online(&mut self, user_id: UserId, username: String) {
        self.online.insert(user_id, username);
    }

    /// Record a user as offline. Returns `false` if they were not online.
    pub fn user_offline(&mut self, user_id: UserId) -> bool {
        self.online.remove(&user_id).is_some()
    }

    /// Apply a typing event to a chat's typing set.
    ///
    /// A repeated `typing = true` for an already-typing user refreshes its
    /// expiry but does not change the visible set; `typing = false` for an
    /// absent user is a no-op. Returns whether the visible set changed.
    pub fn set_typing(
        &mut self,
        chat_id: ChatId,
        user_id: UserId,
        username: String,
        is_typing: bool,
        now: Instant,
    ) -> bool {
        let entries = self.typing.entry(chat_id).or_default();

        if is_typing {
            match entries.iter_mut().find(|e| e.user_id == user_id) {
                Some(entry) => {
                    entry.seen_at = now;
                    false
                }
                None => {
                    entries.push(TypingEntry {
                        user_id,
                        username,
                        seen_at: now,
                    });
                    true
                }
            }
        } else {
            let before = entries.len();
            entries.retain(|e| e.user_id != user_id);
            entries.len() != before
        }
    }

    /// Expire typing entries older than `ttl`. Returns the chats whose
    /// visible typing set changed.
    pub fn sweep_typing(&mut self, now: Instant, ttl: Duration) -> Vec<ChatId> {
        let mut changed = Vec::new();
        for (chat_id, entries) in self.typing.iter_mut() {
            let before = entries.len();
            entries.retain(|e| now.saturating_duration_since(e.seen_at) < ttl);
            if entries.len() != before {
                debug!(chat = %chat_id, expired = before - entries.len(), "Swept stale typing entries");
                changed.push(*chat_id);
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use palaver_shared::model::User;

    use super::*;

    fn test_store() -> ChatStore {
        ChatStore::new(User {
            id: UserId(1),
            username: "self".to_string(),
            created_at: None,
        })
    }

    #[test]
    fn test_online_presence_is_idempotent() {
        let mut store = test_store();

        store.user_online(UserId(2), "ada".to_string());
        store.user_online(UserId(2), "ada".to_string());

        assert!(store.is_online(UserId(2)));
        assert_eq!(store.online_users().count(), 1);

        assert!(store.user_offline(UserId(2)));
        assert!(!store.user_offline(UserId(2)));
        assert!(!store.is_online(UserId(2)));
    }

    #[test]
    fn test_duplicate_typing_events_are_noops() {
        let mut store = test_store();
        let now = Instant::now();

        assert!(store.set_typing(ChatId(7), UserId(2), "ada".to_string(), true, now));
        assert!(!store.set_typing(ChatId(7), UserId(2), "ada".to_string(), true, now));
        assert_eq!(store.typing_users(ChatId(7)).len(), 1);

        assert!(store.set_typing(ChatId(7), UserId(2), "ada".to_string(), false, now));
        assert!(!store.set_typing(ChatId(7), UserId(2), "ada".to_string(), false, now));
        assert!(store.typing_users(ChatId(7)).is_empty());
    }

    #[test]
    fn test_sweep_expires_stale_entries() {
        let mut store = test_store();
        let start = Instant::now();
        let ttl = Duration::from_secs(5);

        store.set_typing(ChatId(7), UserId(2), "ada".to_string(), true, start);
        store.set_typing(
            ChatId(7),
            UserId(3),
            "bob".to_string(),
            true,
            start + Duration::from_secs(4),
        );

        // At +6s only the first entry has aged out.
        let changed = store.sweep_typing(start + Duration::from_secs(6), ttl);
        assert_eq!(changed, vec![ChatId(7)]);
        let remaining = store.typing_users(ChatId(7));
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].user_id, UserId(3));

        // Nothing else to expire yet.
        assert!(store.sweep_typing(start + Duration::from_secs(6), ttl).is_empty());
    }

    #[test]
    fn test_repeated_typing_refreshes_expiry() {
        let mut store = test_store();
        let start = Instant::now();
        let ttl = Duration::from_secs(5);

        store.set_typing(ChatId(7), UserId(2), "ada".to_string(), true, start);
        store.set_typing(
            ChatId(7),
            UserId(2),
            "ada".to_string(),
            true,
            start + Duration::from_secs(4),
        );

        // Would have expired from the first event alone.
        assert!(store.sweep_typing(start + Duration::from_secs(6), ttl).is_empty());
        assert_eq!(store.typing_users(ChatId(7)).len(), 1);
    }
}
