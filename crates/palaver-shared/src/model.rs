//! Domain model structs mirrored from the service's REST representation.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names so it can be decoded straight off the wire and handed to the UI
//! layer unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ChatId, ChatKind, MessageId, MessageStatus, UserId};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A user identity. Immutable once fetched; cached by id during enrichment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Absent on synthesized placeholder identities.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Synthesize an identity for a sender whose user record could not be
    /// resolved. Partial-data failures degrade to this, never to an error.
    pub fn placeholder(id: UserId) -> Self {
        Self {
            id,
            username: format!("user-{}", id.0),
            created_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// A conversation, either two-party (`Direct`) or multi-party (`Group`).
///
/// `name` is authoritative only for group chats; a direct chat's display
/// name is derived from the non-self participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChatKind,
    pub created_at: DateTime<Utc>,
    /// Exactly 2 entries for a direct chat.
    #[serde(default)]
    pub participants: Vec<Participant>,
}

/// Relates a [`Chat`] to a [`User`]; owned by the chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub joined_at: DateTime<Utc>,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message in a timeline.
///
/// Timelines are append-ordered sequences, never re-sorted; arrival order
/// is trust order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub sender: User,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_user() {
        let user = User::placeholder(UserId(42));
        assert_eq!(user.id, UserId(42));
        assert_eq!(user.username, "user-42");
        assert!(user.created_at.is_none());
    }

    #[test]
    fn test_chat_decodes_wire_shape() {
        let json = r#"{
            "id": 7,
            "name": "",
            "type": "direct",
            "createdAt": "2024-05-01T12:00:00Z",
            "participants": []
        }"#;
        let chat: Chat = serde_json::from_str(json).unwrap();
        assert_eq!(chat.id, ChatId(7));
        assert_eq!(chat.kind, ChatKind::Direct);
        assert!(chat.participants.is_empty());
    }
}
