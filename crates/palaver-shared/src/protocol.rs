//! Wire protocol for the realtime channel.
//!
//! Both directions are JSON frames of the form
//! `{"event": "<name>", "data": {...}}`. Inbound frames with an unknown
//! event name fail to decode and are skipped by the channel task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::User;
use crate::types::{ChatId, MessageStatus, UserId};

/// Events pushed from the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    ReceiveMessage(MessagePayload),
    UserOnline(PresencePayload),
    UserOffline(PresencePayload),
    UserTyping(TypingPayload),
}

/// Invocations sent from the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ClientInvocation {
    JoinUser(PresencePayload),
    JoinChat(RoomPayload),
    LeaveChat(RoomPayload),
    SendMessageToChat(SendMessagePayload),
    SendTyping(SendTypingPayload),
    MarkMessagesAsRead(MarkReadPayload),
}

/// A message as carried on the realtime channel.
///
/// The server sends two variants of this shape: the full one carries a
/// resolved `sender` object, the lightweight one only `senderUsername`.
/// Both decode into this struct; the store normalizes the difference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    /// Server-assigned id. Absent or non-positive on lightweight events.
    #[serde(default)]
    pub id: Option<i64>,
    pub chat_id: ChatId,
    pub sender_id: UserId,
    #[serde(default)]
    pub sender: Option<User>,
    #[serde(default)]
    pub sender_username: Option<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<MessageStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    pub user_id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub username: String,
    pub is_typing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomPayload {
    pub chat_id: ChatId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub chat_id: ChatId,
    pub message: MessagePayload,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SendTypingPayload {
    pub chat_id: ChatId,
    pub is_typing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadPayload {
    pub chat_id: ChatId,
    pub last_read_message_id: i64,
}

impl ServerEvent {
    /// Decode an inbound text frame.
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }
}

impl ClientInvocation {
    /// Encode an outbound invocation as a text frame.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageStatus;

    #[test]
    fn test_invocation_roundtrip() {
        let invocation = ClientInvocation::SendTyping(SendTypingPayload {
            chat_id: ChatId(7),
            is_typing: true,
        });

        let json = invocation.to_json().unwrap();
        let restored: ClientInvocation = serde_json::from_str(&json).unwrap();
        assert_eq!(invocation, restored);
    }

    #[test]
    fn test_full_message_event_decodes() {
        let json = r#"{
            "event": "ReceiveMessage",
            "data": {
                "id": 555,
                "chatId": 7,
                "senderId": 3,
                "sender": {"id": 3, "username": "ada", "createdAt": "2024-01-01T00:00:00Z"},
                "content": "hello",
                "timestamp": "2024-05-01T12:00:00Z",
                "status": "delivered"
            }
        }"#;

        let event = ServerEvent::from_json(json).unwrap();
        let ServerEvent::ReceiveMessage(payload) = event else {
            panic!("wrong event variant");
        };
        assert_eq!(payload.id, Some(555));
        assert_eq!(payload.sender.as_ref().unwrap().username, "ada");
        assert_eq!(payload.status, Some(MessageStatus::Delivered));
    }

    #[test]
    fn test_lightweight_message_event_decodes() {
        // No id, no sender object, just the username.
        let json = r#"{
            "event": "ReceiveMessage",
            "data": {
                "chatId": 7,
                "senderId": 3,
                "senderUsername": "ada",
                "content": "hello",
                "timestamp": "2024-05-01T12:00:00Z"
            }
        }"#;

        let event = ServerEvent::from_json(json).unwrap();
        let ServerEvent::ReceiveMessage(payload) = event else {
            panic!("wrong event variant");
        };
        assert_eq!(payload.id, None);
        assert!(payload.sender.is_none());
        assert_eq!(payload.sender_username.as_deref(), Some("ada"));
    }

    #[test]
    fn test_typing_event_decodes() {
        let json = r#"{
            "event": "UserTyping",
            "data": {"chatId": 7, "userId": 3, "username": "ada", "isTyping": true}
        }"#;

        let event = ServerEvent::from_json(json).unwrap();
        assert_eq!(
            event,
            ServerEvent::UserTyping(TypingPayload {
                chat_id: ChatId(7),
                user_id: UserId(3),
                username: "ada".to_string(),
                is_typing: true,
            })
        );
    }
}
