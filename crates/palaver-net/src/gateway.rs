//! Remote Data Gateway: a stateless wrapper over the chat service's REST
//! API.
//!
//! Every operation is a single request/response pair. The gateway performs
//! no retries and no caching; user-lookup caching during message enrichment
//! is the session's responsibility, scoped per call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use palaver_shared::model::{Chat, Message, User};
use palaver_shared::types::{ChatId, MessageId, MessageStatus, UserId};

use crate::error::{NetError, Result};

/// A message as returned by the REST API.
///
/// `sender` may be absent on history pages; the session enriches it
/// through the user-lookup cache before the message enters the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: i64,
    pub chat_id: ChatId,
    pub sender_id: UserId,
    #[serde(default)]
    pub sender: Option<User>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
}

impl MessageDto {
    /// Promote the wire record into a domain message with a resolved sender.
    pub fn into_message(self, sender: User) -> Message {
        Message {
            id: MessageId::Confirmed(self.id),
            chat_id: self.chat_id,
            sender_id: self.sender_id,
            sender,
            content: self.content,
            timestamp: self.timestamp,
            status: self.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateGroupChatRequest<'a> {
    name: &'a str,
    participant_user_ids: &'a [UserId],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDirectChatRequest {
    user_id1: UserId,
    user_id2: UserId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest<'a> {
    sender_id: UserId,
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateMessageStatusRequest {
    status: MessageStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest<'a> {
    username: &'a str,
}

/// REST client for the chat service.
#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
}

impl Gateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// List all chats the user participates in.
    pub async fn list_chats(&self, user_id: UserId) -> Result<Vec<Chat>> {
        let response = self
            .http
            .get(self.url(&format!("/chat/user/{user_id}")))
            .send()
            .await?;
        let chats: Vec<Chat> = check("list chats", response)?.json().await?;
        debug!(user = %user_id, count = chats.len(), "Fetched chat list");
        Ok(chats)
    }

    pub async fn get_chat(&self, chat_id: ChatId) -> Result<Chat> {
        let response = self
            .http
            .get(self.url(&format!("/chat/{chat_id}")))
            .send()
            .await?;
        Ok(check("get chat", response)?.json().await?)
    }

    pub async fn create_group_chat(&self, name: &str, participants: &[UserId]) -> Result<Chat> {
        let response = self
            .http
            .post(self.url("/chat"))
            .json(&CreateGroupChatRequest {
                name,
                participant_user_ids: participants,
            })
            .send()
            .await?;
        Ok(check("create group chat", response)?.json().await?)
    }

    /// Create a direct chat, or fetch the existing one if the pair already
    /// has a conversation (the endpoint is idempotent server-side).
    pub async fn create_direct_chat(&self, user_id1: UserId, user_id2: UserId) -> Result<Chat> {
        let response = self
            .http
            .post(self.url("/chat/direct"))
            .json(&CreateDirectChatRequest { user_id1, user_id2 })
            .send()
            .await?;
        Ok(check("create direct chat", response)?.json().await?)
    }

    pub async fn delete_chat(&self, chat_id: ChatId) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/chat/{chat_id}")))
            .send()
            .await?;
        check("delete chat", response)?;
        Ok(())
    }

    /// Fetch one page of message history, newest page first on the server
    /// side, `take` messages starting `skip` from the end.
    pub async fn list_messages(
        &self,
        chat_id: ChatId,
        take: u32,
        skip: u32,
    ) -> Result<Vec<MessageDto>> {
        let response = self
            .http
            .get(self.url(&format!("/chat/{chat_id}/messages")))
            .query(&[("take", take), ("skip", skip)])
            .send()
            .await?;
        let page: Vec<MessageDto> = check("list messages", response)?.json().await?;
        debug!(chat = %chat_id, count = page.len(), "Fetched message page");
        Ok(page)
    }

    pub async fn send_message(
        &self,
        chat_id: ChatId,
        sender_id: UserId,
        content: &str,
    ) -> Result<MessageDto> {
        let response = self
            .http
            .post(self.url(&format!("/chat/{chat_id}/messages")))
            .json(&SendMessageRequest { sender_id, content })
            .send()
            .await?;
        Ok(check("send message", response)?.json().await?)
    }

    pub async fn update_message_status(
        &self,
        chat_id: ChatId,
        message_id: i64,
        status: MessageStatus,
    ) -> Result<()> {
        let response = self
            .http
            .put(self.url(&format!("/chat/{chat_id}/messages/{message_id}/status")))
            .json(&UpdateMessageStatusRequest { status })
            .send()
            .await?;
        check("update message status", response)?;
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let response = self.http.get(self.url("/users")).send().await?;
        Ok(check("list users", response)?.json().await?)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<User> {
        let response = self
            .http
            .get(self.url(&format!("/users/{user_id}")))
            .send()
            .await?;
        Ok(check("get user", response)?.json().await?)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<User> {
        let response = self
            .http
            .get(self.url(&format!("/users/username/{username}")))
            .send()
            .await?;
        Ok(check("get user by username", response)?.json().await?)
    }

    pub async fn create_user(&self, username: &str) -> Result<User> {
        let response = self
            .http
            .post(self.url("/users"))
            .json(&CreateUserRequest { username })
            .send()
            .await?;
        Ok(check("create user", response)?.json().await?)
    }
}

/// Map a non-success status to a typed error.
fn check(operation: &'static str, response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(NetError::Status {
            operation,
            status: response.status(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let gateway = Gateway::new("http://localhost:5000/api/");
        assert_eq!(
            gateway.url("/chat/7"),
            "http://localhost:5000/api/chat/7"
        );
    }

    #[test]
    fn test_direct_chat_request_wire_shape() {
        let body = CreateDirectChatRequest {
            user_id1: UserId(1),
            user_id2: UserId(42),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"userId1": 1, "userId2": 42})
        );
    }

    #[test]
    fn test_dto_promotes_to_confirmed_id() {
        let dto = MessageDto {
            id: 555,
            chat_id: ChatId(7),
            sender_id: UserId(3),
            sender: None,
            content: "hello".to_string(),
            timestamp: Utc::now(),
            status: MessageStatus::Sent,
        };

        let message = dto.into_message(User::placeholder(UserId(3)));
        assert_eq!(message.id, MessageId::Confirmed(555));
        assert_eq!(message.sender.id, UserId(3));
    }
}
