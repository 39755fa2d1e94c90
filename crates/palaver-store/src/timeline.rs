//! Timeline mutations: the optimistic-send lifecycle and the central
//! reconciliation point for realtime messages.
//!
//! Three sources feed a chat's timeline: the local optimistic echo, the
//! REST history page, and realtime push events. History pages replace the
//! timeline wholesale; everything else is appended through the dedup
//! policy so that replays and echoes of just-sent messages are silently
//! absorbed.

use chrono::{DateTime, Utc};
use tracing::debug;

use palaver_shared::constants::DEDUP_WINDOW_MS;
use palaver_shared::model::{Message, User};
use palaver_shared::protocol::MessagePayload;
use palaver_shared::types::{ChatId, MessageId, MessageStatus};

use crate::error::{Result, StoreError};
use crate::store::ChatStore;

/// Result of feeding one realtime message into the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Ingest {
    /// The message was new and was appended to its chat's timeline.
    Appended {
        message: Message,
        /// Set when the chat is not active and the sender is not the
        /// local user; the presentation layer shows this.
        notification: Option<Notification>,
    },
    /// The message matched an existing timeline entry and was dropped.
    Duplicate,
}

/// Unread notification for a message in a non-active chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub chat_id: ChatId,
    pub sender: String,
    pub content: String,
}

impl ChatStore {
    /// Replace a chat's timeline with a freshly fetched history page.
    ///
    /// This is a destructive replace, not a merge: live messages that
    /// arrived before the fetch completes are overwritten. Callers
    /// sequence this before enabling live updates for a chat, or accept
    /// last-write-wins.
    pub fn replace_timeline(&mut self, chat_id: ChatId, messages: Vec<Message>) {
        debug!(chat = %chat_id, count = messages.len(), "Replacing timeline");
        self.messages.insert(chat_id, messages);
    }

    /// Append the local echo of an outgoing message, before the network
    /// send is awaited. Returns the provisional id the send path uses to
    /// find the entry again.
    pub fn push_local_echo(
        &mut self,
        chat_id: ChatId,
        content: String,
        now: DateTime<Utc>,
    ) -> MessageId {
        let id = MessageId::Provisional(self.alloc_provisional_id());
        let sender = self.current_user.clone();
        let message = Message {
            id,
            chat_id,
            sender_id: sender.id,
            sender,
            content,
            timestamp: now,
            status: MessageStatus::Sent,
        };
        self.messages.entry(chat_id).or_default().push(message);
        id
    }

    /// Rewrite a confirmed echo in place: same array position, new id,
    /// server timestamp and status. The timeline length never changes.
    pub fn confirm_local_echo(
        &mut self,
        chat_id: ChatId,
        provisional: MessageId,
        confirmed_id: i64,
        timestamp: DateTime<Utc>,
        status: MessageStatus,
    ) -> Result<()> {
        let message = self.echo_mut(chat_id, provisional)?;
        message.id = MessageId::Confirmed(confirmed_id);
        message.timestamp = timestamp;
        message.status = status;
        Ok(())
    }

    /// Mark a failed echo in place. The message stays visible in the
    /// transcript, tagged failed.
    pub fn fail_local_echo(&mut self, chat_id: ChatId, provisional: MessageId) -> Result<()> {
        let message = self.echo_mut(chat_id, provisional)?;
        message.status = MessageStatus::Failed;
        Ok(())
    }

    fn echo_mut(&mut self, chat_id: ChatId, provisional: MessageId) -> Result<&mut Message> {
        self.messages
            .get_mut(&chat_id)
            .ok_or(StoreError::UnknownChat(chat_id))?
            .iter_mut()
            .find(|m| m.id == provisional)
            .ok_or(StoreError::UnknownMessage(provisional))
    }

    /// Reconcile one realtime message into its chat's timeline.
    ///
    /// The payload is normalized (lightweight events get a synthesized
    /// sender), tested against the timeline's dedup policy, and appended
    /// if new. Unread accounting: never for the active chat, never for
    /// the local user's own messages. Idempotent under replay.
    pub fn ingest_event_message(&mut self, payload: MessagePayload) -> Ingest {
        let message = self.normalize(payload);
        let chat_id = message.chat_id;

        let timeline = self.messages.entry(chat_id).or_default();
        if timeline.iter().any(|m| is_duplicate(m, &message)) {
            debug!(chat = %chat_id, id = %message.id, "Dropping duplicate message");
            return Ingest::Duplicate;
        }
        timeline.push(message.clone());

        let notification = if self.active_chat == Some(chat_id) {
            None
        } else if message.sender_id != self.current_user.id {
            *self.unread.entry(chat_id).or_insert(0) += 1;
            Some(Notification {
                chat_id,
                sender: message.sender.username.clone(),
                content: message.content.clone(),
            })
        } else {
            None
        };

        Ingest::Appended {
            message,
            notification,
        }
    }

    /// Normalize a wire payload into the canonical message shape.
    ///
    /// The lightweight event variant carries `senderUsername` instead of
    /// a resolved sender; synthesize one. Payloads without a positive
    /// server id get a provisional id, which never participates in
    /// id-equality dedup.
    fn normalize(&mut self, payload: MessagePayload) -> Message {
        let id = match payload.id.filter(|n| *n > 0) {
            Some(n) => MessageId::Confirmed(n),
            None => MessageId::Provisional(self.alloc_provisional_id()),
        };

        let sender = payload.sender.unwrap_or_else(|| match payload.sender_username {
            Some(username) => User {
                id: payload.sender_id,
                username,
                created_at: None,
            },
            None => User::placeholder(payload.sender_id),
        });

        Message {
            id,
            chat_id: payload.chat_id,
            sender_id: payload.sender_id,
            sender,
            content: payload.content,
            timestamp: payload.timestamp,
            status: payload.status.unwrap_or(MessageStatus::Sent),
        }
    }
}

/// Dedup test, in order: two confirmed positive ids match by equality
/// alone; otherwise same sender, same content, timestamps closer than the
/// fuzzy window.
fn is_duplicate(existing: &Message, incoming: &Message) -> bool {
    if let (Some(a), Some(b)) = (existing.id.confirmed(), incoming.id.confirmed()) {
        if a > 0 && b > 0 {
            return a == b;
        }
    }

    existing.sender_id == incoming.sender_id
        && existing.content == incoming.content
        && (existing.timestamp - incoming.timestamp)
            .num_milliseconds()
            .abs()
            < DEDUP_WINDOW_MS
}
