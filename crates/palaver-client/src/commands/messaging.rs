//! Message commands: history loading with sender enrichment, and the
//! optimistic send path.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use palaver_net::ChannelCommand;
use palaver_shared::model::User;
use palaver_shared::protocol::MessagePayload;
use palaver_shared::types::{ChatId, MessageId, UserId};

use crate::error::ClientError;
use crate::session::Session;

impl Session {
    /// Fetch one page of history and replace the chat's timeline.
    ///
    /// Senders are enriched through a per-call cache: at most one remote
    /// lookup per distinct unknown sender, and a lookup failure degrades
    /// to a placeholder identity rather than failing the page.
    ///
    /// The replace is destructive: live messages that arrived for this
    /// chat before the fetch completed are overwritten. Callers sequence
    /// this before joining the chat's room, or accept last-write-wins.
    pub async fn load_messages(&self, chat_id: ChatId) -> Result<(), ClientError> {
        let page = self
            .gateway
            .list_messages(chat_id, self.config.page_size, 0)
            .await?;

        let mut cache: HashMap<UserId, User> = HashMap::new();
        cache.insert(self.current_user.id, self.current_user.clone());

        let mut messages = Vec::with_capacity(page.len());
        for dto in page {
            let sender = match &dto.sender {
                Some(sender) => sender.clone(),
                None => self.resolve_sender(&mut cache, dto.sender_id).await,
            };
            messages.push(dto.into_message(sender));
        }

        self.lock_store()?.replace_timeline(chat_id, messages);
        Ok(())
    }

    async fn resolve_sender(&self, cache: &mut HashMap<UserId, User>, sender_id: UserId) -> User {
        if let Some(user) = cache.get(&sender_id) {
            return user.clone();
        }

        let user = match self.gateway.get_user(sender_id).await {
            Ok(user) => user,
            Err(e) => {
                warn!(user = %sender_id, error = %e, "Could not resolve sender, using placeholder");
                User::placeholder(sender_id)
            }
        };
        // Placeholders are cached too: one lookup per sender per call.
        cache.insert(sender_id, user.clone());
        user
    }

    /// Send a message with an optimistic local echo.
    ///
    /// The echo is appended synchronously before the network call is
    /// awaited, so a realtime message arriving mid-send sees it. On
    /// success the echo is rewritten in place with the server id; on
    /// failure it stays visible tagged failed and the error is re-raised.
    /// There is no automatic retry.
    pub async fn send_message(
        &self,
        chat_id: ChatId,
        content: impl Into<String>,
    ) -> Result<MessageId, ClientError> {
        let content = content.into();
        let provisional = self
            .lock_store()?
            .push_local_echo(chat_id, content.clone(), Utc::now());

        match self
            .gateway
            .send_message(chat_id, self.current_user.id, &content)
            .await
        {
            Ok(dto) => {
                if let Err(e) = self.lock_store()?.confirm_local_echo(
                    chat_id,
                    provisional,
                    dto.id,
                    dto.timestamp,
                    dto.status,
                ) {
                    // The chat was deleted while the send was in flight.
                    debug!(chat = %chat_id, error = %e, "Echo vanished before confirmation");
                }

                // Best-effort realtime publish so room members get the
                // push; the dedup rule absorbs the echo on every client.
                let payload = MessagePayload {
                    id: Some(dto.id),
                    chat_id,
                    sender_id: self.current_user.id,
                    sender: Some(self.current_user.clone()),
                    sender_username: Some(self.current_user.username.clone()),
                    content,
                    timestamp: dto.timestamp,
                    status: Some(dto.status),
                };
                let _ = self
                    .channel_tx
                    .send(ChannelCommand::SendMessage {
                        chat_id,
                        message: payload,
                    })
                    .await;

                info!(chat = %chat_id, id = dto.id, "Message sent");
                Ok(MessageId::Confirmed(dto.id))
            }
            Err(e) => {
                warn!(chat = %chat_id, error = %e, "Send failed, marking echo failed");
                if let Err(store_err) = self.lock_store()?.fail_local_echo(chat_id, provisional) {
                    debug!(chat = %chat_id, error = %store_err, "Echo vanished before failure could be recorded");
                }
                Err(e.into())
            }
        }
    }
}
