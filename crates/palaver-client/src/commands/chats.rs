//! Chat-list commands: load, create, delete, and active selection.

use tracing::{info, warn};

use palaver_net::ChannelCommand;
use palaver_shared::model::Chat;
use palaver_shared::types::{ChatId, UserId};

use crate::error::ClientError;
use crate::session::Session;

impl Session {
    /// Fetch all chats for the current user and replace the list.
    ///
    /// Fail-soft: on error the existing list is left untouched and the
    /// error is surfaced for the caller to report.
    pub async fn load_chats(&self) -> Result<(), ClientError> {
        self.lock_store()?.set_loading(true);

        let result = self.gateway.list_chats(self.current_user.id).await;

        let mut store = self.lock_store()?;
        store.set_loading(false);
        match result {
            Ok(chats) => {
                info!(count = chats.len(), "Loaded chat list");
                store.set_chats(chats);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load chat list");
                Err(e.into())
            }
        }
    }

    /// Create a direct chat with another user, or fetch the existing one.
    pub async fn create_direct_chat(&self, other: UserId) -> Result<Chat, ClientError> {
        let chat = self
            .gateway
            .create_direct_chat(self.current_user.id, other)
            .await?;
        self.lock_store()?.upsert_chat(chat.clone());
        Ok(chat)
    }

    /// Create a group chat with the given members.
    pub async fn create_group_chat(
        &self,
        name: &str,
        members: &[UserId],
    ) -> Result<Chat, ClientError> {
        let chat = self.gateway.create_group_chat(name, members).await?;
        self.lock_store()?.upsert_chat(chat.clone());
        Ok(chat)
    }

    /// Delete a chat remotely, then drop it from local state. A failed
    /// remote delete leaves the chat list unchanged.
    pub async fn delete_chat(&self, chat_id: ChatId) -> Result<(), ClientError> {
        self.gateway.delete_chat(chat_id).await?;
        self.lock_store()?.remove_chat(chat_id);
        info!(chat = %chat_id, "Chat deleted");
        Ok(())
    }

    /// Change the active chat: clear its unread counter, load its
    /// history, move room membership from the previous chat to the new
    /// one, and mark the loaded messages as read.
    pub async fn set_active_chat(&self, chat: Option<&Chat>) -> Result<(), ClientError> {
        let previous = {
            let mut store = self.lock_store()?;
            let previous = store.active_chat();
            store.set_active_chat(chat.map(|c| c.id));
            previous
        };

        let Some(chat) = chat else {
            return Ok(());
        };

        if let Err(e) = self.load_messages(chat.id).await {
            // The selection stands; the transcript refreshes on the next
            // successful load.
            warn!(chat = %chat.id, error = %e, "Failed to load messages for active chat");
        }

        if let Some(previous) = previous.filter(|p| *p != chat.id) {
            let _ = self
                .channel_tx
                .send(ChannelCommand::LeaveChat(previous))
                .await;
        }
        let _ = self.channel_tx.send(ChannelCommand::JoinChat(chat.id)).await;

        let last_read = self
            .lock_store()?
            .messages(chat.id)
            .iter()
            .rev()
            .find_map(|m| m.id.confirmed());
        if let Some(last_read_message_id) = last_read {
            let _ = self
                .channel_tx
                .send(ChannelCommand::MarkRead {
                    chat_id: chat.id,
                    last_read_message_id,
                })
                .await;
        }

        Ok(())
    }
}
