//! Outbound typing indicator with keystroke debounce.
//!
//! The first keystroke announces `typing = true`; every keystroke
//! (re)arms a timer whose expiry announces `typing = false`. The signal
//! is fire-and-forget and changes no local state; the sender never sees
//! its own indicator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use palaver_net::ChannelCommand;
use palaver_shared::types::ChatId;

use crate::session::Session;

pub(crate) struct TypingDebounce {
    channel_tx: mpsc::Sender<ChannelCommand>,
    debounce: Duration,
    timers: Arc<Mutex<HashMap<ChatId, JoinHandle<()>>>>,
}

impl TypingDebounce {
    pub(crate) fn new(channel_tx: mpsc::Sender<ChannelCommand>, debounce: Duration) -> Self {
        Self {
            channel_tx,
            debounce,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a keystroke in a chat's composer.
    pub(crate) async fn keystroke(&self, chat_id: ChatId) {
        let already_typing = match self.timers.lock() {
            Ok(mut timers) => match timers.remove(&chat_id) {
                Some(timer) => {
                    timer.abort();
                    true
                }
                None => false,
            },
            Err(_) => return,
        };

        if !already_typing {
            let _ = self
                .channel_tx
                .send(ChannelCommand::SendTyping {
                    chat_id,
                    is_typing: true,
                })
                .await;
        }

        let channel_tx = self.channel_tx.clone();
        let timers = Arc::clone(&self.timers);
        let debounce = self.debounce;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Ok(mut timers) = timers.lock() {
                timers.remove(&chat_id);
            }
            let _ = channel_tx
                .send(ChannelCommand::SendTyping {
                    chat_id,
                    is_typing: false,
                })
                .await;
        });

        if let Ok(mut timers) = self.timers.lock() {
            timers.insert(chat_id, timer);
        }
    }

    /// Abort all armed timers without sending anything.
    pub(crate) fn shutdown(&self) {
        if let Ok(mut timers) = self.timers.lock() {
            for (_, timer) in timers.drain() {
                timer.abort();
            }
        }
    }
}

impl Session {
    /// Register a keystroke in a chat's composer, debouncing the
    /// realtime typing signal.
    pub async fn notify_typing(&self, chat_id: ChatId) {
        self.typing.keystroke(chat_id).await;
    }
}
