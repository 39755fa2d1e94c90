//! Bridges channel notifications into store mutations and UI events.
//!
//! The bridge task drains the channel's notification queue one event at a
//! time, so store mutations happen in arrival order, preserving the
//! single-writer discipline the dedup policy depends on. The lock is
//! never held across an await.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use palaver_net::ChannelNotification;
use palaver_shared::constants::{TYPING_SWEEP_INTERVAL_MS, TYPING_TTL_SECS};
use palaver_shared::protocol::ServerEvent;
use palaver_store::{ChatStore, Ingest};

use crate::events::{emit, UiEvent};

/// Spawn the notification processing loop.
pub(crate) fn spawn_bridge(
    store: Arc<Mutex<ChatStore>>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    mut notif_rx: mpsc::Receiver<ChannelNotification>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Channel notification bridge started");
        while let Some(notification) = notif_rx.recv().await {
            apply(&store, &ui_tx, notification);
        }
        warn!("Channel notification bridge ended");
    })
}

/// Apply one notification to the store and emit the matching UI events.
fn apply(
    store: &Mutex<ChatStore>,
    ui_tx: &mpsc::UnboundedSender<UiEvent>,
    notification: ChannelNotification,
) {
    let mut guard = match store.lock() {
        Ok(guard) => guard,
        Err(_) => return,
    };

    match notification {
        ChannelNotification::ConnectionChanged(status) => {
            guard.set_connection_status(status);
            drop(guard);
            emit(ui_tx, UiEvent::ConnectionChanged { status });
        }

        ChannelNotification::Event(ServerEvent::ReceiveMessage(payload)) => {
            match guard.ingest_event_message(payload) {
                Ingest::Appended {
                    message,
                    notification,
                } => {
                    drop(guard);
                    emit(ui_tx, UiEvent::MessageReceived { message });
                    if let Some(n) = notification {
                        emit(
                            ui_tx,
                            UiEvent::Notification {
                                chat_id: n.chat_id,
                                sender: n.sender,
                                content: n.content,
                            },
                        );
                    }
                }
                Ingest::Duplicate => {
                    debug!("Duplicate realtime message absorbed");
                }
            }
        }

        ChannelNotification::Event(ServerEvent::UserOnline(p)) => {
            guard.user_online(p.user_id, p.username.clone());
            drop(guard);
            emit(
                ui_tx,
                UiEvent::PresenceChanged {
                    user_id: p.user_id,
                    username: p.username,
                    online: true,
                },
            );
        }

        ChannelNotification::Event(ServerEvent::UserOffline(p)) => {
            guard.user_offline(p.user_id);
            drop(guard);
            emit(
                ui_tx,
                UiEvent::PresenceChanged {
                    user_id: p.user_id,
                    username: p.username,
                    online: false,
                },
            );
        }

        ChannelNotification::Event(ServerEvent::UserTyping(t)) => {
            let changed =
                guard.set_typing(t.chat_id, t.user_id, t.username, t.is_typing, Instant::now());
            drop(guard);
            if changed {
                emit(ui_tx, UiEvent::TypingChanged { chat_id: t.chat_id });
            }
        }
    }
}

/// Spawn the periodic sweep that expires inbound typing entries the
/// server never retracted, mirroring the outbound debounce timeout.
pub(crate) fn spawn_typing_sweep(
    store: Arc<Mutex<ChatStore>>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let ttl = Duration::from_secs(TYPING_TTL_SECS);
        let mut tick = tokio::time::interval(Duration::from_millis(TYPING_SWEEP_INTERVAL_MS));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tick.tick().await;
            let changed = match store.lock() {
                Ok(mut guard) => guard.sweep_typing(Instant::now(), ttl),
                Err(_) => break,
            };
            for chat_id in changed {
                emit(&ui_tx, UiEvent::TypingChanged { chat_id });
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use palaver_shared::model::User;
    use palaver_shared::protocol::{MessagePayload, PresencePayload};
    use palaver_shared::types::{ChatId, ConnectionStatus, UserId};

    use super::*;

    fn test_store() -> Arc<Mutex<ChatStore>> {
        Arc::new(Mutex::new(ChatStore::new(User {
            id: UserId(1),
            username: "self".to_string(),
            created_at: None,
        })))
    }

    fn test_payload(chat: i64, sender: i64, content: &str) -> MessagePayload {
        MessagePayload {
            id: Some(555),
            chat_id: ChatId(chat),
            sender_id: UserId(sender),
            sender: None,
            sender_username: Some("ada".to_string()),
            content: content.to_string(),
            timestamp: Utc::now(),
            status: None,
        }
    }

    #[test]
    fn test_receive_message_mutates_store_and_notifies() {
        let store = test_store();
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();

        apply(
            &store,
            &ui_tx,
            ChannelNotification::Event(ServerEvent::ReceiveMessage(test_payload(7, 2, "hello"))),
        );

        let guard = store.lock().unwrap();
        assert_eq!(guard.messages(ChatId(7)).len(), 1);
        assert_eq!(guard.unread(ChatId(7)), 1);
        drop(guard);

        assert!(matches!(
            ui_rx.try_recv().unwrap(),
            UiEvent::MessageReceived { .. }
        ));
        assert!(matches!(
            ui_rx.try_recv().unwrap(),
            UiEvent::Notification { .. }
        ));
    }

    #[test]
    fn test_duplicate_emits_nothing() {
        let store = test_store();
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();

        let event =
            ChannelNotification::Event(ServerEvent::ReceiveMessage(test_payload(7, 2, "hello")));
        apply(&store, &ui_tx, event.clone());
        let _ = ui_rx.try_recv();
        let _ = ui_rx.try_recv();

        apply(&store, &ui_tx, event);

        assert_eq!(store.lock().unwrap().messages(ChatId(7)).len(), 1);
        assert!(ui_rx.try_recv().is_err());
    }

    #[test]
    fn test_connection_change_reaches_store_and_ui() {
        let store = test_store();
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();

        apply(
            &store,
            &ui_tx,
            ChannelNotification::ConnectionChanged(ConnectionStatus::Reconnecting),
        );

        assert_eq!(
            store.lock().unwrap().connection_status(),
            ConnectionStatus::Reconnecting
        );
        assert!(matches!(
            ui_rx.try_recv().unwrap(),
            UiEvent::ConnectionChanged {
                status: ConnectionStatus::Reconnecting
            }
        ));
    }

    #[test]
    fn test_presence_events_are_idempotent_in_store() {
        let store = test_store();
        let (ui_tx, _ui_rx) = mpsc::unbounded_channel();

        let online = ChannelNotification::Event(ServerEvent::UserOnline(PresencePayload {
            user_id: UserId(2),
            username: "ada".to_string(),
        }));
        apply(&store, &ui_tx, online.clone());
        apply(&store, &ui_tx, online);

        let guard = store.lock().unwrap();
        assert!(guard.is_online(UserId(2)));
        assert_eq!(guard.online_users().count(), 1);
    }
}
