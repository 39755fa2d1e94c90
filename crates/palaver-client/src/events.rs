//! Events pushed to the presentation layer.
//!
//! The session emits these over an unbounded mpsc channel whenever store
//! state changes behind the UI's back. Payloads derive `Serialize` so a
//! host shell can forward them over IPC unchanged.

use serde::Serialize;
use tokio::sync::mpsc;

use palaver_shared::model::Message;
use palaver_shared::types::{ChatId, ConnectionStatus, UserId};

#[derive(Debug, Clone, Serialize)]
pub enum UiEvent {
    /// A new message entered a chat's timeline.
    MessageReceived { message: Message },

    /// A message arrived in a chat that is not active: show it on the
    /// notification surface.
    #[serde(rename_all = "camelCase")]
    Notification {
        chat_id: ChatId,
        sender: String,
        content: String,
    },

    /// A user went online or offline.
    #[serde(rename_all = "camelCase")]
    PresenceChanged {
        user_id: UserId,
        username: String,
        online: bool,
    },

    /// A chat's set of typing users changed.
    #[serde(rename_all = "camelCase")]
    TypingChanged { chat_id: ChatId },

    /// The realtime channel's state changed.
    ConnectionChanged { status: ConnectionStatus },
}

/// Push an event to the presentation layer, tolerating a dropped
/// receiver during teardown.
pub(crate) fn emit(tx: &mpsc::UnboundedSender<UiEvent>, event: UiEvent) {
    if tx.send(event).is_err() {
        tracing::debug!("UI event receiver dropped");
    }
}
