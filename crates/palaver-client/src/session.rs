//! One authenticated session: the store, its network collaborators, and
//! the background tasks that keep them in sync.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use palaver_net::{spawn_channel, ChannelCommand, ChannelConfig, Gateway};
use palaver_shared::constants::TYPING_DEBOUNCE_MS;
use palaver_shared::model::User;
use palaver_store::ChatStore;

use crate::bridge;
use crate::commands::TypingDebounce;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::UiEvent;

/// A live client session.
///
/// Created once per authenticated user; destroyed with
/// [`shutdown`](Self::shutdown), which consumes the session so no command
/// continuation can mutate state that no longer exists.
pub struct Session {
    pub(crate) config: ClientConfig,
    pub(crate) current_user: User,
    pub(crate) store: Arc<Mutex<ChatStore>>,
    pub(crate) gateway: Gateway,
    pub(crate) channel_tx: mpsc::Sender<ChannelCommand>,
    pub(crate) typing: TypingDebounce,
    bridge: JoinHandle<()>,
    sweeper: JoinHandle<()>,
}

impl Session {
    /// Connect the realtime channel, announce the user, and start the
    /// background tasks.
    ///
    /// Returns the session and the receiver of [`UiEvent`]s the
    /// presentation layer listens on. A failed connect (primary and
    /// fallback endpoint both down) fails the whole call.
    pub async fn connect(
        config: ClientConfig,
        current_user: User,
    ) -> Result<(Self, mpsc::UnboundedReceiver<UiEvent>), ClientError> {
        let gateway = Gateway::new(&config.api_base);

        let channel_config = ChannelConfig {
            url: config.ws_url.clone(),
            fallback_url: config.ws_fallback_url.clone(),
            reconnect: config.reconnect.clone(),
        };
        let (channel_tx, notif_rx) = spawn_channel(channel_config).await?;

        channel_tx
            .send(ChannelCommand::JoinUser {
                user_id: current_user.id,
                username: current_user.username.clone(),
            })
            .await
            .map_err(|_| ClientError::ChannelGone)?;

        let store = Arc::new(Mutex::new(ChatStore::new(current_user.clone())));
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();

        let bridge = bridge::spawn_bridge(store.clone(), ui_tx.clone(), notif_rx);
        let sweeper = bridge::spawn_typing_sweep(store.clone(), ui_tx.clone());
        let typing = TypingDebounce::new(
            channel_tx.clone(),
            Duration::from_millis(TYPING_DEBOUNCE_MS),
        );

        info!(user = %current_user.id, "Session connected");

        Ok((
            Self {
                config,
                current_user,
                store,
                gateway,
                channel_tx,
                typing,
                bridge,
                sweeper,
            },
            ui_rx,
        ))
    }

    /// The authenticated user this session belongs to.
    pub fn current_user(&self) -> &User {
        &self.current_user
    }

    /// Shared handle to the store, for presentation-layer reads.
    pub fn store(&self) -> Arc<Mutex<ChatStore>> {
        self.store.clone()
    }

    pub(crate) fn lock_store(&self) -> Result<MutexGuard<'_, ChatStore>, ClientError> {
        self.store.lock().map_err(|_| ClientError::StatePoisoned)
    }

    /// Tear the session down: stop the typing timers, the sweep tick and
    /// the realtime channel, and wait for the bridge to drain.
    pub async fn shutdown(self) {
        info!("Shutting down session");
        self.typing.shutdown();
        self.sweeper.abort();
        let _ = self.channel_tx.send(ChannelCommand::Shutdown).await;
        // The bridge ends once the channel task drops its notification
        // sender, so this does not hang.
        let _ = self.bridge.await;
    }
}
