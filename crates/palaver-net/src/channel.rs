//! Realtime channel client with a tokio mpsc command/notification pattern.
//!
//! The WebSocket connection lives in a dedicated tokio task. External code
//! communicates with it through typed command and notification channels,
//! keeping the transport fully asynchronous and decoupled from the store.
//!
//! Outbound invocations are silently skipped while the connection is down:
//! nothing is queued and nothing errors. Inbound events are delivered in
//! arrival order; nothing is replayed across a reconnect, and gap
//! recovery is the store's REST refetch concern.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use palaver_shared::protocol::{
    ClientInvocation, MarkReadPayload, MessagePayload, PresencePayload, RoomPayload,
    SendMessagePayload, SendTypingPayload, ServerEvent,
};
use palaver_shared::types::{ChatId, ConnectionStatus, UserId};

use crate::backoff::ReconnectPolicy;
use crate::error::{NetError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ---------------------------------------------------------------------------
// Command / notification types
// ---------------------------------------------------------------------------

/// Commands sent *into* the channel task.
#[derive(Debug, Clone)]
pub enum ChannelCommand {
    /// Announce the local user to the server.
    JoinUser { user_id: UserId, username: String },
    /// Join a chat room to receive its events.
    JoinChat(ChatId),
    /// Leave a chat room.
    LeaveChat(ChatId),
    /// Publish a message to a chat room.
    SendMessage {
        chat_id: ChatId,
        message: MessagePayload,
    },
    /// Signal that the local user started or stopped typing.
    SendTyping { chat_id: ChatId, is_typing: bool },
    /// Tell the server everything up to a message has been read.
    MarkRead {
        chat_id: ChatId,
        last_read_message_id: i64,
    },
    /// Gracefully shut down the channel task.
    Shutdown,
}

impl ChannelCommand {
    /// The wire invocation for this command; `None` for [`Shutdown`].
    ///
    /// [`Shutdown`]: ChannelCommand::Shutdown
    fn invocation(self) -> Option<ClientInvocation> {
        match self {
            ChannelCommand::JoinUser { user_id, username } => Some(ClientInvocation::JoinUser(
                PresencePayload { user_id, username },
            )),
            ChannelCommand::JoinChat(chat_id) => {
                Some(ClientInvocation::JoinChat(RoomPayload { chat_id }))
            }
            ChannelCommand::LeaveChat(chat_id) => {
                Some(ClientInvocation::LeaveChat(RoomPayload { chat_id }))
            }
            ChannelCommand::SendMessage { chat_id, message } => Some(
                ClientInvocation::SendMessageToChat(SendMessagePayload { chat_id, message }),
            ),
            ChannelCommand::SendTyping { chat_id, is_typing } => Some(
                ClientInvocation::SendTyping(SendTypingPayload { chat_id, is_typing }),
            ),
            ChannelCommand::MarkRead {
                chat_id,
                last_read_message_id,
            } => Some(ClientInvocation::MarkMessagesAsRead(MarkReadPayload {
                chat_id,
                last_read_message_id,
            })),
            ChannelCommand::Shutdown => None,
        }
    }
}

/// Notifications sent *from* the channel task to the application.
#[derive(Debug, Clone)]
pub enum ChannelNotification {
    /// A server event arrived on the wire.
    Event(ServerEvent),
    /// The connection state changed.
    ConnectionChanged(ConnectionStatus),
}

/// Configuration for spawning the channel task.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Primary realtime endpoint.
    pub url: String,
    /// Tried when the primary endpoint refuses the connection.
    pub fallback_url: String,
    pub reconnect: ReconnectPolicy,
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// Connect to the realtime endpoint and spawn the channel task.
///
/// The initial connect happens before the task is spawned: if both the
/// primary and the fallback endpoint fail, the error is returned here and
/// no task exists, and the caller must not treat that as connected.
///
/// # Returns
///
/// `(command_tx, notification_rx)`
pub async fn spawn_channel(
    config: ChannelConfig,
) -> Result<(
    mpsc::Sender<ChannelCommand>,
    mpsc::Receiver<ChannelNotification>,
)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<ChannelCommand>(256);
    let (notif_tx, notif_rx) = mpsc::channel::<ChannelNotification>(256);

    // Buffered ahead of the connect so consumers observe the full
    // connecting -> connected sequence in order.
    let _ = notif_tx.try_send(ChannelNotification::ConnectionChanged(
        ConnectionStatus::Connecting,
    ));

    let ws = connect_either(&config).await?;

    tokio::spawn(run(config, ws, cmd_rx, notif_tx));

    Ok((cmd_tx, notif_rx))
}

/// Why the connected phase ended.
enum Exit {
    /// The socket dropped or errored; try to reconnect.
    Lost,
    /// Shutdown was requested or every command sender is gone.
    Shutdown,
}

async fn run(
    config: ChannelConfig,
    mut ws: WsStream,
    mut cmd_rx: mpsc::Receiver<ChannelCommand>,
    notif_tx: mpsc::Sender<ChannelNotification>,
) {
    let _ = notif_tx
        .send(ChannelNotification::ConnectionChanged(
            ConnectionStatus::Connected,
        ))
        .await;

    loop {
        match drive(&mut ws, &mut cmd_rx, &notif_tx).await {
            Exit::Shutdown => break,
            Exit::Lost => {}
        }

        let _ = notif_tx
            .send(ChannelNotification::ConnectionChanged(
                ConnectionStatus::Reconnecting,
            ))
            .await;

        match reconnect(&config, &mut cmd_rx).await {
            Some(stream) => {
                ws = stream;
                let _ = notif_tx
                    .send(ChannelNotification::ConnectionChanged(
                        ConnectionStatus::Connected,
                    ))
                    .await;
            }
            None => {
                let _ = notif_tx
                    .send(ChannelNotification::ConnectionChanged(
                        ConnectionStatus::Disconnected,
                    ))
                    .await;
                break;
            }
        }
    }

    info!("Realtime channel task terminated");
}

/// Pump commands out and events in until the socket dies or shutdown is
/// requested.
async fn drive(
    ws: &mut WsStream,
    cmd_rx: &mut mpsc::Receiver<ChannelCommand>,
    notif_tx: &mpsc::Sender<ChannelNotification>,
) -> Exit {
    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ChannelCommand::Shutdown) | None => {
                        let _ = ws.close(None).await;
                        return Exit::Shutdown;
                    }
                    Some(cmd) => {
                        let Some(invocation) = cmd.invocation() else { continue };
                        let frame = match invocation.to_json() {
                            Ok(frame) => frame,
                            Err(e) => {
                                error!(error = %e, "Failed to encode invocation");
                                continue;
                            }
                        };
                        if let Err(e) = ws.send(WsMessage::Text(frame)).await {
                            warn!(error = %e, "Send failed, connection lost");
                            return Exit::Lost;
                        }
                    }
                }
            }

            frame = ws.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        match ServerEvent::from_json(&text) {
                            Ok(event) => {
                                if notif_tx
                                    .send(ChannelNotification::Event(event))
                                    .await
                                    .is_err()
                                {
                                    // Receiver gone: the session is tearing down.
                                    return Exit::Shutdown;
                                }
                            }
                            Err(e) => {
                                debug!(error = %e, len = text.len(), "Skipping undecodable frame");
                            }
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | None => {
                        info!("Server closed the connection");
                        return Exit::Lost;
                    }
                    Some(Ok(_)) => {
                        // Ping/pong/binary frames carry no events.
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket read error");
                        return Exit::Lost;
                    }
                }
            }
        }
    }
}

/// Bounded exponential-backoff reconnect loop.
///
/// Outbound commands arriving while disconnected are dropped, not queued.
/// Returns `None` when the attempts are exhausted or shutdown was
/// requested; the connection is then permanently down until an explicit
/// restart.
async fn reconnect(
    config: &ChannelConfig,
    cmd_rx: &mut mpsc::Receiver<ChannelCommand>,
) -> Option<WsStream> {
    let mut attempt = 0;

    while config.reconnect.should_retry(attempt) {
        let delay = config.reconnect.delay(attempt);
        debug!(attempt, delay_ms = delay.as_millis() as u64, "Waiting before reconnect");

        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(ChannelCommand::Shutdown) | None => return None,
                        Some(cmd) => {
                            debug!(cmd = ?cmd, "Dropping outbound invocation while disconnected");
                        }
                    }
                }
            }
        }

        match connect_either(config).await {
            Ok(ws) => {
                info!(attempt, "Reconnected");
                return Some(ws);
            }
            Err(e) => {
                warn!(attempt, error = %e, "Reconnect attempt failed");
                attempt += 1;
            }
        }
    }

    error!(
        attempts = config.reconnect.max_attempts,
        "Reconnect attempts exhausted, connection is down"
    );
    None
}

/// Try the primary endpoint, then the fallback.
async fn connect_either(config: &ChannelConfig) -> Result<WsStream> {
    match connect_async(config.url.as_str()).await {
        Ok((ws, _)) => {
            info!(url = %config.url, "Connected to realtime endpoint");
            return Ok(ws);
        }
        Err(e) => {
            warn!(url = %config.url, error = %e, "Primary endpoint failed, trying fallback");
        }
    }

    match connect_async(config.fallback_url.as_str()).await {
        Ok((ws, _)) => {
            info!(url = %config.fallback_url, "Connected to fallback realtime endpoint");
            Ok(ws)
        }
        Err(e) => {
            warn!(url = %config.fallback_url, error = %e, "Fallback endpoint failed");
            Err(NetError::ConnectFailed {
                primary: config.url.clone(),
                fallback: config.fallback_url.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_map_to_invocations() {
        let invocation = ChannelCommand::JoinChat(ChatId(7)).invocation().unwrap();
        assert_eq!(
            invocation,
            ClientInvocation::JoinChat(RoomPayload { chat_id: ChatId(7) })
        );

        let invocation = ChannelCommand::MarkRead {
            chat_id: ChatId(7),
            last_read_message_id: 555,
        }
        .invocation()
        .unwrap();
        assert_eq!(
            invocation,
            ClientInvocation::MarkMessagesAsRead(MarkReadPayload {
                chat_id: ChatId(7),
                last_read_message_id: 555,
            })
        );
    }

    #[test]
    fn test_shutdown_has_no_wire_form() {
        assert!(ChannelCommand::Shutdown.invocation().is_none());
    }
}
