// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime channel for the Pulse chat client.
//!
//! One [`RealtimeChannel`] exists per authenticated session. It owns a
//! persistent WebSocket connection whose handshake carries the current
//! access credential, walks the lifecycle
//! `Disconnected -> Connecting -> Connected -> (Disconnected | Reconnecting)`,
//! and funnels inbound push events to the reconciliation layer. The channel
//! performs no deduplication and no queuing: sends are rejected immediately
//! unless the state is `Connected`.
//!
//! Reconnection after a network-level drop is bounded (configurable attempt
//! count, delay growing with the attempt number) and reads the *current*
//! credential from the store on every attempt, so a token renewed while
//! disconnected is honored on reconnect. Cancelling the session scope tears
//! the connection down for good.

pub mod protocol;

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pulse_api::CredentialStore;
use pulse_config::RealtimeConfig;
use pulse_core::{ChannelEvent, ChannelState, MessagePort, OutboundMessage, PulseError};

use crate::protocol::WireFrame;

/// Cloneable handle onto the session's realtime connection task.
#[derive(Debug, Clone)]
pub struct RealtimeChannel {
    state_rx: watch::Receiver<ChannelState>,
    outbound_tx: mpsc::Sender<WireFrame>,
}

impl RealtimeChannel {
    /// Spawns the connection task for the current session.
    ///
    /// Requires a present credential: the channel never connects
    /// unauthenticated. Inbound events are delivered on `events`;
    /// cancelling `session` closes the connection and ends the task.
    pub fn spawn(
        config: RealtimeConfig,
        credentials: CredentialStore,
        events: mpsc::Sender<ChannelEvent>,
        session: CancellationToken,
    ) -> Result<Self, PulseError> {
        if credentials.get().is_none() {
            return Err(PulseError::Channel {
                message: "cannot open realtime channel without an access credential".into(),
                source: None,
            });
        }

        let (state_tx, state_rx) = watch::channel(ChannelState::Disconnected);
        let (outbound_tx, outbound_rx) = mpsc::channel(64);

        tokio::spawn(run_loop(
            config,
            credentials,
            events,
            session,
            state_tx,
            outbound_rx,
        ));

        Ok(Self {
            state_rx,
            outbound_tx,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChannelState {
        *self.state_rx.borrow()
    }

    /// A watch receiver over state transitions, for the view layer.
    pub fn watch_state(&self) -> watch::Receiver<ChannelState> {
        self.state_rx.clone()
    }

    /// Waits until the channel reaches `target` or `timeout` elapses.
    pub async fn wait_for(
        &self,
        target: ChannelState,
        timeout: Duration,
    ) -> Result<(), PulseError> {
        let mut state_rx = self.state_rx.clone();
        tokio::time::timeout(timeout, state_rx.wait_for(|s| *s == target))
            .await
            .map_err(|_| PulseError::Channel {
                message: format!("timed out waiting for channel state {target}"),
                source: None,
            })?
            .map_err(|_| PulseError::Channel {
                message: "realtime connection task ended".into(),
                source: None,
            })?;
        Ok(())
    }

    /// Fire-and-forget send; rejected immediately unless `Connected`.
    pub async fn send(&self, message: OutboundMessage) -> Result<(), PulseError> {
        if self.state() != ChannelState::Connected {
            return Err(PulseError::NotConnected);
        }
        self.outbound_tx
            .send(WireFrame::from(message))
            .await
            .map_err(|_| PulseError::NotConnected)
    }
}

#[async_trait]
impl MessagePort for RealtimeChannel {
    fn state(&self) -> ChannelState {
        RealtimeChannel::state(self)
    }

    async fn send(&self, message: OutboundMessage) -> Result<(), PulseError> {
        RealtimeChannel::send(self, message).await
    }
}

/// Why `drive` returned.
#[derive(Debug, PartialEq, Eq)]
enum Exit {
    /// Session ended (logout or forced logout): no reconnect.
    Shutdown,
    /// Network-level drop while the session still lives.
    Dropped,
}

/// Connection loop: connect, drive, reconnect with bounded backoff.
async fn run_loop(
    config: RealtimeConfig,
    credentials: CredentialStore,
    events: mpsc::Sender<ChannelEvent>,
    session: CancellationToken,
    state_tx: watch::Sender<ChannelState>,
    mut outbound_rx: mpsc::Receiver<WireFrame>,
) {
    // Failed attempts since the last healthy connection.
    let mut reconnects: u32 = 0;

    loop {
        if session.is_cancelled() {
            break;
        }
        // Read the store on every attempt: a credential renewed while
        // disconnected must be the one we hand to the server.
        let Some(token) = credentials.get() else {
            warn!("access credential gone, realtime loop ending");
            break;
        };

        let _ = state_tx.send(if reconnects == 0 {
            ChannelState::Connecting
        } else {
            ChannelState::Reconnecting
        });

        let request_url = handshake_url(&config.url, &token);
        let connected = tokio::select! {
            _ = session.cancelled() => break,
            result = connect_async(request_url) => result,
        };

        match connected {
            Ok((socket, _response)) => {
                reconnects = 0;
                let _ = state_tx.send(ChannelState::Connected);
                info!("realtime channel connected");
                if drive(socket, &events, &session, &mut outbound_rx).await == Exit::Shutdown {
                    break;
                }
                warn!("realtime connection lost");
            }
            Err(e) => {
                warn!(error = %e, "realtime connect failed");
            }
        }

        reconnects += 1;
        if reconnects > config.reconnect_attempts {
            warn!(
                attempts = config.reconnect_attempts,
                "reconnect attempts exhausted"
            );
            break;
        }

        let _ = state_tx.send(ChannelState::Reconnecting);
        let delay = Duration::from_millis(
            config.reconnect_delay_ms.saturating_mul(u64::from(reconnects)),
        );
        debug!(attempt = reconnects, delay_ms = delay.as_millis() as u64, "reconnecting");
        tokio::select! {
            _ = session.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    let _ = state_tx.send(ChannelState::Disconnected);
    debug!("realtime connection task ended");
}

/// Pumps one live connection until it drops or the session ends.
async fn drive(
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    events: &mpsc::Sender<ChannelEvent>,
    session: &CancellationToken,
    outbound_rx: &mut mpsc::Receiver<WireFrame>,
) -> Exit {
    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            _ = session.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                return Exit::Shutdown;
            }
            frame = outbound_rx.recv() => {
                let Some(frame) = frame else {
                    // All handles dropped; nothing left to send for.
                    return Exit::Shutdown;
                };
                let text = match serde_json::to_string(&frame) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "failed to encode outbound frame");
                        continue;
                    }
                };
                if sink.send(Message::text(text)).await.is_err() {
                    return Exit::Dropped;
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => forward_event(&text, events).await,
                    Some(Ok(Message::Close(_))) | None => return Exit::Dropped,
                    Some(Ok(_)) => {} // ping/pong handled by the protocol layer
                    Some(Err(e)) => {
                        warn!(error = %e, "realtime read error");
                        return Exit::Dropped;
                    }
                }
            }
        }
    }
}

/// Parses one inbound text frame and forwards the event to the reconciler.
async fn forward_event(text: &str, events: &mpsc::Sender<ChannelEvent>) {
    let frame: WireFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "ignoring malformed realtime frame");
            return;
        }
    };
    match frame.into_event() {
        Some(event) => {
            if events.send(event).await.is_err() {
                debug!("event receiver dropped, discarding inbound message");
            }
        }
        None => warn!("ignoring unexpected send-message frame from server"),
    }
}

/// Appends the credential as a handshake query parameter, binding the
/// connection to the authenticated identity server-side.
fn handshake_url(base: &str, token: &str) -> String {
    format!("{base}?token={token}")
}
