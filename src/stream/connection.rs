//! Reconnecting WebSocket client.

use super::config::StreamConfig;
use super::events::{parse_frame, StreamEvent};
use super::state::{ConnectionAction, ConnectionInput, ConnectionState};
use futures::{Sink, SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Keepalive frame understood by the backend.
const KEEPALIVE_FRAME: &str = "ping";

/// How long shutdown waits for the close frame to go out.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// A live stream subscription bound to one URL.
pub struct LiveConnection {
    url: String,
    config: StreamConfig,
}

/// Owner of a running connection. Dropping it tears the connection down.
pub struct StreamHandle {
    cancel_token: CancellationToken,
    state: watch::Receiver<ConnectionState>,
    join: Option<JoinHandle<()>>,
}

impl StreamHandle {
    /// Close the socket and cancel any pending reconnect. Idempotent.
    pub fn disable(&self) {
        self.cancel_token.cancel();
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver notified on every state transition.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Disable the connection and wait for its task to finish.
    pub async fn shutdown(mut self) {
        self.disable();
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

impl LiveConnection {
    pub fn new(url: impl Into<String>, config: StreamConfig) -> Self {
        Self {
            url: url.into(),
            config,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Start the connection task. Every parsed event is handed to `on_event`
    /// in arrival order. When the stream is disabled in config nothing is
    /// spawned and the handle reports [`ConnectionState::Disabled`].
    ///
    /// The connection also stops when `parent` is cancelled.
    pub fn spawn<F>(self, on_event: F, parent: &CancellationToken) -> StreamHandle
    where
        F: FnMut(StreamEvent) + Send + 'static,
    {
        let cancel_token = parent.child_token();

        if !self.config.enabled {
            tracing::info!(url = %self.url, "Live stream disabled");
            let (_, state) = watch::channel(ConnectionState::Disabled);
            return StreamHandle {
                cancel_token,
                state,
                join: None,
            };
        }

        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let join = tokio::spawn(run(self, on_event, cancel_token.clone(), state_tx));

        StreamHandle {
            cancel_token,
            state: state_rx,
            join: Some(join),
        }
    }
}

/// Feed `input` to the state machine and publish the new state.
fn step(
    state_tx: &watch::Sender<ConnectionState>,
    input: ConnectionInput,
) -> Option<ConnectionAction> {
    let current = *state_tx.borrow();
    let (next, action) = current.transition(input);
    if next != current {
        tracing::debug!(from = %current, to = %next, ?input, "Stream state transition");
        state_tx.send_replace(next);
    }
    action
}

async fn run<F>(
    connection: LiveConnection,
    mut on_event: F,
    cancel_token: CancellationToken,
    state_tx: watch::Sender<ConnectionState>,
) where
    F: FnMut(StreamEvent) + Send + 'static,
{
    let LiveConnection { url, config } = connection;
    let delay = Duration::from_millis(config.reconnect_delay_ms);
    let mut action = step(&state_tx, ConnectionInput::Start);

    loop {
        match action {
            Some(ConnectionAction::Connect) => {
                let connected = tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => {
                        action = step(&state_tx, ConnectionInput::Disable);
                        continue;
                    }
                    result = connect_async(url.as_str()) => result,
                };

                match connected {
                    Ok((socket, _)) => {
                        tracing::info!(url = %url, "Live stream connected");
                        step(&state_tx, ConnectionInput::Opened);
                        metrics::gauge!("servereye_stream_connected").set(1.0);

                        let input = pump(socket, &mut on_event, &config, &cancel_token).await;
                        metrics::gauge!("servereye_stream_connected").set(0.0);
                        if input != ConnectionInput::Disable {
                            tracing::info!(url = %url, ?input, "Live stream closed");
                        }
                        action = step(&state_tx, input);
                    }
                    Err(error) => {
                        tracing::warn!(url = %url, error = %error, "Live stream connection failed");
                        action = step(&state_tx, ConnectionInput::Errored);
                    }
                }
            }
            Some(ConnectionAction::ScheduleReconnect) => {
                metrics::counter!("servereye_stream_reconnects_total").increment(1);
                tracing::debug!(delay_ms = config.reconnect_delay_ms, "Reconnect scheduled");

                tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => {
                        action = step(&state_tx, ConnectionInput::Disable);
                    }
                    _ = tokio::time::sleep(delay) => {
                        action = step(&state_tx, ConnectionInput::ReconnectElapsed);
                    }
                }
            }
            Some(ConnectionAction::CloseSocket) | None => break,
        }
    }

    tracing::debug!(url = %url, "Live stream stopped");
}

/// Read frames until the socket ends. Returns the input describing why.
async fn pump<F>(
    socket: Socket,
    on_event: &mut F,
    config: &StreamConfig,
    cancel_token: &CancellationToken,
) -> ConnectionInput
where
    F: FnMut(StreamEvent),
{
    let (mut write, mut read) = socket.split();
    let mut keepalive = (config.keepalive_seconds > 0).then(|| {
        let period = Duration::from_secs(config.keepalive_seconds);
        tokio::time::interval_at(Instant::now() + period, period)
    });

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                send_close(&mut write).await;
                return ConnectionInput::Disable;
            }
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => deliver(&text, on_event),
                Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => deliver(text, on_event),
                    Err(_) => {
                        metrics::counter!("servereye_stream_frames_dropped_total").increment(1);
                        tracing::warn!(len = bytes.len(), "Dropping non-UTF-8 binary frame");
                    }
                },
                Some(Ok(Message::Close(_))) | None => return ConnectionInput::Closed,
                // ping/pong are answered by tungstenite
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    tracing::warn!(error = %error, "Live stream error");
                    return ConnectionInput::Errored;
                }
            },
            _ = next_tick(&mut keepalive) => {
                if let Err(error) = write.send(Message::Text(KEEPALIVE_FRAME.to_string())).await {
                    tracing::warn!(error = %error, "Keepalive send failed");
                    return ConnectionInput::Errored;
                }
            }
        }
    }
}

async fn send_close<S>(write: &mut S)
where
    S: Sink<Message> + Unpin,
{
    let sent = tokio::time::timeout(CLOSE_TIMEOUT, write.send(Message::Close(None))).await;
    if sent.is_err() {
        tracing::debug!("Peer not accepting the close frame, dropping the socket");
    }
}

fn deliver<F>(text: &str, on_event: &mut F)
where
    F: FnMut(StreamEvent),
{
    metrics::counter!("servereye_stream_frames_total").increment(1);
    match parse_frame(text) {
        Some(event) => on_event(event),
        None => metrics::counter!("servereye_stream_frames_dropped_total").increment(1),
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
