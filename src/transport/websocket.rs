//! WebSocket transport: a persistent bidirectional channel with
//! auto-reconnect and heartbeat (spec §6).
//!
//! Grounded on `siumai-provider-openai/src/providers/openai/websocket_transport.rs`'s
//! use of `tokio-tungstenite` (`connect_async`, `IntoClientRequest`,
//! `futures_util::{SinkExt, StreamExt}`), generalized from that file's
//! single-shot request/response WebSocket session into a long-lived,
//! reconnecting bidirectional call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message as WireMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::{ClientError, WebSocketErrorKind};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A message sent or received over a [`WebSocketCall`] (spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebSocketMessage {
    Text(String),
    Binary(Vec<u8>),
}

/// Auto-reconnect policy (spec §6): delay is
/// `min(initial × multiplier^attempts, max)`.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub max_attempts: Option<u32>,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Interval between heartbeat pings; `None` disables health monitoring.
    pub heartbeat_interval: Option<Duration>,
    /// How long to wait for a pong before marking the connection unhealthy.
    pub pong_deadline: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            heartbeat_interval: Some(Duration::from_secs(30)),
            pong_deadline: Duration::from_secs(10),
        }
    }
}

impl ReconnectPolicy {
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let scaled = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }
}

/// Consulted on each reconnect to obtain a (possibly refreshed) token.
pub type TokenProvider = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// `http(s)://` auto-upgrades to `ws(s)://`; `ws(s)://` URLs pass through
/// unchanged (spec §6, boundary behavior in §8).
pub fn to_websocket_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        url.to_string()
    }
}

fn build_handshake_request(url: &str, auth_token: Option<&str>) -> Result<tokio_tungstenite::tungstenite::handshake::client::Request, ClientError> {
    let mut request = url
        .into_client_request()
        .map_err(|_| ClientError::WebSocketError(WebSocketErrorKind::ConnectionFailed))?;
    if let Some(token) = auth_token {
        let value = format!("Bearer {token}")
            .parse()
            .map_err(|_| ClientError::WebSocketError(WebSocketErrorKind::ConnectionFailed))?;
        request.headers_mut().insert("authorization", value);
    }
    Ok(request)
}

async fn connect(url: &str, auth_token: Option<&str>) -> Result<WsStream, ClientError> {
    let request = build_handshake_request(url, auth_token)?;
    let (stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|_| ClientError::WebSocketError(WebSocketErrorKind::ConnectionFailed))?;
    Ok(stream)
}

enum Command {
    Send(WireMessage),
    Ping,
    Close(u16, String),
}

/// A connected (or reconnecting) WebSocket call.
pub struct WebSocketCall {
    commands: mpsc::UnboundedSender<Command>,
    inbound: Mutex<mpsc::UnboundedReceiver<Result<WebSocketMessage, ClientError>>>,
    explicitly_closed: Arc<AtomicBool>,
    healthy: Arc<AtomicBool>,
}

impl WebSocketCall {
    pub fn send_text(&self, text: impl Into<String>) -> Result<(), ClientError> {
        self.commands
            .send(Command::Send(WireMessage::Text(text.into().into())))
            .map_err(|_| ClientError::WebSocketError(WebSocketErrorKind::AlreadyClosed))
    }

    pub fn send_binary(&self, bytes: impl Into<Vec<u8>>) -> Result<(), ClientError> {
        self.commands
            .send(Command::Send(WireMessage::Binary(bytes.into().into())))
            .map_err(|_| ClientError::WebSocketError(WebSocketErrorKind::AlreadyClosed))
    }

    pub fn ping(&self) -> Result<(), ClientError> {
        self.commands
            .send(Command::Ping)
            .map_err(|_| ClientError::WebSocketError(WebSocketErrorKind::AlreadyClosed))
    }

    /// Sets `explicitly_closed`, so a pending reconnect timer exits on its
    /// next check (spec §9, design note (c)), and asks the driver to close
    /// the socket with `code`/`reason`.
    pub fn close(&self, code: u16, reason: impl Into<String>) -> Result<(), ClientError> {
        self.explicitly_closed.store(true, Ordering::SeqCst);
        self.commands
            .send(Command::Close(code, reason.into()))
            .map_err(|_| ClientError::WebSocketError(WebSocketErrorKind::AlreadyClosed))
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    /// Receives the next inbound message, or `None` once the driver has
    /// permanently stopped (explicit close, or reconnect attempts
    /// exhausted).
    pub async fn recv(&self) -> Option<Result<WebSocketMessage, ClientError>> {
        self.inbound.lock().await.recv().await
    }
}

/// Builds [`WebSocketCall`]s against a base URL, applying the WebSocket
/// scheme auto-upgrade and driving reconnect/heartbeat in a background task.
pub struct WebSocketTransport {
    reconnect: ReconnectPolicy,
    token_provider: Option<TokenProvider>,
}

impl WebSocketTransport {
    pub fn new(reconnect: ReconnectPolicy) -> Self {
        Self {
            reconnect,
            token_provider: None,
        }
    }

    pub fn with_token_provider(mut self, provider: TokenProvider) -> Self {
        self.token_provider = Some(provider);
        self
    }

    /// Opens the connection and spawns the driver task. `auth_token`, if
    /// given, authenticates the first connect attempt; reconnect attempts
    /// consult `token_provider` (if configured) for a fresh token instead.
    pub async fn connect(&self, url: &str, auth_token: Option<String>) -> Result<WebSocketCall, ClientError> {
        let ws_url = to_websocket_url(url);
        let stream = connect(&ws_url, auth_token.as_deref()).await?;

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let explicitly_closed = Arc::new(AtomicBool::new(false));
        let healthy = Arc::new(AtomicBool::new(true));

        tokio::spawn(drive(
            stream,
            ws_url,
            auth_token,
            self.token_provider.clone(),
            self.reconnect.clone(),
            commands_rx,
            inbound_tx,
            explicitly_closed.clone(),
            healthy.clone(),
        ));

        Ok(WebSocketCall {
            commands: commands_tx,
            inbound: Mutex::new(inbound_rx),
            explicitly_closed,
            healthy,
        })
    }
}

#[allow(clippy::too_many_arguments)]
async fn drive(
    mut stream: WsStream,
    url: String,
    mut auth_token: Option<String>,
    token_provider: Option<TokenProvider>,
    policy: ReconnectPolicy,
    mut commands: mpsc::UnboundedReceiver<Command>,
    inbound: mpsc::UnboundedSender<Result<WebSocketMessage, ClientError>>,
    explicitly_closed: Arc<AtomicBool>,
    healthy: Arc<AtomicBool>,
) {
    let mut attempt: u32 = 0;

    'connection: loop {
        healthy.store(true, Ordering::SeqCst);
        let mut last_pong = Instant::now();
        let mut heartbeat = policy.heartbeat_interval.map(|d| {
            let mut ticker = interval(d);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        let reconnect_needed = loop {
            tokio::select! {
                command = commands.recv() => {
                    match command {
                        Some(Command::Send(message)) => {
                            if stream.send(message).await.is_err() {
                                break true;
                            }
                        }
                        Some(Command::Ping) => {
                            if stream.send(WireMessage::Ping(Vec::new().into())).await.is_err() {
                                break true;
                            }
                        }
                        Some(Command::Close(code, reason)) => {
                            let frame = CloseFrame {
                                code: code.into(),
                                reason: reason.into(),
                            };
                            let _ = stream.close(Some(frame)).await;
                            break 'connection;
                        }
                        None => break 'connection,
                    }
                }
                incoming = stream.next() => {
                    match incoming {
                        Some(Ok(WireMessage::Text(text))) => {
                            let _ = inbound.send(Ok(WebSocketMessage::Text(text.to_string())));
                        }
                        Some(Ok(WireMessage::Binary(bytes))) => {
                            let _ = inbound.send(Ok(WebSocketMessage::Binary(bytes.to_vec())));
                        }
                        Some(Ok(WireMessage::Ping(payload))) => {
                            let _ = stream.send(WireMessage::Pong(payload)).await;
                        }
                        Some(Ok(WireMessage::Pong(_))) => {
                            last_pong = Instant::now();
                        }
                        Some(Ok(WireMessage::Close(_))) | None => break true,
                        Some(Ok(WireMessage::Frame(_))) => {}
                        Some(Err(_)) => {
                            let _ = inbound.send(Err(ClientError::WebSocketError(WebSocketErrorKind::ReceiveFailed)));
                            break true;
                        }
                    }
                }
                _ = async { heartbeat.as_mut().unwrap().tick().await }, if heartbeat.is_some() => {
                    if last_pong.elapsed() > policy.pong_deadline + policy.heartbeat_interval.unwrap_or_default() {
                        healthy.store(false, Ordering::SeqCst);
                        break true;
                    }
                    if stream.send(WireMessage::Ping(Vec::new().into())).await.is_err() {
                        break true;
                    }
                }
            }
        };

        if !reconnect_needed || explicitly_closed.load(Ordering::SeqCst) {
            break;
        }

        healthy.store(false, Ordering::SeqCst);

        // Keep trying to reconnect until one succeeds, attempts are
        // exhausted, or the caller explicitly closed the call.
        loop {
            if let Some(max_attempts) = policy.max_attempts {
                if attempt >= max_attempts {
                    let _ = inbound.send(Err(ClientError::WebSocketError(WebSocketErrorKind::ConnectionFailed)));
                    break 'connection;
                }
            }

            tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
            attempt += 1;

            if explicitly_closed.load(Ordering::SeqCst) {
                break 'connection;
            }

            if let Some(provider) = &token_provider {
                auth_token = provider();
            }

            match connect(&url, auth_token.as_deref()).await {
                Ok(new_stream) => {
                    stream = new_stream;
                    attempt = 0;
                    break;
                }
                Err(error) => {
                    let _ = inbound.send(Err(error));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_and_https_urls_upgrade_to_ws_and_wss() {
        assert_eq!(to_websocket_url("http://h/p"), "ws://h/p");
        assert_eq!(to_websocket_url("https://h/p"), "wss://h/p");
        assert_eq!(to_websocket_url("ws://h/p"), "ws://h/p");
        assert_eq!(to_websocket_url("wss://h/p"), "wss://h/p");
    }

    #[test]
    fn delay_grows_geometrically_and_caps_at_max() {
        let policy = ReconnectPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            multiplier: 2.0,
            ..ReconnectPolicy::default()
        };
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(1));
    }
}
