// CodeViz - Algorithm Playground Core
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Terminal stream lifecycle
//!
//! The terminal socket is a duplex line stream to the execution service.
//! Its lifecycle is an explicit state machine:
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> Disconnected
//!                     ^                           |
//!                     +---- delay, attempt <= max +
//! ```
//!
//! An unexpected closure (peer close, stream error, or a failed connect)
//! schedules a reconnection after the policy delay, up to the policy's
//! attempt cap. Dropping the outbound sender is an explicit shutdown and
//! never reconnects.

use derive_more::Display;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::{
    net::TcpStream,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

/// Connection state of the terminal socket
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No live connection
    #[default]
    #[display("disconnected")]
    Disconnected,
    /// Connection attempt in progress
    #[display("connecting")]
    Connecting,
    /// Lines can flow both ways
    #[display("connected")]
    Connected,
}

/// When and how often to reconnect after an unexpected closure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before each attempt
    pub delay: Duration,
    /// Attempts per closure; zero disables reconnection
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(3), 1)
    }
}

impl ReconnectPolicy {
    /// Create a new policy
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self { delay, max_attempts }
    }
}

/// Terminal stream failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The stream could not be opened
    #[error("failed to connect to {url}: {reason}")]
    Connect {
        /// Stream URL
        url: String,
        /// Underlying failure
        reason: String,
    },
    /// The open stream failed
    #[error("terminal stream failed: {0}")]
    Stream(String),
    /// No stream is open
    #[error("terminal not connected")]
    NotConnected,
    /// Every reconnection attempt failed
    #[error("gave up reconnecting after {0} attempts")]
    ReconnectExhausted(u32),
}

/// A duplex line transport
pub trait TerminalTransport: Send {
    /// Open the stream
    fn connect(&mut self) -> impl std::future::Future<Output = Result<(), ConnectionError>> + Send;

    /// Next inbound line, `None` once the peer closed the stream
    ///
    /// Must be cancel safe: it is raced against outbound lines.
    fn recv_line(
        &mut self,
    ) -> impl std::future::Future<Output = Result<Option<String>, ConnectionError>> + Send;

    /// Send one outbound line
    fn send_line(
        &mut self,
        line: &str,
    ) -> impl std::future::Future<Output = Result<(), ConnectionError>> + Send;

    /// Close the stream
    fn close(&mut self) -> impl std::future::Future<Output = ()> + Send;
}

/// Notifications from a running [`TerminalSocket`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Lifecycle transition
    State(ConnectionState),
    /// Inbound terminal line
    Line(String),
}

/// Handle to a socket running on its own task
#[derive(Debug)]
pub struct TerminalHandle {
    /// Lifecycle transitions and inbound lines
    pub events: UnboundedReceiver<SocketEvent>,
    /// Outbound lines; dropping it shuts the socket down
    pub outbound: UnboundedSender<String>,
    /// Socket task
    pub task: JoinHandle<Result<(), ConnectionError>>,
}

/// Reconnecting terminal socket over a [`TerminalTransport`]
#[derive(Debug)]
pub struct TerminalSocket<T> {
    transport: T,
    policy: ReconnectPolicy,
    state: ConnectionState,
}

impl<T: TerminalTransport> TerminalSocket<T> {
    /// Create a new socket
    pub fn new(transport: T, policy: ReconnectPolicy) -> Self {
        Self { transport, policy, state: ConnectionState::Disconnected }
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Run the socket on a new task
    pub fn spawn(self) -> TerminalHandle
    where
        T: 'static,
    {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(event_tx, outbound_rx));
        TerminalHandle { events, outbound, task }
    }

    /// Drive the socket until explicit shutdown or until reconnection gives up
    ///
    /// Inbound lines are forwarded to `events`; lines received on `outbound`
    /// are written to the stream. Lines sent while disconnected are dropped.
    pub async fn run(
        mut self,
        events: UnboundedSender<SocketEvent>,
        mut outbound: UnboundedReceiver<String>,
    ) -> Result<(), ConnectionError> {
        let mut attempts = 0;
        let mut reconnecting = false;

        loop {
            if reconnecting {
                if attempts >= self.policy.max_attempts {
                    warn!("Gave up reconnecting after {} attempts", attempts);
                    return Err(ConnectionError::ReconnectExhausted(attempts));
                }
                attempts += 1;
                info!(
                    "Reconnecting in {:?} (attempt {}/{})",
                    self.policy.delay, attempts, self.policy.max_attempts
                );
                if !Self::backoff(self.policy.delay, &mut outbound).await {
                    info!("Terminal socket shut down while disconnected");
                    return Ok(());
                }
            }
            reconnecting = true;

            self.set_state(ConnectionState::Connecting, &events);
            if let Err(e) = self.transport.connect().await {
                warn!("Terminal connection failed: {}", e);
                self.set_state(ConnectionState::Disconnected, &events);
                continue;
            }
            self.set_state(ConnectionState::Connected, &events);
            attempts = 0;

            let shutdown = self.pump(&events, &mut outbound).await;
            if shutdown {
                self.transport.close().await;
                self.set_state(ConnectionState::Disconnected, &events);
                info!("Terminal socket shut down");
                return Ok(());
            }
            self.set_state(ConnectionState::Disconnected, &events);
        }
    }

    /// Move lines both ways; returns `true` on explicit shutdown
    async fn pump(
        &mut self,
        events: &UnboundedSender<SocketEvent>,
        outbound: &mut UnboundedReceiver<String>,
    ) -> bool {
        loop {
            tokio::select! {
                inbound = self.transport.recv_line() => match inbound {
                    Ok(Some(line)) => {
                        debug!("Terminal line: {}", line);
                        if events.send(SocketEvent::Line(line)).is_err() {
                            return true;
                        }
                    }
                    Ok(None) => {
                        info!("Terminal stream closed by peer");
                        return false;
                    }
                    Err(e) => {
                        warn!("Terminal stream error: {}", e);
                        return false;
                    }
                },
                line = outbound.recv() => match line {
                    Some(line) => {
                        if let Err(e) = self.transport.send_line(&line).await {
                            warn!("Failed to send terminal input: {}", e);
                            return false;
                        }
                    }
                    None => return true,
                },
            }
        }
    }

    /// Wait out the reconnect delay; returns `false` on explicit shutdown
    async fn backoff(delay: Duration, outbound: &mut UnboundedReceiver<String>) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                line = outbound.recv() => match line {
                    Some(line) => warn!("Dropping terminal input while disconnected: {}", line),
                    None => return false,
                },
            }
        }
    }

    fn set_state(&mut self, state: ConnectionState, events: &UnboundedSender<SocketEvent>) {
        debug!("Terminal socket {} -> {}", self.state, state);
        self.state = state;
        let _ = events.send(SocketEvent::State(state));
    }
}

/// WebSocket transport; text frames are terminal lines
#[derive(Debug)]
pub struct WsTransport {
    url: String,
    stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl WsTransport {
    /// Create a new transport for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), stream: None }
    }

    /// Stream URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TerminalTransport for WsTransport {
    async fn connect(&mut self) -> Result<(), ConnectionError> {
        debug!("Connecting to terminal at {}", self.url);
        let (stream, _) = tokio_tungstenite::connect_async(self.url.as_str()).await.map_err(|e| {
            ConnectionError::Connect { url: self.url.clone(), reason: e.to_string() }
        })?;
        info!("Terminal connection established: {}", self.url);
        self.stream = Some(stream);
        Ok(())
    }

    async fn recv_line(&mut self) -> Result<Option<String>, ConnectionError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(ConnectionError::NotConnected);
        };
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_string())),
                Some(Ok(Message::Close(_))) | None => {
                    self.stream = None;
                    return Ok(None);
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(ConnectionError::Stream(e.to_string()));
                }
            }
        }
    }

    async fn send_line(&mut self, line: &str) -> Result<(), ConnectionError> {
        let stream = self.stream.as_mut().ok_or(ConnectionError::NotConnected)?;
        stream
            .send(Message::text(line.to_string()))
            .await
            .map_err(|e| ConnectionError::Stream(e.to_string()))
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close(None).await {
                debug!("Error closing terminal stream: {}", e);
            }
        }
    }
}
