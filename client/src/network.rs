//! WebSocket connection channel to the world-state server
//!
//! The socket lives on a tokio task. The frame loop talks to it through two
//! unbounded queues: commands go in, connection events come out. Inbound text
//! frames are handed over undecoded so that the presence state alone decides
//! what a frame means, and so that every store write happens on the single
//! consumer of the event queue.

use futures_util::{Sink, SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientMessage, ProtocolError};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("failed to encode message: {0}")]
    Encode(#[from] ProtocolError),
    #[error("connection task is no longer running")]
    ChannelClosed,
}

/// Events surfaced from the connection task, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected,
    Message(String),
    Disconnected { reason: String },
}

#[derive(Debug)]
enum Command {
    Send(ClientMessage),
    Reconnect,
    Shutdown,
}

/// The transport as seen by the frame loop.
pub trait MessageChannel {
    fn send(&mut self, message: ClientMessage) -> Result<(), NetworkError>;

    fn try_recv(&mut self) -> Option<ChannelEvent>;

    fn reconnect(&mut self) -> Result<(), NetworkError>;
}

pub struct ConnectionHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    task: JoinHandle<()>,
}

impl ConnectionHandle {
    /// Spawns the connection task on `runtime` and starts connecting to `url`.
    pub fn spawn(runtime: &Handle, url: String, fake_ping_ms: u64) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let task = runtime.spawn(run_connection(url, fake_ping_ms, commands_rx, events_tx));

        Self {
            commands: commands_tx,
            events: events_rx,
            task,
        }
    }

    /// Waits for the next event; `None` once the task has exited.
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }

    /// Asks the task to close the socket and waits for it to finish.
    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Err(e) = self.task.await {
            error!("Connection task panicked: {}", e);
        }
    }

    /// Requests shutdown without waiting for the task.
    pub fn close(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    fn command(&self, command: Command) -> Result<(), NetworkError> {
        self.commands
            .send(command)
            .map_err(|_| NetworkError::ChannelClosed)
    }
}

impl MessageChannel for ConnectionHandle {
    fn send(&mut self, message: ClientMessage) -> Result<(), NetworkError> {
        self.command(Command::Send(message))
    }

    fn try_recv(&mut self) -> Option<ChannelEvent> {
        self.events.try_recv().ok()
    }

    fn reconnect(&mut self) -> Result<(), NetworkError> {
        self.command(Command::Reconnect)
    }
}

enum SessionEnd {
    Closed(String),
    Reconnect,
    Shutdown,
}

async fn run_connection(
    url: String,
    fake_ping_ms: u64,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<ChannelEvent>,
) {
    loop {
        info!("Connecting to {}", url);

        let end = match connect_async(url.as_str()).await {
            Ok((socket, _)) => {
                info!("Connected to {}", url);
                if events.send(ChannelEvent::Connected).is_err() {
                    return;
                }
                run_session(socket, fake_ping_ms, &mut commands, &events).await
            }
            Err(e) => {
                error!("Failed to connect to {}: {}", url, e);
                SessionEnd::Closed(e.to_string())
            }
        };

        match end {
            SessionEnd::Shutdown => return,
            SessionEnd::Reconnect => {
                info!("Reconnecting");
                let _ = events.send(ChannelEvent::Disconnected {
                    reason: "reconnect requested".to_string(),
                });
            }
            SessionEnd::Closed(reason) => {
                warn!("Disconnected: {}", reason);
                if events.send(ChannelEvent::Disconnected { reason }).is_err() {
                    return;
                }
                if !wait_for_reconnect(&mut commands).await {
                    return;
                }
            }
        }
    }
}

/// Parks the task until the user asks to reconnect. Moves issued while
/// disconnected have nowhere to go and are dropped.
async fn wait_for_reconnect(commands: &mut mpsc::UnboundedReceiver<Command>) -> bool {
    while let Some(command) = commands.recv().await {
        match command {
            Command::Reconnect => return true,
            Command::Shutdown => return false,
            Command::Send(message) => debug!("Dropping {:?} while disconnected", message),
        }
    }
    false
}

async fn run_session(
    socket: Socket,
    fake_ping_ms: u64,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    events: &mpsc::UnboundedSender<ChannelEvent>,
) -> SessionEnd {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = stream.next() => {
                let message = match frame {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => return SessionEnd::Closed(e.to_string()),
                    None => return SessionEnd::Closed("stream ended".to_string()),
                };

                let text = match message {
                    Message::Text(text) => text,
                    Message::Binary(bytes) => match String::from_utf8(bytes) {
                        Ok(text) => text,
                        Err(_) => {
                            warn!("Ignoring non UTF-8 binary frame");
                            continue;
                        }
                    },
                    Message::Close(frame) => {
                        let reason = frame
                            .map(|frame| frame.reason.into_owned())
                            .filter(|reason| !reason.is_empty())
                            .unwrap_or_else(|| "closed by server".to_string());
                        return SessionEnd::Closed(reason);
                    }
                    _ => continue,
                };

                if fake_ping_ms > 0 {
                    sleep(Duration::from_millis(fake_ping_ms / 2)).await;
                }

                if events.send(ChannelEvent::Message(text)).is_err() {
                    let _ = sink.close().await;
                    return SessionEnd::Shutdown;
                }
            },

            command = commands.recv() => match command {
                Some(Command::Send(message)) => {
                    if let Err(e) = send_message(&mut sink, &message, fake_ping_ms).await {
                        error!("Error sending {:?}: {}", message, e);
                        if matches!(e, NetworkError::WebSocket(_)) {
                            return SessionEnd::Closed(e.to_string());
                        }
                    }
                }
                Some(Command::Reconnect) => {
                    let _ = sink.close().await;
                    return SessionEnd::Reconnect;
                }
                Some(Command::Shutdown) | None => {
                    let _ = sink.close().await;
                    return SessionEnd::Shutdown;
                }
            },
        }
    }
}

async fn send_message<S>(
    sink: &mut S,
    message: &ClientMessage,
    fake_ping_ms: u64,
) -> Result<(), NetworkError>
where
    S: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let text = message.encode()?;

    if fake_ping_ms > 0 {
        sleep(Duration::from_millis(fake_ping_ms / 2)).await;
    }

    debug!("Sending {}", text);
    sink.send(Message::Text(text)).await?;
    Ok(())
}
