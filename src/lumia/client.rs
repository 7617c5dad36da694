//! LumiaStream WebSocket connection.
//!
//! One worker task owns the socket. It reports Opened / Message / Error /
//! Closed into the bridge event channel and keeps the shared connection
//! state current. Sends are queued to the worker without awaiting.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::common::error::{ConnectionError, ConnectionResult, SendError, SendResult};
use crate::common::{BridgeEvent, ConnectionState, LumiaEvent, SharedConnectionState};
use crate::lumia::protocol::{LumiaCommand, LumiaEndpoint};

/// Upper bound on the WebSocket handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound on sending our close frame during `stop`.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Handles to a running socket worker.
struct Worker {
    handle: JoinHandle<()>,
    shutdown_tx: oneshot::Sender<()>,
    outgoing_tx: mpsc::UnboundedSender<String>,
}

/// Connection to the LumiaStream API.
pub struct LumiaConnection {
    endpoint: LumiaEndpoint,
    state: SharedConnectionState,
    worker: Option<Worker>,
}

impl LumiaConnection {
    pub fn new(endpoint: LumiaEndpoint) -> Self {
        Self {
            endpoint,
            state: SharedConnectionState::default(),
            worker: None,
        }
    }

    /// Open the socket in a background task.
    ///
    /// The connection reports Connected as soon as the attempt is issued and
    /// drops to Disconnected on the first error or close. Calling `start`
    /// again retires the previous worker.
    pub fn start(&mut self, events: mpsc::UnboundedSender<BridgeEvent>) {
        if let Some(previous) = self.worker.take() {
            debug!("Retiring previous Lumia socket worker");
            previous.handle.abort();
        }

        // Fresh cell per attempt so a retired worker can't flip the new state.
        let state = SharedConnectionState::new(ConnectionState::Connected);
        self.state = state.clone();

        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        info!("Connecting to LumiaStream at {}", self.endpoint.display_address());

        let socket = SocketTask {
            url: self.endpoint.url(),
            address: self.endpoint.display_address(),
            state,
            events,
        };
        let handle = tokio::spawn(socket.run(outgoing_rx, shutdown_rx));

        self.worker = Some(Worker {
            handle,
            shutdown_tx,
            outgoing_tx,
        });
    }

    /// Queue a `chat-command` frame for the worker.
    pub fn send_command(&self, command: &str) -> SendResult<()> {
        if !self.state.is_connected() {
            return Err(SendError::NotConnected);
        }
        let worker = self.worker.as_ref().ok_or(SendError::NotConnected)?;

        let frame = LumiaCommand::chat_command(command).to_json()?;
        worker
            .outgoing_tx
            .send(frame)
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Latest observed state; may be stale until the next error or close.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    #[cfg(test)]
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Close the socket and wait for the worker to exit.
    ///
    /// No events are produced by this connection once `stop` returns.
    pub async fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            self.state.set(ConnectionState::Disconnected);
            return;
        };

        self.state.set(ConnectionState::Closing);
        // Err just means the worker already finished.
        let _ = worker.shutdown_tx.send(());
        drop(worker.outgoing_tx);

        if let Err(e) = worker.handle.await {
            warn!("Lumia socket worker ended abnormally: {}", e);
        }
        self.state.set(ConnectionState::Disconnected);
        info!("Lumia connection stopped");
    }
}

/// State moved into the worker task.
struct SocketTask {
    url: String,
    address: String,
    state: SharedConnectionState,
    events: mpsc::UnboundedSender<BridgeEvent>,
}

impl SocketTask {
    async fn run(
        self,
        mut outgoing_rx: mpsc::UnboundedReceiver<String>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        let attempt = tokio::select! {
            attempt = tokio::time::timeout(
                CONNECT_TIMEOUT,
                tokio_tungstenite::connect_async(self.url.as_str()),
            ) => attempt,
            _ = &mut shutdown_rx => {
                self.state.set(ConnectionState::Disconnected);
                return;
            }
        };

        let stream = match attempt {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => {
                self.finish(Err(ConnectionError::ConnectFailed {
                    url: self.address.clone(),
                    message: e.to_string(),
                }));
                return;
            }
            Err(_) => {
                self.finish(Err(ConnectionError::Timeout));
                return;
            }
        };

        info!("Lumia WebSocket connected to {}", self.address);
        self.state.set(ConnectionState::Connected);
        self.emit(LumiaEvent::Opened);

        let (mut writer, mut reader) = stream.split();

        let outcome: ConnectionResult<()> = loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    debug!("Closing Lumia WebSocket");
                    if let Ok(Err(e)) =
                        tokio::time::timeout(CLOSE_TIMEOUT, writer.send(Message::Close(None))).await
                    {
                        debug!("Close frame not delivered: {}", e);
                    }
                    break Ok(());
                }

                frame = outgoing_rx.recv() => {
                    match frame {
                        Some(text) => {
                            debug!("Lumia <- {}", text);
                            if let Err(e) = writer.send(Message::Text(text.into())).await {
                                break Err(e.into());
                            }
                        }
                        // Connection handle dropped.
                        None => break Ok(()),
                    }
                }

                message = reader.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            self.emit(LumiaEvent::Message(text.as_str().to_string()));
                        }
                        Some(Ok(Message::Close(frame))) => {
                            debug!("Lumia closed the socket: {:?}", frame);
                            break Ok(());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => break Err(e.into()),
                        None => break Err(ConnectionError::ConnectionClosed),
                    }
                }
            }
        };

        self.finish(outcome);
    }

    fn finish(&self, outcome: ConnectionResult<()>) {
        self.state.set(ConnectionState::Disconnected);
        if let Err(e) = outcome {
            warn!("Lumia WebSocket error: {}", e);
            self.emit(LumiaEvent::Error(e.to_string()));
        }
        self.emit(LumiaEvent::Closed);
    }

    fn emit(&self, event: LumiaEvent) {
        if let Err(e) = self.events.send(event.into()) {
            debug!("Bridge event channel closed, dropping Lumia event: {:?}", e.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_test::assert_err;

    fn endpoint(port: u16) -> LumiaEndpoint {
        LumiaEndpoint {
            token: "test-token".to_string(),
            host: "127.0.0.1".to_string(),
            port,
        }
    }

    async fn next_lumia_event(rx: &mut mpsc::UnboundedReceiver<BridgeEvent>) -> LumiaEvent {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for Lumia event")
            .expect("event channel closed");
        match event {
            BridgeEvent::Lumia(event) => event,
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_never_started() {
        let mut connection = LumiaConnection::new(endpoint(1));
        assert!(!connection.is_connected());
        assert!(matches!(
            connection.send_command("lights"),
            Err(SendError::NotConnected)
        ));

        // Safe without a worker, and idempotent.
        connection.stop().await;
        connection.stop().await;
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_relay_and_stop() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (frame_tx, frame_rx) = oneshot::channel::<String>();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::Text("welcome".into())).await.unwrap();
            while let Some(Ok(message)) = ws.next().await {
                if let Message::Text(text) = message {
                    let _ = frame_tx.send(text.as_str().to_string());
                    break;
                }
            }
            // Keep reading until the client closes.
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let mut connection = LumiaConnection::new(endpoint(port));
        connection.start(events_tx);
        assert!(connection.is_connected());

        assert_eq!(next_lumia_event(&mut events_rx).await, LumiaEvent::Opened);
        assert_eq!(
            next_lumia_event(&mut events_rx).await,
            LumiaEvent::Message("welcome".to_string())
        );

        connection.send_command("lights red").unwrap();
        let frame = tokio::time::timeout(Duration::from_secs(5), frame_rx)
            .await
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "chat-command");
        assert_eq!(value["params"]["value"], "lights red");

        connection.stop().await;
        assert!(!connection.is_connected());
        assert_err!(connection.send_command("too late"));

        // Closed was emitted before the worker exited; nothing follows it.
        assert_eq!(next_lumia_event(&mut events_rx).await, LumiaEvent::Closed);
        assert!(events_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_reports_error_then_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let mut connection = LumiaConnection::new(endpoint(port));
        connection.start(events_tx);

        assert!(matches!(
            next_lumia_event(&mut events_rx).await,
            LumiaEvent::Error(_)
        ));
        assert_eq!(next_lumia_event(&mut events_rx).await, LumiaEvent::Closed);
        assert!(!connection.is_connected());
        assert!(matches!(
            connection.send_command("lights"),
            Err(SendError::NotConnected)
        ));
    }
}
