//! Transport to the validator's component port.

use crate::error::ListenerError;
use crate::proto::Message;
use async_trait::async_trait;
use prost::Message as _;
use tracing::{debug, error, warn};
use zeromq::{DealerSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

/// A framed, bidirectional connection carrying validator [`Message`]s.
///
/// `recv` must be cancel safe: the listener races it against the stop signal.
#[async_trait]
pub trait ValidatorConnection: Send + 'static {
    async fn send(&mut self, message: Message) -> Result<(), ListenerError>;

    async fn recv(&mut self) -> Result<Message, ListenerError>;

    async fn close(&mut self) -> Result<(), ListenerError>;
}

/// ZeroMQ DEALER socket, one protobuf `Message` per frame.
pub struct ZmqConnection {
    endpoint: String,
    socket: Option<DealerSocket>,
}

impl ZmqConnection {
    pub async fn connect(endpoint: &str) -> Result<Self, ListenerError> {
        let mut socket = DealerSocket::new();
        socket
            .connect(endpoint)
            .await
            .map_err(|e| ListenerError::Connect {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        debug!(endpoint, "Connected to validator");

        Ok(Self {
            endpoint: endpoint.to_string(),
            socket: Some(socket),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn socket(&mut self) -> Result<&mut DealerSocket, ListenerError> {
        self.socket.as_mut().ok_or(ListenerError::Closed)
    }
}

fn decode_frame(frames: &ZmqMessage) -> Result<Message, ListenerError> {
    let frame = frames.get(0).ok_or_else(|| ListenerError::Decode {
        what: "validator frame",
        reason: "empty message".into(),
    })?;
    Message::decode(frame.as_ref()).map_err(|e| ListenerError::decode("validator message", e))
}

#[async_trait]
impl ValidatorConnection for ZmqConnection {
    async fn send(&mut self, message: Message) -> Result<(), ListenerError> {
        let frame = ZmqMessage::from(message.encode_to_vec());
        self.socket()?
            .send(frame)
            .await
            .map_err(|e| ListenerError::Transport(e.to_string()))
    }

    /// Undecodable frames are logged and skipped.
    async fn recv(&mut self) -> Result<Message, ListenerError> {
        loop {
            let frames = self
                .socket()?
                .recv()
                .await
                .map_err(|e| ListenerError::Transport(e.to_string()))?;
            match decode_frame(&frames) {
                Ok(message) => return Ok(message),
                Err(e) => error!(endpoint = %self.endpoint, error = %e, "Dropping malformed validator message"),
            }
        }
    }

    async fn close(&mut self) -> Result<(), ListenerError> {
        let Some(socket) = self.socket.take() else {
            return Ok(());
        };
        let errors = socket.close().await;
        if errors.is_empty() {
            debug!(endpoint = %self.endpoint, "Validator connection closed");
            Ok(())
        } else {
            for e in &errors {
                warn!(endpoint = %self.endpoint, error = %e, "Error while closing validator socket");
            }
            Err(ListenerError::Transport(format!(
                "{} error(s) while closing {}",
                errors.len(),
                self.endpoint
            )))
        }
    }
}
