//! In-process validator connection.
//!
//! [`memory_pair`] returns the client end, used in place of a socket, and a
//! [`MemoryValidator`] that plays the validator.

use crate::connection::ValidatorConnection;
use crate::error::ListenerError;
use crate::proto::{
    ClientEventsSubscribeRequest, ClientEventsSubscribeResponse, ClientEventsUnsubscribeResponse,
    Event, EventList, Message, MessageType, SubscribeStatus, UnsubscribeStatus,
};
use async_trait::async_trait;
use prost::Message as _;
use std::collections::HashSet;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Client end of an in-memory connection.
pub struct MemoryConnection {
    outbound: Option<mpsc::UnboundedSender<Message>>,
    inbound: mpsc::UnboundedReceiver<Message>,
}

/// Validator end of an in-memory connection.
pub struct MemoryValidator {
    to_client: mpsc::UnboundedSender<Message>,
    from_client: mpsc::UnboundedReceiver<Message>,
}

/// Pushes messages to the client without owning the validator end.
#[derive(Clone)]
pub struct MemoryPublisher {
    to_client: mpsc::UnboundedSender<Message>,
}

pub fn memory_pair() -> (MemoryConnection, MemoryValidator) {
    let (to_client, inbound) = mpsc::unbounded_channel();
    let (outbound, from_client) = mpsc::unbounded_channel();
    (
        MemoryConnection {
            outbound: Some(outbound),
            inbound,
        },
        MemoryValidator {
            to_client,
            from_client,
        },
    )
}

#[async_trait]
impl ValidatorConnection for MemoryConnection {
    async fn send(&mut self, message: Message) -> Result<(), ListenerError> {
        self.outbound
            .as_ref()
            .ok_or(ListenerError::Closed)?
            .send(message)
            .map_err(|_| ListenerError::Closed)
    }

    async fn recv(&mut self) -> Result<Message, ListenerError> {
        self.inbound.recv().await.ok_or(ListenerError::Closed)
    }

    async fn close(&mut self) -> Result<(), ListenerError> {
        self.outbound.take();
        self.inbound.close();
        Ok(())
    }
}

impl MemoryPublisher {
    pub fn send(&self, message: Message) -> Result<(), ListenerError> {
        self.to_client.send(message).map_err(|_| ListenerError::Closed)
    }

    /// Deliver one event list.
    pub fn publish(&self, events: &[(&str, &[u8])]) -> Result<(), ListenerError> {
        let list = EventList {
            events: events
                .iter()
                .map(|(event_type, data)| Event {
                    event_type: event_type.to_string(),
                    attributes: Vec::new(),
                    data: data.to_vec(),
                })
                .collect(),
        };
        self.send(Message::new(MessageType::ClientEvents, "", list.encode_to_vec()))
    }
}

impl MemoryValidator {
    pub fn publisher(&self) -> MemoryPublisher {
        MemoryPublisher {
            to_client: self.to_client.clone(),
        }
    }

    /// Next frame sent by the client. `None` once the client closed.
    pub async fn next_request(&mut self) -> Option<Message> {
        self.from_client.recv().await
    }

    pub fn reply(&self, request: &Message, message_type: MessageType, content: Vec<u8>) -> Result<(), ListenerError> {
        self.to_client
            .send(Message::new(message_type, request.correlation_id.clone(), content))
            .map_err(|_| ListenerError::Closed)
    }

    /// Answer subscribe and unsubscribe requests until the client closes.
    /// Subscriptions to `rejected` event types fail with `INVALID_FILTER`.
    /// The task yields every request it saw.
    pub fn acknowledge(mut self, rejected: &[&str]) -> JoinHandle<Vec<Message>> {
        let rejected: HashSet<String> = rejected.iter().map(|s| s.to_string()).collect();
        tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(request) = self.next_request().await {
                if request.is(MessageType::ClientEventsSubscribeRequest) {
                    let status = ClientEventsSubscribeRequest::decode(request.content.as_slice())
                        .ok()
                        .filter(|r| r.subscriptions.iter().all(|s| !rejected.contains(&s.event_type)))
                        .map_or(SubscribeStatus::InvalidFilter, |_| SubscribeStatus::Ok);
                    let response = ClientEventsSubscribeResponse {
                        status: status as i32,
                        response_message: String::new(),
                    };
                    let _ = self.reply(
                        &request,
                        MessageType::ClientEventsSubscribeResponse,
                        response.encode_to_vec(),
                    );
                } else if request.is(MessageType::ClientEventsUnsubscribeRequest) {
                    let response = ClientEventsUnsubscribeResponse {
                        status: UnsubscribeStatus::Ok as i32,
                    };
                    let _ = self.reply(
                        &request,
                        MessageType::ClientEventsUnsubscribeResponse,
                        response.encode_to_vec(),
                    );
                }
                seen.push(request);
            }
            seen
        })
    }
}
