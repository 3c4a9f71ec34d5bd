//! Correlated request/response exchange over a validator connection.

use crate::connection::ValidatorConnection;
use crate::error::ListenerError;
use crate::proto::{
    ClientEventsSubscribeRequest, ClientEventsSubscribeResponse, ClientEventsUnsubscribeRequest,
    ClientEventsUnsubscribeResponse, EventSubscription, Message, MessageType, SubscribeStatus,
    UnsubscribeStatus,
};
use prost::Message as _;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, trace};
use uuid::Uuid;

/// Handle of one accepted subscription, consumed by [`Session::unsubscribe`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionToken {
    id: Uuid,
    event_type: String,
}

impl SubscriptionToken {
    pub fn event_type(&self) -> &str {
        &self.event_type
    }
}

impl fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.event_type, self.id)
    }
}

/// A validator connection plus the messages that arrived while a request
/// was waiting for its response.
pub struct Session<C> {
    connection: C,
    buffered: VecDeque<Message>,
    request_timeout: Duration,
}

impl<C: ValidatorConnection> Session<C> {
    pub fn new(connection: C, request_timeout: Duration) -> Self {
        Self {
            connection,
            buffered: VecDeque::new(),
            request_timeout,
        }
    }

    /// Send `content` under a fresh correlation id and wait for the reply
    /// carrying the same id.
    pub async fn request(
        &mut self,
        what: &'static str,
        message_type: MessageType,
        content: Vec<u8>,
    ) -> Result<Message, ListenerError> {
        let correlation_id = Uuid::new_v4().to_string();
        let limit = self.request_timeout;
        self.connection
            .send(Message::new(message_type, correlation_id.clone(), content))
            .await?;

        timeout(limit, self.reply_to(&correlation_id))
            .await
            .map_err(|_| ListenerError::Timeout { what, timeout: limit })?
    }

    async fn reply_to(&mut self, correlation_id: &str) -> Result<Message, ListenerError> {
        loop {
            let message = self.connection.recv().await?;
            if message.correlation_id == correlation_id {
                return Ok(message);
            }
            trace!(message_type = message.message_type, "Buffering uncorrelated message");
            self.buffered.push_back(message);
        }
    }

    /// Next message for the receive loop. Buffered messages come first.
    pub async fn next(&mut self) -> Result<Message, ListenerError> {
        match self.buffered.pop_front() {
            Some(message) => Ok(message),
            None => self.connection.recv().await,
        }
    }

    pub async fn subscribe(&mut self, event_type: &str) -> Result<SubscriptionToken, ListenerError> {
        let request = ClientEventsSubscribeRequest {
            subscriptions: vec![EventSubscription {
                event_type: event_type.to_string(),
                filters: Vec::new(),
            }],
            last_known_block_ids: Vec::new(),
        };

        debug!(event_type, "Waiting for subscription confirmation");
        let reply = self
            .request(
                "subscribe request",
                MessageType::ClientEventsSubscribeRequest,
                request.encode_to_vec(),
            )
            .await
            .map_err(|e| ListenerError::Subscription {
                event_type: event_type.to_string(),
                reason: e.to_string(),
            })?;
        expect_type(&reply, MessageType::ClientEventsSubscribeResponse)?;

        let response = ClientEventsSubscribeResponse::decode(reply.content.as_slice())
            .map_err(|e| ListenerError::decode("subscribe response", e))?;
        if response.status != SubscribeStatus::Ok as i32 {
            let status = SubscribeStatus::try_from(response.status)
                .map(|s| format!("{s:?}"))
                .unwrap_or_else(|_| response.status.to_string());
            return Err(ListenerError::Subscription {
                event_type: event_type.to_string(),
                reason: format!("status {status} {}", response.response_message)
                    .trim_end()
                    .to_string(),
            });
        }

        info!(event_type, "Subscribed to ledger events");
        Ok(SubscriptionToken {
            id: Uuid::new_v4(),
            event_type: event_type.to_string(),
        })
    }

    pub async fn unsubscribe(&mut self, token: SubscriptionToken) -> Result<(), ListenerError> {
        let failed = |reason: String| ListenerError::Unsubscribe {
            event_type: token.event_type.clone(),
            reason,
        };

        let reply = self
            .request(
                "unsubscribe request",
                MessageType::ClientEventsUnsubscribeRequest,
                ClientEventsUnsubscribeRequest {}.encode_to_vec(),
            )
            .await
            .map_err(|e| failed(e.to_string()))?;
        expect_type(&reply, MessageType::ClientEventsUnsubscribeResponse)
            .map_err(|e| failed(e.to_string()))?;

        let response = ClientEventsUnsubscribeResponse::decode(reply.content.as_slice())
            .map_err(|e| failed(e.to_string()))?;
        if response.status != UnsubscribeStatus::Ok as i32 {
            return Err(failed(format!("status {}", response.status)));
        }

        debug!(subscription = %token, "Unsubscribed");
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), ListenerError> {
        self.buffered.clear();
        self.connection.close().await
    }
}

fn expect_type(message: &Message, expected: MessageType) -> Result<(), ListenerError> {
    if message.is(expected) {
        Ok(())
    } else {
        Err(ListenerError::UnexpectedMessage(message.message_type))
    }
}
