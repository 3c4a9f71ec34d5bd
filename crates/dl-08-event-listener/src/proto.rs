//! Validator messaging protobufs.
//!
//! Field tags follow the validator's `validator.proto`, `events.proto` and
//! `client_event.proto`.

/// Message type tags of the validator envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum MessageType {
    Default = 0,
    ClientEventsSubscribeRequest = 500,
    ClientEventsSubscribeResponse = 501,
    ClientEventsUnsubscribeRequest = 502,
    ClientEventsUnsubscribeResponse = 503,
    ClientEvents = 504,
}

/// Envelope of every frame exchanged with the validator.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Message {
    #[prost(enumeration = "MessageType", tag = "1")]
    pub message_type: i32,
    #[prost(string, tag = "2")]
    pub correlation_id: String,
    #[prost(bytes = "vec", tag = "3")]
    pub content: Vec<u8>,
}

impl Message {
    pub fn new(message_type: MessageType, correlation_id: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            message_type: message_type as i32,
            correlation_id: correlation_id.into(),
            content,
        }
    }

    pub fn is(&self, message_type: MessageType) -> bool {
        self.message_type == message_type as i32
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EventAttribute {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Event {
    #[prost(string, tag = "1")]
    pub event_type: String,
    #[prost(message, repeated, tag = "2")]
    pub attributes: Vec<EventAttribute>,
    #[prost(bytes = "vec", tag = "3")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EventList {
    #[prost(message, repeated, tag = "1")]
    pub events: Vec<Event>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EventFilter {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub match_string: String,
    #[prost(int32, tag = "3")]
    pub filter_type: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EventSubscription {
    #[prost(string, tag = "1")]
    pub event_type: String,
    #[prost(message, repeated, tag = "2")]
    pub filters: Vec<EventFilter>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ClientEventsSubscribeRequest {
    #[prost(message, repeated, tag = "1")]
    pub subscriptions: Vec<EventSubscription>,
    #[prost(string, repeated, tag = "2")]
    pub last_known_block_ids: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SubscribeStatus {
    StatusUnset = 0,
    Ok = 1,
    InvalidFilter = 2,
    UnknownBlock = 3,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ClientEventsSubscribeResponse {
    #[prost(enumeration = "SubscribeStatus", tag = "1")]
    pub status: i32,
    #[prost(string, tag = "2")]
    pub response_message: String,
}

/// Drops every subscription of the connection.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ClientEventsUnsubscribeRequest {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum UnsubscribeStatus {
    StatusUnset = 0,
    Ok = 1,
    InternalError = 2,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ClientEventsUnsubscribeResponse {
    #[prost(enumeration = "UnsubscribeStatus", tag = "1")]
    pub status: i32,
}
