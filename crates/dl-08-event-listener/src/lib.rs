//! # Event Listener (DL-08)
//!
//! Subscribes to named ledger event types on the validator's component port
//! and runs the registered handler for every delivered event on its own task.
//!
//! ## Lifecycle
//!
//! ```text
//! Stopped -> Connecting -> Subscribing -> Listening -> Stopping -> Stopped
//! ```
//!
//! - Subscribing: one request per event type with a handler, each waiting for
//!   its acknowledgement. A rejected subscription is logged and skipped.
//! - Listening: the receive loop races the next message against the stop
//!   signal. Only `CLIENT_EVENTS` messages are expected; anything else ends
//!   the loop with [`ListenerError::UnexpectedMessage`].
//! - Stopping: unsubscribe every accepted subscription, close the connection,
//!   then wait for all in-flight handlers.
//!
//! Handler errors are logged and never reach the loop.

pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod listener;
pub mod memory;
pub mod proto;
pub mod session;

pub use config::{ListenerConfig, DEFAULT_EVENT_PORT};
pub use connection::{ValidatorConnection, ZmqConnection};
pub use error::ListenerError;
pub use handler::{handler_fn, EventHandler, HandlerFn};
pub use listener::{EventListener, ListenerState};
pub use memory::{memory_pair, MemoryConnection, MemoryPublisher, MemoryValidator};
pub use session::{Session, SubscriptionToken};
