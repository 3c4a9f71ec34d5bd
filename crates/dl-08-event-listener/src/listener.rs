//! Subscribe, dispatch and shut down.

use crate::config::ListenerConfig;
use crate::connection::{ValidatorConnection, ZmqConnection};
use crate::error::ListenerError;
use crate::handler::EventHandler;
use crate::proto::{EventList, Message, MessageType};
use crate::session::{Session, SubscriptionToken};
use prost::Message as _;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

type Handlers = HashMap<String, Arc<dyn EventHandler>>;

/// Lifecycle of an [`EventListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerState {
    Stopped,
    Connecting,
    Subscribing,
    Listening,
    Stopping,
}

impl fmt::Display for ListenerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Connecting => "connecting",
            Self::Subscribing => "subscribing",
            Self::Listening => "listening",
            Self::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

struct Running {
    stop: watch::Sender<bool>,
    task: JoinHandle<Result<(), ListenerError>>,
}

/// Dispatches validator events to handlers registered per event type.
pub struct EventListener {
    config: ListenerConfig,
    handlers: Handlers,
    state: Arc<watch::Sender<ListenerState>>,
    subscribed: Vec<String>,
    running: Option<Running>,
}

impl EventListener {
    pub fn new(config: ListenerConfig) -> Self {
        let (state, _) = watch::channel(ListenerState::Stopped);
        Self {
            config,
            handlers: HashMap::new(),
            state: Arc::new(state),
            subscribed: Vec::new(),
            running: None,
        }
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Register the handler for `event_type`, replacing any previous one.
    /// Handlers are fixed once the listener runs.
    pub fn set_handler(
        &mut self,
        event_type: impl Into<String>,
        handler: impl EventHandler,
    ) -> Result<(), ListenerError> {
        if self.running.is_some() {
            return Err(ListenerError::AlreadyRunning);
        }
        self.handlers.insert(event_type.into(), Arc::new(handler));
        Ok(())
    }

    pub fn state(&self) -> ListenerState {
        *self.state.borrow()
    }

    pub fn state_changes(&self) -> watch::Receiver<ListenerState> {
        self.state.subscribe()
    }

    /// Event types whose subscription the validator accepted on the last start.
    pub fn subscribed_event_types(&self) -> &[String] {
        &self.subscribed
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Connect to the validator over ZeroMQ and start listening.
    pub async fn start(&mut self) -> Result<(), ListenerError> {
        if self.running.is_some() {
            return Err(ListenerError::AlreadyRunning);
        }
        self.config.validate()?;

        self.state.send_replace(ListenerState::Connecting);
        let endpoint = self.config.endpoint();
        match ZmqConnection::connect(&endpoint).await {
            Ok(connection) => self.start_with(connection).await,
            Err(e) => {
                self.state.send_replace(ListenerState::Stopped);
                Err(e)
            }
        }
    }

    /// Subscribe over `connection` and run the receive loop in the background.
    ///
    /// A failed subscription is logged and its event type is not delivered;
    /// the remaining ones still go ahead.
    pub async fn start_with<C: ValidatorConnection>(&mut self, connection: C) -> Result<(), ListenerError> {
        if self.running.is_some() {
            return Err(ListenerError::AlreadyRunning);
        }

        self.state.send_replace(ListenerState::Subscribing);
        let mut session = Session::new(connection, self.config.request_timeout);

        let mut event_types: Vec<&String> = self.handlers.keys().collect();
        event_types.sort();

        let mut tokens = Vec::with_capacity(event_types.len());
        for event_type in event_types {
            match session.subscribe(event_type).await {
                Ok(token) => tokens.push(token),
                Err(e) => error!(%event_type, error = %e, "Error when subscribing to event"),
            }
        }
        self.subscribed = tokens.iter().map(|t| t.event_type().to_string()).collect();

        let (stop, stop_rx) = watch::channel(false);
        self.state.send_replace(ListenerState::Listening);
        let task = tokio::spawn(listen_loop(
            session,
            self.handlers.clone(),
            tokens,
            stop_rx,
            Arc::clone(&self.state),
        ));
        self.running = Some(Running { stop, task });
        Ok(())
    }

    /// Stop listening, unsubscribe, close the connection and wait for every
    /// in-flight handler.
    ///
    /// Returns the error that ended the receive loop if it ended on its own,
    /// otherwise the collected unsubscribe failures.
    pub async fn stop(&mut self) -> Result<(), ListenerError> {
        let Running { stop, task } = self.running.take().ok_or(ListenerError::NotRunning)?;
        let _ = stop.send(true);

        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(ListenerError::Task(e.to_string())),
        };
        self.state.send_replace(ListenerState::Stopped);
        self.subscribed.clear();
        result
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            warn!("Event listener dropped while running; stopping in the background");
            let _ = running.stop.send(true);
        }
    }
}

async fn listen_loop<C: ValidatorConnection>(
    mut session: Session<C>,
    handlers: Handlers,
    tokens: Vec<SubscriptionToken>,
    mut stop: watch::Receiver<bool>,
    state: Arc<watch::Sender<ListenerState>>,
) -> Result<(), ListenerError> {
    info!(subscriptions = tokens.len(), "Start listening on ledger events");
    let mut tasks = JoinSet::new();

    let outcome = loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break Ok(()),
            Some(done) = tasks.join_next(), if !tasks.is_empty() => reap(done),
            incoming = session.next() => {
                if let Err(e) = incoming.and_then(|message| dispatch(message, &handlers, &mut tasks)) {
                    break Err(e);
                }
            }
        }
    };

    state.send_replace(ListenerState::Stopping);
    match &outcome {
        Ok(()) => info!("Stopping event listener"),
        Err(e) => error!(error = %e, "Event loop aborted"),
    }

    let mut failures = Vec::new();
    for token in tokens {
        if let Err(e) = session.unsubscribe(token).await {
            error!(error = %e, "Client couldn't unsubscribe");
            failures.push(e);
        }
    }
    if let Err(e) = session.close().await {
        warn!(error = %e, "Error while closing validator connection");
    }

    info!(in_flight = tasks.len(), "Waiting for all the event handlers to finish");
    while let Some(done) = tasks.join_next().await {
        reap(done);
    }
    info!("Event listener handlers finished");
    state.send_replace(ListenerState::Stopped);

    outcome?;
    if failures.is_empty() {
        Ok(())
    } else {
        Err(ListenerError::Unsubscribes(failures))
    }
}

fn dispatch(message: Message, handlers: &Handlers, tasks: &mut JoinSet<()>) -> Result<(), ListenerError> {
    if !message.is(MessageType::ClientEvents) {
        return Err(ListenerError::UnexpectedMessage(message.message_type));
    }

    let list = match EventList::decode(message.content.as_slice()) {
        Ok(list) => list,
        Err(e) => {
            error!(error = %e, "Dropping malformed event list");
            return Ok(());
        }
    };

    for event in list.events {
        let event_type = event.event_type;
        let Some(handler) = handlers.get(&event_type) else {
            warn!(%event_type, "Handler missing for the event");
            continue;
        };

        debug!(%event_type, "Event received");
        let handler = Arc::clone(handler);
        let data = event.data;
        tasks.spawn(async move {
            if let Err(e) = handler.handle(data).await {
                error!(%event_type, error = %format!("{e:#}"), "Error when handling the event");
            }
        });
    }
    Ok(())
}

fn reap(done: Result<(), JoinError>) {
    if let Err(e) = done {
        if e.is_panic() {
            error!(error = %e, "Event handler panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::memory::{memory_pair, MemoryPublisher};
    use crate::proto::MessageType;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn config() -> ListenerConfig {
        ListenerConfig {
            request_timeout: Duration::from_secs(1),
            ..ListenerConfig::default()
        }
    }

    async fn started(listener: &mut EventListener, rejected: &[&str]) -> (MemoryPublisher, JoinHandle<Vec<Message>>) {
        let (connection, validator) = memory_pair();
        let publisher = validator.publisher();
        let acknowledger = validator.acknowledge(rejected);
        listener.start_with(connection).await.unwrap();
        (publisher, acknowledger)
    }

    #[tokio::test]
    async fn test_dispatches_registered_event_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        let mut listener = EventListener::new(config());
        let (c, s) = (Arc::clone(&calls), Arc::clone(&seen));
        listener
            .set_handler(
                "proposal_accepted",
                handler_fn(move |data| {
                    let (c, s, done_tx) = (Arc::clone(&c), Arc::clone(&s), done_tx.clone());
                    async move {
                        c.fetch_add(1, Ordering::SeqCst);
                        s.lock().unwrap().push(data);
                        let _ = done_tx.send(());
                        Ok(())
                    }
                }),
            )
            .unwrap();

        let (publisher, _acknowledger) = started(&mut listener, &[]).await;
        assert_eq!(listener.state(), ListenerState::Listening);
        assert_eq!(listener.subscribed_event_types(), ["proposal_accepted".to_string()]);

        publisher
            .publish(&[("block_commit", b"ignored"), ("proposal_accepted", b"abc123")])
            .unwrap();
        timeout(Duration::from_secs(2), done_rx.recv()).await.unwrap();

        listener.stop().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock().unwrap(), vec![b"abc123".to_vec()]);
        assert_eq!(listener.state(), ListenerState::Stopped);
    }

    #[tokio::test]
    async fn test_stop_waits_for_in_flight_handlers() {
        let finished = Arc::new(AtomicBool::new(false));
        let (started_tx, mut started_rx) = mpsc::unbounded_channel();

        let mut listener = EventListener::new(config());
        let flag = Arc::clone(&finished);
        listener
            .set_handler(
                "slow",
                handler_fn(move |_| {
                    let (flag, started_tx) = (Arc::clone(&flag), started_tx.clone());
                    async move {
                        let _ = started_tx.send(());
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        flag.store(true, Ordering::SeqCst);
                        Ok(())
                    }
                }),
            )
            .unwrap();

        let (publisher, acknowledger) = started(&mut listener, &[]).await;
        publisher.publish(&[("slow", b"x")]).unwrap();
        timeout(Duration::from_secs(2), started_rx.recv()).await.unwrap();

        listener.stop().await.unwrap();
        assert!(finished.load(Ordering::SeqCst));

        drop(publisher);
        let requests = acknowledger.await.unwrap();
        let kinds: Vec<i32> = requests.iter().map(|m| m.message_type).collect();
        assert_eq!(
            kinds,
            vec![
                MessageType::ClientEventsSubscribeRequest as i32,
                MessageType::ClientEventsUnsubscribeRequest as i32
            ]
        );
    }

    #[tokio::test]
    async fn test_handler_error_does_not_stop_listener() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        let mut listener = EventListener::new(config());
        let c = Arc::clone(&calls);
        listener
            .set_handler(
                "flaky",
                handler_fn(move |_| {
                    let (c, done_tx) = (Arc::clone(&c), done_tx.clone());
                    async move {
                        c.fetch_add(1, Ordering::SeqCst);
                        let _ = done_tx.send(());
                        anyhow::bail!("cannot handle")
                    }
                }),
            )
            .unwrap();

        let (publisher, _acknowledger) = started(&mut listener, &[]).await;
        publisher.publish(&[("flaky", b"1")]).unwrap();
        publisher.publish(&[("flaky", b"2")]).unwrap();
        for _ in 0..2 {
            timeout(Duration::from_secs(2), done_rx.recv()).await.unwrap();
        }

        assert_eq!(listener.state(), ListenerState::Listening);
        listener.stop().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_subscription_is_not_fatal() {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let mut listener = EventListener::new(config());
        listener
            .set_handler("rejected", handler_fn(|_| async { Ok(()) }))
            .unwrap();
        listener
            .set_handler(
                "accepted",
                handler_fn(move |_| {
                    let done_tx = done_tx.clone();
                    async move {
                        let _ = done_tx.send(());
                        Ok(())
                    }
                }),
            )
            .unwrap();

        let (publisher, _acknowledger) = started(&mut listener, &["rejected"]).await;
        assert_eq!(listener.subscribed_event_types(), ["accepted".to_string()]);

        publisher.publish(&[("accepted", b"")]).unwrap();
        timeout(Duration::from_secs(2), done_rx.recv()).await.unwrap();
        listener.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_unexpected_message_type_ends_the_loop() {
        let mut listener = EventListener::new(config());
        listener
            .set_handler("proposal_accepted", handler_fn(|_| async { Ok(()) }))
            .unwrap();
        let mut states = listener.state_changes();

        let (publisher, _acknowledger) = started(&mut listener, &[]).await;
        publisher
            .send(Message::new(MessageType::ClientEventsSubscribeResponse, "stray", Vec::new()))
            .unwrap();

        timeout(
            Duration::from_secs(2),
            states.wait_for(|s| *s == ListenerState::Stopped),
        )
        .await
        .unwrap()
        .unwrap();

        let err = listener.stop().await.unwrap_err();
        assert!(matches!(err, ListenerError::UnexpectedMessage(501)));
    }

    #[tokio::test]
    async fn test_malformed_event_list_is_skipped() {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let mut listener = EventListener::new(config());
        listener
            .set_handler(
                "proposal_accepted",
                handler_fn(move |_| {
                    let done_tx = done_tx.clone();
                    async move {
                        let _ = done_tx.send(());
                        Ok(())
                    }
                }),
            )
            .unwrap();

        let (publisher, _acknowledger) = started(&mut listener, &[]).await;
        publisher
            .send(Message::new(MessageType::ClientEvents, "", vec![0xff, 0xff, 0xff]))
            .unwrap();
        publisher.publish(&[("proposal_accepted", b"p1")]).unwrap();

        timeout(Duration::from_secs(2), done_rx.recv()).await.unwrap();
        listener.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_lifecycle_errors() {
        let mut listener = EventListener::new(config());
        assert!(matches!(listener.stop().await, Err(ListenerError::NotRunning)));

        let (_publisher, _acknowledger) = started(&mut listener, &[]).await;
        let (connection, _validator) = memory_pair();
        assert!(matches!(
            listener.start_with(connection).await,
            Err(ListenerError::AlreadyRunning)
        ));
        assert!(matches!(
            listener.set_handler("late", handler_fn(|_| async { Ok(()) })),
            Err(ListenerError::AlreadyRunning)
        ));
        listener.stop().await.unwrap();
    }
}
