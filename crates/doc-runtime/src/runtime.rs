//! # Doc Runtime
//!
//! Wires the workflow to the ledger client and runs the event listener.

use crate::adapters::LedgerClient;
use crate::config::RuntimeConfig;
use crate::events::{ProposalAcceptedHandler, PROPOSAL_ACCEPTED};
use crate::ports::{ContentStore, LedgerPort, SigningKeyProvider};
use crate::workflow::DocumentWorkflow;
use anyhow::{Context, Result};
use dl_08_event_listener::{EventListener, ListenerState, ValidatorConnection};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// The running application: workflow plus event listener.
pub struct DocRuntime {
    config: RuntimeConfig,
    workflow: DocumentWorkflow,
    listener: EventListener,
}

impl DocRuntime {
    /// Runtime over the REST gateway at `config.rest_api_url`.
    pub fn new(
        config: RuntimeConfig,
        store: Arc<dyn ContentStore>,
        keys: Arc<dyn SigningKeyProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let ledger = LedgerClient::from_config(&config).context("building ledger client")?;
        Self::with_ledger(config, Arc::new(ledger), store, keys)
    }

    pub fn with_ledger(
        config: RuntimeConfig,
        ledger: Arc<dyn LedgerPort>,
        store: Arc<dyn ContentStore>,
        keys: Arc<dyn SigningKeyProvider>,
    ) -> Result<Self> {
        let workflow = DocumentWorkflow::new(ledger, store, keys, config.operation_timeout);
        let mut listener = EventListener::new(config.listener());
        listener.set_handler(PROPOSAL_ACCEPTED, ProposalAcceptedHandler::new(workflow.clone()))?;

        Ok(Self {
            config,
            workflow,
            listener,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn workflow(&self) -> &DocumentWorkflow {
        &self.workflow
    }

    pub fn listener_state(&self) -> ListenerState {
        self.listener.state()
    }

    /// Connect to the validator and start listening.
    pub async fn start(&mut self) -> Result<()> {
        info!(endpoint = %self.config.listener().endpoint(), "Starting doc runtime");
        self.listener.start().await.context("starting event listener")?;
        Ok(())
    }

    /// Start listening on an already open connection.
    pub async fn start_with<C: ValidatorConnection>(&mut self, connection: C) -> Result<()> {
        self.listener
            .start_with(connection)
            .await
            .context("starting event listener")?;
        Ok(())
    }

    /// Resolves once the listener has stopped, either through [`Self::shutdown`]
    /// or because the receive loop ended on its own. Resolves at once when the
    /// listener is not running.
    ///
    /// [`Self::shutdown`] afterwards returns the error that ended the loop.
    pub fn stopped(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut states = self.listener.state_changes();
        async move {
            let _ = states.wait_for(|state| *state == ListenerState::Stopped).await;
        }
    }

    /// Stop the listener and wait for in-flight handlers.
    pub async fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down doc runtime");
        self.listener.stop().await.context("stopping event listener")?;
        info!("Doc runtime stopped");
        Ok(())
    }
}
