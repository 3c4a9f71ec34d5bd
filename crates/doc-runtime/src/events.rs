//! Ledger event handlers.

use crate::workflow::DocumentWorkflow;
use async_trait::async_trait;
use dl_08_event_listener::EventHandler;
use tracing::info;

/// Event emitted by the proposals family once a proposal reaches its vote
/// threshold. Its data is the proposal id.
pub const PROPOSAL_ACCEPTED: &str = "proposal_accepted";

/// Commits accepted proposals as new document versions.
#[derive(Clone)]
pub struct ProposalAcceptedHandler {
    workflow: DocumentWorkflow,
}

impl ProposalAcceptedHandler {
    pub fn new(workflow: DocumentWorkflow) -> Self {
        Self { workflow }
    }
}

#[async_trait]
impl EventHandler for ProposalAcceptedHandler {
    async fn handle(&self, data: Vec<u8>) -> anyhow::Result<()> {
        let record = self.workflow.handle_proposal_accepted(&data).await?;
        info!(
            proposal_id = %record.proposal_id,
            document = %record.document_key(),
            version = record.version,
            "Accepted proposal handled"
        );
        Ok(())
    }
}
