use thiserror::Error;

use cloudcore_store::StoreError;
use cloudcore_workflow::WorkflowError;

/// Errors surfaced by the outbound/inbound lifecycle activities (§4.3, §C6).
///
/// Deliberately wraps [`StoreError`]/[`WorkflowError`] directly rather than
/// going through [`cloudcore_reconciler::ReconcileError`] — a second hop of
/// `#[from]` would stop `?` from converting in one step.
#[derive(Debug, Error)]
pub enum ActivityError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("precondition failed: {0}")]
    Precondition(String),
}

impl ActivityError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ActivityError::Store(e) => e.is_retryable(),
            ActivityError::Workflow(e) => e.is_retryable(),
            ActivityError::Precondition(_) => false,
        }
    }
}
