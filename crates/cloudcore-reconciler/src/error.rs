use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] cloudcore_store::StoreError),

    #[error(transparent)]
    Ipam(#[from] cloudcore_ipam::IpamError),

    #[error(transparent)]
    Workflow(#[from] cloudcore_workflow::WorkflowError),

    #[error("site {0} not found")]
    SiteNotFound(Uuid),

    #[error("inventory collection failed for {resource} on site {site}")]
    SiteAgentFailure { site: Uuid, resource: &'static str },
}

impl ReconcileError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ReconcileError::Store(e) => e.is_retryable(),
            ReconcileError::Ipam(_) => false,
            ReconcileError::Workflow(e) => e.is_retryable(),
            ReconcileError::SiteNotFound(_) => false,
            ReconcileError::SiteAgentFailure { .. } => false,
        }
    }
}
