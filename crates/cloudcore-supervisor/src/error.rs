use thiserror::Error;

use cloudcore_store::StoreError;
use cloudcore_workflow::WorkflowError;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("notifier failed: {0}")]
    Notifier(String),

    #[error("health probe failed for site {site}: {reason}")]
    HealthProbe { site: uuid::Uuid, reason: String },

    #[error("site-manager request failed for site {site}: {reason}")]
    SiteManager { site: uuid::Uuid, reason: String },
}

impl SupervisorError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SupervisorError::Store(e) => e.is_retryable(),
            SupervisorError::Workflow(e) => e.is_retryable(),
            SupervisorError::Notifier(_) => false,
            SupervisorError::HealthProbe { .. } => true,
            SupervisorError::SiteManager { .. } => true,
        }
    }
}
