use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("no workflow client registered for site {0}")]
    UnknownSite(uuid::Uuid),

    #[error("failed to connect to workflow engine for site {site}: {source}")]
    Transport { site: uuid::Uuid, source: String },

    #[error("workflow engine rejected the request: {0}")]
    SiteAgentFailure(String),

    #[error("workflow RPC timed out or the engine is temporarily unavailable: {0}")]
    Transient(String),
}

impl WorkflowError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkflowError::Transient(_) | WorkflowError::Transport { .. })
    }
}
