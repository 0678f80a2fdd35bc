use thiserror::Error;

/// DAO-layer error kinds (§7). `Transient` signals the caller should retry or
/// paginate — e.g. the [`crate::TOTAL_LIMIT`](cloudcore_domain::constants::TOTAL_LIMIT)
/// guard tripping.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transient store error: {0}")]
    Transient(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether a caller (e.g. a reconciler loop) should retry this operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}
