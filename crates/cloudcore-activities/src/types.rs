use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlates an outbound `*ViaSiteAgent` call with the inbound
/// `Update<Resource>InDB` that later reports its outcome (§4.3 step 4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionId {
    pub resource_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl TransactionId {
    pub fn new(resource_id: Uuid) -> Self {
        Self { resource_id, timestamp: Utc::now() }
    }
}

/// `OBJECT_STATUS_*` reported by the Site alongside a workflow outcome (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectStatus {
    Created,
    Deleted,
    Updated,
}

/// `WORKFLOW_STATUS_*` the Site reports for a completed workflow (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Success,
    Failure,
}

/// The payload `Update<Resource>InDB(ctx, txID, info)` receives (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    pub transaction_id: TransactionId,
    pub workflow_status: WorkflowStatus,
    pub object_status: Option<ObjectStatus>,
    /// Populated by the Site when `object_status = Created` — the new
    /// Controller-ID to persist (§4.3).
    pub controller_id: Option<String>,
    pub message: Option<String>,
}
