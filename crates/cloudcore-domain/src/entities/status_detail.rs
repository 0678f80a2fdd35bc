use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only journal row capturing `(entity, status, message, ts)` (§3).
///
/// `entity_id` is the raw UUID of whichever entity kind owns this row — the
/// journal is a single cross-cutting table, not one per entity kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusDetail {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub status: String,
    pub message: Option<String>,
    pub created: DateTime<Utc>,
}

impl StatusDetail {
    pub fn new(entity_id: Uuid, status: impl Into<String>, message: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_id,
            status: status.into(),
            message,
            created: Utc::now(),
        }
    }
}
