use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SiteId;
use crate::status::SiteStatus;

/// A remote cluster reporting inventory into the Cloud (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub infrastructure_provider_id: String,
    pub status: SiteStatus,
    pub agent_version: Option<String>,
    pub controller_version: Option<String>,
    pub registration_token: Option<String>,
    pub registration_token_expiry: Option<DateTime<Utc>>,
    /// Timestamp of the last inventory page accepted for any resource kind.
    /// Monotonic under normal receipt (§3); governs C8's staleness sweep.
    pub inventory_received: Option<DateTime<Utc>>,
    pub agent_cert_expiry: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Site {
    pub fn new(infrastructure_provider_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SiteId::random(),
            infrastructure_provider_id: infrastructure_provider_id.into(),
            status: SiteStatus::Pending,
            agent_version: None,
            controller_version: None,
            registration_token: None,
            registration_token_expiry: None,
            inventory_received: None,
            agent_cert_expiry: None,
            created: now,
            updated: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
