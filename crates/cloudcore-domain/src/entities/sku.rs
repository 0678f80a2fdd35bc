use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{MachineId, SiteId, SkuId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sku {
    pub id: SkuId,
    pub site_id: SiteId,
    pub device_type: String,
    /// Opaque component bill-of-materials blob reported by the Site.
    pub components: serde_json::Value,
    pub associated_machine_ids: Vec<MachineId>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Sku {
    pub fn new(site_id: SiteId, device_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SkuId::random(),
            site_id,
            device_type: device_type.into(),
            components: serde_json::Value::Null,
            associated_machine_ids: Vec::new(),
            created: now,
            updated: now,
            deleted_at: None,
        }
    }
}
