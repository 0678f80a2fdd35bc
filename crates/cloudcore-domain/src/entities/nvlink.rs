use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{NvLinkLogicalPartitionId, SiteId, TenantId};
use crate::status::ResourceStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvLinkLogicalPartition {
    pub id: NvLinkLogicalPartitionId,
    pub site_id: SiteId,
    pub tenant_id: TenantId,
    pub status: ResourceStatus,
    pub is_missing_on_site: bool,
    pub controller_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl NvLinkLogicalPartition {
    pub fn new(site_id: SiteId, tenant_id: TenantId) -> Self {
        let now = Utc::now();
        Self {
            id: NvLinkLogicalPartitionId::random(),
            site_id,
            tenant_id,
            status: ResourceStatus::Pending,
            is_missing_on_site: false,
            controller_id: None,
            name: None,
            description: None,
            created: now,
            updated: now,
            deleted_at: None,
        }
    }
}
