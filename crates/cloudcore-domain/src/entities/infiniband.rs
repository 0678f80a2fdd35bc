use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{InfinibandPartitionId, SiteId, TenantId};
use crate::status::ResourceStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfinibandPartition {
    pub id: InfinibandPartitionId,
    pub site_id: SiteId,
    pub tenant_id: TenantId,
    pub status: ResourceStatus,
    pub is_missing_on_site: bool,
    pub controller_ib_partition_id: Option<String>,
    pub pkey: Option<u16>,
    pub partition_name: Option<String>,
    pub service_level: Option<u8>,
    pub rate_limit: Option<u32>,
    pub mtu: Option<u32>,
    pub enable_sharp: Option<bool>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl InfinibandPartition {
    pub fn new(site_id: SiteId, tenant_id: TenantId) -> Self {
        let now = Utc::now();
        Self {
            id: InfinibandPartitionId::random(),
            site_id,
            tenant_id,
            status: ResourceStatus::Pending,
            is_missing_on_site: false,
            controller_ib_partition_id: None,
            pkey: None,
            partition_name: None,
            service_level: None,
            rate_limit: None,
            mtu: None,
            enable_sharp: None,
            created: now,
            updated: now,
            deleted_at: None,
        }
    }
}
