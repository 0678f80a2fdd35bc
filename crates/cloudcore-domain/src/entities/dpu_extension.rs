use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{DpuExtensionServiceId, SiteId, TenantId};
use crate::status::ResourceStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub data: serde_json::Value,
    pub has_credentials: bool,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DpuExtensionService {
    pub id: DpuExtensionServiceId,
    pub site_id: SiteId,
    pub tenant: TenantId,
    pub status: ResourceStatus,
    pub is_missing_on_site: bool,
    pub controller_id: Option<String>,
    pub version: Option<String>,
    pub version_info: Option<VersionInfo>,
    pub active_versions: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl DpuExtensionService {
    pub fn new(site_id: SiteId, tenant: TenantId) -> Self {
        let now = Utc::now();
        Self {
            id: DpuExtensionServiceId::random(),
            site_id,
            tenant,
            status: ResourceStatus::Pending,
            is_missing_on_site: false,
            controller_id: None,
            version: None,
            version_info: None,
            active_versions: Vec::new(),
            created: now,
            updated: now,
            deleted_at: None,
        }
    }
}
