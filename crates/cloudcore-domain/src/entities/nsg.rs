use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{NetworkSecurityGroupId, SiteId, TenantId};
use crate::status::ResourceStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleDirection {
    Ingress,
    Egress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAction {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityRule {
    pub direction: RuleDirection,
    pub action: RuleAction,
    pub protocol: String,
    pub port_range: Option<String>,
    pub cidr: String,
    pub priority: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSecurityGroup {
    pub id: NetworkSecurityGroupId,
    pub site_id: SiteId,
    pub tenant_org: TenantId,
    pub status: ResourceStatus,
    pub is_missing_on_site: bool,
    pub controller_id: Option<String>,
    pub stateful_egress: bool,
    pub rules: Vec<SecurityRule>,
    /// Incremented by the Site on every rule change; reconciliation only updates
    /// when the reported version differs from the stored one (§3).
    pub version: u64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl NetworkSecurityGroup {
    pub fn new(site_id: SiteId, tenant_org: TenantId) -> Self {
        let now = Utc::now();
        Self {
            id: NetworkSecurityGroupId::random(),
            site_id,
            tenant_org,
            status: ResourceStatus::Pending,
            is_missing_on_site: false,
            controller_id: None,
            stateful_egress: false,
            rules: Vec::new(),
            version: 0,
            created: now,
            updated: now,
            deleted_at: None,
        }
    }
}
