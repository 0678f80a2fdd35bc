use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{NetworkSecurityGroupId, SiteId, TenantId, VpcId};
use crate::status::ResourceStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkVirtualizationType {
    Vxlan,
    Vlan,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSecurityGroupPropagationDetails {
    pub propagated_at: Option<DateTime<Utc>>,
    pub propagation_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vpc {
    pub id: VpcId,
    pub site_id: SiteId,
    pub tenant_id: TenantId,
    pub status: ResourceStatus,
    pub is_missing_on_site: bool,
    pub controller_vpc_id: Option<String>,
    pub network_virtualization_type: Option<NetworkVirtualizationType>,
    pub network_security_group_id: Option<NetworkSecurityGroupId>,
    pub network_security_group_propagation_details: Option<NetworkSecurityGroupPropagationDetails>,
    pub labels: HashMap<String, String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Vpc {
    pub fn new(site_id: SiteId, tenant_id: TenantId) -> Self {
        let now = Utc::now();
        Self {
            id: VpcId::random(),
            site_id,
            tenant_id,
            status: ResourceStatus::Pending,
            is_missing_on_site: false,
            controller_vpc_id: None,
            network_virtualization_type: None,
            network_security_group_id: None,
            network_security_group_propagation_details: None,
            labels: HashMap::new(),
            created: now,
            updated: now,
            deleted_at: None,
        }
    }
}
