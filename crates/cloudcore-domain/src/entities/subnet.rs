use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{IpBlockId, SiteId, SubnetId, TenantId, VpcId};
use crate::status::ResourceStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subnet {
    pub id: SubnetId,
    pub site_id: SiteId,
    pub tenant_id: TenantId,
    pub vpc_id: VpcId,
    pub status: ResourceStatus,
    pub is_missing_on_site: bool,
    pub controller_network_segment_id: Option<String>,
    pub ipv4_prefix: Option<String>,
    pub prefix_length: u8,
    pub ipv4_gateway: Option<String>,
    pub ipv4_block_id: Option<IpBlockId>,
    pub domain_id: Option<String>,
    pub mtu: Option<u32>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Subnet {
    pub fn new(site_id: SiteId, tenant_id: TenantId, vpc_id: VpcId, prefix_length: u8) -> Self {
        let now = Utc::now();
        Self {
            id: SubnetId::random(),
            site_id,
            tenant_id,
            vpc_id,
            status: ResourceStatus::Pending,
            is_missing_on_site: false,
            controller_network_segment_id: None,
            ipv4_prefix: None,
            prefix_length,
            ipv4_gateway: None,
            ipv4_block_id: None,
            domain_id: None,
            mtu: None,
            created: now,
            updated: now,
            deleted_at: None,
        }
    }

    /// §3: an IPAM child entry exists iff `prefix_length != parent block prefix length`
    /// and the subnet is not in the `Deleted` state.
    pub fn needs_ipam_child(&self, parent_block_prefix_length: u8) -> bool {
        self.prefix_length != parent_block_prefix_length && self.status != ResourceStatus::Deleted
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpcPrefix {
    pub id: crate::ids::VpcPrefixId,
    pub site_id: SiteId,
    pub tenant_id: TenantId,
    pub vpc_id: VpcId,
    pub status: ResourceStatus,
    pub is_missing_on_site: bool,
    pub ip_block_id: IpBlockId,
    pub prefix: String,
    pub prefix_length: u8,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl VpcPrefix {
    pub fn new(
        site_id: SiteId,
        tenant_id: TenantId,
        vpc_id: VpcId,
        ip_block_id: IpBlockId,
        prefix: impl Into<String>,
        prefix_length: u8,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::ids::VpcPrefixId::random(),
            site_id,
            tenant_id,
            vpc_id,
            status: ResourceStatus::Pending,
            is_missing_on_site: false,
            ip_block_id,
            prefix: prefix.into(),
            prefix_length,
            created: now,
            updated: now,
            deleted_at: None,
        }
    }

    pub fn needs_ipam_child(&self, parent_block_prefix_length: u8) -> bool {
        self.prefix_length != parent_block_prefix_length && self.status != ResourceStatus::Deleted
    }
}
