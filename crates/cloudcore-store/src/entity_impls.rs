use chrono::{DateTime, Utc};
use cloudcore_domain::entities::{
    DpuExtensionService, InfinibandPartition, Machine, MachineCapability, MachineInterface,
    NetworkSecurityGroup, NvLinkLogicalPartition, Site, Sku, Subnet, Vpc, VpcPrefix,
};

use crate::entity::Entity;

macro_rules! impl_entity_by_site {
    ($ty:ty, $name:literal) => {
        impl Entity for $ty {
            fn id(&self) -> uuid::Uuid {
                self.id.as_uuid()
            }
            fn scope_id(&self) -> uuid::Uuid {
                self.site_id.as_uuid()
            }
            fn deleted_at(&self) -> Option<DateTime<Utc>> {
                self.deleted_at
            }
            fn mark_deleted(&mut self, at: DateTime<Utc>) {
                self.deleted_at = Some(at);
            }
            fn entity_name() -> &'static str {
                $name
            }
        }
    };
}

impl_entity_by_site!(Vpc, "vpc");
impl_entity_by_site!(Subnet, "subnet");
impl_entity_by_site!(VpcPrefix, "vpc_prefix");
impl_entity_by_site!(Machine, "machine");
impl_entity_by_site!(InfinibandPartition, "infiniband_partition");
impl_entity_by_site!(NvLinkLogicalPartition, "nvlink_logical_partition");
impl_entity_by_site!(NetworkSecurityGroup, "network_security_group");
impl_entity_by_site!(DpuExtensionService, "dpu_extension_service");

impl Entity for Sku {
    fn id(&self) -> uuid::Uuid {
        self.id.as_uuid()
    }
    fn scope_id(&self) -> uuid::Uuid {
        self.site_id.as_uuid()
    }
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }
    fn entity_name() -> &'static str {
        "sku"
    }
}

impl Entity for Site {
    fn id(&self) -> uuid::Uuid {
        self.id.as_uuid()
    }
    fn scope_id(&self) -> uuid::Uuid {
        // A Site scopes itself — listings are never filtered by a parent Site.
        self.id.as_uuid()
    }
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }
    fn entity_name() -> &'static str {
        "site"
    }
}

/// Scoped by owning Machine rather than Site (§3).
impl Entity for MachineInterface {
    fn id(&self) -> uuid::Uuid {
        self.id.as_uuid()
    }
    fn scope_id(&self) -> uuid::Uuid {
        self.machine_id.as_uuid()
    }
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }
    fn entity_name() -> &'static str {
        "machine_interface"
    }
}

impl Entity for MachineCapability {
    fn id(&self) -> uuid::Uuid {
        self.id.as_uuid()
    }
    fn scope_id(&self) -> uuid::Uuid {
        self.machine_id.as_uuid()
    }
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }
    fn entity_name() -> &'static str {
        "machine_capability"
    }
}
