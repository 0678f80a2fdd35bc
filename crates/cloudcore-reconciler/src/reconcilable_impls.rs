use chrono::{DateTime, Utc};
use cloudcore_domain::entities::{
    DpuExtensionService, InfinibandPartition, Machine, MachineStatus, NetworkSecurityGroup,
    NvLinkLogicalPartition, Subnet, Vpc, VpcPrefix,
};
use cloudcore_domain::status::ResourceStatus;

use crate::reconcilable::Reconcilable;

macro_rules! impl_reconcilable_simple {
    ($ty:ty, $controller_field:ident) => {
        impl Reconcilable for $ty {
            fn controller_id(&self) -> Option<&str> {
                self.$controller_field.as_deref()
            }
            fn set_controller_id(&mut self, id: Option<String>) {
                self.$controller_field = id;
            }
            fn status_label(&self) -> String {
                self.status.to_string()
            }
            fn is_deleting(&self) -> bool {
                self.status == ResourceStatus::Deleting
            }
            fn set_status_error(&mut self) {
                self.status = ResourceStatus::Error;
            }
            fn set_status_deleting(&mut self) {
                self.status = ResourceStatus::Deleting;
            }
            fn is_missing_on_site(&self) -> bool {
                self.is_missing_on_site
            }
            fn set_missing_on_site(&mut self, missing: bool) {
                self.is_missing_on_site = missing;
            }
            fn created_at(&self) -> DateTime<Utc> {
                self.created
            }
            fn updated_at(&self) -> DateTime<Utc> {
                self.updated
            }
            fn touch_updated(&mut self) {
                self.updated = Utc::now();
            }
        }
    };
}

impl_reconcilable_simple!(Vpc, controller_vpc_id);
impl_reconcilable_simple!(Subnet, controller_network_segment_id);
impl_reconcilable_simple!(InfinibandPartition, controller_ib_partition_id);
impl_reconcilable_simple!(NvLinkLogicalPartition, controller_id);
impl_reconcilable_simple!(NetworkSecurityGroup, controller_id);
impl_reconcilable_simple!(DpuExtensionService, controller_id);

impl Reconcilable for VpcPrefix {
    fn controller_id(&self) -> Option<&str> {
        // VPC-Prefix has no independent Controller-ID of its own (§3) — it is
        // paired by `(vpc_id, prefix)` in `vpc_prefix.rs` instead.
        None
    }
    fn set_controller_id(&mut self, _id: Option<String>) {}
    fn status_label(&self) -> String {
        self.status.to_string()
    }
    fn is_deleting(&self) -> bool {
        self.status == ResourceStatus::Deleting
    }
    fn set_status_error(&mut self) {
        self.status = ResourceStatus::Error;
    }
    fn set_status_deleting(&mut self) {
        self.status = ResourceStatus::Deleting;
    }
    fn is_missing_on_site(&self) -> bool {
        self.is_missing_on_site
    }
    fn set_missing_on_site(&mut self, missing: bool) {
        self.is_missing_on_site = missing;
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated
    }
    fn touch_updated(&mut self) {
        self.updated = Utc::now();
    }
}

impl Reconcilable for Machine {
    fn controller_id(&self) -> Option<&str> {
        self.controller_machine_id.as_deref()
    }
    fn set_controller_id(&mut self, id: Option<String>) {
        self.controller_machine_id = id;
    }
    fn status_label(&self) -> String {
        self.status.to_string()
    }
    fn is_deleting(&self) -> bool {
        // MachineStatus has no Deleting state — Machines are hard-deleted only
        // via the supervisor's cascade (§4.5 `DeleteSiteComponentsFromDB`),
        // never by inventory-driven candidate-removal.
        false
    }
    fn set_status_error(&mut self) {
        self.status = MachineStatus::Error;
        self.is_usable_by_tenant = false;
    }
    fn is_missing_on_site(&self) -> bool {
        self.is_missing_on_site
    }
    fn set_missing_on_site(&mut self, missing: bool) {
        self.is_missing_on_site = missing;
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated
    }
    fn touch_updated(&mut self) {
        self.updated = Utc::now();
    }
}
