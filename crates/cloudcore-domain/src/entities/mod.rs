mod dpu_extension;
mod infiniband;
mod machine;
mod nsg;
mod nvlink;
mod site;
mod sku;
mod status_detail;
mod subnet;
mod vpc;

pub use dpu_extension::{DpuExtensionService, VersionInfo};
pub use infiniband::InfinibandPartition;
pub use machine::{
    AlertClassification, CapabilityType, HealthAlert, Machine, MachineCapability,
    MachineHealth, MachineInterface, MachineStatus, UNKNOWN_CAPABILITY_NAME,
};
pub use nsg::{NetworkSecurityGroup, RuleAction, RuleDirection, SecurityRule};
pub use nvlink::NvLinkLogicalPartition;
pub use site::Site;
pub use sku::Sku;
pub use status_detail::StatusDetail;
pub use subnet::{Subnet, VpcPrefix};
pub use vpc::{NetworkSecurityGroupPropagationDetails, NetworkVirtualizationType, Vpc};
