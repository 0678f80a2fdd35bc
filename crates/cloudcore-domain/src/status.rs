use serde::{Deserialize, Serialize};

/// Lifecycle status shared by VPC, Subnet, VPC-Prefix, InfiniBand-Partition,
/// NVLink-Logical-Partition, NetworkSecurityGroup, SKU and DPU-Extension-Service.
///
/// Machine uses its own, richer [`crate::machine::MachineStatus`] (see §4.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Pending,
    Provisioning,
    Ready,
    Deleting,
    Deleted,
    Error,
}

impl Default for ResourceStatus {
    fn default() -> Self {
        ResourceStatus::Pending
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceStatus::Pending => "pending",
            ResourceStatus::Provisioning => "provisioning",
            ResourceStatus::Ready => "ready",
            ResourceStatus::Deleting => "deleting",
            ResourceStatus::Deleted => "deleted",
            ResourceStatus::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Site lifecycle status (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    Pending,
    Registered,
    Error,
}

impl std::fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SiteStatus::Pending => "pending",
            SiteStatus::Registered => "registered",
            SiteStatus::Error => "error",
        };
        write!(f, "{s}")
    }
}
