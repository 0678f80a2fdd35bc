use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declare a 128-bit UUID-backed identifier newtype with the Display/FromStr/serde
/// plumbing every entity id in this crate needs. Mirrors the `EnclaveId`/`PartitionId`
/// wrapper pattern, generalized from a single string key to the UUID keys this
/// system's entities use.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(SiteId);
define_id!(VpcId);
define_id!(SubnetId);
define_id!(VpcPrefixId);
define_id!(MachineId);
define_id!(MachineInterfaceId);
define_id!(MachineCapabilityId);
define_id!(InfinibandPartitionId);
define_id!(NvLinkLogicalPartitionId);
define_id!(NetworkSecurityGroupId);
define_id!(SkuId);
define_id!(DpuExtensionServiceId);
define_id!(IpBlockId);
define_id!(TenantId);
