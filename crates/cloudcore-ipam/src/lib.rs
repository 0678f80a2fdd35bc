//! Child-CIDR allocator under a parent IP block (§C3), namespaced by
//! routing-type/provider/site so unrelated allocation domains never collide.

pub mod error;
pub mod ipam;
pub mod memory;
pub mod types;

pub use error::IpamError;
pub use ipam::ChildAllocator;
pub use memory::InMemoryIpam;
pub use types::Namespace;
