use async_trait::async_trait;
use ipnet::IpNet;
use uuid::Uuid;

use crate::error::IpamError;
use crate::types::Namespace;

/// Child-CIDR allocator under a parent IP block (§2, §C3). A parent block
/// may carve out any number of children as long as each child's prefix
/// length is strictly narrower than the parent's — mirroring the Subnet /
/// VPC-Prefix invariant that an IPAM child entry exists iff
/// `PrefixLength != parent block.PrefixLength`.
#[async_trait]
pub trait ChildAllocator: Send + Sync + 'static {
    /// Registers (idempotently) the parent block's own CIDR under a
    /// namespace so children can later be carved out of it.
    async fn register_parent(
        &self,
        namespace: &Namespace,
        parent_block_id: Uuid,
        parent_cidr: IpNet,
    ) -> Result<(), IpamError>;

    /// Allocates the next free child CIDR of `prefix_length` under the
    /// parent block. Fails with [`IpamError::Exhausted`] if none remain.
    async fn create_child(
        &self,
        namespace: &Namespace,
        parent_block_id: Uuid,
        prefix_length: u8,
    ) -> Result<IpNet, IpamError>;

    /// Releases a previously allocated child CIDR so it can be reused.
    /// Idempotent: deleting a CIDR that was never allocated is a no-op.
    async fn delete_child(
        &self,
        namespace: &Namespace,
        parent_block_id: Uuid,
        child: IpNet,
    ) -> Result<(), IpamError>;
}
