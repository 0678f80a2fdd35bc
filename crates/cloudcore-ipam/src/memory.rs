use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use ipnet::IpNet;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::IpamError;
use crate::ipam::ChildAllocator;
use crate::types::Namespace;

struct ParentState {
    cidr: IpNet,
    children: HashSet<IpNet>,
}

/// In-memory [`ChildAllocator`] — the allocator backing the reference
/// stack (§2 Non-goals: "backed by an in-memory allocator").
#[derive(Default)]
pub struct InMemoryIpam {
    parents: RwLock<HashMap<(Namespace, Uuid), ParentState>>,
}

impl InMemoryIpam {
    pub fn new() -> Self {
        Self::default()
    }
}

fn first_free_subnet(
    parent_block_id: Uuid,
    parent: IpNet,
    prefix_length: u8,
    used: &HashSet<IpNet>,
) -> Result<IpNet, IpamError> {
    let candidate = match parent {
        IpNet::V4(v4) => {
            let subnets = v4.subnets(prefix_length).map_err(|_| IpamError::InvalidPrefixLength {
                requested: prefix_length,
                parent_len: v4.prefix_len(),
            })?;
            subnets.map(IpNet::V4).find(|c| !used.contains(c))
        }
        IpNet::V6(v6) => {
            let subnets = v6.subnets(prefix_length).map_err(|_| IpamError::InvalidPrefixLength {
                requested: prefix_length,
                parent_len: v6.prefix_len(),
            })?;
            subnets.map(IpNet::V6).find(|c| !used.contains(c))
        }
    };
    candidate.ok_or(IpamError::Exhausted { parent: parent_block_id, requested: prefix_length })
}

#[async_trait]
impl ChildAllocator for InMemoryIpam {
    async fn register_parent(
        &self,
        namespace: &Namespace,
        parent_block_id: Uuid,
        parent_cidr: IpNet,
    ) -> Result<(), IpamError> {
        let mut guard = self.parents.write().await;
        guard
            .entry((namespace.clone(), parent_block_id))
            .or_insert_with(|| ParentState { cidr: parent_cidr, children: HashSet::new() });
        Ok(())
    }

    async fn create_child(
        &self,
        namespace: &Namespace,
        parent_block_id: Uuid,
        prefix_length: u8,
    ) -> Result<IpNet, IpamError> {
        let mut guard = self.parents.write().await;
        let state = guard
            .get_mut(&(namespace.clone(), parent_block_id))
            .ok_or(IpamError::UnknownParentBlock(parent_block_id))?;

        let child = first_free_subnet(parent_block_id, state.cidr, prefix_length, &state.children)?;
        state.children.insert(child);
        debug!(%parent_block_id, %child, "allocated child cidr");
        Ok(child)
    }

    async fn delete_child(
        &self,
        namespace: &Namespace,
        parent_block_id: Uuid,
        child: IpNet,
    ) -> Result<(), IpamError> {
        let mut guard = self.parents.write().await;
        let state = guard
            .get_mut(&(namespace.clone(), parent_block_id))
            .ok_or(IpamError::UnknownParentBlock(parent_block_id))?;
        state.children.remove(&child);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns() -> Namespace {
        Namespace::new("vxlan", "on-prem", Uuid::new_v4())
    }

    #[tokio::test]
    async fn create_child_allocates_first_free_subnet() {
        let ipam = InMemoryIpam::new();
        let namespace = ns();
        let parent_id = Uuid::new_v4();
        let parent: IpNet = "192.0.8.0/22".parse().unwrap();
        ipam.register_parent(&namespace, parent_id, parent).await.unwrap();

        let child = ipam.create_child(&namespace, parent_id, 26).await.unwrap();
        assert_eq!(child.to_string(), "192.0.8.0/26");
    }

    #[tokio::test]
    async fn create_child_skips_already_allocated() {
        let ipam = InMemoryIpam::new();
        let namespace = ns();
        let parent_id = Uuid::new_v4();
        let parent: IpNet = "192.0.8.0/22".parse().unwrap();
        ipam.register_parent(&namespace, parent_id, parent).await.unwrap();

        let first = ipam.create_child(&namespace, parent_id, 26).await.unwrap();
        let second = ipam.create_child(&namespace, parent_id, 26).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn delete_child_frees_it_for_reuse() {
        let ipam = InMemoryIpam::new();
        let namespace = ns();
        let parent_id = Uuid::new_v4();
        let parent: IpNet = "192.0.8.0/30".parse().unwrap();
        ipam.register_parent(&namespace, parent_id, parent).await.unwrap();

        let child = ipam.create_child(&namespace, parent_id, 31).await.unwrap();
        ipam.delete_child(&namespace, parent_id, child).await.unwrap();
        let reallocated = ipam.create_child(&namespace, parent_id, 31).await.unwrap();
        assert_eq!(child, reallocated);
    }

    #[tokio::test]
    async fn exhausted_parent_block_errors() {
        let ipam = InMemoryIpam::new();
        let namespace = ns();
        let parent_id = Uuid::new_v4();
        let parent: IpNet = "192.0.8.0/30".parse().unwrap();
        ipam.register_parent(&namespace, parent_id, parent).await.unwrap();

        ipam.create_child(&namespace, parent_id, 31).await.unwrap();
        ipam.create_child(&namespace, parent_id, 31).await.unwrap();
        let err = ipam.create_child(&namespace, parent_id, 31).await.unwrap_err();
        assert!(matches!(err, IpamError::Exhausted { .. }));
    }

    #[tokio::test]
    async fn unknown_parent_block_errors() {
        let ipam = InMemoryIpam::new();
        let err = ipam.create_child(&ns(), Uuid::new_v4(), 26).await.unwrap_err();
        assert!(matches!(err, IpamError::UnknownParentBlock(_)));
    }

    #[tokio::test]
    async fn prefix_length_not_narrower_than_parent_errors() {
        let ipam = InMemoryIpam::new();
        let namespace = ns();
        let parent_id = Uuid::new_v4();
        let parent: IpNet = "192.0.8.0/22".parse().unwrap();
        ipam.register_parent(&namespace, parent_id, parent).await.unwrap();

        let err = ipam.create_child(&namespace, parent_id, 20).await.unwrap_err();
        assert!(matches!(err, IpamError::InvalidPrefixLength { .. }));
    }

    #[tokio::test]
    async fn different_namespaces_do_not_share_a_parent_block() {
        let ipam = InMemoryIpam::new();
        let parent_id = Uuid::new_v4();
        let parent: IpNet = "192.0.8.0/22".parse().unwrap();
        let ns_a = Namespace::new("vxlan", "on-prem", Uuid::new_v4());
        let ns_b = Namespace::new("routed", "on-prem", ns_a.site_id);
        ipam.register_parent(&ns_a, parent_id, parent).await.unwrap();

        let err = ipam.create_child(&ns_b, parent_id, 26).await.unwrap_err();
        assert!(matches!(err, IpamError::UnknownParentBlock(_)));
    }
}
