use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use cloudcore_domain::entities::VpcPrefix;
use cloudcore_domain::ids::{SiteId, VpcId};
use cloudcore_domain::state_mapping::map_simple_resource_state;
use cloudcore_ipam::{ChildAllocator, Namespace};
use cloudcore_store::{AdvisoryLocks, Dao, Session, StatusJournal, StoreError};
use uuid::Uuid;

use crate::driver::{reconcile, ApplyResult, Match, NewOnSitePolicy, ReconcileHooks, ReconcileOutcome};
use crate::error::ReconcileError;
use crate::types::Inventory;

/// One reported VPC-Prefix (§3, §4.2).
#[derive(Debug, Clone)]
pub struct VpcPrefixItem {
    pub vpc_id: VpcId,
    pub prefix: String,
    pub controller_state: String,
}

pub struct VpcPrefixHooks {
    pub ipam: Arc<dyn ChildAllocator>,
    pub locks: Arc<dyn AdvisoryLocks>,
    pub namespace: Namespace,
}

#[async_trait]
impl ReconcileHooks<VpcPrefix, VpcPrefixItem> for VpcPrefixHooks {
    fn resource_noun(&self) -> &'static str {
        "vpc_prefix"
    }

    fn find_existing<'e>(&self, item: &VpcPrefixItem, existing: &'e [VpcPrefix]) -> Match<'e, VpcPrefix> {
        // §9 decision ledger: VPC-Prefix has no independent Controller-ID —
        // it is paired by `(vpc_id, prefix)` instead.
        match existing.iter().find(|p| p.vpc_id == item.vpc_id && p.prefix == item.prefix) {
            Some(prefix) => Match::Existing(prefix),
            None => Match::Unmatched,
        }
    }

    fn new_on_site_policy(&self) -> NewOnSitePolicy {
        NewOnSitePolicy::Reject
    }

    fn apply(&self, entity: &mut VpcPrefix, item: &VpcPrefixItem) -> ApplyResult {
        let (status, message) = map_simple_resource_state(&item.controller_state, "VPC-Prefix");
        let changed = entity.status != status;
        entity.status = status;
        ApplyResult { changed, status_label: status.to_string(), message: Some(message), metadata_drift: false }
    }

    async fn before_hard_delete(&self, entity: &VpcPrefix) -> Result<(), ReconcileError> {
        let child: ipnet::IpNet = format!("{}/{}", entity.prefix, entity.prefix_length)
            .parse()
            .map_err(|e| ReconcileError::Store(StoreError::Internal(format!("invalid vpc-prefix cidr: {e}"))))?;

        let ipam = self.ipam.clone();
        let namespace = self.namespace.clone();
        let block_uuid = entity.ip_block_id.as_uuid();
        self.locks
            .with_lock(
                block_uuid,
                Box::pin(async move {
                    ipam.delete_child(&namespace, block_uuid, child)
                        .await
                        .map_err(|e| StoreError::Internal(e.to_string()))
                }),
            )
            .await?;
        Ok(())
    }
}

/// `UpdateVPCPrefixesInDB` (§6).
pub async fn update_vpc_prefixes_in_db(
    prefixes: &Arc<dyn Dao<VpcPrefix>>,
    status_journal: &Arc<dyn StatusJournal>,
    session: &Arc<dyn Session>,
    site_id: SiteId,
    inventory: Inventory<VpcPrefixItem>,
    hooks: &VpcPrefixHooks,
    reported: &mut HashSet<Uuid>,
) -> Result<ReconcileOutcome<VpcPrefix>, ReconcileError> {
    reconcile(prefixes, status_journal, session, site_id.as_uuid(), inventory, hooks, reported).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcore_domain::entities::VpcPrefix;
    use cloudcore_domain::ids::{IpBlockId, TenantId};
    use cloudcore_domain::status::ResourceStatus;
    use cloudcore_ipam::InMemoryIpam;
    use cloudcore_store::journal::memory::InMemoryStatusJournal;
    use cloudcore_store::lock::InMemoryAdvisoryLocks;
    use cloudcore_store::memory::InMemoryDao;
    use cloudcore_store::session::InMemorySession;

    fn hooks() -> VpcPrefixHooks {
        VpcPrefixHooks {
            ipam: Arc::new(InMemoryIpam::new()),
            locks: Arc::new(InMemoryAdvisoryLocks::new()),
            namespace: Namespace::new("vxlan", "on-prem", Uuid::new_v4()),
        }
    }

    #[tokio::test]
    async fn matches_by_vpc_id_and_prefix_not_controller_id() {
        let dao: Arc<dyn Dao<VpcPrefix>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let session: Arc<dyn Session> = Arc::new(InMemorySession::new());
        let site_id = SiteId::random();
        let tenant_id = TenantId::random();
        let vpc_id = VpcId::random();
        let block_id = IpBlockId::random();

        let mut p = VpcPrefix::new(site_id, tenant_id, vpc_id, block_id, "10.1.0.0", 22);
        p.status = ResourceStatus::Provisioning;
        dao.create(&p).await.unwrap();

        let inventory = Inventory::unpaged(vec![VpcPrefixItem {
            vpc_id,
            prefix: "10.1.0.0".to_string(),
            controller_state: "READY".to_string(),
        }]);

        let mut reported = HashSet::new();
        update_vpc_prefixes_in_db(&dao, &journal, &session, site_id, inventory, &hooks(), &mut reported).await.unwrap();

        let fetched = dao.get_by_id(p.id.as_uuid(), false).await.unwrap().unwrap();
        assert_eq!(fetched.status, ResourceStatus::Ready);
        assert!(reported.contains(&p.id.as_uuid()));
    }
}
