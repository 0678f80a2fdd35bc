use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use cloudcore_domain::entities::Subnet;
use cloudcore_domain::ids::SiteId;
use cloudcore_domain::state_mapping::map_simple_resource_state;
use cloudcore_ipam::{ChildAllocator, Namespace};
use cloudcore_store::{AdvisoryLocks, Dao, Session, StatusJournal, StoreError};
use uuid::Uuid;

use crate::driver::{reconcile, ApplyResult, Match, NewOnSitePolicy, ReconcileHooks, ReconcileOutcome};
use crate::error::ReconcileError;
use crate::types::Inventory;

/// One reported Subnet (§3, §4.2).
#[derive(Debug, Clone)]
pub struct SubnetItem {
    pub controller_network_segment_id: Option<String>,
    /// §9 decision ledger: Subnet's documented fallback match is
    /// `controllerSegment.Name == cloudSubnet.ID`.
    pub controller_segment_name: Option<String>,
    pub controller_state: String,
    pub mtu: Option<u32>,
    pub ipv4_gateway: Option<String>,
}

pub struct SubnetHooks {
    pub ipam: Arc<dyn ChildAllocator>,
    pub locks: Arc<dyn AdvisoryLocks>,
    pub namespace: Namespace,
}

#[async_trait]
impl ReconcileHooks<Subnet, SubnetItem> for SubnetHooks {
    fn resource_noun(&self) -> &'static str {
        "subnet"
    }

    fn find_existing<'e>(&self, item: &SubnetItem, existing: &'e [Subnet]) -> Match<'e, Subnet> {
        if let Some(ref ctrl_id) = item.controller_network_segment_id {
            if let Some(subnet) = existing.iter().find(|s| s.controller_network_segment_id.as_deref() == Some(ctrl_id.as_str())) {
                return Match::Existing(subnet);
            }
        }
        if let Some(ref name) = item.controller_segment_name {
            if let Some(subnet) = existing.iter().find(|s| s.id.to_string() == *name) {
                return Match::Existing(subnet);
            }
        }
        Match::Unmatched
    }

    fn new_on_site_policy(&self) -> NewOnSitePolicy {
        NewOnSitePolicy::Reject
    }

    fn apply(&self, entity: &mut Subnet, item: &SubnetItem) -> ApplyResult {
        let (status, message) = map_simple_resource_state(&item.controller_state, "Subnet");

        let changed = entity.controller_network_segment_id != item.controller_network_segment_id
            || entity.status != status
            || entity.mtu != item.mtu
            || entity.ipv4_gateway != item.ipv4_gateway;

        if item.controller_network_segment_id.is_some() {
            entity.controller_network_segment_id = item.controller_network_segment_id.clone();
        }
        entity.status = status;
        entity.mtu = item.mtu;
        entity.ipv4_gateway = item.ipv4_gateway.clone();

        ApplyResult { changed, status_label: status.to_string(), message: Some(message), metadata_drift: false }
    }

    async fn before_hard_delete(&self, entity: &Subnet) -> Result<(), ReconcileError> {
        let (Some(block_id), Some(prefix)) = (entity.ipv4_block_id, entity.ipv4_prefix.clone()) else {
            return Ok(());
        };
        let child: ipnet::IpNet = format!("{prefix}/{}", entity.prefix_length)
            .parse()
            .map_err(|e| ReconcileError::Store(StoreError::Internal(format!("invalid subnet cidr: {e}"))))?;

        let ipam = self.ipam.clone();
        let namespace = self.namespace.clone();
        let block_uuid = block_id.as_uuid();
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

/// `UpdateSubnetsInDB` (§6).
pub async fn update_subnets_in_db(
    subnets: &Arc<dyn Dao<Subnet>>,
    status_journal: &Arc<dyn StatusJournal>,
    session: &Arc<dyn Session>,
    site_id: SiteId,
    inventory: Inventory<SubnetItem>,
    hooks: &SubnetHooks,
    reported: &mut HashSet<Uuid>,
) -> Result<ReconcileOutcome<Subnet>, ReconcileError> {
    reconcile(subnets, status_journal, session, site_id.as_uuid(), inventory, hooks, reported).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcore_domain::entities::Subnet;
    use cloudcore_domain::ids::VpcId;
    use cloudcore_domain::ids::{IpBlockId, TenantId};
    use cloudcore_domain::status::ResourceStatus;
    use cloudcore_ipam::InMemoryIpam;
    use cloudcore_store::journal::memory::InMemoryStatusJournal;
    use cloudcore_store::lock::InMemoryAdvisoryLocks;
    use cloudcore_store::memory::InMemoryDao;
    use cloudcore_store::session::InMemorySession;

    fn hooks() -> SubnetHooks {
        SubnetHooks {
            ipam: Arc::new(InMemoryIpam::new()),
            locks: Arc::new(InMemoryAdvisoryLocks::new()),
            namespace: Namespace::new("vxlan", "on-prem", Uuid::new_v4()),
        }
    }

    #[tokio::test]
    async fn subnet_status_transition_scenario_1() {
        let dao: Arc<dyn Dao<Subnet>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let session: Arc<dyn Session> = Arc::new(InMemorySession::new());
        let site_id = SiteId::random();
        let tenant_id = TenantId::random();
        let vpc_id = VpcId::random();

        let mut s = Subnet::new(site_id, tenant_id, vpc_id, 24);
        s.controller_network_segment_id = Some("X".to_string());
        s.status = ResourceStatus::Provisioning;
        s.ipv4_prefix = Some("192.0.1.0".to_string());
        dao.create(&s).await.unwrap();

        let inventory = Inventory::unpaged(vec![SubnetItem {
            controller_network_segment_id: Some("X".to_string()),
            controller_segment_name: None,
            controller_state: "READY".to_string(),
            mtu: Some(1500),
            ipv4_gateway: None,
        }]);

        let mut reported = HashSet::new();
        update_subnets_in_db(&dao, &journal, &session, site_id, inventory, &hooks(), &mut reported).await.unwrap();

        let fetched = dao.get_by_id(s.id.as_uuid(), false).await.unwrap().unwrap();
        assert_eq!(fetched.status, ResourceStatus::Ready);
        assert_eq!(fetched.mtu, Some(1500));

        let latest = journal.latest(s.id.as_uuid()).await.unwrap().unwrap();
        assert_eq!(latest.message.as_deref(), Some("Subnet is ready for use"));
    }

    #[tokio::test]
    async fn subnet_missing_and_deleting_hard_deletes_and_frees_ipam_scenario_2() {
        let dao: Arc<dyn Dao<Subnet>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let session: Arc<dyn Session> = Arc::new(InMemorySession::new());
        let site_id = SiteId::random();
        let tenant_id = TenantId::random();
        let vpc_id = VpcId::random();
        let hooks = hooks();
        let block_id = IpBlockId::random();

        hooks
            .ipam
            .register_parent(&hooks.namespace, block_id.as_uuid(), "192.0.8.0/22".parse().unwrap())
            .await
            .unwrap();
        let child = hooks.ipam.create_child(&hooks.namespace, block_id.as_uuid(), 26).await.unwrap();
        assert_eq!(child.to_string(), "192.0.8.0/26");

        let mut s = Subnet::new(site_id, tenant_id, vpc_id, 26);
        s.status = ResourceStatus::Deleting;
        s.ipv4_block_id = Some(block_id);
        s.ipv4_prefix = Some("192.0.8.0".to_string());
        s.created = chrono::Utc::now() - chrono::Duration::hours(1);
        dao.create(&s).await.unwrap();

        let inventory = Inventory::unpaged(vec![]);
        let mut reported = HashSet::new();
        let outcome = update_subnets_in_db(&dao, &journal, &session, site_id, inventory, &hooks, &mut reported).await.unwrap();

        assert_eq!(outcome.events.len(), 1);
        assert!(outcome.events[0].deleted);
        assert!(dao.get_by_id(s.id.as_uuid(), false).await.unwrap().unwrap().deleted_at.is_some());

        let err = hooks.ipam.create_child(&hooks.namespace, block_id.as_uuid(), 26).await.unwrap();
        assert_eq!(err.to_string(), "192.0.8.0/26", "freed child should be reallocatable");
    }
}
