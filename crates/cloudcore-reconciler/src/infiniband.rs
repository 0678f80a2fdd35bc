use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use cloudcore_domain::entities::InfinibandPartition;
use cloudcore_domain::ids::SiteId;
use cloudcore_domain::state_mapping::map_simple_resource_state;
use cloudcore_store::{Dao, Session, StatusJournal};
use uuid::Uuid;

use crate::driver::{reconcile, ApplyResult, Match, NewOnSitePolicy, ReconcileHooks, ReconcileOutcome};
use crate::error::ReconcileError;
use crate::types::Inventory;

/// One reported InfiniBand-Partition (§3, §4.2).
#[derive(Debug, Clone)]
pub struct InfinibandPartitionItem {
    pub controller_ib_partition_id: String,
    pub controller_state: String,
    pub pkey: Option<u16>,
    pub rate_limit: Option<u32>,
}

struct InfinibandHooks;

#[async_trait]
impl ReconcileHooks<InfinibandPartition, InfinibandPartitionItem> for InfinibandHooks {
    fn resource_noun(&self) -> &'static str {
        "infiniband_partition"
    }

    fn find_existing<'e>(
        &self,
        item: &InfinibandPartitionItem,
        existing: &'e [InfinibandPartition],
    ) -> Match<'e, InfinibandPartition> {
        match existing.iter().find(|p| p.controller_ib_partition_id.as_deref() == Some(item.controller_ib_partition_id.as_str())) {
            Some(p) => Match::Existing(p),
            None => Match::Unmatched,
        }
    }

    fn new_on_site_policy(&self) -> NewOnSitePolicy {
        NewOnSitePolicy::Reject
    }

    fn apply(&self, entity: &mut InfinibandPartition, item: &InfinibandPartitionItem) -> ApplyResult {
        let (status, message) = map_simple_resource_state(&item.controller_state, "InfiniBand-Partition");
        let changed = entity.status != status || entity.pkey != item.pkey || entity.rate_limit != item.rate_limit;
        entity.status = status;
        entity.pkey = item.pkey;
        entity.rate_limit = item.rate_limit;
        ApplyResult { changed, status_label: status.to_string(), message: Some(message), metadata_drift: false }
    }
}

/// `UpdateInfiniBandPartitionsInDB` (§6).
pub async fn update_infiniband_partitions_in_db(
    partitions: &Arc<dyn Dao<InfinibandPartition>>,
    status_journal: &Arc<dyn StatusJournal>,
    session: &Arc<dyn Session>,
    site_id: SiteId,
    inventory: Inventory<InfinibandPartitionItem>,
    reported: &mut HashSet<Uuid>,
) -> Result<ReconcileOutcome<InfinibandPartition>, ReconcileError> {
    reconcile(partitions, status_journal, session, site_id.as_uuid(), inventory, &InfinibandHooks, reported).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcore_domain::entities::InfinibandPartition;
    use cloudcore_domain::ids::TenantId;
    use cloudcore_domain::status::ResourceStatus;
    use cloudcore_store::journal::memory::InMemoryStatusJournal;
    use cloudcore_store::memory::InMemoryDao;
    use cloudcore_store::session::InMemorySession;

    #[tokio::test]
    async fn unmatched_partition_is_skipped_not_created() {
        let dao: Arc<dyn Dao<InfinibandPartition>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let session: Arc<dyn Session> = Arc::new(InMemorySession::new());
        let site_id = SiteId::random();

        let inventory = Inventory::unpaged(vec![InfinibandPartitionItem {
            controller_ib_partition_id: "ib-1".to_string(),
            controller_state: "READY".to_string(),
            pkey: Some(1),
            rate_limit: None,
        }]);

        let mut reported = HashSet::new();
        update_infiniband_partitions_in_db(&dao, &journal, &session, site_id, inventory, &mut reported).await.unwrap();

        let all = dao.get_all(Default::default(), Default::default()).await.unwrap();
        assert!(all.items.is_empty());
    }

    #[tokio::test]
    async fn matched_partition_updates_pkey_and_status() {
        let dao: Arc<dyn Dao<InfinibandPartition>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let session: Arc<dyn Session> = Arc::new(InMemorySession::new());
        let site_id = SiteId::random();
        let tenant_id = TenantId::random();

        let mut p = InfinibandPartition::new(site_id, tenant_id);
        p.controller_ib_partition_id = Some("ib-1".to_string());
        p.status = ResourceStatus::Provisioning;
        dao.create(&p).await.unwrap();

        let inventory = Inventory::unpaged(vec![InfinibandPartitionItem {
            controller_ib_partition_id: "ib-1".to_string(),
            controller_state: "READY".to_string(),
            pkey: Some(42),
            rate_limit: Some(100),
        }]);

        let mut reported = HashSet::new();
        update_infiniband_partitions_in_db(&dao, &journal, &session, site_id, inventory, &mut reported).await.unwrap();

        let fetched = dao.get_by_id(p.id.as_uuid(), false).await.unwrap().unwrap();
        assert_eq!(fetched.status, ResourceStatus::Ready);
        assert_eq!(fetched.pkey, Some(42));
    }
}
