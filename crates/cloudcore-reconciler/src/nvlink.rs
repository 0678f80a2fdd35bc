use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use cloudcore_domain::entities::NvLinkLogicalPartition;
use cloudcore_domain::ids::SiteId;
use cloudcore_domain::state_mapping::map_simple_resource_state;
use cloudcore_store::{Dao, Session, StatusJournal};
use uuid::Uuid;

use crate::driver::{reconcile, ApplyResult, Match, NewOnSitePolicy, ReconcileHooks, ReconcileOutcome};
use crate::error::ReconcileError;
use crate::types::Inventory;

/// One reported NVLink-Logical-Partition (§3, §4.2).
#[derive(Debug, Clone)]
pub struct NvLinkPartitionItem {
    pub controller_id: String,
    pub controller_state: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

struct NvLinkHooks;

#[async_trait]
impl ReconcileHooks<NvLinkLogicalPartition, NvLinkPartitionItem> for NvLinkHooks {
    fn resource_noun(&self) -> &'static str {
        "nvlink_logical_partition"
    }

    fn find_existing<'e>(
        &self,
        item: &NvLinkPartitionItem,
        existing: &'e [NvLinkLogicalPartition],
    ) -> Match<'e, NvLinkLogicalPartition> {
        match existing.iter().find(|p| p.controller_id.as_deref() == Some(item.controller_id.as_str())) {
            Some(p) => Match::Existing(p),
            None => Match::Unmatched,
        }
    }

    fn new_on_site_policy(&self) -> NewOnSitePolicy {
        NewOnSitePolicy::Reject
    }

    fn apply(&self, entity: &mut NvLinkLogicalPartition, item: &NvLinkPartitionItem) -> ApplyResult {
        let (status, message) = map_simple_resource_state(&item.controller_state, "NVLink-Logical-Partition");
        let changed = entity.status != status || entity.name != item.name || entity.description != item.description;
        entity.status = status;
        entity.name = item.name.clone();
        entity.description = item.description.clone();
        ApplyResult { changed, status_label: status.to_string(), message: Some(message), metadata_drift: false }
    }
}

/// `UpdateNVLinkLogicalPartitionsInDB` (§6).
pub async fn update_nvlink_partitions_in_db(
    partitions: &Arc<dyn Dao<NvLinkLogicalPartition>>,
    status_journal: &Arc<dyn StatusJournal>,
    session: &Arc<dyn Session>,
    site_id: SiteId,
    inventory: Inventory<NvLinkPartitionItem>,
    reported: &mut HashSet<Uuid>,
) -> Result<ReconcileOutcome<NvLinkLogicalPartition>, ReconcileError> {
    reconcile(partitions, status_journal, session, site_id.as_uuid(), inventory, &NvLinkHooks, reported).await
}
