use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use cloudcore_domain::entities::Vpc;
use cloudcore_domain::ids::SiteId;
use cloudcore_domain::state_mapping::map_simple_resource_state;
use cloudcore_store::{Dao, Session, StatusJournal};
use uuid::Uuid;

use crate::driver::{reconcile, ApplyResult, Match, NewOnSitePolicy, ReconcileHooks, ReconcileOutcome};
use crate::error::ReconcileError;
use crate::types::Inventory;

/// One reported VPC (§3, §4.2).
#[derive(Debug, Clone)]
pub struct VpcItem {
    pub controller_vpc_id: String,
    pub controller_state: String,
    pub labels: HashMap<String, String>,
}

struct VpcHooks;

#[async_trait]
impl ReconcileHooks<Vpc, VpcItem> for VpcHooks {
    fn resource_noun(&self) -> &'static str {
        "vpc"
    }

    fn find_existing<'e>(&self, item: &VpcItem, existing: &'e [Vpc]) -> Match<'e, Vpc> {
        // §9 decision ledger: VPC matches on Controller-ID only, skip-unmatched.
        match existing.iter().find(|v| v.controller_vpc_id.as_deref() == Some(item.controller_vpc_id.as_str())) {
            Some(vpc) => Match::Existing(vpc),
            None => Match::Unmatched,
        }
    }

    fn new_on_site_policy(&self) -> NewOnSitePolicy {
        NewOnSitePolicy::Reject
    }

    fn apply(&self, entity: &mut Vpc, item: &VpcItem) -> ApplyResult {
        let (status, message) = map_simple_resource_state(&item.controller_state, "VPC");

        let labels_drifted = entity.labels != item.labels;
        let changed = entity.controller_vpc_id.as_deref() != Some(item.controller_vpc_id.as_str())
            || entity.status != status
            || labels_drifted;

        entity.controller_vpc_id = Some(item.controller_vpc_id.clone());
        entity.status = status;
        if labels_drifted {
            entity.labels = item.labels.clone();
        }

        ApplyResult { changed, status_label: status.to_string(), message: Some(message), metadata_drift: labels_drifted }
    }
}

/// `Update<Vpc>sInDB` (§6) — reconcile one page of a Site's VPC inventory.
/// Returns the lifecycle events plus any VPCs whose metadata just drifted
/// from the Site's (the caller should dispatch `UpdateVPC` for each).
pub async fn update_vpcs_in_db(
    vpcs: &Arc<dyn Dao<Vpc>>,
    status_journal: &Arc<dyn StatusJournal>,
    session: &Arc<dyn Session>,
    site_id: SiteId,
    inventory: Inventory<VpcItem>,
    reported: &mut HashSet<Uuid>,
) -> Result<ReconcileOutcome<Vpc>, ReconcileError> {
    reconcile(vpcs, status_journal, session, site_id.as_uuid(), inventory, &VpcHooks, reported).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcore_domain::entities::Vpc;
    use cloudcore_domain::ids::TenantId;
    use cloudcore_domain::status::ResourceStatus;
    use cloudcore_store::memory::InMemoryDao;
    use cloudcore_store::journal::memory::InMemoryStatusJournal;
    use cloudcore_store::session::InMemorySession;

    #[tokio::test]
    async fn paged_vpc_metadata_drift_flags_update_and_missing_tail() {
        // Scenario 4: 38 VPCs in DB, inventory reports 34 across pages; one
        // drifted label, the remaining 4 end up missing on the last page.
        let dao: Arc<dyn Dao<Vpc>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let session: Arc<dyn Session> = Arc::new(InMemorySession::new());
        let site_id = SiteId::random();
        let tenant_id = TenantId::random();

        let mut all = Vec::new();
        for i in 0..38 {
            let mut vpc = Vpc::new(site_id, tenant_id);
            vpc.controller_vpc_id = Some(format!("ctrl-{i}"));
            vpc.status = ResourceStatus::Ready;
            if i == 1 {
                vpc.labels.insert("west1".to_string(), "gpu".to_string());
            }
            dao.create(&vpc).await.unwrap();
            all.push(vpc);
        }

        let mut reported = HashSet::new();
        let reported_items: Vec<VpcItem> = all
            .iter()
            .take(34)
            .enumerate()
            .map(|(i, v)| VpcItem {
                controller_vpc_id: v.controller_vpc_id.clone().unwrap(),
                controller_state: "READY".to_string(),
                labels: if i == 1 {
                    HashMap::from([("west1".to_string(), "gpu1".to_string())])
                } else {
                    v.labels.clone()
                },
            })
            .collect();

        let inventory = Inventory {
            items: reported_items,
            inventory_status: crate::types::InventoryStatus::Success,
            timestamp: chrono::Utc::now(),
            page: Some(crate::types::InventoryPage {
                current_page: 1,
                total_pages: 1,
                page_size: 34,
                total_items: 34,
                item_ids: Vec::new(),
            }),
        };

        let outcome = update_vpcs_in_db(&dao, &journal, &session, site_id, inventory, &mut reported).await.unwrap();
        assert_eq!(outcome.drift_notices.len(), 1);
        assert_eq!(outcome.drift_notices[0].controller_vpc_id, all[1].controller_vpc_id);

        for v in all.iter().skip(34) {
            let fetched = dao.get_by_id(v.id.as_uuid(), false).await.unwrap().unwrap();
            assert!(fetched.is_missing_on_site);
            assert_eq!(fetched.status, ResourceStatus::Error);
        }
    }
}
