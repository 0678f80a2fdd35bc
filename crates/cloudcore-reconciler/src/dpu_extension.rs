use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use cloudcore_domain::entities::DpuExtensionService;
use cloudcore_domain::ids::SiteId;
use cloudcore_domain::state_mapping::map_simple_resource_state;
use cloudcore_store::{Dao, Session, StatusJournal};
use uuid::Uuid;

use crate::driver::{reconcile, ApplyResult, Match, NewOnSitePolicy, ReconcileHooks, ReconcileOutcome};
use crate::error::ReconcileError;
use crate::types::Inventory;

/// One reported DPU-Extension-Service (§3, §4.2).
#[derive(Debug, Clone)]
pub struct DpuExtensionServiceItem {
    pub controller_id: String,
    pub controller_state: String,
    pub version: Option<String>,
    pub active_versions: Vec<String>,
}

struct DpuExtensionHooks;

#[async_trait]
impl ReconcileHooks<DpuExtensionService, DpuExtensionServiceItem> for DpuExtensionHooks {
    fn resource_noun(&self) -> &'static str {
        "dpu_extension_service"
    }

    fn find_existing<'e>(
        &self,
        item: &DpuExtensionServiceItem,
        existing: &'e [DpuExtensionService],
    ) -> Match<'e, DpuExtensionService> {
        match existing.iter().find(|s| s.controller_id.as_deref() == Some(item.controller_id.as_str())) {
            Some(s) => Match::Existing(s),
            // §9 open question: unknown-on-Site currently logs and skips
            // rather than auto-creating.
            None => Match::Unmatched,
        }
    }

    fn new_on_site_policy(&self) -> NewOnSitePolicy {
        NewOnSitePolicy::Reject
    }

    fn apply(&self, entity: &mut DpuExtensionService, item: &DpuExtensionServiceItem) -> ApplyResult {
        let (status, message) = map_simple_resource_state(&item.controller_state, "DPU-Extension-Service");
        let changed = entity.status != status
            || entity.version != item.version
            || entity.active_versions != item.active_versions;
        entity.status = status;
        entity.version = item.version.clone();
        entity.active_versions = item.active_versions.clone();
        ApplyResult { changed, status_label: status.to_string(), message: Some(message), metadata_drift: false }
    }

    fn failed_inventory_is_terminal(&self) -> bool {
        // §4.2 step 2: unlike the other resources, a failed collection for
        // this one surfaces as a non-retryable error instead of a skip.
        true
    }
}

/// `UpdateDPUExtensionServicesInDB` (§6).
pub async fn update_dpu_extension_services_in_db(
    services: &Arc<dyn Dao<DpuExtensionService>>,
    status_journal: &Arc<dyn StatusJournal>,
    session: &Arc<dyn Session>,
    site_id: SiteId,
    inventory: Inventory<DpuExtensionServiceItem>,
    reported: &mut HashSet<Uuid>,
) -> Result<ReconcileOutcome<DpuExtensionService>, ReconcileError> {
    reconcile(services, status_journal, session, site_id.as_uuid(), inventory, &DpuExtensionHooks, reported).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InventoryStatus;
    use cloudcore_store::journal::memory::InMemoryStatusJournal;
    use cloudcore_store::memory::InMemoryDao;
    use cloudcore_store::session::InMemorySession;

    #[tokio::test]
    async fn failed_inventory_is_a_terminal_error() {
        let dao: Arc<dyn Dao<DpuExtensionService>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let session: Arc<dyn Session> = Arc::new(InMemorySession::new());
        let site_id = SiteId::random();

        let mut inventory = Inventory::unpaged(Vec::<DpuExtensionServiceItem>::new());
        inventory.inventory_status = InventoryStatus::Failed;

        let mut reported = HashSet::new();
        let err = update_dpu_extension_services_in_db(&dao, &journal, &session, site_id, inventory, &mut reported)
            .await
            .unwrap_err();
        assert!(!err.is_retryable());
    }
}
