use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cloudcore_domain::entities::{Machine, MachineHealth};
use cloudcore_domain::ids::SiteId;
use cloudcore_domain::state_mapping::map_machine_state;
use cloudcore_store::{Dao, Session, StatusJournal};
use uuid::Uuid;

use crate::driver::{reconcile, ApplyResult, Match, NewOnSitePolicy, ReconcileHooks, ReconcileOutcome};
use crate::error::ReconcileError;
use crate::types::Inventory;

/// One reported Machine (§3, §4.2.1).
#[derive(Debug, Clone)]
pub struct MachineItem {
    pub controller_machine_id: String,
    pub controller_state: String,
    pub maintenance_start_time: Option<DateTime<Utc>>,
    pub health: MachineHealth,
    pub hostname: Option<String>,
    pub instance_type_id: Option<String>,
    pub labels: HashMap<String, String>,
}

struct MachineHooks;

#[async_trait]
impl ReconcileHooks<Machine, MachineItem> for MachineHooks {
    fn resource_noun(&self) -> &'static str {
        "machine"
    }

    fn find_existing<'e>(&self, item: &MachineItem, existing: &'e [Machine]) -> Match<'e, Machine> {
        match existing.iter().find(|m| m.controller_machine_id.as_deref() == Some(item.controller_machine_id.as_str())) {
            Some(m) => Match::Existing(m),
            // Machines are provisioned through their own workflow, never
            // discovered and auto-created from inventory (§4.5).
            None => Match::Unmatched,
        }
    }

    fn new_on_site_policy(&self) -> NewOnSitePolicy {
        NewOnSitePolicy::Reject
    }

    fn apply(&self, entity: &mut Machine, item: &MachineItem) -> ApplyResult {
        let result = map_machine_state(&item.controller_state, item.maintenance_start_time, &item.health);

        let changed = entity.status != result.status
            || entity.is_usable_by_tenant != result.is_usable_by_tenant
            || entity.maintenance_start_time != item.maintenance_start_time
            || entity.hostname != item.hostname
            || entity.instance_type_id != item.instance_type_id
            || entity.labels != item.labels;

        entity.status = result.status;
        entity.is_usable_by_tenant = result.is_usable_by_tenant;
        entity.maintenance_start_time = item.maintenance_start_time;
        entity.health = item.health.clone();
        entity.hostname = item.hostname.clone();
        entity.instance_type_id = item.instance_type_id.clone();
        entity.labels = item.labels.clone();

        ApplyResult { changed, status_label: result.status.to_string(), message: Some(result.message), metadata_drift: false }
    }

    fn requires_stale_guard(&self) -> bool {
        // §9 "row locking": a Machine reload refuses to back-transition state
        // that was already superseded by a fresher mutation.
        true
    }
}

/// `UpdateMachinesInDB` (§6).
pub async fn update_machines_in_db(
    machines: &Arc<dyn Dao<Machine>>,
    status_journal: &Arc<dyn StatusJournal>,
    session: &Arc<dyn Session>,
    site_id: SiteId,
    inventory: Inventory<MachineItem>,
    reported: &mut HashSet<Uuid>,
) -> Result<ReconcileOutcome<Machine>, ReconcileError> {
    reconcile(machines, status_journal, session, site_id.as_uuid(), inventory, &MachineHooks, reported).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcore_domain::entities::MachineStatus;
    use cloudcore_store::journal::memory::InMemoryStatusJournal;
    use cloudcore_store::memory::InMemoryDao;
    use cloudcore_store::session::InMemorySession;

    #[tokio::test]
    async fn ready_machine_becomes_usable_by_tenant() {
        let dao: Arc<dyn Dao<Machine>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let session: Arc<dyn Session> = Arc::new(InMemorySession::new());
        let site_id = SiteId::random();

        let mut m = Machine::new(site_id, "on-prem-provider");
        m.controller_machine_id = Some("mach-1".to_string());
        m.status = MachineStatus::Initializing;
        m.created = chrono::Utc::now() - chrono::Duration::hours(1);
        m.updated = m.created;
        dao.create(&m).await.unwrap();

        let inventory = Inventory::unpaged(vec![MachineItem {
            controller_machine_id: "mach-1".to_string(),
            controller_state: "Ready".to_string(),
            maintenance_start_time: None,
            health: MachineHealth::default(),
            hostname: Some("node-1".to_string()),
            instance_type_id: None,
            labels: HashMap::new(),
        }]);

        let mut reported = HashSet::new();
        update_machines_in_db(&dao, &journal, &session, site_id, inventory, &mut reported).await.unwrap();

        let fetched = dao.get_by_id(m.id.as_uuid(), false).await.unwrap().unwrap();
        assert_eq!(fetched.status, MachineStatus::Ready);
        assert!(fetched.is_usable_by_tenant);
        assert_eq!(fetched.hostname.as_deref(), Some("node-1"));
    }

    #[tokio::test]
    async fn recently_mutated_machine_is_skipped_by_stale_guard() {
        let dao: Arc<dyn Dao<Machine>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let session: Arc<dyn Session> = Arc::new(InMemorySession::new());
        let site_id = SiteId::random();

        let mut m = Machine::new(site_id, "on-prem-provider");
        m.controller_machine_id = Some("mach-1".to_string());
        m.status = MachineStatus::InUse;
        dao.create(&m).await.unwrap(); // updated == now, inside the guard window

        let inventory = Inventory::unpaged(vec![MachineItem {
            controller_machine_id: "mach-1".to_string(),
            controller_state: "Ready".to_string(),
            maintenance_start_time: None,
            health: MachineHealth::default(),
            hostname: None,
            instance_type_id: None,
            labels: HashMap::new(),
        }]);

        let mut reported = HashSet::new();
        update_machines_in_db(&dao, &journal, &session, site_id, inventory, &mut reported).await.unwrap();

        let fetched = dao.get_by_id(m.id.as_uuid(), false).await.unwrap().unwrap();
        assert_eq!(fetched.status, MachineStatus::InUse, "stale guard should have skipped the apply");
    }
}
