use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use cloudcore_domain::entities::{NetworkSecurityGroup, SecurityRule};
use cloudcore_domain::ids::{SiteId, TenantId};
use cloudcore_domain::state_mapping::map_simple_resource_state;
use cloudcore_store::{Dao, Session, StatusJournal};
use uuid::Uuid;

use crate::driver::{reconcile, ApplyResult, Match, NewOnSitePolicy, ReconcileHooks, ReconcileOutcome};
use crate::error::ReconcileError;
use crate::types::Inventory;

/// One reported NetworkSecurityGroup (§3, §4.2).
#[derive(Debug, Clone)]
pub struct NsgItem {
    pub controller_id: String,
    pub controller_state: String,
    pub tenant_id: TenantId,
    pub stateful_egress: bool,
    pub rules: Vec<SecurityRule>,
    pub version: u64,
}

struct NsgHooks;

#[async_trait]
impl ReconcileHooks<NetworkSecurityGroup, NsgItem> for NsgHooks {
    fn resource_noun(&self) -> &'static str {
        "network_security_group"
    }

    fn find_existing<'e>(&self, item: &NsgItem, existing: &'e [NetworkSecurityGroup]) -> Match<'e, NetworkSecurityGroup> {
        match existing.iter().find(|n| n.controller_id.as_deref() == Some(item.controller_id.as_str())) {
            Some(n) => Match::Existing(n),
            None => Match::NewOnSite,
        }
    }

    fn new_on_site_policy(&self) -> NewOnSitePolicy {
        // §9 decision ledger: NSG auto-creates when unmatched.
        NewOnSitePolicy::AutoCreate
    }

    fn create_new(&self, item: &NsgItem, site_id: Uuid) -> Option<NetworkSecurityGroup> {
        let mut nsg = NetworkSecurityGroup::new(SiteId::new(site_id), item.tenant_id);
        nsg.controller_id = Some(item.controller_id.clone());
        Some(nsg)
    }

    fn apply(&self, entity: &mut NetworkSecurityGroup, item: &NsgItem) -> ApplyResult {
        let (status, message) = map_simple_resource_state(&item.controller_state, "NetworkSecurityGroup");

        // §3: only the rule set updates when the reported version differs
        // from what's stored — status still tracks the controller state every pass.
        let version_drifted = entity.version != item.version;
        let changed = entity.status != status || version_drifted;

        entity.status = status;
        if version_drifted {
            entity.stateful_egress = item.stateful_egress;
            entity.rules = item.rules.clone();
            entity.version = item.version;
        }

        ApplyResult { changed, status_label: status.to_string(), message: Some(message), metadata_drift: version_drifted }
    }
}

/// `UpdateNetworkSecurityGroupsInDB` (§6).
pub async fn update_network_security_groups_in_db(
    nsgs: &Arc<dyn Dao<NetworkSecurityGroup>>,
    status_journal: &Arc<dyn StatusJournal>,
    session: &Arc<dyn Session>,
    site_id: SiteId,
    inventory: Inventory<NsgItem>,
    reported: &mut HashSet<Uuid>,
) -> Result<ReconcileOutcome<NetworkSecurityGroup>, ReconcileError> {
    reconcile(nsgs, status_journal, session, site_id.as_uuid(), inventory, &NsgHooks, reported).await
}
