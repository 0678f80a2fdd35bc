use std::sync::Arc;

use chrono::Utc;
use cloudcore_domain::constants::INVENTORY_RECEIPT_INTERVAL;
use cloudcore_domain::entities::MachineInterface;
use cloudcore_domain::ids::MachineId;
use cloudcore_store::{Dao, Entity, ListFilter, PageRequest};
use tracing::warn;

use crate::error::ReconcileError;

/// One reported interface of a Machine (§3). Scoped by the owning Machine,
/// not by Site — there is no paged inventory envelope here, the Site reports
/// a Machine's full interface set in one shot.
#[derive(Debug, Clone)]
pub struct MachineInterfaceItem {
    pub controller_interface_id: String,
    pub controller_segment_id: Option<String>,
    pub attached_dpu_machine_id: Option<MachineId>,
    pub ip_addresses: Vec<String>,
    pub mac_address: Option<String>,
    pub hostname: Option<String>,
    pub is_primary: bool,
}

/// Syncs a Machine's interface rows against one reported snapshot. Unlike the
/// resource reconcilers this has no per-item status — presence and the
/// primary-interface invariant are all there is (§3: "exactly one primary
/// interface per Machine").
pub async fn sync_machine_interfaces(
    interfaces: &Arc<dyn Dao<MachineInterface>>,
    machine_id: uuid::Uuid,
    items: &[MachineInterfaceItem],
) -> Result<(), ReconcileError> {
    let existing = interfaces
        .get_all(ListFilter { scope_id: Some(machine_id), include_deleted: false }, PageRequest::default())
        .await?
        .items;

    let primary_count = items.iter().filter(|i| i.is_primary).count();
    if primary_count > 1 {
        warn!(%machine_id, primary_count, "machine reported more than one primary interface, keeping first claim");
    }
    let mut primary_claimed = false;

    let mut reported = std::collections::HashSet::new();
    for item in items {
        let is_primary = item.is_primary && !primary_claimed;
        if is_primary {
            primary_claimed = true;
        }

        match existing.iter().find(|i| i.controller_interface_id.as_deref() == Some(item.controller_interface_id.as_str())) {
            Some(found) => {
                reported.insert(found.id());
                let mut updated = found.clone();
                updated.controller_segment_id = item.controller_segment_id.clone();
                updated.attached_dpu_machine_id = item.attached_dpu_machine_id;
                updated.ip_addresses = item.ip_addresses.clone();
                updated.mac_address = item.mac_address.clone();
                updated.hostname = item.hostname.clone();
                updated.is_primary = is_primary;
                updated.updated = Utc::now();
                interfaces.update(&updated).await?;
            }
            None => {
                let mut created = MachineInterface::new(MachineId::new(machine_id));
                created.controller_interface_id = Some(item.controller_interface_id.clone());
                created.controller_segment_id = item.controller_segment_id.clone();
                created.attached_dpu_machine_id = item.attached_dpu_machine_id;
                created.ip_addresses = item.ip_addresses.clone();
                created.mac_address = item.mac_address.clone();
                created.hostname = item.hostname.clone();
                created.is_primary = is_primary;
                reported.insert(created.id);
                interfaces.create(&created).await?;
            }
        }
    }

    let now = Utc::now();
    for entity in &existing {
        if reported.contains(&entity.id) || entity.deleted_at.is_some() {
            continue;
        }
        if now - entity.created < chrono::Duration::from_std(INVENTORY_RECEIPT_INTERVAL).unwrap_or_default() {
            continue;
        }
        interfaces.delete_by_id(entity.id.as_uuid()).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcore_store::memory::InMemoryDao;

    #[tokio::test]
    async fn creates_reported_interface_as_primary() {
        let dao: Arc<dyn Dao<MachineInterface>> = InMemoryDao::new();
        let machine_id = MachineId::random();

        let items = vec![MachineInterfaceItem {
            controller_interface_id: "eth0".to_string(),
            controller_segment_id: None,
            attached_dpu_machine_id: None,
            ip_addresses: vec!["10.0.0.5".to_string()],
            mac_address: Some("aa:bb:cc:00:11:22".to_string()),
            hostname: Some("node-1".to_string()),
            is_primary: true,
        }];

        sync_machine_interfaces(&dao, machine_id.as_uuid(), &items).await.unwrap();

        let all = dao.get_all(Default::default(), Default::default()).await.unwrap();
        assert_eq!(all.items.len(), 1);
        assert!(all.items[0].is_primary);
    }

    #[tokio::test]
    async fn only_first_claimed_primary_wins() {
        let dao: Arc<dyn Dao<MachineInterface>> = InMemoryDao::new();
        let machine_id = MachineId::random();

        let items = vec![
            MachineInterfaceItem {
                controller_interface_id: "eth0".to_string(),
                controller_segment_id: None,
                attached_dpu_machine_id: None,
                ip_addresses: vec![],
                mac_address: None,
                hostname: None,
                is_primary: true,
            },
            MachineInterfaceItem {
                controller_interface_id: "eth1".to_string(),
                controller_segment_id: None,
                attached_dpu_machine_id: None,
                ip_addresses: vec![],
                mac_address: None,
                hostname: None,
                is_primary: true,
            },
        ];

        sync_machine_interfaces(&dao, machine_id.as_uuid(), &items).await.unwrap();

        let all = dao.get_all(Default::default(), Default::default()).await.unwrap();
        let primaries = all.items.iter().filter(|i| i.is_primary).count();
        assert_eq!(primaries, 1);
    }
}
