use std::sync::Arc;

use chrono::Utc;
use cloudcore_domain::constants::INVENTORY_RECEIPT_INTERVAL;
use cloudcore_domain::entities::{CapabilityType, MachineCapability};
use cloudcore_domain::ids::MachineId;
use cloudcore_store::{Dao, Entity, ListFilter, PageRequest};

use crate::error::ReconcileError;

/// One reported capability row of a Machine (§3: unique by `(Type, Name)`
/// within a Machine; a capability with unknown capacity is still a
/// first-class row named [`cloudcore_domain::entities::UNKNOWN_CAPABILITY_NAME`],
/// never discarded).
#[derive(Debug, Clone)]
pub struct MachineCapabilityItem {
    pub capability_type: CapabilityType,
    pub name: String,
    pub count: u32,
    pub capacity: Option<u64>,
    pub cores: Option<u32>,
    pub threads: Option<u32>,
    pub device_type: Option<String>,
    pub inactive_devices: Vec<String>,
}

/// Syncs a Machine's capability rows against one reported snapshot.
pub async fn sync_machine_capabilities(
    capabilities: &Arc<dyn Dao<MachineCapability>>,
    machine_id: uuid::Uuid,
    items: &[MachineCapabilityItem],
) -> Result<(), ReconcileError> {
    let existing = capabilities
        .get_all(ListFilter { scope_id: Some(machine_id), include_deleted: false }, PageRequest::default())
        .await?
        .items;

    let mut reported = std::collections::HashSet::new();
    for item in items {
        match existing.iter().find(|c| c.identity() == (item.capability_type, item.name.as_str())) {
            Some(found) => {
                reported.insert(found.id());
                let changed = found.count != item.count
                    || found.capacity != item.capacity
                    || found.cores != item.cores
                    || found.threads != item.threads
                    || found.device_type != item.device_type
                    || found.inactive_devices != item.inactive_devices;
                if changed {
                    let mut updated = found.clone();
                    updated.count = item.count;
                    updated.capacity = item.capacity;
                    updated.cores = item.cores;
                    updated.threads = item.threads;
                    updated.device_type = item.device_type.clone();
                    updated.inactive_devices = item.inactive_devices.clone();
                    updated.updated = Utc::now();
                    capabilities.update(&updated).await?;
                }
            }
            None => {
                let mut created = MachineCapability::new(MachineId::new(machine_id), item.capability_type, item.name.clone(), item.count);
                created.capacity = item.capacity;
                created.cores = item.cores;
                created.threads = item.threads;
                created.device_type = item.device_type.clone();
                created.inactive_devices = item.inactive_devices.clone();
                reported.insert(created.id);
                capabilities.create(&created).await?;
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
        capabilities.delete_by_id(entity.id.as_uuid()).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcore_domain::entities::UNKNOWN_CAPABILITY_NAME;
    use cloudcore_store::memory::InMemoryDao;

    #[tokio::test]
    async fn unknown_capacity_capability_is_preserved_as_its_own_row() {
        let dao: Arc<dyn Dao<MachineCapability>> = InMemoryDao::new();
        let machine_id = MachineId::random();

        let items = vec![MachineCapabilityItem {
            capability_type: CapabilityType::Memory,
            name: UNKNOWN_CAPABILITY_NAME.to_string(),
            count: 1,
            capacity: None,
            cores: None,
            threads: None,
            device_type: None,
            inactive_devices: vec![],
        }];

        sync_machine_capabilities(&dao, machine_id.as_uuid(), &items).await.unwrap();

        let all = dao.get_all(Default::default(), Default::default()).await.unwrap();
        assert_eq!(all.items.len(), 1);
        assert_eq!(all.items[0].name, UNKNOWN_CAPABILITY_NAME);
        assert!(all.items[0].capacity.is_none());
    }

    #[tokio::test]
    async fn unreported_capability_is_soft_deleted_after_guard_window() {
        let dao: Arc<dyn Dao<MachineCapability>> = InMemoryDao::new();
        let machine_id = MachineId::random();

        let mut cap = MachineCapability::new(machine_id, CapabilityType::Gpu, "H100", 8);
        cap.created = chrono::Utc::now() - chrono::Duration::hours(1);
        dao.create(&cap).await.unwrap();

        sync_machine_capabilities(&dao, machine_id.as_uuid(), &[]).await.unwrap();

        let fetched = dao.get_by_id(cap.id.as_uuid(), false).await.unwrap().unwrap();
        assert!(fetched.deleted_at.is_some());
    }
}
