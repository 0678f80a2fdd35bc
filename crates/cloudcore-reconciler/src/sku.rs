use std::sync::Arc;

use chrono::Utc;
use cloudcore_domain::entities::Sku;
use cloudcore_domain::ids::{MachineId, SiteId};
use cloudcore_store::{Dao, Entity, ListFilter, PageRequest};

use crate::error::ReconcileError;

/// One reported SKU (§3). SKU carries no status field and is never marked
/// missing or hard-deleted by inventory — it is a pure upsert keyed by the
/// Site's own device-type identifier (§9 decision ledger).
#[derive(Debug, Clone)]
pub struct SkuItem {
    pub device_type: String,
    pub components: serde_json::Value,
    pub associated_machine_ids: Vec<MachineId>,
}

/// `UpdateSKUsInDB` (§6).
pub async fn update_skus_in_db(
    skus: &Arc<dyn Dao<Sku>>,
    site_id: SiteId,
    items: &[SkuItem],
) -> Result<(), ReconcileError> {
    let existing = skus
        .get_all(ListFilter { scope_id: Some(site_id.as_uuid()), include_deleted: false }, PageRequest::default())
        .await?
        .items;

    for item in items {
        match existing.iter().find(|s| s.device_type == item.device_type) {
            Some(found) => {
                if found.components != item.components || found.associated_machine_ids != item.associated_machine_ids {
                    let mut updated = found.clone();
                    updated.components = item.components.clone();
                    updated.associated_machine_ids = item.associated_machine_ids.clone();
                    updated.updated = Utc::now();
                    skus.update(&updated).await?;
                }
            }
            None => {
                let mut created = Sku::new(site_id, item.device_type.clone());
                created.components = item.components.clone();
                created.associated_machine_ids = item.associated_machine_ids.clone();
                skus.create(&created).await?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcore_store::memory::InMemoryDao;
    use serde_json::json;

    #[tokio::test]
    async fn new_device_type_is_created() {
        let dao: Arc<dyn Dao<Sku>> = InMemoryDao::new();
        let site_id = SiteId::random();

        let items = vec![SkuItem {
            device_type: "h100-node".to_string(),
            components: json!({"gpu_count": 8}),
            associated_machine_ids: vec![],
        }];

        update_skus_in_db(&dao, site_id, &items).await.unwrap();

        let all = dao.get_all(Default::default(), Default::default()).await.unwrap();
        assert_eq!(all.items.len(), 1);
        assert_eq!(all.items[0].device_type, "h100-node");
    }

    #[tokio::test]
    async fn matching_device_type_updates_components_in_place() {
        let dao: Arc<dyn Dao<Sku>> = InMemoryDao::new();
        let site_id = SiteId::random();

        let mut sku = Sku::new(site_id, "h100-node");
        sku.components = json!({"gpu_count": 8});
        dao.create(&sku).await.unwrap();

        let items = vec![SkuItem {
            device_type: "h100-node".to_string(),
            components: json!({"gpu_count": 4}),
            associated_machine_ids: vec![],
        }];
        update_skus_in_db(&dao, site_id, &items).await.unwrap();

        let all = dao.get_all(Default::default(), Default::default()).await.unwrap();
        assert_eq!(all.items.len(), 1, "same device_type should update, not duplicate");
        assert_eq!(all.items[0].components, json!({"gpu_count": 4}));
    }
}
