use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::Dao;
use crate::entity::{Entity, ListFilter, Page, PageRequest};
use crate::error::StoreError;

/// In-memory implementation of [`Dao`], generic over any [`Entity`]. Data is
/// lost on process exit — suitable for tests and the in-process reference stack.
#[derive(Debug)]
pub struct InMemoryDao<E: Entity> {
    rows: RwLock<HashMap<Uuid, E>>,
    _marker: PhantomData<E>,
}

impl<E: Entity> Default for InMemoryDao<E> {
    fn default() -> Self {
        Self { rows: RwLock::new(HashMap::new()), _marker: PhantomData }
    }
}

impl<E: Entity> InMemoryDao<E> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl<E: Entity> Dao<E> for InMemoryDao<E> {
    async fn create(&self, entity: &E) -> Result<(), StoreError> {
        let mut guard = self.rows.write().await;
        if guard.contains_key(&entity.id()) {
            return Err(StoreError::Conflict(format!(
                "{} {} already exists",
                E::entity_name(),
                entity.id()
            )));
        }
        guard.insert(entity.id(), entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &E) -> Result<(), StoreError> {
        let mut guard = self.rows.write().await;
        if !guard.contains_key(&entity.id()) {
            return Err(StoreError::NotFound {
                entity: E::entity_name(),
                id: entity.id().to_string(),
            });
        }
        guard.insert(entity.id(), entity.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid, _lock_for_update: bool) -> Result<Option<E>, StoreError> {
        let guard = self.rows.read().await;
        Ok(guard.get(&id).cloned())
    }

    async fn get_all(&self, filter: ListFilter, page: PageRequest) -> Result<Page<E>, StoreError> {
        let guard = self.rows.read().await;
        let mut items: Vec<E> = guard
            .values()
            .filter(|e| filter.include_deleted || e.deleted_at().is_none())
            .filter(|e| filter.scope_id.map_or(true, |s| e.scope_id() == s))
            .cloned()
            .collect();
        items.sort_by_key(|e| e.id());

        if page.page_size == 0 && items.len() as i64 > cloudcore_domain::constants::TOTAL_LIMIT {
            return Err(StoreError::Transient(format!(
                "{} unpaged listing exceeds TotalLimit ({}); paginate the caller",
                E::entity_name(),
                cloudcore_domain::constants::TOTAL_LIMIT
            )));
        }

        let start = match &page.page_token {
            Some(token) => {
                let after: Uuid = token
                    .parse()
                    .map_err(|_| StoreError::Internal(format!("invalid page token: {token}")))?;
                items.iter().position(|e| e.id() == after).map(|i| i + 1).unwrap_or(0)
            }
            None => 0,
        };
        let page_size = if page.page_size == 0 { items.len() as u32 } else { page.page_size };
        let end = (start + page_size as usize).min(items.len());
        let slice = items[start..end].to_vec();
        let next_page_token = if end < items.len() { slice.last().map(|e| e.id().to_string()) } else { None };

        Ok(Page { items: slice, next_page_token })
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        let mut guard = self.rows.write().await;
        let entity = guard
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound { entity: E::entity_name(), id: id.to_string() })?;
        entity.mark_deleted(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Widget {
        id: Uuid,
        site_id: Uuid,
        deleted_at: Option<DateTime<Utc>>,
    }

    impl Entity for Widget {
        fn id(&self) -> Uuid {
            self.id
        }
        fn scope_id(&self) -> Uuid {
            self.site_id
        }
        fn deleted_at(&self) -> Option<DateTime<Utc>> {
            self.deleted_at
        }
        fn mark_deleted(&mut self, at: DateTime<Utc>) {
            self.deleted_at = Some(at);
        }
        fn entity_name() -> &'static str {
            "widget"
        }
    }

    fn widget(site_id: Uuid) -> Widget {
        Widget { id: Uuid::new_v4(), site_id, deleted_at: None }
    }

    #[tokio::test]
    async fn create_then_get_by_id() {
        let dao: Arc<InMemoryDao<Widget>> = InMemoryDao::new();
        let w = widget(Uuid::new_v4());
        dao.create(&w).await.unwrap();

        let fetched = dao.get_by_id(w.id, false).await.unwrap().unwrap();
        assert_eq!(fetched.id, w.id);
    }

    #[tokio::test]
    async fn create_twice_conflicts() {
        let dao: Arc<InMemoryDao<Widget>> = InMemoryDao::new();
        let w = widget(Uuid::new_v4());
        dao.create(&w).await.unwrap();
        let err = dao.create(&w).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let dao: Arc<InMemoryDao<Widget>> = InMemoryDao::new();
        let w = widget(Uuid::new_v4());
        let err = dao.update(&w).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_is_soft() {
        let dao: Arc<InMemoryDao<Widget>> = InMemoryDao::new();
        let w = widget(Uuid::new_v4());
        dao.create(&w).await.unwrap();
        dao.delete_by_id(w.id).await.unwrap();

        let fetched = dao.get_by_id(w.id, false).await.unwrap().unwrap();
        assert!(fetched.deleted_at.is_some());
    }

    #[tokio::test]
    async fn get_all_filters_by_scope_and_excludes_deleted_by_default() {
        let dao: Arc<InMemoryDao<Widget>> = InMemoryDao::new();
        let site_a = Uuid::new_v4();
        let site_b = Uuid::new_v4();
        let w1 = widget(site_a);
        let w2 = widget(site_a);
        let w3 = widget(site_b);
        dao.create(&w1).await.unwrap();
        dao.create(&w2).await.unwrap();
        dao.create(&w3).await.unwrap();
        dao.delete_by_id(w2.id).await.unwrap();

        let page = dao
            .get_all(ListFilter { scope_id: Some(site_a), include_deleted: false }, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, w1.id);
    }

    #[tokio::test]
    async fn get_all_pages_results() {
        let dao: Arc<InMemoryDao<Widget>> = InMemoryDao::new();
        let site = Uuid::new_v4();
        for _ in 0..5 {
            dao.create(&widget(site)).await.unwrap();
        }

        let page1 = dao
            .get_all(ListFilter { scope_id: Some(site), include_deleted: false }, PageRequest { page_token: None, page_size: 2 })
            .await
            .unwrap();
        assert_eq!(page1.items.len(), 2);
        assert!(page1.next_page_token.is_some());

        let page2 = dao
            .get_all(
                ListFilter { scope_id: Some(site), include_deleted: false },
                PageRequest { page_token: page1.next_page_token, page_size: 2 },
            )
            .await
            .unwrap();
        assert_eq!(page2.items.len(), 2);
    }
}
