use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::client::WorkflowClient;
use crate::error::WorkflowError;

/// Lazy, thread-safe Site-UUID → client map (§C4, §4.4, §4.6). Readers take
/// a read lock; a cache miss upgrades to a write lock and re-checks before
/// building (double-checked read) so concurrent first-time lookups for the
/// same Site only build one client.
pub struct ClientPool<F> {
    clients: RwLock<HashMap<Uuid, Arc<dyn WorkflowClient>>>,
    factory: F,
}

impl<F, Fut> ClientPool<F>
where
    F: Fn(Uuid) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<Arc<dyn WorkflowClient>, WorkflowError>> + Send,
{
    pub fn new(factory: F) -> Self {
        Self { clients: RwLock::new(HashMap::new()), factory }
    }

    /// Returns the client for `site_id`, building and caching it on first use.
    pub async fn get(&self, site_id: Uuid) -> Result<Arc<dyn WorkflowClient>, WorkflowError> {
        if let Some(client) = self.clients.read().await.get(&site_id) {
            return Ok(client.clone());
        }

        let mut guard = self.clients.write().await;
        if let Some(client) = guard.get(&site_id) {
            return Ok(client.clone());
        }

        let client = (self.factory)(site_id).await?;
        guard.insert(site_id, client.clone());
        Ok(client)
    }

    /// Evicts a cached client, forcing the next `get` to rebuild it — used
    /// when a Site's TLS material is rotated (§4.4: "dynamically reloadable").
    pub async fn evict(&self, site_id: Uuid) {
        self.clients.write().await.remove(&site_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryWorkflowClient;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn builds_a_client_once_per_site() {
        let build_count = Arc::new(AtomicUsize::new(0));
        let counter = build_count.clone();
        let pool = ClientPool::new(move |_site_id| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(InMemoryWorkflowClient::new()) as Arc<dyn WorkflowClient>)
            }
        });

        let site = Uuid::new_v4();
        let first = pool.get(site).await.unwrap();
        let second = pool.get(site).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(build_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_sites_get_distinct_clients() {
        let pool = ClientPool::new(|_site_id| async move {
            Ok(Arc::new(InMemoryWorkflowClient::new()) as Arc<dyn WorkflowClient>)
        });

        let site_a = pool.get(Uuid::new_v4()).await.unwrap();
        let site_b = pool.get(Uuid::new_v4()).await.unwrap();
        assert!(!Arc::ptr_eq(&site_a, &site_b));
    }

    #[tokio::test]
    async fn evict_forces_rebuild() {
        let build_count = Arc::new(AtomicUsize::new(0));
        let counter = build_count.clone();
        let pool = ClientPool::new(move |_site_id| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(InMemoryWorkflowClient::new()) as Arc<dyn WorkflowClient>)
            }
        });

        let site = Uuid::new_v4();
        pool.get(site).await.unwrap();
        pool.evict(site).await;
        pool.get(site).await.unwrap();
        assert_eq!(build_count.load(Ordering::SeqCst), 2);
    }
}
