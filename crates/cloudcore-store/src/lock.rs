use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::StoreError;

type BoxedWork<'a> = Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>;

/// Cooperative, transaction-scoped lock keyed by a hashed string — concretely
/// an entity UUID (§4.1, §9). Both implementations run `work` with the lock
/// held and release it afterward, success or failure.
#[async_trait]
pub trait AdvisoryLocks: Send + Sync + 'static {
    async fn with_lock<'a>(&'a self, key: Uuid, work: BoxedWork<'a>) -> Result<(), StoreError>;
}

/// In-process advisory locks for [`crate::memory`] — a `HashMap<Uuid, Arc<Mutex<()>>>`
/// behind an `RwLock`, lazily populated per key on first use.
#[derive(Debug, Default)]
pub struct InMemoryAdvisoryLocks {
    locks: RwLock<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl InMemoryAdvisoryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    async fn mutex_for(&self, key: Uuid) -> Arc<Mutex<()>> {
        if let Some(m) = self.locks.read().await.get(&key) {
            return m.clone();
        }
        let mut guard = self.locks.write().await;
        guard.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

#[async_trait]
impl AdvisoryLocks for InMemoryAdvisoryLocks {
    async fn with_lock<'a>(&'a self, key: Uuid, work: BoxedWork<'a>) -> Result<(), StoreError> {
        let mutex = self.mutex_for(key).await;
        let _guard = mutex.lock().await;
        work.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serializes_access_to_the_same_key() {
        let locks = InMemoryAdvisoryLocks::new();
        let key = Uuid::new_v4();
        let counter = Arc::new(tokio::sync::Mutex::new(0i32));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let counter = counter.clone();
            let locks = &locks;
            handles.push(async move {
                locks
                    .with_lock(
                        key,
                        Box::pin(async move {
                            let mut c = counter.lock().await;
                            let before = *c;
                            *c += 1;
                            assert_eq!(*c, before + 1);
                            Ok(())
                        }),
                    )
                    .await
            });
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(*counter.lock().await, 10);
    }
}
