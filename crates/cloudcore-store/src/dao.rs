use async_trait::async_trait;
use uuid::Uuid;

use crate::entity::{Entity, ListFilter, Page, PageRequest};
use crate::error::StoreError;
use crate::session::Tx;

/// Typed CRUD surface for one entity kind (§C1). `Update` replaces the whole
/// row, which in this Rust model subsumes the original "Clear" operation —
/// Option fields set to `None` are written through as NULL (see DESIGN.md).
#[async_trait]
pub trait Dao<E: Entity>: Send + Sync + 'static {
    async fn create(&self, entity: &E) -> Result<(), StoreError>;

    async fn update(&self, entity: &E) -> Result<(), StoreError>;

    /// `lock_for_update` requests a row lock for the duration of the caller's
    /// transaction (§4.2 stale guard). The in-memory store treats every read
    /// as already serialized behind its single `RwLock` and ignores the flag.
    async fn get_by_id(&self, id: Uuid, lock_for_update: bool) -> Result<Option<E>, StoreError>;

    async fn get_all(&self, filter: ListFilter, page: PageRequest) -> Result<Page<E>, StoreError>;

    /// Soft-delete: sets `deleted_at` rather than removing the row.
    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;

    /// Reloads `id` with a row lock held inside an already-open `tx` (§4.1,
    /// §4.2 step 6 stale guard) — the lock is held until `tx` is committed
    /// or dropped, unlike a bare `get_by_id(id, true)` outside a transaction.
    /// Default delegates to `get_by_id`; the in-memory backend never
    /// overrides this since its own `RwLock` already serializes every call.
    async fn get_by_id_in_tx(&self, _tx: &mut Tx, id: Uuid) -> Result<Option<E>, StoreError> {
        self.get_by_id(id, true).await
    }

    /// Writes `entity` using the same connection/transaction as `tx`, so the
    /// lock taken by `get_by_id_in_tx` covers this write too. Default
    /// delegates to `update`.
    async fn update_in_tx(&self, _tx: &mut Tx, entity: &E) -> Result<(), StoreError> {
        self.update(entity).await
    }
}
