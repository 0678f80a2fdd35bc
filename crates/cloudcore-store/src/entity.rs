use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// Common shape the generic DAO engine needs from every stored entity (§3:
/// every entity carries an id, a soft-delete flag, and is listed scoped to
/// either its Site or, for Machine-Interface/Machine-Capability, its Machine).
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    fn id(&self) -> Uuid;

    /// Id used to scope `GetAll` listings — SiteId for most entities, MachineId
    /// for Machine-Interface and Machine-Capability (§3).
    fn scope_id(&self) -> Uuid;

    fn deleted_at(&self) -> Option<DateTime<Utc>>;
    fn mark_deleted(&mut self, at: DateTime<Utc>);

    /// Human-readable entity name used in [`crate::StoreError::NotFound`] messages.
    fn entity_name() -> &'static str;
}

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub scope_id: Option<Uuid>,
    pub include_deleted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// Opaque continuation token from a previous [`Page::next_page_token`].
    pub page_token: Option<String>,
    pub page_size: u32,
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}
