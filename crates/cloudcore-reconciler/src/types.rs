use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-page inventory status (§4.2). `Failed` means the whole payload is
/// discarded for this call — see [`crate::driver::reconcile`] step 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryStatus {
    Success,
    Failed,
}

/// Pagination envelope (§4.2, §6). Candidate-deletion only runs once
/// `is_last()` is true.
#[derive(Debug, Clone)]
pub struct InventoryPage {
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    pub total_items: u32,
    pub item_ids: Vec<String>,
}

impl InventoryPage {
    pub fn is_last(&self) -> bool {
        self.current_page >= self.total_pages
    }
}

/// One Site's inventory report for a single resource kind (§4.2).
#[derive(Debug, Clone)]
pub struct Inventory<I> {
    pub items: Vec<I>,
    pub inventory_status: InventoryStatus,
    pub timestamp: DateTime<Utc>,
    pub page: Option<InventoryPage>,
}

impl<I> Inventory<I> {
    pub fn unpaged(items: Vec<I>) -> Self {
        Self { items, inventory_status: InventoryStatus::Success, timestamp: Utc::now(), page: None }
    }

    pub fn is_last_page(&self) -> bool {
        self.page.as_ref().map_or(true, |p| p.is_last())
    }
}

/// In-memory record passed from the reconciler (C5) to the metrics recorder
/// (C7) — §4.2 step 8, §GLOSSARY.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub entity_id: Uuid,
    pub created: bool,
    pub deleted: bool,
}

impl LifecycleEvent {
    pub fn created(entity_id: Uuid) -> Self {
        Self { entity_id, created: true, deleted: false }
    }

    pub fn deleted(entity_id: Uuid) -> Self {
        Self { entity_id, created: false, deleted: true }
    }
}
