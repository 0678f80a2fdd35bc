use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use cloudcore_domain::constants::{INVENTORY_RECEIPT_INTERVAL, RECENT_MUTATION_GUARD_MARGIN};
use cloudcore_domain::entities::StatusDetail;
use cloudcore_store::{Dao, ListFilter, PageRequest, Session, StatusJournal};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ReconcileError;
use crate::reconcilable::Reconcilable;
use crate::types::{Inventory, InventoryStatus, LifecycleEvent};

/// Outcome of matching one reported inventory item against the entities
/// already on file for this Site (§4.2 step 6).
pub enum Match<'e, E> {
    Existing(&'e E),
    NewOnSite,
    Unmatched,
}

/// Whether an unmatched item should be auto-created or dropped (§4.2 step 6,
/// §9: "NetworkSecurityGroup and SKU auto-create when unmatched").
pub enum NewOnSitePolicy {
    Reject,
    AutoCreate,
}

/// Result of applying one reported item onto an existing entity.
pub struct ApplyResult {
    pub changed: bool,
    pub status_label: String,
    pub message: Option<String>,
    /// True when Cloud's metadata differs from the Site's and an
    /// `UpdateVPC`/`UpdateNetworkSecurityGroup`-style workflow should be
    /// dispatched by the caller (§4.2 step 6 "out-of-band metadata drift").
    pub metadata_drift: bool,
}

/// The per-resource policy the generic driver is parameterized by (§9: "the
/// single most important architectural lever"). One `impl` per entity kind
/// supplies matching, delta application, and new/delete policy; the driver
/// supplies the universal algorithm (§4.2).
#[async_trait]
pub trait ReconcileHooks<E: Reconcilable, I: Send + Sync>: Send + Sync {
    fn resource_noun(&self) -> &'static str;

    fn find_existing<'e>(&self, item: &I, existing: &'e [E]) -> Match<'e, E>;

    fn new_on_site_policy(&self) -> NewOnSitePolicy {
        NewOnSitePolicy::Reject
    }

    fn create_new(&self, _item: &I, _site_id: Uuid) -> Option<E> {
        None
    }

    fn apply(&self, entity: &mut E, item: &I) -> ApplyResult;

    /// Machine (and, by the default pattern, anything else that needs it)
    /// reloads under a row lock and refuses to back-transition fresher state
    /// (§4.2 step 6 "stale guard", §9 "row locking").
    fn requires_stale_guard(&self) -> bool {
        false
    }

    /// A payload whose inventory collection itself failed is normally just
    /// skipped (§7 kind 5); DPU-Extension-Service instead surfaces it as a
    /// terminal, non-retryable error (§4.2 step 2).
    fn failed_inventory_is_terminal(&self) -> bool {
        false
    }

    /// Hook run before a candidate is hard-deleted — e.g. releasing its IPAM
    /// child CIDR under an advisory lock (§4.2 step 7, §5).
    async fn before_hard_delete(&self, _entity: &E) -> Result<(), ReconcileError> {
        Ok(())
    }
}

/// Accumulated outcome of one or more `reconcile` calls over the pages of a
/// single inventory submission.
#[derive(Default)]
pub struct ReconcileOutcome<E> {
    pub events: Vec<LifecycleEvent>,
    /// Entities whose Cloud metadata just drifted from the Site's — the
    /// caller (which holds a `WorkflowClient`) dispatches the matching
    /// `Update<Resource>` workflow for each.
    pub drift_notices: Vec<E>,
}

/// Runs the universal reconciliation algorithm (§4.2) for one inventory page
/// of one resource kind. `reported` accumulates matched entity ids across
/// pages of the same inventory submission; candidate-removal (step 7) only
/// runs once `inventory.is_last_page()`.
pub async fn reconcile<E, I, H>(
    dao: &Arc<dyn Dao<E>>,
    journal: &Arc<dyn StatusJournal>,
    session: &Arc<dyn Session>,
    site_id: Uuid,
    inventory: Inventory<I>,
    hooks: &H,
    reported: &mut HashSet<Uuid>,
) -> Result<ReconcileOutcome<E>, ReconcileError>
where
    E: Reconcilable,
    I: Send + Sync,
    H: ReconcileHooks<E, I>,
{
    let mut outcome = ReconcileOutcome::default();

    if inventory.inventory_status == InventoryStatus::Failed {
        if hooks.failed_inventory_is_terminal() {
            return Err(ReconcileError::SiteAgentFailure { site: site_id, resource: hooks.resource_noun() });
        }
        warn!(resource = hooks.resource_noun(), %site_id, "inventory collection failed, skipping payload");
        return Ok(outcome);
    }

    let existing = dao
        .get_all(ListFilter { scope_id: Some(site_id), include_deleted: false }, PageRequest::default())
        .await?
        .items;

    for item in &inventory.items {
        match hooks.find_existing(item, &existing) {
            Match::Existing(existing_entity) => {
                reported.insert(existing_entity.id());

                // Under the stale guard, begin a transaction and reload
                // under a row lock held until commit, so a concurrent write
                // landing after the earlier bulk `get_all` snapshot can't be
                // missed by this apply (§4.1, §4.2 step 6).
                let (mut entity, mut tx) = if hooks.requires_stale_guard() {
                    let mut tx = session.begin_tx().await?;
                    let Some(reloaded) = dao.get_by_id_in_tx(&mut tx, existing_entity.id()).await? else {
                        debug!(resource = hooks.resource_noun(), entity_id = %existing_entity.id(), "stale-guard: entity vanished before reload");
                        continue;
                    };

                    let now = Utc::now();
                    let guard_window = INVENTORY_RECEIPT_INTERVAL + RECENT_MUTATION_GUARD_MARGIN;
                    if now - reloaded.updated_at() < chrono::Duration::from_std(guard_window).unwrap_or_default() {
                        debug!(resource = hooks.resource_noun(), entity_id = %reloaded.id(), "stale-guard: skipping item, entity mutated too recently");
                        continue;
                    }
                    (reloaded, Some(tx))
                } else {
                    (existing_entity.clone(), None)
                };

                let result = hooks.apply(&mut entity, item);
                if result.changed {
                    entity.touch_updated();
                    match tx.as_mut() {
                        Some(tx) => dao.update_in_tx(tx, &entity).await?,
                        None => dao.update(&entity).await?,
                    }
                }
                if let Some(tx) = tx {
                    tx.commit().await?;
                }

                append_status_if_changed(journal, entity.id(), &result.status_label, &result.message).await?;

                if result.metadata_drift {
                    outcome.drift_notices.push(entity.clone());
                }

                if hooks.resource_noun() == "subnet" && result.changed && result.status_label == "ready" {
                    outcome.events.push(LifecycleEvent::created(entity.id()));
                }
            }
            Match::NewOnSite => match hooks.new_on_site_policy() {
                NewOnSitePolicy::Reject => {
                    debug!(resource = hooks.resource_noun(), "unmatched item with no auto-create policy, skipping");
                }
                NewOnSitePolicy::AutoCreate => {
                    if let Some(mut new_entity) = hooks.create_new(item, site_id) {
                        let result = hooks.apply(&mut new_entity, item);
                        reported.insert(new_entity.id());
                        dao.create(&new_entity).await?;
                        append_status_if_changed(journal, new_entity.id(), &result.status_label, &result.message).await?;
                    }
                }
            },
            Match::Unmatched => {
                debug!(resource = hooks.resource_noun(), "item matched no fallback rule, skipping");
            }
        }
    }

    if inventory.is_last_page() {
        let now = Utc::now();
        for entity in &existing {
            if reported.contains(&entity.id()) {
                continue;
            }
            if now - entity.created_at() < chrono::Duration::from_std(INVENTORY_RECEIPT_INTERVAL).unwrap_or_default() {
                continue;
            }

            if entity.is_deleting() {
                hooks.before_hard_delete(entity).await?;
                dao.delete_by_id(entity.id()).await?;
                if hooks.resource_noun() == "subnet" || hooks.resource_noun() == "vpc" {
                    outcome.events.push(LifecycleEvent::deleted(entity.id()));
                }
            } else {
                if entity.is_missing_on_site() {
                    continue;
                }
                let mut updated = entity.clone();
                updated.set_missing_on_site(true);
                updated.set_status_error();
                dao.update(&updated).await?;

                let message = format!("{} is missing on Site", hooks.resource_noun());
                append_status_if_changed(journal, updated.id(), &updated.status_label(), &Some(message)).await?;
            }
        }
    }

    Ok(outcome)
}

async fn append_status_if_changed(
    journal: &Arc<dyn StatusJournal>,
    entity_id: Uuid,
    status_label: &str,
    message: &Option<String>,
) -> Result<(), ReconcileError> {
    let should_append = match journal.latest(entity_id).await? {
        Some(latest) => latest.status != status_label || &latest.message != message,
        None => true,
    };
    if should_append {
        journal.append(&StatusDetail::new(entity_id, status_label, message.clone())).await?;
    }
    Ok(())
}
