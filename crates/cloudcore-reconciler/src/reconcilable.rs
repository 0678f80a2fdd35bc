use chrono::{DateTime, Utc};
use cloudcore_store::Entity;

/// Accessors the generic reconciliation driver needs from any entity kind it
/// drives, on top of the CRUD-level [`Entity`] trait (§4.2, §9 "many-entity
/// symmetry"). Field names vary per entity (`controller_vpc_id`,
/// `controller_network_segment_id`, ...); this trait is the seam that lets
/// the driver stay entity-agnostic.
pub trait Reconcilable: Entity + Clone {
    fn controller_id(&self) -> Option<&str>;
    fn set_controller_id(&mut self, id: Option<String>);

    /// Human-readable status label for journaling and logging — the
    /// `Display` of whichever status enum this entity uses.
    fn status_label(&self) -> String;

    /// True iff this entity's status is the "Deleting" terminal-intent state
    /// that makes candidate-removal hard-delete rather than mark-missing
    /// (§4.2 step 7). Always false for entities with no such state (Machine).
    fn is_deleting(&self) -> bool;

    /// Moves this entity into its Error status, used when inventory reports
    /// it missing (§4.2 step 7).
    fn set_status_error(&mut self);

    /// Moves this entity into its Deleting status, used by the inbound
    /// `Update<Resource>InDB` activity when a Site confirms deletion (§4.3).
    /// A no-op for entities with no such state (Machine).
    fn set_status_deleting(&mut self) {}

    fn is_missing_on_site(&self) -> bool;
    fn set_missing_on_site(&mut self, missing: bool);

    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
    fn touch_updated(&mut self);
}
