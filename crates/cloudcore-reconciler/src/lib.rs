//! The universal reconciliation algorithm (§4.2, §C5) plus one hook
//! implementation per resource kind. [`driver::reconcile`] carries the
//! matching / stale-guard / apply / candidate-removal sequence shared by
//! every resource; each module here only supplies that resource's matching
//! rule and delta application.

pub mod dpu_extension;
pub mod driver;
pub mod error;
pub mod infiniband;
pub mod machine;
pub mod machine_capability;
pub mod machine_interface;
pub mod nsg;
pub mod nvlink;
pub mod reconcilable;
mod reconcilable_impls;
pub mod sku;
pub mod subnet;
pub mod types;
pub mod vpc;
pub mod vpc_prefix;

pub use driver::{reconcile, ApplyResult, Match, NewOnSitePolicy, ReconcileHooks, ReconcileOutcome};
pub use error::ReconcileError;
pub use reconcilable::Reconcilable;
pub use types::{Inventory, InventoryPage, InventoryStatus, LifecycleEvent};
