//! Lifecycle activities invoked by the workflow engine (§4.3, §C6): outbound
//! `Create|Delete|Update<Resource>ViaSiteAgent` dispatches plus the inbound
//! `Update<Resource>InDB` companion that applies a reported outcome.

pub mod error;
pub mod inbound;
pub mod outbound;
pub mod types;

pub use error::ActivityError;
pub use inbound::apply_workflow_outcome;
pub use outbound::ClientResolver;
pub use types::{ObjectStatus, TransactionId, WorkflowOutcome, WorkflowStatus};
