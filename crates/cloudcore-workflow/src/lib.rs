//! Site-scoped workflow engine client (§C4): a `WorkflowClient` trait
//! backed by an in-memory fake for tests and a `tonic`-based gRPC client
//! shape, plus the lazy client pool keyed by Site id.

pub mod client;
pub mod error;
pub mod memory;
pub mod pool;
pub mod tonic_client;
pub mod types;

pub use client::WorkflowClient;
pub use error::WorkflowError;
pub use memory::InMemoryWorkflowClient;
pub use pool::ClientPool;
pub use tonic_client::TonicWorkflowClient;
pub use types::{workflow_id, ExecuteWorkflowRequest, TlsMaterial, WorkflowHandle};
