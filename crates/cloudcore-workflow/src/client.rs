use async_trait::async_trait;

use crate::error::WorkflowError;
use crate::types::{ExecuteWorkflowRequest, WorkflowHandle};

/// A Site-scoped workflow engine client (§C4, §4.4). Starts a named
/// workflow on a fixed task queue within the Site's namespace and returns
/// immediately with a handle — workflows launched this way are
/// fire-and-forget (§4.5).
#[async_trait]
pub trait WorkflowClient: Send + Sync + 'static {
    async fn execute_workflow(&self, request: ExecuteWorkflowRequest) -> Result<WorkflowHandle, WorkflowError>;
}
