use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::client::WorkflowClient;
use crate::error::WorkflowError;
use crate::types::{ExecuteWorkflowRequest, WorkflowHandle};

/// In-memory [`WorkflowClient`] fake — records every started workflow so
/// tests can assert on it, matching the teacher's `InMemoryStore` /
/// `LocalDriver` test-double convention.
#[derive(Default)]
pub struct InMemoryWorkflowClient {
    started: Mutex<Vec<ExecuteWorkflowRequest>>,
}

impl InMemoryWorkflowClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn started_workflows(&self) -> Vec<ExecuteWorkflowRequest> {
        self.started.lock().await.clone()
    }
}

#[async_trait]
impl WorkflowClient for InMemoryWorkflowClient {
    async fn execute_workflow(&self, request: ExecuteWorkflowRequest) -> Result<WorkflowHandle, WorkflowError> {
        let workflow_id = request.workflow_id.clone();
        self.started.lock().await.push(request);
        Ok(WorkflowHandle { workflow_id, run_id: Uuid::new_v4().to_string() })
    }
}
