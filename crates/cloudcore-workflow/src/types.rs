use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// TLS material a Site's workflow client connects with. Reloadable at
/// runtime (§4.4: "dynamically reloadable") by swapping the `Arc` held by
/// the pool entry rather than mutating fields in place.
#[derive(Debug, Clone)]
pub struct TlsMaterial {
    pub cert_path: String,
    pub key_path: String,
    pub ca_path: String,
    pub server_name: String,
    pub min_version: &'static str,
}

impl TlsMaterial {
    pub fn new(cert_path: impl Into<String>, key_path: impl Into<String>, ca_path: impl Into<String>, server_name: impl Into<String>) -> Self {
        Self {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
            ca_path: ca_path.into(),
            server_name: server_name.into(),
            min_version: cloudcore_domain::constants::SITE_TLS_MIN_VERSION,
        }
    }
}

/// A request to start a named workflow on a Site's namespace and task queue
/// (§4.3 step 5: `ExecuteWorkflow(named="<Verb><Resource>", args=[txID, req])`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteWorkflowRequest {
    pub workflow_id: String,
    pub workflow_name: String,
    pub task_queue: String,
    pub args: serde_json::Value,
}

/// Handle to a started (fire-and-forget) workflow execution. Completion is
/// observed later through a subsequent inventory report or a Site-initiated
/// callback activity, never awaited here (§4.5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowHandle {
    pub workflow_id: String,
    pub run_id: String,
}

/// Deterministic workflow id: `"site-<resource>-<verb>-<entityID>"` (§4.3 step 3).
/// The Site id is the namespace the workflow runs in, not part of the id itself.
pub fn workflow_id(resource: &str, verb: &str, entity_id: Uuid) -> String {
    format!("site-{}-{}-{}", resource.to_lowercase(), verb.to_lowercase(), entity_id)
}
