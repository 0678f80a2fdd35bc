use serde::Deserialize;

/// Flat shape matching the `CLOUDCORE_*` environment variables, before
/// conversion into the nested [`crate::Config`] the rest of the workspace uses.
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub db_host: String,
    #[serde(default = "default_db_port")]
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    #[serde(default = "default_db_pool_size")]
    pub db_pool_size: u32,

    pub workflow_host: String,
    #[serde(default = "default_workflow_port")]
    pub workflow_port: u16,
    pub workflow_server_name: String,
    pub workflow_namespace: String,
    #[serde(default = "default_workflow_queue")]
    pub workflow_task_queue: String,
    pub workflow_encryption_key: Option<String>,

    pub site_tls_cert_path: String,
    pub site_tls_key_path: String,
    pub site_tls_ca_path: String,

    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    pub site_manager_endpoint: String,

    pub slack_webhook_url: Option<String>,
    pub pagerduty_integration_key: Option<String>,

    #[serde(default)]
    pub bundebug: bool,
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_pool_size() -> u32 {
    10
}

fn default_workflow_port() -> u16 {
    7233
}

fn default_workflow_queue() -> String {
    "cloudcore-default".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}
