use cloudcore_domain::constants::SITE_TLS_MIN_VERSION;
use figment::providers::Env;
use figment::Figment;
use tracing::debug;

use crate::error::ConfigError;
use crate::raw::RawConfig;
use crate::types::{
    Config, DatabaseConfig, MetricsConfig, NotifierConfig, SiteManagerConfig, SiteTlsConfig,
    WorkflowConfig,
};

/// Load configuration from `CLOUDCORE_*` environment variables.
///
/// Expected variables (required unless noted):
/// ```text
/// CLOUDCORE_DB_HOST, CLOUDCORE_DB_PORT (default 5432), CLOUDCORE_DB_USER,
/// CLOUDCORE_DB_PASSWORD, CLOUDCORE_DB_NAME, CLOUDCORE_DB_POOL_SIZE (default 10)
/// CLOUDCORE_WORKFLOW_HOST, CLOUDCORE_WORKFLOW_PORT (default 7233),
/// CLOUDCORE_WORKFLOW_SERVER_NAME, CLOUDCORE_WORKFLOW_NAMESPACE,
/// CLOUDCORE_WORKFLOW_TASK_QUEUE (default "cloudcore-default"),
/// CLOUDCORE_WORKFLOW_ENCRYPTION_KEY (optional)
/// CLOUDCORE_SITE_TLS_CERT_PATH, CLOUDCORE_SITE_TLS_KEY_PATH, CLOUDCORE_SITE_TLS_CA_PATH
/// CLOUDCORE_METRICS_PORT (default 9090)
/// CLOUDCORE_SITE_MANAGER_ENDPOINT
/// CLOUDCORE_SLACK_WEBHOOK_URL (optional), CLOUDCORE_PAGERDUTY_INTEGRATION_KEY (optional)
/// CLOUDCORE_BUNDEBUG (default false)
/// ```
pub fn load() -> Result<Config, ConfigError> {
    let raw: RawConfig = Figment::new()
        .merge(Env::prefixed("CLOUDCORE_").split("_"))
        .extract()?;

    debug!(db_host = %raw.db_host, workflow_namespace = %raw.workflow_namespace, "loaded configuration");

    Ok(convert(raw))
}

fn convert(raw: RawConfig) -> Config {
    Config {
        database: DatabaseConfig {
            host: raw.db_host,
            port: raw.db_port,
            user: raw.db_user,
            password: raw.db_password,
            database: raw.db_name,
            pool_size: raw.db_pool_size,
        },
        workflow: WorkflowConfig {
            host: raw.workflow_host,
            port: raw.workflow_port,
            server_name: raw.workflow_server_name,
            namespace: raw.workflow_namespace,
            task_queue: raw.workflow_task_queue,
            encryption_key: raw.workflow_encryption_key,
        },
        site_tls: SiteTlsConfig {
            cert_path: raw.site_tls_cert_path,
            key_path: raw.site_tls_key_path,
            ca_path: raw.site_tls_ca_path,
            min_version: SITE_TLS_MIN_VERSION,
        },
        metrics: MetricsConfig { port: raw.metrics_port },
        site_manager: SiteManagerConfig { endpoint: raw.site_manager_endpoint },
        notifiers: NotifierConfig {
            slack_webhook_url: raw.slack_webhook_url,
            pagerduty_integration_key: raw.pagerduty_integration_key,
        },
        debug: raw.bundebug,
    }
}
