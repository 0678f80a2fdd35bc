//! Thin process wiring (§1: no HTTP router, no CLI — the activities stay
//! plain async functions). `main` loads configuration, assembles C1-C8,
//! and runs the two periodic supervisor sweeps until interrupted.

use std::sync::Arc;
use std::time::Duration;

use cloudcore_activities::ClientResolver;
use cloudcore_domain::constants::INVENTORY_RECEIPT_INTERVAL;
use cloudcore_ipam::InMemoryIpam;
use cloudcore_store::Stores;
use cloudcore_supervisor::{check_otp_expiration_and_renew_for_all_sites, monitor_inventory_receipt_for_all_sites, HttpSiteManagerClient, LoggingNotifier};
use cloudcore_workflow::{ClientPool, TlsMaterial, TonicWorkflowClient, WorkflowClient, WorkflowError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_target(false).init();

    let config = cloudcore_config::load()?;
    tracing::info!(debug = config.debug, "cloudcore-runtime starting");

    let stores = Stores::in_memory();
    let _ipam = Arc::new(InMemoryIpam::new());
    let _metrics_handle = cloudcore_metrics::install_prometheus_recorder()?;

    let tls = TlsMaterial::new(
        config.site_tls.cert_path.clone(),
        config.site_tls.key_path.clone(),
        config.site_tls.ca_path.clone(),
        config.workflow.server_name.clone(),
    );
    let workflow_address = config.workflow.address();
    let pool = Arc::new(ClientPool::new(move |_site_id| {
        let tls = tls.clone();
        let address = workflow_address.clone();
        async move {
            let endpoint = tonic::transport::Endpoint::from_shared(format!("https://{address}"))
                .map_err(|e| WorkflowError::Transient(format!("invalid workflow endpoint: {e}")))?;
            let client = TonicWorkflowClient::connect(endpoint, &tls).await?;
            Ok(Arc::new(client) as Arc<dyn WorkflowClient>)
        }
    }));

    let site_manager = HttpSiteManagerClient::new(config.site_manager.endpoint.clone());
    let notifier = LoggingNotifier;

    let mut ticker = tokio::time::interval(INVENTORY_RECEIPT_INTERVAL);
    let mut otp_ticker = tokio::time::interval(Duration::from_secs(15 * 60));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = monitor_inventory_receipt_for_all_sites(&stores.sites, &stores.status_journal, &notifier).await {
                    tracing::error!(error = %e, "inventory staleness sweep failed");
                }
            }
            _ = otp_ticker.tick() => {
                if let Err(e) = check_otp_expiration_and_renew_for_all_sites(&stores.sites, pool.as_ref() as &dyn ClientResolver, &site_manager).await {
                    tracing::error!(error = %e, "otp renewal sweep failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    Ok(())
}
