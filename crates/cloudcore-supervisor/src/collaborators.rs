//! Narrow trait seams for the external collaborators C8 talks to but this
//! repo does not implement for real (§1): alerting, the Site-Manager HTTP
//! API, and the Site health probe. Each ships a logging-only / in-memory
//! reference implementation, the same shape as `nclav-driver`'s `LocalDriver`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::SupervisorError;

/// Alerting sink for `MonitorInventoryReceiptForAllSites` (§4.5).
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify_slack(&self, message: &str) -> Result<(), SupervisorError>;
    async fn notify_pagerduty(&self, message: &str) -> Result<(), SupervisorError>;
}

/// Logs and otherwise does nothing — the default wired by the runtime when
/// no real Slack/PagerDuty integration is configured.
#[derive(Debug, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify_slack(&self, message: &str) -> Result<(), SupervisorError> {
        tracing::warn!(channel = "slack", message, "site alert");
        Ok(())
    }

    async fn notify_pagerduty(&self, message: &str) -> Result<(), SupervisorError> {
        tracing::warn!(channel = "pagerduty", message, "site alert");
        Ok(())
    }
}

/// Site-Manager's OTP-issuance HTTP endpoint (§4.5).
#[async_trait]
pub trait SiteManagerClient: Send + Sync + 'static {
    async fn fetch_otp(&self, site_id: Uuid) -> Result<String, SupervisorError>;
}

/// In-memory stand-in: mints a deterministic fake OTP and logs the request,
/// rather than calling out to a real Site-Manager deployment.
#[derive(Debug, Default)]
pub struct LoggingSiteManagerClient;

#[async_trait]
impl SiteManagerClient for LoggingSiteManagerClient {
    async fn fetch_otp(&self, site_id: Uuid) -> Result<String, SupervisorError> {
        tracing::info!(%site_id, "requesting fresh OTP from site-manager");
        Ok(format!("otp-{site_id}"))
    }
}

#[derive(serde::Deserialize)]
struct OtpResponse {
    otp: String,
}

/// Real Site-Manager client, parallel to how `cloudcore-workflow` pairs
/// `InMemoryWorkflowClient` with a `tonic`-based one. POSTs to
/// `{base_url}/sites/{site_id}/otp` and expects `{"otp": "..."}` back.
pub struct HttpSiteManagerClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSiteManagerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into() }
    }
}

#[async_trait]
impl SiteManagerClient for HttpSiteManagerClient {
    async fn fetch_otp(&self, site_id: Uuid) -> Result<String, SupervisorError> {
        let url = format!("{}/sites/{site_id}/otp", self.base_url);
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| SupervisorError::SiteManager { site: site_id, reason: e.to_string() })?
            .error_for_status()
            .map_err(|e| SupervisorError::SiteManager { site: site_id, reason: e.to_string() })?;

        let body: OtpResponse = response
            .json()
            .await
            .map_err(|e| SupervisorError::SiteManager { site: site_id, reason: e.to_string() })?;
        Ok(body.otp)
    }
}

/// Outcome of the three `GetHealth` sub-probes (§4.5).
#[derive(Debug, Clone, Copy)]
pub struct SiteHealthReport {
    pub site_inventory_collection: bool,
    pub site_controller_connection: bool,
    pub site_agent_high_availability: bool,
}

impl SiteHealthReport {
    pub fn all_up(&self) -> bool {
        self.site_inventory_collection && self.site_controller_connection && self.site_agent_high_availability
    }

    /// The first failing probe's name, used to build the Error status message.
    pub fn first_failure(&self) -> Option<&'static str> {
        if !self.site_inventory_collection {
            Some("SiteInventoryCollection")
        } else if !self.site_controller_connection {
            Some("SiteControllerConnection")
        } else if !self.site_agent_high_availability {
            Some("SiteAgentHighAvailability")
        } else {
            None
        }
    }
}

/// Reports the outcome of a `GetHealth` workflow (§4.3, §4.5). In production
/// this is fed by the Site's asynchronous callback to the workflow result;
/// here it stands in as a direct, synchronous probe.
#[async_trait]
pub trait HealthProbeClient: Send + Sync + 'static {
    async fn get_health(&self, site_id: Uuid) -> Result<SiteHealthReport, SupervisorError>;
}

/// Always reports every probe up — the reference implementation used when
/// no real Site-Agent health channel is wired in.
#[derive(Debug, Default)]
pub struct LoggingHealthProbeClient;

#[async_trait]
impl HealthProbeClient for LoggingHealthProbeClient {
    async fn get_health(&self, site_id: Uuid) -> Result<SiteHealthReport, SupervisorError> {
        tracing::debug!(%site_id, "probing site health");
        Ok(SiteHealthReport { site_inventory_collection: true, site_controller_connection: true, site_agent_high_availability: true })
    }
}

/// Workflow-namespace listing for `DeleteOrphanedSiteTemporalNamespaces`
/// (§4.5) — the workflow engine's namespace admin surface is out of scope
/// (§1), so this is a narrow seam over it.
#[async_trait]
pub trait NamespaceRegistry: Send + Sync + 'static {
    async fn list_namespaces(&self) -> Result<Vec<String>, SupervisorError>;
    async fn delete_namespace(&self, name: &str) -> Result<(), SupervisorError>;
}

/// In-memory registry seeded by the caller — stands in for the workflow
/// engine's namespace list in tests and the reference stack.
#[derive(Debug, Default)]
pub struct InMemoryNamespaceRegistry {
    namespaces: tokio::sync::RwLock<std::collections::HashSet<String>>,
}

impl InMemoryNamespaceRegistry {
    pub fn new(namespaces: impl IntoIterator<Item = String>) -> Self {
        Self { namespaces: tokio::sync::RwLock::new(namespaces.into_iter().collect()) }
    }
}

#[async_trait]
impl NamespaceRegistry for InMemoryNamespaceRegistry {
    async fn list_namespaces(&self) -> Result<Vec<String>, SupervisorError> {
        Ok(self.namespaces.read().await.iter().cloned().collect())
    }

    async fn delete_namespace(&self, name: &str) -> Result<(), SupervisorError> {
        self.namespaces.write().await.remove(name);
        Ok(())
    }
}
