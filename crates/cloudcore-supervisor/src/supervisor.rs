use std::sync::Arc;

use chrono::Utc;
use cloudcore_activities::ClientResolver;
use cloudcore_domain::constants::{INVENTORY_STALE_THRESHOLD, OTP_RENEWAL_WINDOW};
use cloudcore_domain::entities::{Machine, Site, StatusDetail};
use cloudcore_domain::status::SiteStatus;
use cloudcore_store::{Dao, Entity, ListFilter, PageRequest, StatusJournal, Stores};
use cloudcore_workflow::{workflow_id, ExecuteWorkflowRequest};
use uuid::Uuid;

use crate::collaborators::{HealthProbeClient, NamespaceRegistry, Notifier, SiteManagerClient};
use crate::error::SupervisorError;

/// `MonitorInventoryReceiptForAllSites` (§4.5): transitions any `Registered`
/// Site whose last inventory receipt is older than
/// [`INVENTORY_STALE_THRESHOLD`] to `Error` and alerts. Returns the ids of
/// Sites transitioned this pass.
pub async fn monitor_inventory_receipt_for_all_sites(
    sites: &Arc<dyn Dao<Site>>,
    journal: &Arc<dyn StatusJournal>,
    notifier: &dyn Notifier,
) -> Result<Vec<Uuid>, SupervisorError> {
    let page = sites.get_all(ListFilter::default(), PageRequest::default()).await?;
    let now = Utc::now();
    let mut transitioned = Vec::new();

    for mut site in page.items {
        if site.status != SiteStatus::Registered {
            continue;
        }
        let last_seen = site.inventory_received.unwrap_or(site.created);
        if now.signed_duration_since(last_seen).to_std().unwrap_or_default() <= INVENTORY_STALE_THRESHOLD {
            continue;
        }

        site.status = SiteStatus::Error;
        site.updated = now;
        let message = format!("no inventory received since {last_seen}");
        sites.update(&site).await?;
        journal.append(&StatusDetail::new(site.id.as_uuid(), site.status.to_string(), Some(message.clone()))).await?;

        let alert = format!("site {} is stale: {message}", site.id);
        notifier.notify_slack(&alert).await?;
        notifier.notify_pagerduty(&alert).await?;
        transitioned.push(site.id.as_uuid());
    }

    Ok(transitioned)
}

/// `CheckHealthForSiteViaSiteAgent` (§4.3, §4.5): dispatches `GetHealth` on
/// the Site's namespace, evaluates the three sub-probes, and updates the
/// Site's status accordingly. Returns the resulting status.
pub async fn check_health_for_site_via_site_agent(
    sites: &Arc<dyn Dao<Site>>,
    journal: &Arc<dyn StatusJournal>,
    resolver: &dyn ClientResolver,
    health_client: &dyn HealthProbeClient,
    site_id: Uuid,
) -> Result<SiteStatus, SupervisorError> {
    let mut site = sites.get_by_id(site_id, false).await?.ok_or(SupervisorError::Store(cloudcore_store::StoreError::NotFound {
        entity: "site",
        id: site_id.to_string(),
    }))?;

    let client = resolver.client_for(site_id).await?;
    client
        .execute_workflow(ExecuteWorkflowRequest {
            workflow_id: workflow_id("site", "health", site_id),
            workflow_name: "GetHealth".to_string(),
            task_queue: site_id.to_string(),
            args: serde_json::Value::Null,
        })
        .await?;

    let report = health_client.get_health(site_id).await?;
    let (status, message) = if report.all_up() {
        (SiteStatus::Registered, "all health probes up".to_string())
    } else {
        let failed = report.first_failure().unwrap_or("unknown probe");
        (SiteStatus::Error, format!("{failed} is down"))
    };

    site.status = status;
    site.updated = Utc::now();
    sites.update(&site).await?;
    journal.append(&StatusDetail::new(site_id, status.to_string(), Some(message))).await?;

    Ok(status)
}

/// `CheckOTPExpirationAndRenewForAllSites` (§4.5): pages through Sites and,
/// for each whose `registration_token_expiry` falls inside
/// [`OTP_RENEWAL_WINDOW`], fetches a fresh OTP from Site-Manager and starts
/// `RotateTemporalCertAccessOTP` on that Site's namespace.
pub async fn check_otp_expiration_and_renew_for_all_sites(
    sites: &Arc<dyn Dao<Site>>,
    resolver: &dyn ClientResolver,
    site_manager: &dyn SiteManagerClient,
) -> Result<Vec<Uuid>, SupervisorError> {
    let page = sites.get_all(ListFilter::default(), PageRequest::default()).await?;
    let now = Utc::now();
    let mut renewed = Vec::new();

    for mut site in page.items {
        let Some(expiry) = site.registration_token_expiry else {
            continue;
        };
        let time_to_expiry = expiry.signed_duration_since(now);
        if time_to_expiry.to_std().map(|d| d > OTP_RENEWAL_WINDOW).unwrap_or(false) {
            continue;
        }

        let site_id = site.id.as_uuid();
        let fresh_otp = site_manager.fetch_otp(site_id).await?;
        site.registration_token = Some(fresh_otp);
        site.registration_token_expiry = Some(now + chrono::Duration::from_std(OTP_RENEWAL_WINDOW).unwrap());
        site.updated = now;
        sites.update(&site).await?;

        let client = resolver.client_for(site_id).await?;
        client
            .execute_workflow(ExecuteWorkflowRequest {
                workflow_id: workflow_id("site", "rotate-otp", site_id),
                workflow_name: "RotateTemporalCertAccessOTP".to_string(),
                task_queue: site_id.to_string(),
                args: serde_json::Value::Null,
            })
            .await?;
        renewed.push(site_id);
    }

    Ok(renewed)
}

async fn delete_all_scoped<E: Entity>(dao: &Arc<dyn Dao<E>>, scope_id: Uuid) -> Result<(), SupervisorError> {
    let filter = ListFilter { scope_id: Some(scope_id), include_deleted: false };
    let page = dao.get_all(filter, PageRequest::default()).await?;
    for item in &page.items {
        dao.delete_by_id(item.id()).await?;
    }
    Ok(())
}

/// `DeleteSiteComponentsFromDB(siteID, ipID, purgeMachines)` (§4.5): cascades
/// soft-delete over every entity owned by a Site. `ip_id` names the Site's
/// top-level IP block for logging/audit purposes — releasing it from IPAM
/// is out of scope for [`cloudcore_ipam::ChildAllocator`], which only
/// carves and releases children under an already-registered parent.
pub async fn delete_site_components_from_db(stores: &Stores, site_id: Uuid, ip_id: Uuid, purge_machines: bool) -> Result<(), SupervisorError> {
    tracing::info!(%site_id, %ip_id, purge_machines, "cascading delete of site components");

    delete_all_scoped(&stores.vpcs, site_id).await?;
    delete_all_scoped(&stores.subnets, site_id).await?;
    delete_all_scoped(&stores.vpc_prefixes, site_id).await?;
    delete_all_scoped(&stores.infiniband_partitions, site_id).await?;
    delete_all_scoped(&stores.nvlink_logical_partitions, site_id).await?;
    delete_all_scoped(&stores.network_security_groups, site_id).await?;
    delete_all_scoped(&stores.skus, site_id).await?;
    delete_all_scoped(&stores.dpu_extension_services, site_id).await?;

    let machines = stores
        .machines
        .get_all(ListFilter { scope_id: Some(site_id), include_deleted: false }, PageRequest::default())
        .await?;
    for machine in &machines.items {
        let machine_id = <Machine as Entity>::id(machine);
        delete_all_scoped(&stores.machine_interfaces, machine_id).await?;
        delete_all_scoped(&stores.machine_capabilities, machine_id).await?;
        if purge_machines {
            stores.machines.delete_by_id(machine_id).await?;
        }
    }

    Ok(())
}

/// `DeleteOrphanedSiteTemporalNamespaces` (§4.5): removes any workflow
/// namespace whose name parses as a UUID that matches no live Site.
pub async fn delete_orphaned_site_temporal_namespaces(
    sites: &Arc<dyn Dao<Site>>,
    registry: &dyn NamespaceRegistry,
) -> Result<Vec<String>, SupervisorError> {
    let page = sites.get_all(ListFilter { scope_id: None, include_deleted: true }, PageRequest::default()).await?;
    let live: std::collections::HashSet<Uuid> = page.items.iter().map(|s| s.id.as_uuid()).collect();

    let mut removed = Vec::new();
    for namespace in registry.list_namespaces().await? {
        let Ok(candidate) = namespace.parse::<Uuid>() else {
            continue;
        };
        if !live.contains(&candidate) {
            registry.delete_namespace(&namespace).await?;
            removed.push(namespace);
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{LoggingHealthProbeClient, LoggingNotifier, LoggingSiteManagerClient};
    use async_trait::async_trait;
    use cloudcore_store::memory::InMemoryDao;
    use cloudcore_workflow::memory::InMemoryWorkflowClient;
    use cloudcore_workflow::{WorkflowClient, WorkflowError};
    use std::sync::Arc as StdArc;

    struct FixedResolver(StdArc<dyn WorkflowClient>);

    #[async_trait]
    impl ClientResolver for FixedResolver {
        async fn client_for(&self, _site_id: Uuid) -> Result<StdArc<dyn WorkflowClient>, WorkflowError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn stale_registered_site_is_flagged_and_notified() {
        let sites: Arc<dyn Dao<Site>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = cloudcore_store::journal::memory::InMemoryStatusJournal::new();
        let notifier = LoggingNotifier;

        let mut site = Site::new("provider-a");
        site.status = SiteStatus::Registered;
        site.inventory_received = Some(Utc::now() - chrono::Duration::hours(2));
        sites.create(&site).await.unwrap();

        let transitioned = monitor_inventory_receipt_for_all_sites(&sites, &journal, &notifier).await.unwrap();
        assert_eq!(transitioned, vec![site.id.as_uuid()]);

        let stored = sites.get_by_id(site.id.as_uuid(), false).await.unwrap().unwrap();
        assert_eq!(stored.status, SiteStatus::Error);
    }

    #[tokio::test]
    async fn fresh_registered_site_is_left_alone() {
        let sites: Arc<dyn Dao<Site>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = cloudcore_store::journal::memory::InMemoryStatusJournal::new();
        let notifier = LoggingNotifier;

        let mut site = Site::new("provider-a");
        site.status = SiteStatus::Registered;
        site.inventory_received = Some(Utc::now());
        sites.create(&site).await.unwrap();

        let transitioned = monitor_inventory_receipt_for_all_sites(&sites, &journal, &notifier).await.unwrap();
        assert!(transitioned.is_empty());
    }

    #[tokio::test]
    async fn healthy_site_becomes_registered() {
        let sites: Arc<dyn Dao<Site>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = cloudcore_store::journal::memory::InMemoryStatusJournal::new();
        let resolver = FixedResolver(StdArc::new(InMemoryWorkflowClient::new()));
        let health_client = LoggingHealthProbeClient;

        let site = Site::new("provider-a");
        sites.create(&site).await.unwrap();

        let status = check_health_for_site_via_site_agent(&sites, &journal, &resolver, &health_client, site.id.as_uuid()).await.unwrap();
        assert_eq!(status, SiteStatus::Registered);
    }

    #[tokio::test]
    async fn otp_within_window_is_renewed() {
        let sites: Arc<dyn Dao<Site>> = InMemoryDao::new();
        let resolver = FixedResolver(StdArc::new(InMemoryWorkflowClient::new()));
        let site_manager = LoggingSiteManagerClient;

        let mut site = Site::new("provider-a");
        site.registration_token_expiry = Some(Utc::now() + chrono::Duration::minutes(10));
        sites.create(&site).await.unwrap();

        let renewed = check_otp_expiration_and_renew_for_all_sites(&sites, &resolver, &site_manager).await.unwrap();
        assert_eq!(renewed, vec![site.id.as_uuid()]);

        let stored = sites.get_by_id(site.id.as_uuid(), false).await.unwrap().unwrap();
        assert!(stored.registration_token.is_some());
    }

    #[tokio::test]
    async fn delete_site_components_cascades_to_machine_children() {
        let stores = Stores::in_memory();
        let site = Site::new("provider-a");
        stores.sites.create(&site).await.unwrap();

        let mut machine = Machine::new(cloudcore_domain::ids::SiteId::new(site.id.as_uuid()), "provider-a");
        machine.controller_machine_id = Some("ctrl-1".to_string());
        stores.machines.create(&machine).await.unwrap();

        delete_site_components_from_db(&stores, site.id.as_uuid(), Uuid::new_v4(), true).await.unwrap();

        let stored = stores.machines.get_by_id(machine.id.as_uuid(), false).await.unwrap().unwrap();
        assert!(stored.deleted_at.is_some());
    }

    #[tokio::test]
    async fn orphaned_namespace_not_matching_any_site_is_removed() {
        use crate::collaborators::{InMemoryNamespaceRegistry, NamespaceRegistry};

        let sites: Arc<dyn Dao<Site>> = InMemoryDao::new();
        let site = Site::new("provider-a");
        sites.create(&site).await.unwrap();

        let orphan = Uuid::new_v4().to_string();
        let registry = InMemoryNamespaceRegistry::new([site.id.to_string(), orphan.clone()]);

        let removed = delete_orphaned_site_temporal_namespaces(&sites, &registry).await.unwrap();
        assert_eq!(removed, vec![orphan]);

        let remaining = registry.list_namespaces().await.unwrap();
        assert_eq!(remaining, vec![site.id.to_string()]);
    }
}
