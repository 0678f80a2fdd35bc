//! The Site supervisor (§4.5, C8): staleness monitoring, health probing, OTP
//! rotation, and cascaded Site teardown — the operational loop that sits
//! above per-resource reconciliation and keeps Site-level bookkeeping honest.

pub mod collaborators;
pub mod error;
pub mod supervisor;

pub use collaborators::{
    HealthProbeClient, HttpSiteManagerClient, InMemoryNamespaceRegistry, LoggingHealthProbeClient, LoggingNotifier, LoggingSiteManagerClient,
    NamespaceRegistry, Notifier, SiteHealthReport, SiteManagerClient,
};
pub use error::SupervisorError;
pub use supervisor::{
    check_health_for_site_via_site_agent, check_otp_expiration_and_renew_for_all_sites, delete_orphaned_site_temporal_namespaces,
    delete_site_components_from_db, monitor_inventory_receipt_for_all_sites,
};
