use std::sync::Arc;

use cloudcore_domain::entities::{
    DpuExtensionService, InfinibandPartition, Machine, MachineCapability, MachineInterface,
    NetworkSecurityGroup, NvLinkLogicalPartition, Site, Sku, Subnet, Vpc, VpcPrefix,
};

use crate::dao::Dao;
use crate::journal::memory::InMemoryStatusJournal;
use crate::journal::postgres::PostgresStatusJournal;
use crate::journal::StatusJournal;
use crate::lock::{AdvisoryLocks, InMemoryAdvisoryLocks};
use crate::memory::InMemoryDao;
use crate::postgres::{PostgresAdvisoryLocks, PostgresDao};
use crate::session::{InMemorySession, PostgresSession, Session};

/// Every per-entity DAO plus the status journal and advisory locks, wired
/// together for one backend. This is the handle `cloudcore-reconciler` and
/// `cloudcore-activities` depend on.
pub struct Stores {
    pub sites: Arc<dyn Dao<Site>>,
    pub vpcs: Arc<dyn Dao<Vpc>>,
    pub subnets: Arc<dyn Dao<Subnet>>,
    pub vpc_prefixes: Arc<dyn Dao<VpcPrefix>>,
    pub machines: Arc<dyn Dao<Machine>>,
    pub machine_interfaces: Arc<dyn Dao<MachineInterface>>,
    pub machine_capabilities: Arc<dyn Dao<MachineCapability>>,
    pub infiniband_partitions: Arc<dyn Dao<InfinibandPartition>>,
    pub nvlink_logical_partitions: Arc<dyn Dao<NvLinkLogicalPartition>>,
    pub network_security_groups: Arc<dyn Dao<NetworkSecurityGroup>>,
    pub skus: Arc<dyn Dao<Sku>>,
    pub dpu_extension_services: Arc<dyn Dao<DpuExtensionService>>,
    pub status_journal: Arc<dyn StatusJournal>,
    pub advisory_locks: Arc<dyn AdvisoryLocks>,
    pub session: Arc<dyn Session>,
}

impl Stores {
    /// All-in-memory stack — used by tests and by the `local` driver profile.
    pub fn in_memory() -> Self {
        Self {
            sites: InMemoryDao::new(),
            vpcs: InMemoryDao::new(),
            subnets: InMemoryDao::new(),
            vpc_prefixes: InMemoryDao::new(),
            machines: InMemoryDao::new(),
            machine_interfaces: InMemoryDao::new(),
            machine_capabilities: InMemoryDao::new(),
            infiniband_partitions: InMemoryDao::new(),
            nvlink_logical_partitions: InMemoryDao::new(),
            network_security_groups: InMemoryDao::new(),
            skus: InMemoryDao::new(),
            dpu_extension_services: InMemoryDao::new(),
            status_journal: InMemoryStatusJournal::new(),
            advisory_locks: Arc::new(InMemoryAdvisoryLocks::new()),
            session: Arc::new(InMemorySession::new()),
        }
    }

    /// Postgres-backed stack. Assumes the schema documented on [`PostgresDao`]
    /// and [`PostgresStatusJournal`] already exists — no migration runner.
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            sites: Arc::new(PostgresDao::new(pool.clone(), "sites")),
            vpcs: Arc::new(PostgresDao::new(pool.clone(), "vpcs")),
            subnets: Arc::new(PostgresDao::new(pool.clone(), "subnets")),
            vpc_prefixes: Arc::new(PostgresDao::new(pool.clone(), "vpc_prefixes")),
            machines: Arc::new(PostgresDao::new(pool.clone(), "machines")),
            machine_interfaces: Arc::new(PostgresDao::new(pool.clone(), "machine_interfaces")),
            machine_capabilities: Arc::new(PostgresDao::new(pool.clone(), "machine_capabilities")),
            infiniband_partitions: Arc::new(PostgresDao::new(pool.clone(), "infiniband_partitions")),
            nvlink_logical_partitions: Arc::new(PostgresDao::new(pool.clone(), "nvlink_logical_partitions")),
            network_security_groups: Arc::new(PostgresDao::new(pool.clone(), "network_security_groups")),
            skus: Arc::new(PostgresDao::new(pool.clone(), "skus")),
            dpu_extension_services: Arc::new(PostgresDao::new(pool.clone(), "dpu_extension_services")),
            status_journal: Arc::new(PostgresStatusJournal::new(pool.clone())),
            advisory_locks: Arc::new(PostgresAdvisoryLocks::new(pool.clone())),
            session: Arc::new(PostgresSession::new(pool)),
        }
    }
}
