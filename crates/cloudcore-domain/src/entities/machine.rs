use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{MachineCapabilityId, MachineId, MachineInterfaceId, SiteId, TenantId};

/// Machine lifecycle status (§4.2.1). Richer than [`crate::status::ResourceStatus`]
/// because it is derived from a controller-state prefix/substate split plus health
/// alerts, not a flat enum reported verbatim by the Site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    Unknown,
    Initializing,
    Measuring,
    InUse,
    Ready,
    Maintenance,
    Decommissioned,
    Error,
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MachineStatus::Unknown => "unknown",
            MachineStatus::Initializing => "initializing",
            MachineStatus::Measuring => "measuring",
            MachineStatus::InUse => "in_use",
            MachineStatus::Ready => "ready",
            MachineStatus::Maintenance => "maintenance",
            MachineStatus::Decommissioned => "decommissioned",
            MachineStatus::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Classification of a single health alert, as examined by §4.2.1 step 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertClassification {
    PreventAllocations,
    Informational,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthAlert {
    pub id: String,
    pub target: String,
    pub classification: AlertClassification,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MachineHealth {
    #[serde(default)]
    pub alerts: Vec<HealthAlert>,
}

impl MachineHealth {
    pub fn has_prevent_allocations_alert(&self) -> bool {
        self.alerts
            .iter()
            .any(|a| a.classification == AlertClassification::PreventAllocations)
    }

    /// The specific `(Id=Maintenance, Target=Degraded)` alert referenced by §4.2.1 step 5.
    pub fn has_maintenance_degraded_alert(&self) -> bool {
        self.alerts
            .iter()
            .any(|a| a.id == "Maintenance" && a.target == "Degraded")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    pub site_id: SiteId,
    pub tenant_id: Option<TenantId>,
    pub status: MachineStatus,
    pub is_missing_on_site: bool,
    pub infrastructure_provider_id: String,
    pub controller_machine_id: Option<String>,
    pub hostname: Option<String>,
    pub instance_type_id: Option<String>,
    pub labels: HashMap<String, String>,
    pub is_in_maintenance: bool,
    pub is_network_degraded: bool,
    pub is_usable_by_tenant: bool,
    pub health: MachineHealth,
    pub maintenance_start_time: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Machine {
    pub fn new(site_id: SiteId, infrastructure_provider_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: MachineId::random(),
            site_id,
            tenant_id: None,
            status: MachineStatus::Unknown,
            is_missing_on_site: false,
            infrastructure_provider_id: infrastructure_provider_id.into(),
            controller_machine_id: None,
            hostname: None,
            instance_type_id: None,
            labels: HashMap::new(),
            is_in_maintenance: false,
            is_network_degraded: false,
            is_usable_by_tenant: false,
            health: MachineHealth::default(),
            maintenance_start_time: None,
            created: now,
            updated: now,
            deleted_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineInterface {
    pub id: MachineInterfaceId,
    pub machine_id: MachineId,
    pub controller_interface_id: Option<String>,
    pub controller_segment_id: Option<String>,
    pub attached_dpu_machine_id: Option<MachineId>,
    pub ip_addresses: Vec<String>,
    pub mac_address: Option<String>,
    pub hostname: Option<String>,
    pub is_primary: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MachineInterface {
    pub fn new(machine_id: MachineId) -> Self {
        let now = Utc::now();
        Self {
            id: MachineInterfaceId::random(),
            machine_id,
            controller_interface_id: None,
            controller_segment_id: None,
            attached_dpu_machine_id: None,
            ip_addresses: Vec::new(),
            mac_address: None,
            hostname: None,
            is_primary: false,
            created: now,
            updated: now,
            deleted_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapabilityType {
    Cpu,
    Gpu,
    Dpu,
    Memory,
    Network,
    InfiniBand,
    Storage,
}

/// §9 open question: memory capability with unknown capacity is a first-class
/// row named `"UNKNOWN"`, never discarded.
pub const UNKNOWN_CAPABILITY_NAME: &str = "UNKNOWN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineCapability {
    pub id: MachineCapabilityId,
    pub machine_id: MachineId,
    pub capability_type: CapabilityType,
    pub name: String,
    pub count: u32,
    pub capacity: Option<u64>,
    pub cores: Option<u32>,
    pub threads: Option<u32>,
    pub device_type: Option<String>,
    pub inactive_devices: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MachineCapability {
    pub fn new(machine_id: MachineId, capability_type: CapabilityType, name: impl Into<String>, count: u32) -> Self {
        let now = Utc::now();
        Self {
            id: MachineCapabilityId::random(),
            machine_id,
            capability_type,
            name: name.into(),
            count,
            capacity: None,
            cores: None,
            threads: None,
            device_type: None,
            inactive_devices: Vec::new(),
            created: now,
            updated: now,
            deleted_at: None,
        }
    }

    /// Identity tuple used by the reconciler to detect duplicates (§3: unique by
    /// (Type, Name) within a machine).
    pub fn identity(&self) -> (CapabilityType, &str) {
        (self.capability_type, &self.name)
    }
}
