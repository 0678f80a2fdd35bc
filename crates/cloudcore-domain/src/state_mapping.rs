//! Site → Cloud status derivation (§4.2.1).
//!
//! Encoded as small tables plus an interpreter, per the design notes in §9
//! ("best encoded as a table plus a short rules interpreter, not as a nested
//! conditional"), rather than as one `match` arm per reconciler.

use crate::entities::{MachineHealth, MachineStatus};
use crate::status::ResourceStatus;

/// One row of the shared simple-resource state table.
struct StateRow {
    controller_states: &'static [&'static str],
    status: ResourceStatus,
    message: &'static str,
}

/// Shared controller → Cloud status table for VPC, Subnet, VPC-Prefix,
/// InfiniBand-Partition, NVLink-Logical-Partition, NetworkSecurityGroup and
/// DPU-Extension-Service. §4.2.1 gives Subnet as the worked example; the other
/// "simple" resources (those without Machine's prefix/substate/health split)
/// share the same total function per the many-entity symmetry design note (§9).
/// SKU carries no status field (§3) and never consults this table.
const SIMPLE_STATE_TABLE: &[StateRow] = &[
    StateRow { controller_states: &["PROVISIONING", "CONFIGURING"], status: ResourceStatus::Provisioning, message: "provisioning" },
    StateRow { controller_states: &["READY"], status: ResourceStatus::Ready, message: "ready for use" },
    StateRow { controller_states: &["TERMINATING"], status: ResourceStatus::Deleting, message: "deleting" },
    StateRow { controller_states: &["TERMINATED"], status: ResourceStatus::Deleted, message: "deleted" },
    StateRow { controller_states: &["FAILED"], status: ResourceStatus::Error, message: "failed" },
];

/// Map a raw Site-reported controller state string to `(status, message)`.
/// Returns `(Error, "unknown controller state: <state>")` for anything not in
/// the table — the total-function default named in §4.2.1.
pub fn map_simple_resource_state(controller_state: &str, resource_noun: &str) -> (ResourceStatus, String) {
    let normalized = controller_state.trim().to_ascii_uppercase();
    for row in SIMPLE_STATE_TABLE {
        if row.controller_states.contains(&normalized.as_str()) {
            return (row.status, format!("{resource_noun} is {}", row.message));
        }
    }
    (ResourceStatus::Error, format!("{resource_noun} is in an unknown controller state: {controller_state}"))
}

/// Split a Machine controller state into `(prefix, substate)` on the first `/`.
fn split_machine_state(controller_state: &str) -> (&str, Option<&str>) {
    match controller_state.split_once('/') {
        Some((prefix, substate)) => (prefix, Some(substate)),
        None => (controller_state, None),
    }
}

/// Result of deriving a Machine's Cloud-facing status from its raw controller
/// state, maintenance window and health alerts (§4.2.1).
pub struct MachineStateResult {
    pub status: MachineStatus,
    pub message: String,
    pub is_usable_by_tenant: bool,
}

/// Implements the five-step Machine precedence rule from §4.2.1.
pub fn map_machine_state(
    controller_state: &str,
    maintenance_start_time: Option<chrono::DateTime<chrono::Utc>>,
    health: &MachineHealth,
) -> MachineStateResult {
    let prevent_allocations = health.has_prevent_allocations_alert();

    // Step 1: empty state.
    if controller_state.trim().is_empty() {
        return MachineStateResult {
            status: MachineStatus::Unknown,
            message: "machine state is unknown".to_string(),
            is_usable_by_tenant: false,
        };
    }

    let (prefix, substate) = split_machine_state(controller_state);

    // Step 2: maintenance window takes precedence over everything else below.
    if maintenance_start_time.is_some() {
        return MachineStateResult {
            status: MachineStatus::Maintenance,
            message: "machine is in maintenance".to_string(),
            is_usable_by_tenant: machine_is_usable(MachineStatus::Maintenance, prevent_allocations, prefix, health),
        };
    }

    // Step 3: any PreventAllocations alert forces Error.
    if prevent_allocations {
        return MachineStateResult {
            status: MachineStatus::Error,
            message: "Machine has one or more health probe alerts that prevents allocation".to_string(),
            is_usable_by_tenant: false,
        };
    }

    // Step 4: prefix → status mapping.
    let (status, message) = match prefix {
        "Created" | "HostInitializing" | "HostReprovisioning" | "Reprovisioning" => {
            (MachineStatus::Initializing, "machine is initializing".to_string())
        }
        p if p.starts_with("DPU") => (MachineStatus::Initializing, "DPU is initializing".to_string()),
        "WaitingForCleanup" => (MachineStatus::Decommissioned, "machine is decommissioned".to_string()),
        "Measuring" => {
            let msg = match substate {
                Some(sub) => format!("machine is measuring: {sub}"),
                None => "machine is measuring".to_string(),
            };
            (MachineStatus::Measuring, msg)
        }
        "BomValidating" => {
            if substate == Some("SkuVerificationFailed") {
                (MachineStatus::Error, "SKU verification failed".to_string())
            } else {
                (MachineStatus::Initializing, "validating bill of materials".to_string())
            }
        }
        "Assigned" => (MachineStatus::InUse, "machine is in use".to_string()),
        "Ready" => (MachineStatus::Ready, "machine is ready for use".to_string()),
        "ForceDeletion" => (MachineStatus::Decommissioned, "machine is decommissioned".to_string()),
        "Failed" => (MachineStatus::Error, "machine is in a failed state".to_string()),
        "Missing" => (MachineStatus::Error, "machine is missing".to_string()),
        other => (MachineStatus::Error, format!("unknown machine controller state prefix: {other}")),
    };

    let is_usable_by_tenant = machine_is_usable(status, prevent_allocations, prefix, health);

    MachineStateResult { status, message, is_usable_by_tenant }
}

/// Step 5: `IsUsableByTenant = true iff (status ∈ {Ready, InUse, Initializing} AND
/// no PreventAllocations) OR (prefix=Assigned AND a Maintenance+Degraded alert present)`.
fn machine_is_usable(
    status: MachineStatus,
    prevent_allocations: bool,
    prefix: &str,
    health: &MachineHealth,
) -> bool {
    let usable_status = matches!(
        status,
        MachineStatus::Ready | MachineStatus::InUse | MachineStatus::Initializing
    );
    (usable_status && !prevent_allocations) || (prefix == "Assigned" && health.has_maintenance_degraded_alert())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AlertClassification, HealthAlert};

    #[test]
    fn subnet_state_table_matches_spec_example() {
        assert_eq!(map_simple_resource_state("PROVISIONING", "Subnet").0, ResourceStatus::Provisioning);
        assert_eq!(map_simple_resource_state("CONFIGURING", "Subnet").0, ResourceStatus::Provisioning);
        assert_eq!(map_simple_resource_state("READY", "Subnet").0, ResourceStatus::Ready);
        assert_eq!(map_simple_resource_state("TERMINATING", "Subnet").0, ResourceStatus::Deleting);
        assert_eq!(map_simple_resource_state("TERMINATED", "Subnet").0, ResourceStatus::Deleted);
        assert_eq!(map_simple_resource_state("FAILED", "Subnet").0, ResourceStatus::Error);
        let (status, msg) = map_simple_resource_state("SOMETHING_WEIRD", "Subnet");
        assert_eq!(status, ResourceStatus::Error);
        assert!(msg.contains("unknown controller state"));
    }

    #[test]
    fn subnet_ready_message_matches_scenario_1() {
        let (_, msg) = map_simple_resource_state("READY", "Subnet");
        assert_eq!(msg, "Subnet is ready for use");
    }

    #[test]
    fn machine_empty_state_is_unknown() {
        let result = map_machine_state("", None, &MachineHealth::default());
        assert_eq!(result.status, MachineStatus::Unknown);
        assert!(!result.is_usable_by_tenant);
    }

    #[test]
    fn machine_maintenance_start_time_wins_over_prefix() {
        let result = map_machine_state("Ready", Some(chrono::Utc::now()), &MachineHealth::default());
        assert_eq!(result.status, MachineStatus::Maintenance);
    }

    #[test]
    fn machine_prevent_allocations_forces_error_scenario_3() {
        let health = MachineHealth {
            alerts: vec![HealthAlert {
                id: "SomeAlert".to_string(),
                target: "Host".to_string(),
                classification: AlertClassification::PreventAllocations,
                message: None,
            }],
        };
        let result = map_machine_state("Ready", None, &health);
        assert_eq!(result.status, MachineStatus::Error);
        assert_eq!(
            result.message,
            "Machine has one or more health probe alerts that prevents allocation"
        );
        assert!(!result.is_usable_by_tenant);
    }

    #[test]
    fn machine_assigned_with_degraded_alert_is_usable() {
        let health = MachineHealth {
            alerts: vec![HealthAlert {
                id: "Maintenance".to_string(),
                target: "Degraded".to_string(),
                classification: AlertClassification::Informational,
                message: None,
            }],
        };
        let result = map_machine_state("Assigned", None, &health);
        assert_eq!(result.status, MachineStatus::InUse);
        assert!(result.is_usable_by_tenant);
    }

    #[test]
    fn machine_assigned_in_maintenance_with_degraded_alert_is_still_usable() {
        let health = MachineHealth {
            alerts: vec![HealthAlert {
                id: "Maintenance".to_string(),
                target: "Degraded".to_string(),
                classification: AlertClassification::Informational,
                message: None,
            }],
        };
        let result = map_machine_state("Assigned/Draining", Some(chrono::Utc::now()), &health);
        assert_eq!(result.status, MachineStatus::Maintenance);
        assert!(result.is_usable_by_tenant);
    }

    #[test]
    fn machine_bom_validating_sku_failure_is_error() {
        let result = map_machine_state("BomValidating/SkuVerificationFailed", None, &MachineHealth::default());
        assert_eq!(result.status, MachineStatus::Error);
    }

    #[test]
    fn machine_bom_validating_other_substate_is_initializing() {
        let result = map_machine_state("BomValidating/Checking", None, &MachineHealth::default());
        assert_eq!(result.status, MachineStatus::Initializing);
    }

    #[test]
    fn machine_dpu_prefix_is_initializing() {
        let result = map_machine_state("DPUProvisioning", None, &MachineHealth::default());
        assert_eq!(result.status, MachineStatus::Initializing);
    }

    #[test]
    fn machine_ready_is_usable() {
        let result = map_machine_state("Ready", None, &MachineHealth::default());
        assert_eq!(result.status, MachineStatus::Ready);
        assert!(result.is_usable_by_tenant);
    }
}
