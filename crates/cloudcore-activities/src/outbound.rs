//! Outbound lifecycle activities (§4.3, §C6): one function per (resource,
//! verb) pair named in §6's workflow list. Each validates preconditions,
//! dispatches a fire-and-forget workflow on the Site's namespace, and writes
//! an interim status regardless of RPC outcome — completion is observed
//! later through inventory or [`crate::inbound::apply_workflow_outcome`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use cloudcore_domain::constants::DEFAULT_RESERVED_IP_COUNT;
use cloudcore_domain::entities::{InfinibandPartition, NetworkSecurityGroup, StatusDetail, Subnet, Vpc};
use cloudcore_domain::ids::SiteId;
use cloudcore_domain::status::ResourceStatus;
use cloudcore_store::{Dao, StatusJournal};
use cloudcore_workflow::{workflow_id, ClientPool, ExecuteWorkflowRequest, WorkflowClient, WorkflowError, WorkflowHandle};

use crate::error::ActivityError;
use crate::types::TransactionId;

/// Object-safe front for [`ClientPool`] so activity functions don't need to
/// carry its factory-closure type parameter.
#[async_trait]
pub trait ClientResolver: Send + Sync {
    async fn client_for(&self, site_id: Uuid) -> Result<Arc<dyn WorkflowClient>, WorkflowError>;
}

#[async_trait]
impl<F, Fut> ClientResolver for ClientPool<F>
where
    F: Fn(Uuid) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<Arc<dyn WorkflowClient>, WorkflowError>> + Send,
{
    async fn client_for(&self, site_id: Uuid) -> Result<Arc<dyn WorkflowClient>, WorkflowError> {
        self.get(site_id).await
    }
}

/// Entities driven through a ViaSiteAgent activity all share a bare
/// [`ResourceStatus`] field (Machine is not in §6's outbound list — it is
/// provisioned through its own workflow, not C6).
trait HasResourceStatus {
    fn resource_status_mut(&mut self) -> &mut ResourceStatus;
}

impl HasResourceStatus for Vpc {
    fn resource_status_mut(&mut self) -> &mut ResourceStatus {
        &mut self.status
    }
}
impl HasResourceStatus for Subnet {
    fn resource_status_mut(&mut self) -> &mut ResourceStatus {
        &mut self.status
    }
}
impl HasResourceStatus for InfinibandPartition {
    fn resource_status_mut(&mut self) -> &mut ResourceStatus {
        &mut self.status
    }
}
impl HasResourceStatus for NetworkSecurityGroup {
    fn resource_status_mut(&mut self) -> &mut ResourceStatus {
        &mut self.status
    }
}

#[derive(Debug, Clone, Serialize)]
struct NetworkPrefixInfo {
    prefix: String,
    gateway: Option<String>,
    reserve_first: u8,
}

#[derive(Debug, Clone, Serialize)]
struct CreateSubnetRequest {
    network_prefixes: Vec<NetworkPrefixInfo>,
}

#[derive(Debug, Clone, Serialize)]
struct DeleteResourceRequest {
    controller_id: String,
}

#[derive(Debug, Clone, Serialize)]
struct CreateVpcRequest {
    tenant_id: Uuid,
    network_virtualization_type: Option<cloudcore_domain::entities::NetworkVirtualizationType>,
}

#[derive(Debug, Clone, Serialize)]
struct UpdateVpcRequest {
    controller_id: String,
    network_virtualization_type: Option<cloudcore_domain::entities::NetworkVirtualizationType>,
    labels: std::collections::HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
struct CreateInfinibandPartitionRequest {
    partition_name: Option<String>,
    service_level: Option<u8>,
    rate_limit: Option<u32>,
    mtu: Option<u32>,
    enable_sharp: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
struct UpdateNetworkSecurityGroupRequest {
    controller_id: String,
    stateful_egress: bool,
    rules: Vec<cloudcore_domain::entities::SecurityRule>,
    version: u64,
}

/// Runs one outbound dispatch: builds the workflow id, invokes
/// `ExecuteWorkflow`, and writes the interim status/journal entry regardless
/// of RPC outcome (§4.3 step 6).
async fn dispatch<E>(
    dao: &Arc<dyn Dao<E>>,
    journal: &Arc<dyn StatusJournal>,
    resolver: &dyn ClientResolver,
    mut entity: E,
    site_id: Uuid,
    resource: &str,
    verb: &str,
    workflow_name: &str,
    req: impl Serialize + Send,
    on_success: ResourceStatus,
    success_message: &str,
) -> Result<WorkflowHandle, ActivityError>
where
    E: cloudcore_store::Entity + HasResourceStatus,
{
    let entity_id = entity.id();
    let tx_id = TransactionId::new(entity_id);
    let args = serde_json::to_value(&(&tx_id, &req)).map_err(cloudcore_store::StoreError::Serialization)?;

    let client = resolver.client_for(site_id).await?;
    let request = ExecuteWorkflowRequest {
        workflow_id: workflow_id(resource, verb, entity_id),
        workflow_name: workflow_name.to_string(),
        task_queue: site_id.to_string(),
        args,
    };

    let outcome = client.execute_workflow(request).await;
    let (status, message) = match &outcome {
        Ok(_) => (on_success, success_message.to_string()),
        Err(e) => (ResourceStatus::Error, format!("failed to initiate: {e}")),
    };

    *entity.resource_status_mut() = status;
    dao.update(&entity).await?;
    journal.append(&StatusDetail::new(entity_id, status.to_string(), Some(message))).await?;

    Ok(outcome?)
}

pub async fn create_vpc_via_site_agent(
    dao: &Arc<dyn Dao<Vpc>>,
    journal: &Arc<dyn StatusJournal>,
    resolver: &dyn ClientResolver,
    vpc_id: Uuid,
) -> Result<WorkflowHandle, ActivityError> {
    let vpc = dao
        .get_by_id(vpc_id, false)
        .await?
        .ok_or_else(|| ActivityError::Precondition("vpc not found".into()))?;

    let req = CreateVpcRequest {
        tenant_id: vpc.tenant_id.as_uuid(),
        network_virtualization_type: vpc.network_virtualization_type,
    };
    let site_id = vpc.site_id.as_uuid();
    dispatch(dao, journal, resolver, vpc, site_id, "vpc", "create", "CreateVPC", req, ResourceStatus::Provisioning, "request sent").await
}

pub async fn delete_vpc_via_site_agent(
    dao: &Arc<dyn Dao<Vpc>>,
    journal: &Arc<dyn StatusJournal>,
    resolver: &dyn ClientResolver,
    vpc_id: Uuid,
) -> Result<WorkflowHandle, ActivityError> {
    let vpc = dao
        .get_by_id(vpc_id, false)
        .await?
        .ok_or_else(|| ActivityError::Precondition("vpc not found".into()))?;
    let controller_id = vpc
        .controller_vpc_id
        .clone()
        .ok_or_else(|| ActivityError::Precondition("vpc has no controller id to delete".into()))?;

    let req = DeleteResourceRequest { controller_id };
    let site_id = vpc.site_id.as_uuid();
    dispatch(dao, journal, resolver, vpc, site_id, "vpc", "delete", "DeleteVPC", req, ResourceStatus::Deleting, "request sent").await
}

pub async fn update_vpc_via_site_agent(
    dao: &Arc<dyn Dao<Vpc>>,
    journal: &Arc<dyn StatusJournal>,
    resolver: &dyn ClientResolver,
    vpc_id: Uuid,
) -> Result<WorkflowHandle, ActivityError> {
    let vpc = dao
        .get_by_id(vpc_id, false)
        .await?
        .ok_or_else(|| ActivityError::Precondition("vpc not found".into()))?;
    let controller_id = vpc
        .controller_vpc_id
        .clone()
        .ok_or_else(|| ActivityError::Precondition("vpc has no controller id to update".into()))?;

    let req = UpdateVpcRequest {
        controller_id,
        network_virtualization_type: vpc.network_virtualization_type,
        labels: vpc.labels.clone(),
    };
    let site_id = vpc.site_id.as_uuid();
    let current_status = vpc.status;
    dispatch(dao, journal, resolver, vpc, site_id, "vpc", "update", "UpdateVPC", req, current_status, "update request sent").await
}

pub async fn create_subnet_via_site_agent(
    dao: &Arc<dyn Dao<Subnet>>,
    journal: &Arc<dyn StatusJournal>,
    resolver: &dyn ClientResolver,
    subnet_id: Uuid,
) -> Result<WorkflowHandle, ActivityError> {
    let subnet = dao
        .get_by_id(subnet_id, false)
        .await?
        .ok_or_else(|| ActivityError::Precondition("subnet not found".into()))?;
    let prefix = subnet
        .ipv4_prefix
        .clone()
        .ok_or_else(|| ActivityError::Precondition("subnet has no ipv4 prefix to create".into()))?;

    let req = CreateSubnetRequest {
        network_prefixes: vec![NetworkPrefixInfo {
            prefix: format!("{prefix}/{}", subnet.prefix_length),
            gateway: subnet.ipv4_gateway.clone(),
            reserve_first: DEFAULT_RESERVED_IP_COUNT,
        }],
    };
    let site_id = subnet.site_id.as_uuid();
    dispatch(dao, journal, resolver, subnet, site_id, "subnet", "create", "CreateSubnet", req, ResourceStatus::Provisioning, "request sent").await
}

pub async fn delete_subnet_via_site_agent(
    dao: &Arc<dyn Dao<Subnet>>,
    journal: &Arc<dyn StatusJournal>,
    resolver: &dyn ClientResolver,
    subnet_id: Uuid,
) -> Result<WorkflowHandle, ActivityError> {
    let subnet = dao
        .get_by_id(subnet_id, false)
        .await?
        .ok_or_else(|| ActivityError::Precondition("subnet not found".into()))?;
    let controller_id = subnet
        .controller_network_segment_id
        .clone()
        .ok_or_else(|| ActivityError::Precondition("subnet has no controller id to delete".into()))?;

    let req = DeleteResourceRequest { controller_id };
    let site_id = subnet.site_id.as_uuid();
    dispatch(dao, journal, resolver, subnet, site_id, "subnet", "delete", "DeleteSubnet", req, ResourceStatus::Deleting, "request sent").await
}

pub async fn create_infiniband_partition_via_site_agent(
    dao: &Arc<dyn Dao<InfinibandPartition>>,
    journal: &Arc<dyn StatusJournal>,
    resolver: &dyn ClientResolver,
    partition_id: Uuid,
) -> Result<WorkflowHandle, ActivityError> {
    let partition = dao
        .get_by_id(partition_id, false)
        .await?
        .ok_or_else(|| ActivityError::Precondition("infiniband partition not found".into()))?;

    let req = CreateInfinibandPartitionRequest {
        partition_name: partition.partition_name.clone(),
        service_level: partition.service_level,
        rate_limit: partition.rate_limit,
        mtu: partition.mtu,
        enable_sharp: partition.enable_sharp,
    };
    let site_id = partition.site_id.as_uuid();
    dispatch(
        dao,
        journal,
        resolver,
        partition,
        site_id,
        "infiniband_partition",
        "create",
        "CreateInfiniBandPartition",
        req,
        ResourceStatus::Provisioning,
        "request sent",
    )
    .await
}

pub async fn delete_infiniband_partition_via_site_agent(
    dao: &Arc<dyn Dao<InfinibandPartition>>,
    journal: &Arc<dyn StatusJournal>,
    resolver: &dyn ClientResolver,
    partition_id: Uuid,
) -> Result<WorkflowHandle, ActivityError> {
    let partition = dao
        .get_by_id(partition_id, false)
        .await?
        .ok_or_else(|| ActivityError::Precondition("infiniband partition not found".into()))?;
    let controller_id = partition
        .controller_ib_partition_id
        .clone()
        .ok_or_else(|| ActivityError::Precondition("partition has no controller id to delete".into()))?;

    let req = DeleteResourceRequest { controller_id };
    let site_id = partition.site_id.as_uuid();
    dispatch(
        dao,
        journal,
        resolver,
        partition,
        site_id,
        "infiniband_partition",
        "delete",
        "DeleteInfiniBandPartition",
        req,
        ResourceStatus::Deleting,
        "request sent",
    )
    .await
}

pub async fn update_network_security_group_via_site_agent(
    dao: &Arc<dyn Dao<NetworkSecurityGroup>>,
    journal: &Arc<dyn StatusJournal>,
    resolver: &dyn ClientResolver,
    nsg_id: Uuid,
) -> Result<WorkflowHandle, ActivityError> {
    let nsg = dao
        .get_by_id(nsg_id, false)
        .await?
        .ok_or_else(|| ActivityError::Precondition("network security group not found".into()))?;
    let controller_id = nsg
        .controller_id
        .clone()
        .ok_or_else(|| ActivityError::Precondition("nsg has no controller id to update".into()))?;

    let req = UpdateNetworkSecurityGroupRequest {
        controller_id,
        stateful_egress: nsg.stateful_egress,
        rules: nsg.rules.clone(),
        version: nsg.version,
    };
    let site_id = nsg.site_id.as_uuid();
    let current_status = nsg.status;
    dispatch(
        dao,
        journal,
        resolver,
        nsg,
        site_id,
        "network_security_group",
        "update",
        "UpdateNetworkSecurityGroup",
        req,
        current_status,
        "update request sent",
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcore_domain::ids::TenantId;
    use cloudcore_store::journal::memory::InMemoryStatusJournal;
    use cloudcore_store::memory::InMemoryDao;
    use cloudcore_workflow::memory::InMemoryWorkflowClient;

    struct FixedResolver(Arc<dyn WorkflowClient>);

    #[async_trait]
    impl ClientResolver for FixedResolver {
        async fn client_for(&self, _site_id: Uuid) -> Result<Arc<dyn WorkflowClient>, WorkflowError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn create_subnet_sends_reserved_ip_count_and_marks_provisioning() {
        let dao: Arc<dyn Dao<Subnet>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let resolver = FixedResolver(Arc::new(InMemoryWorkflowClient::new()));

        let site_id = SiteId::random();
        let mut subnet = Subnet::new(site_id, TenantId::random(), cloudcore_domain::ids::VpcId::random(), 26);
        subnet.ipv4_prefix = Some("192.0.2.0".to_string());
        subnet.ipv4_gateway = Some("192.0.2.1".to_string());
        dao.create(&subnet).await.unwrap();

        let handle = create_subnet_via_site_agent(&dao, &journal, &resolver, subnet.id.as_uuid()).await.unwrap();
        assert!(!handle.workflow_id.is_empty());

        let stored = dao.get_by_id(subnet.id.as_uuid(), false).await.unwrap().unwrap();
        assert_eq!(stored.status, ResourceStatus::Provisioning);

        let latest = journal.latest(subnet.id.as_uuid()).await.unwrap().unwrap();
        assert_eq!(latest.status, "provisioning");
    }

    #[tokio::test]
    async fn delete_vpc_without_controller_id_is_a_precondition_error() {
        let dao: Arc<dyn Dao<Vpc>> = InMemoryDao::new();
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let resolver = FixedResolver(Arc::new(InMemoryWorkflowClient::new()));

        let vpc = Vpc::new(SiteId::random(), TenantId::random());
        dao.create(&vpc).await.unwrap();

        let err = delete_vpc_via_site_agent(&dao, &journal, &resolver, vpc.id.as_uuid()).await.unwrap_err();
        assert!(!err.is_retryable());
    }
}
