use uuid::Uuid;

/// Namespace a parent IP block's child-CIDR allocations live under —
/// the same parent block id can be shared across routing types, cloud
/// providers, or sites without the allocators colliding (§2, §C3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub routing_type: String,
    pub provider: String,
    pub site_id: Uuid,
}

impl Namespace {
    pub fn new(routing_type: impl Into<String>, provider: impl Into<String>, site_id: Uuid) -> Self {
        Self { routing_type: routing_type.into(), provider: provider.into(), site_id }
    }
}
