use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid site id: {0}")]
    InvalidSiteId(String),

    #[error("invalid {entity} id: {id}")]
    InvalidEntityId { entity: String, id: String },

    #[error("unknown controller state for {entity}: {state}")]
    UnknownControllerState { entity: String, state: String },

    #[error("duplicate machine capability (type={capability_type:?}, name={name}) on machine {machine_id}")]
    DuplicateMachineCapability {
        capability_type: String,
        name: String,
        machine_id: String,
    },

    #[error("invalid prefix length {prefix_length} for ip block {ip_block_id}")]
    InvalidPrefixLength { ip_block_id: String, prefix_length: u8 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
