use thiserror::Error;

#[derive(Debug, Error)]
pub enum IpamError {
    #[error("parent ip block {0} not registered")]
    UnknownParentBlock(uuid::Uuid),

    #[error("no free /{requested} child CIDR remains under parent {parent}")]
    Exhausted { parent: uuid::Uuid, requested: u8 },

    #[error("requested prefix length /{requested} is not narrower than parent /{parent_len}")]
    InvalidPrefixLength { requested: u8, parent_len: u8 },

    #[error("child allocation {0} not found")]
    NotFound(uuid::Uuid),

    #[error("internal ipam error: {0}")]
    Internal(String),
}

impl IpamError {
    pub fn is_retryable(&self) -> bool {
        false
    }
}
