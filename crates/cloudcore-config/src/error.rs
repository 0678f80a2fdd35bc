use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration from environment: {0}")]
    Extract(#[from] figment::Error),

    #[error("invalid configuration value for {field}: {message}")]
    Conversion { field: String, message: String },

    #[error("domain error: {0}")]
    Domain(#[from] cloudcore_domain::DomainError),
}
