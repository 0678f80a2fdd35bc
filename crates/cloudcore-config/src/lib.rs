mod loader;
mod raw;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use loader::load;
pub use types::{
    Config, DatabaseConfig, MetricsConfig, NotifierConfig, SiteManagerConfig, SiteTlsConfig,
    WorkflowConfig,
};
