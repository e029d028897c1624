pub mod app_config;
pub mod config;
pub mod listings;
pub mod snapshot;
pub mod sources;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use listings::{Listing, ListingError, RawListing, Source};
pub use snapshot::Snapshot;
pub use sources::{load_sources, SourceConfig, SourceKind, SourcesFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("invalid sources config: {0}")]
    Validation(String),
}
