use thiserror::Error;

use crate::snapshot::StoreError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "required environment variable '{0}' not set; please ensure it is defined in .env"
    )]
    Missing(&'static str),

    #[error("invalid value for '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("failed to read .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// Reasons a monitoring cycle stops before completing.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("all market data calls failed")]
    UpstreamFetchFailed,

    #[error("snapshot store: {0}")]
    Store(#[from] StoreError),
}
