//! CLI error types.

use mdsync_config::ConfigError;
use mdsync_core::SyncError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Sync(#[from] SyncError),

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("{0}")]
    Validation(String),
}
