//! Inventory adapter errors.

use std::path::PathBuf;

use sceneguard_domain::error::SceneGuardError;

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("inventory directory {0} not found")]
    MissingDirectory(PathBuf),
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<InventoryError> for SceneGuardError {
    fn from(err: InventoryError) -> Self {
        Self::Inventory(Box::new(err))
    }
}
