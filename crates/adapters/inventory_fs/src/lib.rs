//! Filesystem inventory adapter.
//!
//! Scene definitions come from bridge inventory snapshots (one JSON file per
//! bridge) in a directory. Resource ids are mapped to local entities through
//! the entity registry file, which also supplies scene labels. Both are
//! re-read on every [`SceneInventory::load_scenes`] call.

mod error;
mod format;
mod registry;

pub use error::InventoryError;

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::Deserialize;

use sceneguard_app::ports::{EntityResolver, SceneInventory};
use sceneguard_domain::error::SceneGuardError;
use sceneguard_domain::id::{EntityRef, ResourceId};
use sceneguard_domain::scene::SceneDefinition;

use crate::format::{InventorySnapshot, RawScene};
use crate::registry::{RegistryFile, RegistryIndex};

const DEFAULT_PLATFORM: &str = "hue";

/// Where to find the inventory snapshots and the entity registry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub dir: PathBuf,
    pub registry_path: Option<PathBuf>,
    /// Registry platform whose entries are indexed.
    pub platform: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("inventory"),
            registry_path: None,
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }
}

/// Reads scene definitions and the registry index from disk.
pub struct FsInventory {
    config: InventoryConfig,
    index: RwLock<RegistryIndex>,
}

impl FsInventory {
    #[must_use]
    pub fn new(config: InventoryConfig) -> Self {
        Self {
            config,
            index: RwLock::new(RegistryIndex::default()),
        }
    }

    async fn load_registry(&self) -> Result<RegistryIndex, InventoryError> {
        let Some(path) = self.config.registry_path.as_deref() else {
            return Ok(RegistryIndex::default());
        };
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "entity registry not found, targets will not resolve");
                return Ok(RegistryIndex::default());
            }
            Err(source) => {
                return Err(InventoryError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let file: RegistryFile =
            serde_json::from_str(&raw).map_err(|source| InventoryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let index = RegistryIndex::from_file(file, &self.config.platform);
        tracing::debug!(entries = index.len(), platform = %self.config.platform, "entity registry indexed");
        Ok(index)
    }

    async fn snapshot_paths(&self) -> Result<Vec<PathBuf>, InventoryError> {
        let dir = &self.config.dir;
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(InventoryError::MissingDirectory(dir.clone()));
            }
            Err(source) => {
                return Err(InventoryError::Io {
                    path: dir.clone(),
                    source,
                });
            }
        };
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|source| InventoryError::Io {
            path: dir.clone(),
            source,
        })? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

async fn read_snapshot(path: &Path) -> Result<InventorySnapshot, InventoryError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| InventoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&raw).map_err(|source| InventoryError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl SceneInventory for FsInventory {
    async fn load_scenes(&self) -> Result<Vec<SceneDefinition>, SceneGuardError> {
        let index = self.load_registry().await?;
        let paths = self.snapshot_paths().await?;

        let mut seen = HashSet::new();
        let mut scenes = Vec::new();
        for path in paths {
            let snapshot = match read_snapshot(&path).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable inventory file");
                    continue;
                }
            };
            let bridge = snapshot.bridge_name().unwrap_or("unknown").to_string();
            for item in snapshot.resources.scenes.items {
                let hint = item
                    .get("id")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("unknown")
                    .to_string();
                let converted = RawScene::from_item(item).and_then(|raw| {
                    let labels = index
                        .entry(&raw.id)
                        .map(|entry| entry.labels.clone())
                        .unwrap_or_default();
                    raw.into_definition(labels)
                });
                match converted {
                    Ok(scene) if seen.insert(scene.id.clone()) => scenes.push(scene),
                    Ok(scene) => {
                        tracing::debug!(scene_id = %scene.id, %bridge, "duplicate scene id, keeping first");
                    }
                    Err(err) => {
                        tracing::warn!(scene_id = %hint, %bridge, error = %err, "skipping scene");
                    }
                }
            }
        }

        *self.index.write().unwrap_or_else(PoisonError::into_inner) = index;
        Ok(scenes)
    }
}

impl EntityResolver for FsInventory {
    fn resolve(&self, resource: &ResourceId) -> Option<EntityRef> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(resource)
    }
}
