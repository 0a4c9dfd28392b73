//! Inventory ports: persisted scene definitions and id resolution.

use std::future::Future;

use sceneguard_domain::error::SceneGuardError;
use sceneguard_domain::id::{EntityRef, ResourceId};
use sceneguard_domain::scene::SceneDefinition;

/// Source of persisted scene definitions.
pub trait SceneInventory {
    /// Load every known scene definition.
    fn load_scenes(
        &self,
    ) -> impl Future<Output = Result<Vec<SceneDefinition>, SceneGuardError>> + Send;
}

/// Maps an opaque external resource id to a local control handle.
///
/// Resolution is a lookup in memory; implementations refresh their index
/// when the inventory is reloaded.
pub trait EntityResolver {
    fn resolve(&self, resource: &ResourceId) -> Option<EntityRef>;
}

impl<T: SceneInventory + Send + Sync> SceneInventory for std::sync::Arc<T> {
    fn load_scenes(
        &self,
    ) -> impl Future<Output = Result<Vec<SceneDefinition>, SceneGuardError>> + Send {
        (**self).load_scenes()
    }
}

impl<T: EntityResolver> EntityResolver for std::sync::Arc<T> {
    fn resolve(&self, resource: &ResourceId) -> Option<EntityRef> {
        (**self).resolve(resource)
    }
}
