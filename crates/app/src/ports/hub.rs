//! Hub ports: reading entity state and issuing corrective actions.

use std::future::Future;

use sceneguard_domain::error::SceneGuardError;
use sceneguard_domain::id::{EntityRef, SceneId};
use sceneguard_domain::observed::ObservedState;
use sceneguard_domain::scene::EntityCommand;

/// Reads the live state of an entity.
pub trait StateReader {
    /// Return a fresh reading. Implementations must not serve cached state.
    fn read_state(
        &self,
        entity: &EntityRef,
    ) -> impl Future<Output = Result<ObservedState, SceneGuardError>> + Send;
}

/// Issues activations and per-entity commands.
pub trait ActionInvoker {
    /// Re-activate a whole scene.
    fn activate_scene(
        &self,
        scene_id: &SceneId,
    ) -> impl Future<Output = Result<(), SceneGuardError>> + Send;

    /// Drive one entity straight to a target state.
    fn set_entity_state(
        &self,
        entity: &EntityRef,
        command: &EntityCommand,
    ) -> impl Future<Output = Result<(), SceneGuardError>> + Send;
}

impl<T: StateReader + Send + Sync> StateReader for std::sync::Arc<T> {
    fn read_state(
        &self,
        entity: &EntityRef,
    ) -> impl Future<Output = Result<ObservedState, SceneGuardError>> + Send {
        (**self).read_state(entity)
    }
}

impl<T: ActionInvoker + Send + Sync> ActionInvoker for std::sync::Arc<T> {
    fn activate_scene(
        &self,
        scene_id: &SceneId,
    ) -> impl Future<Output = Result<(), SceneGuardError>> + Send {
        (**self).activate_scene(scene_id)
    }

    fn set_entity_state(
        &self,
        entity: &EntityRef,
        command: &EntityCommand,
    ) -> impl Future<Output = Result<(), SceneGuardError>> + Send {
        (**self).set_entity_state(entity, command)
    }
}
