//! # sceneguard-adapter-virtual
//!
//! Simulated light hub for demos and end-to-end tests.
//!
//! Lights keep an in-memory [`ObservedState`]. Installed scenes map each
//! light to its target, and recalling one applies the targets and publishes
//! an activation notice, just like a real bridge reporting a recall.
//! Individual lights can be made to misbehave through [`LightFaults`].
//!
//! ## Dependency rule
//!
//! Depends on `sceneguard-app` (port traits) and `sceneguard-domain` only.

mod error;
mod light;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sceneguard_app::ports::{ActionInvoker, EntityResolver, NoticePublisher, StateReader};
use sceneguard_domain::activation::{ActivationNotice, Marker};
use sceneguard_domain::error::SceneGuardError;
use sceneguard_domain::id::{EntityRef, SceneId};
use sceneguard_domain::observed::ObservedState;
use sceneguard_domain::scene::{EntityCommand, SceneDefinition};

pub use error::VirtualError;
pub use light::{COLOR_TEMP_LAG_MIREK, LightFaults};

use light::VirtualLight;

/// In-memory hub of virtual lights and scenes.
pub struct VirtualHub<P> {
    lights: Mutex<HashMap<EntityRef, VirtualLight>>,
    scenes: Mutex<HashMap<SceneId, Vec<(EntityRef, EntityCommand)>>>,
    publisher: P,
}

impl<P> VirtualHub<P>
where
    P: NoticePublisher + Send + Sync,
{
    /// Create an empty hub publishing recall notices to `publisher`.
    pub fn new(publisher: P) -> Self {
        Self {
            lights: Mutex::new(HashMap::new()),
            scenes: Mutex::new(HashMap::new()),
            publisher,
        }
    }

    /// Add a light, switched off. Replaces any light with the same id.
    pub fn add_light(&self, entity: EntityRef, faults: LightFaults) {
        self.lights().insert(entity, VirtualLight::new(faults));
    }

    /// Install `scene`, resolving each target through `resolver`.
    ///
    /// Lights are created on demand for resolved targets. Returns the
    /// number of targets that could be resolved.
    pub fn install_scene(&self, scene: &SceneDefinition, resolver: &impl EntityResolver) -> usize {
        let members: Vec<_> = scene
            .actions
            .iter()
            .filter_map(|action| {
                resolver
                    .resolve(&action.target)
                    .map(|entity| (entity, EntityCommand::from(action)))
            })
            .collect();

        {
            let mut lights = self.lights();
            for (entity, _) in &members {
                lights
                    .entry(entity.clone())
                    .or_insert_with(|| VirtualLight::new(LightFaults::default()));
            }
        }

        let count = members.len();
        tracing::debug!(scene_id = %scene.id, count, "virtual scene installed");
        self.scenes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(scene.id.clone(), members);
        count
    }

    /// Change the simulated faults of an existing light.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::UnknownLight`] if no such light exists.
    pub fn set_faults(&self, entity: &EntityRef, faults: LightFaults) -> Result<(), VirtualError> {
        let mut lights = self.lights();
        let light = lights
            .get_mut(entity)
            .ok_or_else(|| VirtualError::UnknownLight(entity.clone()))?;
        let state = light.state().clone();
        *light = VirtualLight::new(faults);
        light.overwrite(state);
        Ok(())
    }

    /// Mark a light (un)reachable.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::UnknownLight`] if no such light exists.
    pub fn set_unavailable(&self, entity: &EntityRef, unavailable: bool) -> Result<(), VirtualError> {
        self.lights()
            .get_mut(entity)
            .ok_or_else(|| VirtualError::UnknownLight(entity.clone()))?
            .set_unavailable(unavailable);
        Ok(())
    }

    /// Force a light into `state`, bypassing faults.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::UnknownLight`] if no such light exists.
    pub fn overwrite(&self, entity: &EntityRef, state: ObservedState) -> Result<(), VirtualError> {
        self.lights()
            .get_mut(entity)
            .ok_or_else(|| VirtualError::UnknownLight(entity.clone()))?
            .overwrite(state);
        Ok(())
    }

    /// Current state of a light.
    #[must_use]
    pub fn light(&self, entity: &EntityRef) -> Option<ObservedState> {
        self.lights().get(entity).map(|light| light.state().clone())
    }

    /// Recall a scene: apply its targets and publish an activation notice.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::UnknownScene`] (as [`SceneGuardError::NotFound`])
    /// for a scene that was never installed, or the publisher's error.
    pub async fn recall(&self, scene_id: &SceneId) -> Result<(), SceneGuardError> {
        self.apply_scene(scene_id)?;
        let notice = ActivationNotice::new(
            scene_id.clone(),
            Marker::Recalled(Some(sceneguard_domain::time::now())),
        );
        self.publisher.publish(notice).await
    }

    fn apply_scene(&self, scene_id: &SceneId) -> Result<(), VirtualError> {
        let members = self
            .scenes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(scene_id)
            .cloned()
            .ok_or_else(|| VirtualError::UnknownScene(scene_id.clone()))?;

        let mut lights = self.lights();
        for (entity, command) in &members {
            let applied = lights
                .get_mut(entity)
                .is_some_and(|light| light.recall(command));
            if !applied {
                tracing::debug!(%scene_id, %entity, "light ignored scene recall");
            }
        }
        Ok(())
    }

    fn lights(&self) -> MutexGuard<'_, HashMap<EntityRef, VirtualLight>> {
        self.lights.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P> StateReader for VirtualHub<P>
where
    P: NoticePublisher + Send + Sync,
{
    async fn read_state(&self, entity: &EntityRef) -> Result<ObservedState, SceneGuardError> {
        self.light(entity)
            .ok_or_else(|| VirtualError::UnknownLight(entity.clone()).into())
    }
}

impl<P> ActionInvoker for VirtualHub<P>
where
    P: NoticePublisher + Send + Sync,
{
    async fn activate_scene(&self, scene_id: &SceneId) -> Result<(), SceneGuardError> {
        self.recall(scene_id).await
    }

    async fn set_entity_state(
        &self,
        entity: &EntityRef,
        command: &EntityCommand,
    ) -> Result<(), SceneGuardError> {
        let mut lights = self.lights();
        let light = lights
            .get_mut(entity)
            .ok_or_else(|| VirtualError::UnknownLight(entity.clone()))?;
        if !light.apply(command) {
            return Err(VirtualError::Unavailable(entity.clone()).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sceneguard_app::event_bus::InProcessNoticeBus;
    use sceneguard_domain::id::ResourceId;
    use sceneguard_domain::scene::TargetAction;

    use super::*;

    struct Prefix;

    impl EntityResolver for Prefix {
        fn resolve(&self, resource: &ResourceId) -> Option<EntityRef> {
            (resource.as_str() != "ghost")
                .then(|| EntityRef::new(format!("light.{resource}")).unwrap())
        }
    }

    fn entity(raw: &str) -> EntityRef {
        EntityRef::new(raw).unwrap()
    }

    fn evening() -> SceneDefinition {
        SceneDefinition::builder()
            .id(SceneId::new("evening").unwrap())
            .name("Evening")
            .action(TargetAction::switch(ResourceId::new("desk").unwrap(), true).with_brightness(40.0))
            .action(TargetAction::switch(ResourceId::new("sofa").unwrap(), false))
            .action(TargetAction::switch(ResourceId::new("ghost").unwrap(), true))
            .build()
            .unwrap()
    }

    fn hub() -> (VirtualHub<Arc<InProcessNoticeBus>>, Arc<InProcessNoticeBus>) {
        let bus = Arc::new(InProcessNoticeBus::new(16));
        (VirtualHub::new(Arc::clone(&bus)), bus)
    }

    #[test]
    fn should_create_lights_for_resolved_targets() {
        let (hub, _) = hub();
        assert_eq!(hub.install_scene(&evening(), &Prefix), 2);
        assert!(hub.light(&entity("light.desk")).is_some());
        assert!(hub.light(&entity("light.ghost")).is_none());
    }

    #[tokio::test]
    async fn should_apply_targets_and_publish_notice_on_recall() {
        let (hub, bus) = hub();
        hub.install_scene(&evening(), &Prefix);
        let mut rx = bus.subscribe();

        hub.recall(&SceneId::new("evening").unwrap()).await.unwrap();

        let desk = hub.light(&entity("light.desk")).unwrap();
        assert!(desk.on);
        assert_eq!(desk.brightness_pct, Some(40.0));
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.scene_id.as_str(), "evening");
        assert!(matches!(notice.marker, Marker::Recalled(Some(_))));
    }

    #[tokio::test]
    async fn should_leave_stuck_light_untouched_on_recall() {
        let (hub, _bus) = hub();
        hub.install_scene(&evening(), &Prefix);
        hub.set_faults(
            &entity("light.desk"),
            LightFaults {
                stuck: true,
                ..LightFaults::default()
            },
        )
        .unwrap();

        hub.activate_scene(&SceneId::new("evening").unwrap())
            .await
            .unwrap();

        assert!(!hub.light(&entity("light.desk")).unwrap().on);
    }

    #[tokio::test]
    async fn should_report_unknown_scene_as_not_found() {
        let (hub, _bus) = hub();
        let result = hub.activate_scene(&SceneId::new("nope").unwrap()).await;
        assert!(matches!(result, Err(SceneGuardError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_apply_direct_command() {
        let (hub, _bus) = hub();
        hub.add_light(entity("light.desk"), LightFaults::default());

        hub.set_entity_state(
            &entity("light.desk"),
            &EntityCommand::TurnOn {
                brightness_pct: Some(70.0),
                color_xy: None,
                color_mirek: None,
                effect: None,
            },
        )
        .await
        .unwrap();

        let state = hub.read_state(&entity("light.desk")).await.unwrap();
        assert_eq!(state.brightness_pct, Some(70.0));
    }

    #[tokio::test]
    async fn should_fail_command_on_unavailable_light() {
        let (hub, _bus) = hub();
        hub.add_light(entity("light.desk"), LightFaults::default());
        hub.set_unavailable(&entity("light.desk"), true).unwrap();

        let result = hub
            .set_entity_state(&entity("light.desk"), &EntityCommand::TurnOff)
            .await;

        assert!(matches!(result, Err(SceneGuardError::Collaborator(_))));
        assert!(hub.read_state(&entity("light.desk")).await.unwrap().unavailable);
    }

    #[tokio::test]
    async fn should_fail_reading_unknown_light() {
        let (hub, _bus) = hub();
        let result = hub.read_state(&entity("light.none")).await;
        assert!(matches!(result, Err(SceneGuardError::NotFound(_))));
    }
}
