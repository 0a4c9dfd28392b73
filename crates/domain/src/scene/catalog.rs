//! Immutable snapshot of the loaded scene definitions.

use std::collections::HashMap;
use std::sync::Arc;

use crate::id::SceneId;

use super::SceneDefinition;

/// Scene definitions keyed by id.
///
/// A reload builds a fresh catalog and swaps it in whole; runs already in
/// flight keep the `Arc<SceneDefinition>` they started with.
#[derive(Debug, Clone, Default)]
pub struct SceneCatalog {
    scenes: HashMap<SceneId, Arc<SceneDefinition>>,
}

impl SceneCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, replacing any previous one with the same id.
    pub fn insert(&mut self, scene: SceneDefinition) {
        self.scenes.insert(scene.id.clone(), Arc::new(scene));
    }

    #[must_use]
    pub fn get(&self, id: &SceneId) -> Option<Arc<SceneDefinition>> {
        self.scenes.get(id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SceneDefinition>> {
        self.scenes.values()
    }
}

impl FromIterator<SceneDefinition> for SceneCatalog {
    fn from_iter<T: IntoIterator<Item = SceneDefinition>>(iter: T) -> Self {
        let mut catalog = Self::new();
        for scene in iter {
            catalog.insert(scene);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(id: &str, name: &str) -> SceneDefinition {
        SceneDefinition::builder()
            .id(SceneId::new(id).unwrap())
            .name(name)
            .build()
            .unwrap()
    }

    #[test]
    fn should_start_empty() {
        let catalog = SceneCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
    }

    #[test]
    fn should_replace_scene_with_same_id() {
        let catalog: SceneCatalog = [scene("s1", "First"), scene("s1", "Second")]
            .into_iter()
            .collect();

        assert_eq!(catalog.len(), 1);
        let found = catalog.get(&SceneId::new("s1").unwrap()).unwrap();
        assert_eq!(found.name, "Second");
    }

    #[test]
    fn should_return_none_for_unknown_scene() {
        let catalog: SceneCatalog = std::iter::once(scene("s1", "First")).collect();
        assert!(catalog.get(&SceneId::new("s2").unwrap()).is_none());
    }
}
