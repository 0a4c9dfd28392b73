//! Entity registry index: external unique ids to local entity ids.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use sceneguard_domain::id::{EntityRef, ResourceId};

#[derive(Debug, Deserialize)]
pub(crate) struct RegistryFile {
    #[serde(default)]
    data: RegistryData,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryData {
    #[serde(default)]
    entities: Vec<RegistryRecord>,
}

#[derive(Debug, Deserialize)]
struct RegistryRecord {
    entity_id: Option<String>,
    unique_id: Option<String>,
    platform: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegistryEntry {
    pub entity: EntityRef,
    pub labels: BTreeSet<String>,
}

/// Registry entries of one platform, keyed by unique id.
#[derive(Debug, Default)]
pub(crate) struct RegistryIndex {
    by_unique_id: BTreeMap<String, RegistryEntry>,
}

impl RegistryIndex {
    pub(crate) fn from_file(file: RegistryFile, platform: &str) -> Self {
        let by_unique_id = file
            .data
            .entities
            .into_iter()
            .filter(|record| record.platform.as_deref() == Some(platform))
            .filter_map(|record| {
                let entity = EntityRef::new(record.entity_id?).ok()?;
                let unique_id = record.unique_id.filter(|id| !id.is_empty())?;
                Some((
                    unique_id,
                    RegistryEntry {
                        entity,
                        labels: record.labels.into_iter().collect(),
                    },
                ))
            })
            .collect();
        Self { by_unique_id }
    }

    pub(crate) fn len(&self) -> usize {
        self.by_unique_id.len()
    }

    pub(crate) fn entry(&self, unique_id: &str) -> Option<&RegistryEntry> {
        self.by_unique_id.get(unique_id)
    }

    /// Exact unique-id match first, then a unique id that ends with the
    /// resource id or embeds it after a `_` or `-` separator.
    pub(crate) fn resolve(&self, resource: &ResourceId) -> Option<EntityRef> {
        let rid = resource.as_str();
        if let Some(entry) = self.by_unique_id.get(rid) {
            return Some(entry.entity.clone());
        }
        let underscored = format!("_{rid}");
        let dashed = format!("-{rid}");
        self.by_unique_id
            .iter()
            .find(|(unique_id, _)| {
                unique_id.ends_with(rid)
                    || unique_id.contains(&underscored)
                    || unique_id.contains(&dashed)
            })
            .map(|(_, entry)| entry.entity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> RegistryIndex {
        let file: RegistryFile = serde_json::from_value(serde_json::json!({
            "data": {"entities": [
                {"entity_id": "light.desk", "unique_id": "aaaa-1111", "platform": "hue"},
                {"entity_id": "light.sofa", "unique_id": "bridge_bbbb-2222_light", "platform": "hue"},
                {"entity_id": "scene.evening", "unique_id": "scene-1", "platform": "hue", "labels": ["validate"]},
                {"entity_id": "light.zigbee", "unique_id": "cccc-3333", "platform": "zha"},
                {"entity_id": "light.broken", "platform": "hue"}
            ]}
        }))
        .unwrap();
        RegistryIndex::from_file(file, "hue")
    }

    fn rid(raw: &str) -> ResourceId {
        ResourceId::new(raw).unwrap()
    }

    #[test]
    fn should_keep_only_platform_entries_with_unique_id() {
        assert_eq!(index().len(), 3);
    }

    #[test]
    fn should_resolve_exact_unique_id() {
        assert_eq!(
            index().resolve(&rid("aaaa-1111")).unwrap().as_str(),
            "light.desk"
        );
    }

    #[test]
    fn should_resolve_embedded_resource_id() {
        assert_eq!(
            index().resolve(&rid("bbbb-2222")).unwrap().as_str(),
            "light.sofa"
        );
    }

    #[test]
    fn should_resolve_suffix_match() {
        assert_eq!(index().resolve(&rid("1111")).unwrap().as_str(), "light.desk");
    }

    #[test]
    fn should_not_resolve_other_platforms() {
        assert!(index().resolve(&rid("cccc-3333")).is_none());
    }

    #[test]
    fn should_expose_labels() {
        let idx = index();
        let entry = idx.entry("scene-1").unwrap();
        assert!(entry.labels.contains("validate"));
    }
}
