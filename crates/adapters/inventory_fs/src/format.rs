//! On-disk bridge inventory snapshot format.
//!
//! Only the fields needed to rebuild scene definitions are modelled;
//! everything else in the snapshot is ignored.

use std::collections::BTreeSet;

use serde::Deserialize;

use sceneguard_domain::id::{ResourceId, SceneId};
use sceneguard_domain::scene::{ColorXy, SceneDefinition, SceneKind, TargetAction};

const SMART_SCENE_TYPE: &str = "smart_scene";

#[derive(Debug, Deserialize)]
pub(crate) struct InventorySnapshot {
    #[serde(default)]
    pub bridge_info: Option<BridgeInfo>,
    #[serde(default)]
    pub resources: Resources,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BridgeInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub config: Option<BridgeConfig>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BridgeConfig {
    #[serde(default)]
    pub name: Option<String>,
}

impl InventorySnapshot {
    /// Bridge name for log context, if the snapshot carries one.
    pub(crate) fn bridge_name(&self) -> Option<&str> {
        let info = self.bridge_info.as_ref()?;
        info.config
            .as_ref()
            .and_then(|config| config.name.as_deref())
            .or(info.name.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Resources {
    #[serde(default)]
    pub scenes: ResourceList,
}

/// Items stay raw JSON so a malformed scene only costs itself.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResourceList {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawScene {
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub actions: Vec<RawAction>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Metadata {
    #[serde(default)]
    pub name: Option<String>,
}

/// Older snapshots serialised actions as opaque strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawAction {
    Structured(StructuredAction),
    Legacy(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct StructuredAction {
    pub target: Target,
    #[serde(default)]
    pub action: ActionBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Target {
    pub rid: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ActionBody {
    pub on: Option<OnState>,
    pub dimming: Option<Dimming>,
    pub color: Option<Color>,
    pub color_temperature: Option<ColorTemperature>,
    pub effects: Option<Effects>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OnState {
    pub on: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Dimming {
    pub brightness: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Color {
    pub xy: ColorXy,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ColorTemperature {
    pub mirek: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Effects {
    pub effect: Option<String>,
}

/// Why a raw scene could not be turned into a definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ConversionError {
    #[error("malformed scene: {0}")]
    Malformed(String),
    #[error("scene id is blank")]
    BlankId,
    #[error("legacy string actions are not supported")]
    LegacyActions,
    #[error("action target {0:?} is blank")]
    BlankTarget(String),
}

impl RawScene {
    /// Decode one scene item of a snapshot.
    pub(crate) fn from_item(item: serde_json::Value) -> Result<Self, ConversionError> {
        serde_json::from_value(item).map_err(|err| ConversionError::Malformed(err.to_string()))
    }

    /// Build a [`SceneDefinition`]; range checks happen later in the
    /// validator so that every rejection is logged the same way.
    pub(crate) fn into_definition(
        self,
        labels: BTreeSet<String>,
    ) -> Result<SceneDefinition, ConversionError> {
        let id = SceneId::new(self.id).map_err(|_| ConversionError::BlankId)?;
        let kind = match self.kind.as_deref() {
            Some(SMART_SCENE_TYPE) => SceneKind::Transition,
            _ => SceneKind::Recall,
        };
        let actions = self
            .actions
            .into_iter()
            .map(|raw| match raw {
                RawAction::Structured(action) => action.into_target(),
                RawAction::Legacy(_) => Err(ConversionError::LegacyActions),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SceneDefinition {
            name: self.metadata.name.unwrap_or_else(|| id.to_string()),
            id,
            kind,
            labels,
            actions,
        })
    }
}

impl StructuredAction {
    fn into_target(self) -> Result<TargetAction, ConversionError> {
        let target = ResourceId::new(self.target.rid.clone())
            .map_err(|_| ConversionError::BlankTarget(self.target.rid))?;
        let body = self.action;
        // An absent power field means the entity is expected off.
        let on = body.on.is_some_and(|state| state.on);
        Ok(TargetAction {
            target,
            on,
            brightness_pct: body.dimming.map(|dimming| dimming.brightness),
            color_xy: body.color.map(|color| color.xy),
            color_mirek: body.color_temperature.and_then(|ct| ct.mirek),
            effect: body.effects.and_then(|effects| effects.effect),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(value: serde_json::Value) -> RawScene {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn should_convert_structured_actions() {
        let scene = raw(serde_json::json!({
            "id": "scene-1",
            "type": "scene",
            "metadata": {"name": "Evening"},
            "actions": [{
                "target": {"rid": "light-1", "rtype": "light"},
                "action": {
                    "on": {"on": true},
                    "dimming": {"brightness": 42.5},
                    "color": {"xy": {"x": 0.45, "y": 0.41}},
                    "effects": {"effect": "candle"}
                }
            }]
        }))
        .into_definition(BTreeSet::from(["validate".to_string()]))
        .unwrap();

        assert_eq!(scene.name, "Evening");
        assert_eq!(scene.kind, SceneKind::Recall);
        assert!(scene.has_label("validate"));
        let action = &scene.actions[0];
        assert_eq!(action.target.as_str(), "light-1");
        assert!(action.on);
        assert_eq!(action.brightness_pct, Some(42.5));
        assert_eq!(action.color_xy, Some(ColorXy::new(0.45, 0.41)));
        assert_eq!(action.color_mirek, None);
        assert_eq!(action.effect.as_deref(), Some("candle"));
    }

    #[test]
    fn should_treat_missing_power_as_off() {
        let scene = raw(serde_json::json!({
            "id": "scene-1",
            "actions": [{"target": {"rid": "light-1"}, "action": {"dimming": {"brightness": 10}}}]
        }))
        .into_definition(BTreeSet::new())
        .unwrap();
        assert!(!scene.actions[0].on);
    }

    #[test]
    fn should_map_smart_scene_to_transition() {
        let scene = raw(serde_json::json!({"id": "s", "type": "smart_scene"}))
            .into_definition(BTreeSet::new())
            .unwrap();
        assert_eq!(scene.kind, SceneKind::Transition);
        assert_eq!(scene.name, "s");
    }

    #[test]
    fn should_reject_legacy_string_actions() {
        let result = raw(serde_json::json!({"id": "s", "actions": ["on:light-1"]}))
            .into_definition(BTreeSet::new());
        assert_eq!(result, Err(ConversionError::LegacyActions));
    }

    #[test]
    fn should_report_malformed_item() {
        let result = RawScene::from_item(serde_json::json!({
            "id": "s",
            "actions": [{"action": {"dimming": {}}}]
        }));
        assert!(matches!(result, Err(ConversionError::Malformed(_))));
    }

    #[test]
    fn should_read_bridge_name_from_config_first() {
        let snapshot: InventorySnapshot = serde_json::from_value(serde_json::json!({
            "bridge_info": {"name": "outer", "config": {"name": "Living room bridge"}}
        }))
        .unwrap();
        assert_eq!(snapshot.bridge_name(), Some("Living room bridge"));
    }
}
