//! Direct per-entity commands derived from a target action.

use serde::{Deserialize, Serialize};

use super::{ColorXy, TargetAction};

/// Lowest brightness sent with a turn-on command. A target of 0 % while on
/// would otherwise be interpreted by most lights as "off".
pub const MIN_ON_BRIGHTNESS_PCT: f64 = 1.0;

/// A command that drives one entity straight to its target state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum EntityCommand {
    TurnOff,
    TurnOn {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        brightness_pct: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color_xy: Option<ColorXy>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color_mirek: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        effect: Option<String>,
    },
}

impl From<&TargetAction> for EntityCommand {
    fn from(action: &TargetAction) -> Self {
        if !action.on {
            return Self::TurnOff;
        }
        Self::TurnOn {
            brightness_pct: action
                .brightness_pct
                .map(|pct| pct.max(MIN_ON_BRIGHTNESS_PCT)),
            color_xy: action.color_xy,
            color_mirek: action.color_mirek,
            effect: action.effect.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ResourceId;

    fn rid() -> ResourceId {
        ResourceId::new("r1").unwrap()
    }

    #[test]
    fn should_turn_off_when_target_is_off() {
        let action = TargetAction::switch(rid(), false).with_brightness(80.0);
        assert_eq!(EntityCommand::from(&action), EntityCommand::TurnOff);
    }

    #[test]
    fn should_carry_every_dimension_when_target_is_on() {
        let action = TargetAction::switch(rid(), true)
            .with_brightness(40.0)
            .with_color_xy(0.3, 0.4)
            .with_effect("candle");
        assert_eq!(
            EntityCommand::from(&action),
            EntityCommand::TurnOn {
                brightness_pct: Some(40.0),
                color_xy: Some(ColorXy::new(0.3, 0.4)),
                color_mirek: None,
                effect: Some("candle".to_string()),
            }
        );
    }

    #[test]
    fn should_raise_zero_brightness_to_minimum_when_on() {
        let action = TargetAction::switch(rid(), true).with_brightness(0.0);
        let EntityCommand::TurnOn { brightness_pct, .. } = EntityCommand::from(&action) else {
            panic!("expected turn on");
        };
        assert_eq!(brightness_pct, Some(MIN_ON_BRIGHTNESS_PCT));
    }

    #[test]
    fn should_serialize_with_service_tag() {
        let json = serde_json::to_value(EntityCommand::TurnOff).unwrap();
        assert_eq!(json, serde_json::json!({"service": "turn_off"}));
    }
}
