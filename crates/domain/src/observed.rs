//! Observed state: what a light reports right now.

use serde::{Deserialize, Serialize};

use crate::scene::ColorXy;

/// Effect name reported by lights that have no effect running.
pub const NO_EFFECT: &str = "no_effect";

/// A fresh reading of one entity. Never cached across escalation levels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservedState {
    pub on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness_pct: Option<f64>,
    /// Only reported while the light is in xy colour mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_xy: Option<ColorXy>,
    /// Only reported while the light is in colour-temperature mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_mirek: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(default)]
    pub unavailable: bool,
}

impl ObservedState {
    /// A reachable light that is switched off.
    #[must_use]
    pub fn off() -> Self {
        Self::default()
    }

    /// A light that cannot be reached.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Whether an effect is currently running.
    #[must_use]
    pub fn effect_active(&self) -> bool {
        is_effect_active(self.effect.as_deref())
    }
}

/// `None` and [`NO_EFFECT`] both mean no effect is running.
#[must_use]
pub fn is_effect_active(effect: Option<&str>) -> bool {
    effect.is_some_and(|name| name != NO_EFFECT)
}
