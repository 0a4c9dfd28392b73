//! Tolerance-based comparison of a target action against an observed state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::observed::{ObservedState, is_effect_active};
use crate::scene::{ColorXy, TargetAction};

/// Acceptable deviation per dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Percentage points.
    pub brightness_pct: f64,
    /// Absolute difference per xy axis.
    pub color_xy: f64,
    /// Mirek.
    pub color_mirek: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            brightness_pct: 5.0,
            color_xy: 0.01,
            color_mirek: 50.0,
        }
    }
}

/// The dimension a [`Mismatch`] was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Availability,
    Power,
    Brightness,
    ColorXy,
    ColorTemperature,
    Effect,
}

/// One out-of-tolerance dimension of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dimension", rename_all = "snake_case")]
pub enum Mismatch {
    Unavailable,
    Power { actual: bool, expected: bool },
    Brightness { actual: f64, expected: f64 },
    ColorXy { actual: ColorXy, expected: ColorXy },
    ColorTemperature { actual: f64, expected: f64 },
    Effect { actual: bool, expected: bool },
}

impl Mismatch {
    #[must_use]
    pub fn dimension(&self) -> Dimension {
        match self {
            Self::Unavailable => Dimension::Availability,
            Self::Power { .. } => Dimension::Power,
            Self::Brightness { .. } => Dimension::Brightness,
            Self::ColorXy { .. } => Dimension::ColorXy,
            Self::ColorTemperature { .. } => Dimension::ColorTemperature,
            Self::Effect { .. } => Dimension::Effect,
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn power(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

fn effect(active: bool) -> &'static str {
    if active { "active" } else { "none" }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("unavailable"),
            Self::Power { actual, expected } => {
                write!(f, "state {} != {}", power(*actual), power(*expected))
            }
            Self::Brightness { actual, expected } => write!(
                f,
                "brightness {} != {} (Δ{})",
                round1(*actual),
                round1(*expected),
                round1((actual - expected).abs())
            ),
            Self::ColorXy { actual, expected } => write!(
                f,
                "xy ({:.3}, {:.3}) != ({:.3}, {:.3})",
                actual.x, actual.y, expected.x, expected.y
            ),
            Self::ColorTemperature { actual, expected } => write!(
                f,
                "color_temp {} != {} (Δ{})",
                round1(*actual),
                round1(*expected),
                round1((actual - expected).abs())
            ),
            Self::Effect { actual, expected } => {
                write!(f, "effect {} != {}", effect(*actual), effect(*expected))
            }
        }
    }
}

/// Compare one target action against one observed state.
///
/// An unreachable light yields a single [`Mismatch::Unavailable`]. A power
/// mismatch yields a single [`Mismatch::Power`] and nothing else is compared;
/// neither is anything when the target is off. Otherwise every present
/// target dimension is checked independently and all failures are returned.
#[must_use]
pub fn compare(target: &TargetAction, observed: &ObservedState, tol: &Tolerances) -> Vec<Mismatch> {
    if observed.unavailable {
        return vec![Mismatch::Unavailable];
    }
    if target.on != observed.on {
        return vec![Mismatch::Power {
            actual: observed.on,
            expected: target.on,
        }];
    }
    if !target.on {
        return Vec::new();
    }

    let mut mismatches = Vec::new();

    if let Some(expected) = target.brightness_pct {
        let actual = observed.brightness_pct.unwrap_or(0.0);
        if (actual - expected).abs() > tol.brightness_pct {
            mismatches.push(Mismatch::Brightness { actual, expected });
        }
    }

    if let (Some(expected), Some(actual)) = (target.color_xy, observed.color_xy)
        && ((actual.x - expected.x).abs() > tol.color_xy
            || (actual.y - expected.y).abs() > tol.color_xy)
    {
        mismatches.push(Mismatch::ColorXy { actual, expected });
    }

    if let (Some(expected), Some(actual)) = (target.color_mirek, observed.color_mirek)
        && (actual - expected).abs() > tol.color_mirek
    {
        mismatches.push(Mismatch::ColorTemperature { actual, expected });
    }

    if target.effect.is_some() {
        let expected = is_effect_active(target.effect.as_deref());
        let actual = observed.effect_active();
        if actual != expected {
            mismatches.push(Mismatch::Effect { actual, expected });
        }
    }

    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ResourceId;

    fn target() -> TargetAction {
        TargetAction::switch(ResourceId::new("r1").unwrap(), true)
    }

    fn lit(brightness: f64) -> ObservedState {
        ObservedState {
            on: true,
            brightness_pct: Some(brightness),
            ..ObservedState::default()
        }
    }

    #[test]
    fn should_pass_when_within_tolerance() {
        let result = compare(&target().with_brightness(50.0), &lit(53.0), &Tolerances::default());
        assert!(result.is_empty());
    }

    #[test]
    fn should_report_brightness_with_delta() {
        let result = compare(&target().with_brightness(50.0), &lit(20.0), &Tolerances::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].to_string(), "brightness 20 != 50 (Δ30)");
    }

    #[test]
    fn should_round_brightness_to_one_decimal() {
        let result = compare(&target().with_brightness(50.0), &lit(20.44), &Tolerances::default());
        assert_eq!(result[0].to_string(), "brightness 20.4 != 50 (Δ29.6)");
    }

    #[test]
    fn should_treat_missing_brightness_as_zero() {
        let observed = ObservedState {
            on: true,
            ..ObservedState::default()
        };
        let result = compare(&target().with_brightness(30.0), &observed, &Tolerances::default());
        assert_eq!(
            result,
            vec![Mismatch::Brightness {
                actual: 0.0,
                expected: 30.0
            }]
        );
    }

    #[test]
    fn should_report_only_power_when_on_off_differs() {
        let action = target().with_brightness(80.0).with_color_mirek(300.0);
        let result = compare(&action, &ObservedState::off(), &Tolerances::default());
        assert_eq!(
            result,
            vec![Mismatch::Power {
                actual: false,
                expected: true
            }]
        );
        assert_eq!(result[0].to_string(), "state off != on");
    }

    #[test]
    fn should_report_unavailable_before_power() {
        let result = compare(&target(), &ObservedState::unavailable(), &Tolerances::default());
        assert_eq!(result, vec![Mismatch::Unavailable]);
    }

    #[test]
    fn should_ignore_other_dimensions_when_target_is_off() {
        let action = TargetAction::switch(ResourceId::new("r1").unwrap(), false).with_brightness(90.0);
        let result = compare(&action, &ObservedState::off(), &Tolerances::default());
        assert!(result.is_empty());
    }

    #[test]
    fn should_require_both_xy_axes_within_tolerance() {
        let action = target().with_color_xy(0.30, 0.40);
        let observed = ObservedState {
            on: true,
            color_xy: Some(ColorXy::new(0.305, 0.42)),
            ..ObservedState::default()
        };
        let result = compare(&action, &observed, &Tolerances::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].dimension(), Dimension::ColorXy);
    }

    #[test]
    fn should_skip_color_temperature_when_light_reports_xy_mode() {
        let action = target().with_color_mirek(300.0);
        let observed = ObservedState {
            on: true,
            color_xy: Some(ColorXy::new(0.3, 0.3)),
            ..ObservedState::default()
        };
        assert!(compare(&action, &observed, &Tolerances::default()).is_empty());
    }

    #[test]
    fn should_report_every_failing_dimension() {
        let action = target().with_brightness(50.0).with_color_mirek(300.0);
        let observed = ObservedState {
            on: true,
            brightness_pct: Some(10.0),
            color_mirek: Some(450.0),
            ..ObservedState::default()
        };
        let result = compare(&action, &observed, &Tolerances::default());
        let dims: Vec<_> = result.iter().map(Mismatch::dimension).collect();
        assert_eq!(dims, vec![Dimension::Brightness, Dimension::ColorTemperature]);
        assert_eq!(result[1].to_string(), "color_temp 450 != 300 (Δ150)");
    }

    #[test]
    fn should_compare_effects_by_presence_only() {
        let action = target().with_effect("candle");
        let observed = ObservedState {
            on: true,
            effect: Some("fire".to_string()),
            ..ObservedState::default()
        };
        assert!(compare(&action, &observed, &Tolerances::default()).is_empty());

        let idle = ObservedState {
            on: true,
            effect: Some("no_effect".to_string()),
            ..ObservedState::default()
        };
        let result = compare(&action, &idle, &Tolerances::default());
        assert_eq!(result[0].to_string(), "effect none != active");
    }
}
