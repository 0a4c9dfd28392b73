//! Typed validator configuration.
//!
//! Parsed once at start-up and then shared read-only. Durations are written
//! in seconds (fractions allowed) and carry a `_secs` suffix on the wire.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use sceneguard_domain::circuit_breaker::CircuitBreakerConfig;
use sceneguard_domain::comparator::Tolerances;
use sceneguard_domain::error::ValidationError;
use sceneguard_domain::filter::{FilterConfig, SceneFilter};
use sceneguard_domain::rate_limit::RateLimitConfig;
use sceneguard_domain::time::secs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Wait after an activation before the first comparison.
    #[serde(rename = "transition_delay_secs", with = "secs")]
    pub transition_delay: Duration,
    /// Wait after a re-trigger before comparing again.
    #[serde(rename = "validation_delay_secs", with = "secs")]
    pub validation_delay: Duration,
    /// Wait after the last individual command before the final comparison.
    #[serde(rename = "settle_delay_secs", with = "secs")]
    pub settle_delay: Duration,
    /// Pause between consecutive individual commands.
    #[serde(rename = "stagger_delay_secs", with = "secs")]
    pub stagger_delay: Duration,
    #[serde(rename = "debounce_window_secs", with = "secs")]
    pub debounce_window: Duration,
    /// Applied to `validation_delay` at level 2 when level 1 only failed on
    /// colour temperature.
    pub level2_color_temp_multiplier: f64,
    /// Applied to `validation_delay` before level 3 when both earlier
    /// levels only failed on colour temperature.
    pub level3_color_temp_multiplier: f64,
    pub tolerances: Tolerances,
    pub rate_limit: RateLimitConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub filter: FilterConfig,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            transition_delay: Duration::from_secs(5),
            validation_delay: Duration::from_secs(2),
            settle_delay: Duration::from_secs(2),
            stagger_delay: Duration::from_millis(100),
            debounce_window: Duration::from_secs(30),
            level2_color_temp_multiplier: 2.0,
            level3_color_temp_multiplier: 3.0,
            tolerances: Tolerances::default(),
            rate_limit: RateLimitConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

fn out_of_bounds(field: &'static str, expected: &'static str) -> ValidationError {
    ValidationError::OutOfBounds { field, expected }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl ValidatorConfig {
    /// A configuration with every wait set to zero, for tests.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            transition_delay: Duration::ZERO,
            validation_delay: Duration::ZERO,
            settle_delay: Duration::ZERO,
            stagger_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Check bounds and compile the filter patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfBounds`] for a negative tolerance, a
    /// zero limit, threshold or window, or a multiplier below 1, and
    /// [`ValidationError::InvalidPattern`] for a pattern that does not compile.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let tol = &self.tolerances;
        if !non_negative(tol.brightness_pct) {
            return Err(out_of_bounds("tolerances.brightness_pct", "non-negative"));
        }
        if !non_negative(tol.color_xy) {
            return Err(out_of_bounds("tolerances.color_xy", "non-negative"));
        }
        if !non_negative(tol.color_mirek) {
            return Err(out_of_bounds("tolerances.color_mirek", "non-negative"));
        }
        if self.rate_limit.window.is_zero() {
            return Err(out_of_bounds("rate_limit.window_secs", "greater than zero"));
        }
        if self.rate_limit.per_scene == 0 {
            return Err(out_of_bounds("rate_limit.per_scene", "at least 1"));
        }
        if self.rate_limit.global == 0 {
            return Err(out_of_bounds("rate_limit.global", "at least 1"));
        }
        if self.circuit_breaker.failure_threshold == 0 {
            return Err(out_of_bounds("circuit_breaker.failure_threshold", "at least 1"));
        }
        if self.circuit_breaker.success_threshold == 0 {
            return Err(out_of_bounds("circuit_breaker.success_threshold", "at least 1"));
        }
        if !(self.level2_color_temp_multiplier.is_finite() && self.level2_color_temp_multiplier >= 1.0) {
            return Err(out_of_bounds("level2_color_temp_multiplier", "at least 1"));
        }
        if !(self.level3_color_temp_multiplier.is_finite() && self.level3_color_temp_multiplier >= 1.0) {
            return Err(out_of_bounds("level3_color_temp_multiplier", "at least 1"));
        }
        SceneFilter::new(&self.filter)?;
        Ok(())
    }
}
