//! Time and timestamp helpers.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// UTC timestamp used for activation markers, rate windows, and outcomes.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Time elapsed between `earlier` and `now`.
///
/// Notifications may arrive out of order, so a negative span saturates to
/// zero instead of failing.
#[must_use]
pub fn elapsed(now: Timestamp, earlier: Timestamp) -> Duration {
    (now - earlier).to_std().unwrap_or(Duration::ZERO)
}

/// Serde helper storing a [`Duration`] as (possibly fractional) seconds.
pub mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    /// Serialize a duration as floating-point seconds.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    /// Deserialize a duration from non-negative seconds.
    ///
    /// # Errors
    ///
    /// Fails on negative, infinite, or NaN values.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_measure_elapsed_time() {
        let start = now();
        let later = start + chrono::TimeDelta::seconds(12);
        assert_eq!(elapsed(later, start), Duration::from_secs(12));
    }

    #[test]
    fn should_saturate_to_zero_when_earlier_is_in_the_future() {
        let start = now();
        let earlier = start - chrono::TimeDelta::seconds(5);
        assert_eq!(elapsed(earlier, start), Duration::ZERO);
    }

    #[derive(serde::Deserialize)]
    struct Holder {
        #[serde(with = "secs")]
        delay: Duration,
    }

    #[test]
    fn should_deserialize_fractional_seconds() {
        let holder: Holder = serde_json::from_str(r#"{"delay": 0.25}"#).unwrap();
        assert_eq!(holder.delay, Duration::from_millis(250));
    }

    #[test]
    fn should_reject_negative_seconds() {
        let result: Result<Holder, _> = serde_json::from_str(r#"{"delay": -1}"#);
        assert!(result.is_err());
    }
}
