//! Activation detection and debouncing.
//!
//! Every change notification for a scene passes through the
//! [`ActivationDetector`], which decides whether it is a genuine
//! (re)activation and suppresses repeats inside the debounce window.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::id::SceneId;
use crate::time::{Timestamp, elapsed};

/// Reported activity of a transition-style scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[serde(alias = "static", alias = "dynamic_palette")]
    Active,
    Inactive,
}

/// The activation signal carried by a scene notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Marker {
    /// "Last recalled" timestamp of a recall-style scene; `None` if never recalled.
    Recalled(Option<Timestamp>),
    /// Current status of a transition-style scene.
    Status(ActivityStatus),
}

impl Marker {
    fn same_kind(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Recalled(_), Self::Recalled(_)) | (Self::Status(_), Self::Status(_))
        )
    }
}

/// A change notification for one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationNotice {
    pub scene_id: SceneId,
    pub marker: Marker,
}

impl ActivationNotice {
    #[must_use]
    pub fn new(scene_id: SceneId, marker: Marker) -> Self {
        Self { scene_id, marker }
    }
}

/// Per-scene detection memory. Created on first observation, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivationRecord {
    pub previous_marker: Option<Marker>,
    pub last_validated_at: Option<Timestamp>,
}

/// Result of observing one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// The marker did not indicate a new activation.
    NotAnActivation,
    /// A genuine activation arrived too soon after the last validated one.
    Debounced { elapsed: Duration },
    /// A genuine activation that should be validated.
    Activated,
}

fn is_activation(previous: Option<&Marker>, current: &Marker) -> bool {
    let previous = previous.filter(|prev| prev.same_kind(current));
    match current {
        Marker::Recalled(None) => false,
        Marker::Recalled(Some(_)) => previous != Some(current),
        Marker::Status(ActivityStatus::Inactive) => false,
        Marker::Status(ActivityStatus::Active) => {
            previous != Some(&Marker::Status(ActivityStatus::Active))
        }
    }
}

/// Detects scene (re)activations and applies the debounce window.
#[derive(Debug)]
pub struct ActivationDetector {
    records: HashMap<SceneId, ActivationRecord>,
    debounce_window: Duration,
}

impl ActivationDetector {
    #[must_use]
    pub fn new(debounce_window: Duration) -> Self {
        Self {
            records: HashMap::new(),
            debounce_window,
        }
    }

    /// Seed the previous marker from a startup snapshot without producing an
    /// activation, so already-active scenes are not validated on boot.
    pub fn prime(&mut self, scene_id: SceneId, marker: Marker) {
        self.records.entry(scene_id).or_default().previous_marker = Some(marker);
    }

    /// Observe one notification at `now`.
    ///
    /// The previous marker is always updated. `last_validated_at` is only
    /// moved forward when the result is [`Detection::Activated`].
    pub fn observe(&mut self, notice: &ActivationNotice, now: Timestamp) -> Detection {
        let record = self.records.entry(notice.scene_id.clone()).or_default();
        let activated = is_activation(record.previous_marker.as_ref(), &notice.marker);
        record.previous_marker = Some(notice.marker);

        if !activated {
            return Detection::NotAnActivation;
        }
        if let Some(last) = record.last_validated_at {
            let since = elapsed(now, last);
            if since < self.debounce_window {
                return Detection::Debounced { elapsed: since };
            }
        }
        record.last_validated_at = Some(now);
        Detection::Activated
    }

    #[must_use]
    pub fn record(&self, scene_id: &SceneId) -> Option<&ActivationRecord> {
        self.records.get(scene_id)
    }
}
