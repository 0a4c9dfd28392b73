//! Results of a validation run.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::comparator::Mismatch;
use crate::id::{EntityRef, ResourceId, RunId, SceneId};
use crate::time::Timestamp;

/// Escalation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Compare observed states against the definition.
    Validate = 1,
    /// Re-activate the whole scene and compare again.
    Retrigger = 2,
    /// Drive every entity individually and compare a final time.
    Individual = 3,
}

impl Level {
    #[must_use]
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

/// One reason a level did not succeed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    Mismatch { entity: EntityRef, mismatch: Mismatch },
    ReadFailed { entity: EntityRef, reason: String },
    ActionFailed { subject: String, reason: String },
    SceneMissing { scene_id: SceneId },
    EmptyScene { scene_id: SceneId },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch { entity, mismatch } => write!(f, "{entity}: {mismatch}"),
            Self::ReadFailed { entity, reason } => write!(f, "{entity}: read failed: {reason}"),
            Self::ActionFailed { subject, reason } => {
                write!(f, "{subject}: action failed: {reason}")
            }
            Self::SceneMissing { scene_id } => write!(f, "scene {scene_id} not found"),
            Self::EmptyScene { scene_id } => write!(f, "scene {scene_id} has no target actions"),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Level 1 found every entity within tolerance.
    Success,
    RecoveredLevel2,
    RecoveredLevel3,
    /// Level 3 could not bring the scene into tolerance.
    Critical,
    /// Ended before escalation: missing or empty definition.
    Aborted,
}

impl OutcomeKind {
    #[must_use]
    pub fn level_reached(self) -> Level {
        match self {
            Self::Success | Self::Aborted => Level::Validate,
            Self::RecoveredLevel2 => Level::Retrigger,
            Self::RecoveredLevel3 | Self::Critical => Level::Individual,
        }
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(
            self,
            Self::Success | Self::RecoveredLevel2 | Self::RecoveredLevel3
        )
    }
}

/// Final record of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub run_id: RunId,
    pub scene_id: SceneId,
    pub kind: OutcomeKind,
    pub level_reached: Level,
    pub success: bool,
    /// Failures of the last level that ran.
    pub failures: Vec<Failure>,
    /// Targets that could not be resolved to a local entity.
    pub skipped: Vec<ResourceId>,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

impl ValidationOutcome {
    /// Build the outcome; `level_reached` and `success` follow from `kind`.
    #[must_use]
    pub fn new(
        run_id: RunId,
        scene_id: SceneId,
        kind: OutcomeKind,
        started_at: Timestamp,
        finished_at: Timestamp,
    ) -> Self {
        Self {
            run_id,
            scene_id,
            kind,
            level_reached: kind.level_reached(),
            success: kind.is_success(),
            failures: Vec::new(),
            skipped: Vec::new(),
            started_at,
            finished_at,
        }
    }

    #[must_use]
    pub fn with_failures(mut self, failures: Vec<Failure>) -> Self {
        self.failures = failures;
        self
    }

    #[must_use]
    pub fn with_skipped(mut self, skipped: Vec<ResourceId>) -> Self {
        self.skipped = skipped;
        self
    }

    /// Failures rendered as human-readable strings.
    #[must_use]
    pub fn failure_messages(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }
}
