//! Runtime state of each scene, as reported by the status endpoint.

use serde::Serialize;

use crate::id::RunId;
use crate::time::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    #[default]
    Idle,
    Validating,
    Retrying,
    Fallback,
    Success,
    Failed,
}

impl ValidationState {
    /// Whether a run is currently in progress.
    #[must_use]
    pub fn is_running(self) -> bool {
        matches!(self, Self::Validating | Self::Retrying | Self::Fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneRunStatus {
    pub state: ValidationState,
    pub run_id: Option<RunId>,
    pub updated_at: Timestamp,
}
