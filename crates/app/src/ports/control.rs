//! Driving port: what the outside world (HTTP) can ask of the validator.

use std::collections::BTreeMap;
use std::future::Future;

use serde::Serialize;

use sceneguard_domain::circuit_breaker::CircuitSnapshot;
use sceneguard_domain::error::SceneGuardError;
use sceneguard_domain::id::SceneId;
use sceneguard_domain::stats::Statistics;
use sceneguard_domain::status::SceneRunStatus;

/// Point-in-time view of the validator.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatorStatus {
    pub scenes_loaded: usize,
    pub circuit_breaker: CircuitSnapshot,
    pub runs: BTreeMap<SceneId, SceneRunStatus>,
    pub statistics: Statistics,
}

pub trait ValidatorControl {
    fn status(&self) -> ValidatorStatus;

    fn statistics(&self) -> Statistics;

    /// Reload scene definitions; returns how many were loaded.
    fn reload_inventory(&self) -> impl Future<Output = Result<usize, SceneGuardError>> + Send;
}

impl<T: ValidatorControl + Send + Sync> ValidatorControl for std::sync::Arc<T> {
    fn status(&self) -> ValidatorStatus {
        (**self).status()
    }

    fn statistics(&self) -> Statistics {
        (**self).statistics()
    }

    fn reload_inventory(&self) -> impl Future<Output = Result<usize, SceneGuardError>> + Send {
        (**self).reload_inventory()
    }
}
