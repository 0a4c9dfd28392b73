//! Scene validator: admission gates and run bookkeeping.
//!
//! Every notice passes the gates in a fixed order: activation detector,
//! scene filter, rate limiter, circuit breaker. An admitted notice starts
//! one validation run on its own task; the escalation itself lives in
//! [`escalation`].

mod escalation;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::Instrument;

use sceneguard_domain::activation::{ActivationDetector, ActivationNotice, Detection};
use sceneguard_domain::circuit_breaker::{CircuitBreaker, CircuitRejected};
use sceneguard_domain::error::{SceneGuardError, ValidationError};
use sceneguard_domain::filter::{FilterDecision, SceneFilter, SkipReason};
use sceneguard_domain::id::{RunId, SceneId};
use sceneguard_domain::outcome::ValidationOutcome;
use sceneguard_domain::rate_limit::{RateLimited, RateLimiter};
use sceneguard_domain::scene::SceneCatalog;
use sceneguard_domain::stats::Statistics;
use sceneguard_domain::status::{SceneRunStatus, ValidationState};

use crate::config::ValidatorConfig;
use crate::ports::{
    ActionInvoker, Clock, EntityResolver, Notifier, SceneInventory, StateReader,
    ValidatorControl, ValidatorStatus,
};

/// The adapters a [`SceneValidator`] talks to.
#[derive(Debug, Clone)]
pub struct Collaborators<I, E, S, A, N, C> {
    pub inventory: I,
    pub resolver: E,
    pub reader: S,
    pub invoker: A,
    pub notifier: N,
    pub clock: C,
}

/// What happened to one notice at the gates.
#[derive(Debug)]
pub enum Admission {
    NotAnActivation,
    Debounced { elapsed: Duration },
    Skipped(SkipReason),
    RateLimited(RateLimited),
    CircuitOpen(CircuitRejected),
    Started {
        run_id: RunId,
        handle: JoinHandle<ValidationOutcome>,
    },
}

/// Mutable gate state, always updated under one lock.
#[derive(Debug)]
struct Gates {
    detector: ActivationDetector,
    limiter: RateLimiter,
    breaker: CircuitBreaker,
}

struct Inner<I, E, S, A, N, C> {
    config: ValidatorConfig,
    filter: SceneFilter,
    ports: Collaborators<I, E, S, A, N, C>,
    catalog: RwLock<Arc<SceneCatalog>>,
    gates: Mutex<Gates>,
    stats: Mutex<Statistics>,
    runs: Mutex<HashMap<SceneId, SceneRunStatus>>,
}

/// Owns all shared validation state and drives runs.
///
/// Cloning is cheap; clones share the same state.
pub struct SceneValidator<I, E, S, A, N, C> {
    inner: Arc<Inner<I, E, S, A, N, C>>,
}

impl<I, E, S, A, N, C> Clone for SceneValidator<I, E, S, A, N, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I, E, S, A, N, C> SceneValidator<I, E, S, A, N, C>
where
    I: SceneInventory + Send + Sync + 'static,
    E: EntityResolver + Send + Sync + 'static,
    S: StateReader + Send + Sync + 'static,
    A: ActionInvoker + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Create a validator with an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when `config` is out of bounds or a
    /// filter pattern does not compile.
    pub fn new(
        config: ValidatorConfig,
        ports: Collaborators<I, E, S, A, N, C>,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        let filter = SceneFilter::new(&config.filter)?;
        let gates = Gates {
            detector: ActivationDetector::new(config.debounce_window),
            limiter: RateLimiter::new(config.rate_limit),
            breaker: CircuitBreaker::new(config.circuit_breaker),
        };
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                filter,
                ports,
                catalog: RwLock::new(Arc::new(SceneCatalog::new())),
                gates: Mutex::new(gates),
                stats: Mutex::new(Statistics::default()),
                runs: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Seed the detector so a scene that is already active is not treated as
    /// freshly activated.
    #[cfg(test)]
    pub(crate) fn prime(&self, scene_id: SceneId, marker: sceneguard_domain::activation::Marker) {
        self.inner.gates().detector.prime(scene_id, marker);
    }

    /// Consume notices until the channel closes.
    pub async fn run(&self, notices: broadcast::Receiver<ActivationNotice>) {
        let mut stream = BroadcastStream::new(notices);
        while let Some(item) = stream.next().await {
            match item {
                Ok(notice) => {
                    self.handle_notice(notice);
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "activation notices dropped, validator lagging");
                }
            }
        }
        tracing::info!("activation stream closed");
    }

    /// Pass one notice through the gates and start a run when admitted.
    pub fn handle_notice(&self, notice: ActivationNotice) -> Admission {
        let inner = &self.inner;
        let now = inner.ports.clock.now();
        let scene_id = notice.scene_id.clone();

        let mut gates = inner.gates();
        match gates.detector.observe(&notice, now) {
            Detection::NotAnActivation => return Admission::NotAnActivation,
            Detection::Debounced { elapsed } => {
                tracing::debug!(%scene_id, ?elapsed, "activation debounced");
                return Admission::Debounced { elapsed };
            }
            Detection::Activated => {}
        }

        let scene = inner.catalog().get(&scene_id);
        let reason = match inner.filter.evaluate(&scene_id, scene.as_deref()) {
            FilterDecision::Skip(reason) => {
                tracing::debug!(%scene_id, %reason, "scene skipped by filter");
                return Admission::Skipped(reason);
            }
            FilterDecision::Validate(reason) => reason,
        };

        if let Err(limited) = gates.limiter.try_acquire(&scene_id, now) {
            tracing::warn!(%scene_id, %limited, "validation rate limited");
            return Admission::RateLimited(limited);
        }
        if let Err(rejected) = gates.breaker.try_acquire(now) {
            tracing::warn!(%scene_id, %rejected, "validation rejected by circuit breaker");
            return Admission::CircuitOpen(rejected);
        }
        drop(gates);

        let run_id = RunId::new();
        inner.set_run_state(&scene_id, ValidationState::Validating, run_id);
        tracing::info!(%scene_id, %run_id, %reason, "scene activation detected, validating");

        let span = tracing::info_span!("validation", %run_id, %scene_id);
        let task_inner = Arc::clone(inner);
        let handle =
            tokio::spawn(async move { task_inner.execute(run_id, scene_id).await }.instrument(span));
        Admission::Started { run_id, handle }
    }

    /// Load scene definitions from the inventory and swap the catalog.
    ///
    /// Definitions that fail validation are logged and left out. Runs in
    /// flight keep the definitions they already hold.
    ///
    /// # Errors
    ///
    /// Propagates the inventory error; the current catalog is kept.
    pub async fn reload(&self) -> Result<usize, SceneGuardError> {
        let scenes = self.inner.ports.inventory.load_scenes().await?;
        let catalog: SceneCatalog = scenes
            .into_iter()
            .filter(|scene| match scene.validate() {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(scene_id = %scene.id, error = %err, "ignoring invalid scene definition");
                    false
                }
            })
            .collect();
        let count = catalog.len();
        *self
            .inner
            .catalog
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(catalog);
        tracing::info!(count, "scene inventory loaded");
        Ok(count)
    }
}

impl<I, E, S, A, N, C: Clock> Inner<I, E, S, A, N, C> {
    fn gates(&self) -> std::sync::MutexGuard<'_, Gates> {
        self.gates.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn catalog(&self) -> Arc<SceneCatalog> {
        Arc::clone(&self.catalog.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn set_run_state(&self, scene_id: &SceneId, state: ValidationState, run_id: RunId) {
        let updated_at = self.ports.clock.now();
        self.runs.lock().unwrap_or_else(PoisonError::into_inner).insert(
            scene_id.clone(),
            SceneRunStatus {
                state,
                run_id: Some(run_id),
                updated_at,
            },
        );
    }

    fn statistics(&self) -> Statistics {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<I, E, S, A, N, C> ValidatorControl for SceneValidator<I, E, S, A, N, C>
where
    I: SceneInventory + Send + Sync + 'static,
    E: EntityResolver + Send + Sync + 'static,
    S: StateReader + Send + Sync + 'static,
    A: ActionInvoker + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn status(&self) -> ValidatorStatus {
        let inner = &self.inner;
        let circuit_breaker = inner.gates().breaker.snapshot();
        let catalog = inner.catalog();
        let now = inner.ports.clock.now();
        let mut runs: BTreeMap<_, _> = inner
            .runs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, status)| (id.clone(), *status))
            .collect();
        // Loaded scenes that never ran are reported idle.
        for scene in catalog.iter() {
            runs.entry(scene.id.clone()).or_insert(SceneRunStatus {
                state: ValidationState::Idle,
                run_id: None,
                updated_at: now,
            });
        }
        ValidatorStatus {
            scenes_loaded: catalog.len(),
            circuit_breaker,
            runs,
            statistics: inner.statistics(),
        }
    }

    fn statistics(&self) -> Statistics {
        self.inner.statistics()
    }

    async fn reload_inventory(&self) -> Result<usize, SceneGuardError> {
        self.reload().await
    }
}
