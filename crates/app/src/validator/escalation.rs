//! The 3-level escalation run.
//!
//! Level 1 compares, level 2 re-activates the scene and compares again,
//! level 3 drives every entity individually before a final comparison.
//! Levels run strictly in order and each run updates statistics and the
//! circuit breaker exactly once.

use std::sync::PoisonError;
use std::time::Duration;

use sceneguard_domain::comparator::{Dimension, compare};
use sceneguard_domain::id::{ResourceId, RunId, SceneId};
use sceneguard_domain::outcome::{Failure, Level, OutcomeKind, ValidationOutcome};
use sceneguard_domain::scene::{EntityCommand, SceneDefinition};
use sceneguard_domain::status::ValidationState;
use sceneguard_domain::time::{Timestamp, elapsed};

use super::Inner;
use crate::ports::{
    ActionInvoker, Clock, EntityResolver, Notifier, SceneInventory, Severity, StateReader,
};

/// Result of comparing every target of a scene once.
#[derive(Debug, Default)]
struct LevelReport {
    failures: Vec<Failure>,
    skipped: Vec<ResourceId>,
}

impl LevelReport {
    fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every failure is an out-of-tolerance colour temperature.
    fn color_temp_only(&self) -> bool {
        !self.failures.is_empty()
            && self.failures.iter().all(|failure| {
                matches!(
                    failure,
                    Failure::Mismatch { mismatch, .. }
                        if mismatch.dimension() == Dimension::ColorTemperature
                )
            })
    }

    fn summary(&self) -> String {
        self.failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// `delay` stretched by `factor`, or `delay` unchanged when the product
/// does not fit in a [`Duration`].
fn scaled(delay: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(delay)
}

impl<I, E, S, A, N, C> Inner<I, E, S, A, N, C>
where
    I: SceneInventory + Send + Sync + 'static,
    E: EntityResolver + Send + Sync + 'static,
    S: StateReader + Send + Sync + 'static,
    A: ActionInvoker + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    pub(super) async fn execute(&self, run_id: RunId, scene_id: SceneId) -> ValidationOutcome {
        let started_at = self.ports.clock.now();
        tokio::time::sleep(self.config.transition_delay).await;

        // Looked up after the transition delay so a reload in between is honoured.
        let Some(scene) = self.catalog().get(&scene_id) else {
            let failure = Failure::SceneMissing {
                scene_id: scene_id.clone(),
            };
            return self.abort(run_id, scene_id, failure, started_at);
        };
        if scene.actions.is_empty() {
            let failure = Failure::EmptyScene {
                scene_id: scene_id.clone(),
            };
            return self.abort(run_id, scene_id, failure, started_at);
        }

        let level1 = self.check(&scene, Level::Validate).await;
        if level1.passed() {
            tracing::info!(scene = %scene.name, "scene validated");
            let outcome = self.outcome(run_id, &scene, OutcomeKind::Success, started_at, level1);
            return self.finish(outcome, &scene).await;
        }
        tracing::warn!(
            scene = %scene.name,
            failures = level1.failures.len(),
            details = %level1.summary(),
            "level 1 failed, re-triggering scene"
        );

        self.set_run_state(&scene_id, ValidationState::Retrying, run_id);
        let level2_wait = if level1.color_temp_only() {
            scaled(
                self.config.validation_delay,
                self.config.level2_color_temp_multiplier,
            )
        } else {
            self.config.validation_delay
        };
        let level2 = match self.ports.invoker.activate_scene(&scene.id).await {
            Ok(()) => {
                tokio::time::sleep(level2_wait).await;
                self.check(&scene, Level::Retrigger).await
            }
            Err(err) => {
                tracing::warn!(error = %err, "scene re-trigger failed");
                LevelReport {
                    failures: vec![Failure::ActionFailed {
                        subject: scene.id.to_string(),
                        reason: err.to_string(),
                    }],
                    skipped: Vec::new(),
                }
            }
        };
        if level2.passed() {
            tracing::info!(scene = %scene.name, "scene recovered by re-trigger");
            let outcome =
                self.outcome(run_id, &scene, OutcomeKind::RecoveredLevel2, started_at, level2);
            return self.finish(outcome, &scene).await;
        }
        tracing::warn!(
            scene = %scene.name,
            failures = level2.failures.len(),
            details = %level2.summary(),
            "level 2 failed, correcting entities individually"
        );

        self.set_run_state(&scene_id, ValidationState::Fallback, run_id);
        let level3_wait = if level1.color_temp_only() && level2.color_temp_only() {
            scaled(
                self.config.validation_delay,
                self.config.level3_color_temp_multiplier,
            )
        } else {
            self.config.validation_delay
        };
        tokio::time::sleep(level3_wait).await;

        let command_failures = self.correct_individually(&scene).await;
        tokio::time::sleep(self.config.settle_delay).await;
        let mut level3 = self.check(&scene, Level::Individual).await;

        if command_failures.is_empty() && level3.passed() {
            tracing::info!(scene = %scene.name, "scene recovered by individual correction");
            let outcome =
                self.outcome(run_id, &scene, OutcomeKind::RecoveredLevel3, started_at, level3);
            return self.finish(outcome, &scene).await;
        }

        let mut failures = command_failures;
        failures.append(&mut level3.failures);
        level3.failures = failures;
        let outcome = self.outcome(run_id, &scene, OutcomeKind::Critical, started_at, level3);
        self.finish(outcome, &scene).await
    }

    /// Resolve, read and compare every target of `scene`.
    async fn check(&self, scene: &SceneDefinition, level: Level) -> LevelReport {
        let mut report = LevelReport::default();
        for action in &scene.actions {
            let Some(entity) = self.ports.resolver.resolve(&action.target) else {
                tracing::warn!(%level, target = %action.target, "target not resolvable, skipped");
                report.skipped.push(action.target.clone());
                continue;
            };
            match self.ports.reader.read_state(&entity).await {
                Ok(observed) => {
                    let mismatches = compare(action, &observed, &self.config.tolerances);
                    for mismatch in mismatches {
                        tracing::debug!(%level, %entity, %mismatch, "out of tolerance");
                        report.failures.push(Failure::Mismatch {
                            entity: entity.clone(),
                            mismatch,
                        });
                    }
                }
                Err(err) => {
                    tracing::warn!(%level, %entity, error = %err, "failed to read state");
                    report.failures.push(Failure::ReadFailed {
                        entity,
                        reason: err.to_string(),
                    });
                }
            }
        }
        report
    }

    /// Issue one direct command per resolvable target.
    async fn correct_individually(&self, scene: &SceneDefinition) -> Vec<Failure> {
        let mut failures = Vec::new();
        let mut first = true;
        for action in &scene.actions {
            let Some(entity) = self.ports.resolver.resolve(&action.target) else {
                continue;
            };
            if !first {
                tokio::time::sleep(self.config.stagger_delay).await;
            }
            first = false;

            let command = EntityCommand::from(action);
            tracing::debug!(%entity, ?command, "setting entity state");
            if let Err(err) = self.ports.invoker.set_entity_state(&entity, &command).await {
                tracing::warn!(%entity, error = %err, "entity command failed");
                failures.push(Failure::ActionFailed {
                    subject: entity.to_string(),
                    reason: err.to_string(),
                });
            }
        }
        failures
    }

    fn outcome(
        &self,
        run_id: RunId,
        scene: &SceneDefinition,
        kind: OutcomeKind,
        started_at: Timestamp,
        report: LevelReport,
    ) -> ValidationOutcome {
        ValidationOutcome::new(
            run_id,
            scene.id.clone(),
            kind,
            started_at,
            self.ports.clock.now(),
        )
        .with_failures(report.failures)
        .with_skipped(report.skipped)
    }

    /// End a run before escalation. No breaker verdict is recorded.
    fn abort(
        &self,
        run_id: RunId,
        scene_id: SceneId,
        failure: Failure,
        started_at: Timestamp,
    ) -> ValidationOutcome {
        tracing::warn!(reason = %failure, "validation aborted");
        let outcome = ValidationOutcome::new(
            run_id,
            scene_id.clone(),
            OutcomeKind::Aborted,
            started_at,
            self.ports.clock.now(),
        )
        .with_failures(vec![failure]);

        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(&outcome, scene_id.as_str());
        self.gates().breaker.release_trial();
        self.set_run_state(&scene_id, ValidationState::Failed, run_id);
        outcome
    }

    /// Record statistics and breaker feedback, then notify on critical failure.
    async fn finish(&self, outcome: ValidationOutcome, scene: &SceneDefinition) -> ValidationOutcome {
        let now = self.ports.clock.now();
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(&outcome, &scene.name);

        let opened = {
            let mut gates = self.gates();
            if outcome.success {
                gates.breaker.record_success();
                false
            } else {
                gates.breaker.record_failure(now)
            }
        };

        let state = if outcome.success {
            ValidationState::Success
        } else {
            ValidationState::Failed
        };
        self.set_run_state(&outcome.scene_id, state, outcome.run_id);

        let took = elapsed(outcome.finished_at, outcome.started_at);
        tracing::info!(
            kind = ?outcome.kind,
            level = %outcome.level_reached,
            skipped = outcome.skipped.len(),
            ?took,
            "validation finished"
        );

        if outcome.kind == OutcomeKind::Critical {
            let message = format!(
                "Scene '{}' failed validation after {} levels: {}",
                scene.name,
                outcome.level_reached,
                outcome.failure_messages().join("; ")
            );
            self.send(Severity::Critical, message).await;
        }
        if opened {
            let message = format!(
                "Circuit breaker opened after {} consecutive failures; validation paused for {:?}",
                self.config.circuit_breaker.failure_threshold, self.config.circuit_breaker.timeout
            );
            self.send(Severity::Warning, message).await;
        }
        outcome
    }

    async fn send(&self, severity: Severity, message: String) {
        if let Err(err) = self.ports.notifier.notify(severity, message).await {
            tracing::warn!(%severity, error = %err, "failed to deliver notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use sceneguard_domain::comparator::Mismatch;
    use sceneguard_domain::id::EntityRef;

    use super::*;

    fn mismatch(mismatch: Mismatch) -> Failure {
        Failure::Mismatch {
            entity: EntityRef::new("light.desk").unwrap(),
            mismatch,
        }
    }

    #[test]
    fn should_detect_color_temp_only_failures() {
        let report = LevelReport {
            failures: vec![mismatch(Mismatch::ColorTemperature {
                actual: 450.0,
                expected: 300.0,
            })],
            skipped: Vec::new(),
        };
        assert!(report.color_temp_only());
    }

    #[test]
    fn should_not_flag_mixed_failures_as_color_temp_only() {
        let report = LevelReport {
            failures: vec![
                mismatch(Mismatch::ColorTemperature {
                    actual: 450.0,
                    expected: 300.0,
                }),
                mismatch(Mismatch::Brightness {
                    actual: 10.0,
                    expected: 50.0,
                }),
            ],
            skipped: Vec::new(),
        };
        assert!(!report.color_temp_only());
        assert!(!LevelReport::default().color_temp_only());
    }

    #[test]
    fn should_scale_delay_by_factor() {
        assert_eq!(scaled(Duration::from_secs(10), 2.0), Duration::from_secs(20));
    }

    #[test]
    fn should_keep_base_delay_when_scaling_overflows() {
        let huge = Duration::from_secs(u64::MAX / 2);
        assert_eq!(scaled(huge, 3.0), huge);
        assert_eq!(scaled(Duration::MAX, 1.5), Duration::MAX);
    }

    #[test]
    fn should_join_failures_in_summary() {
        let report = LevelReport {
            failures: vec![
                mismatch(Mismatch::Unavailable),
                mismatch(Mismatch::Brightness {
                    actual: 20.0,
                    expected: 50.0,
                }),
            ],
            skipped: Vec::new(),
        };
        assert_eq!(
            report.summary(),
            "light.desk: unavailable; light.desk: brightness 20 != 50 (Δ30)"
        );
    }
}
