//! Running counters over all validation outcomes since start-up.

use serde::Serialize;

use crate::id::{RunId, SceneId};
use crate::outcome::{Level, OutcomeKind, ValidationOutcome};
use crate::time::Timestamp;

/// Summary of the most recent critical failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureSnapshot {
    pub run_id: RunId,
    pub scene_id: SceneId,
    pub scene_name: String,
    pub level: Level,
    pub failures: Vec<String>,
    pub at: Timestamp,
}

/// Monotonic counters.
///
/// `total = success + failed_level1 + aborted` and
/// `failed_level1 = recovered_level2 + recovered_level3 + critical_failures`
/// hold after every call to [`Statistics::record`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total: u64,
    pub success: u64,
    pub failed_level1: u64,
    pub recovered_level2: u64,
    pub recovered_level3: u64,
    pub critical_failures: u64,
    pub aborted: u64,
    pub last_failure: Option<FailureSnapshot>,
}

impl Statistics {
    /// Account for one finished run. `scene_name` labels a critical failure.
    pub fn record(&mut self, outcome: &ValidationOutcome, scene_name: &str) {
        self.total += 1;
        match outcome.kind {
            OutcomeKind::Success => self.success += 1,
            OutcomeKind::Aborted => self.aborted += 1,
            OutcomeKind::RecoveredLevel2 => {
                self.failed_level1 += 1;
                self.recovered_level2 += 1;
            }
            OutcomeKind::RecoveredLevel3 => {
                self.failed_level1 += 1;
                self.recovered_level3 += 1;
            }
            OutcomeKind::Critical => {
                self.failed_level1 += 1;
                self.critical_failures += 1;
                self.last_failure = Some(FailureSnapshot {
                    run_id: outcome.run_id,
                    scene_id: outcome.scene_id.clone(),
                    scene_name: scene_name.to_string(),
                    level: outcome.level_reached,
                    failures: outcome.failure_messages(),
                    at: outcome.finished_at,
                });
            }
        }
    }

    /// Share of runs that ended in tolerance, as a percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> Option<f64> {
        let validated = self.total - self.aborted;
        if validated == 0 {
            return None;
        }
        let ok = self.success + self.recovered_level2 + self.recovered_level3;
        Some(ok as f64 * 100.0 / validated as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(kind: OutcomeKind) -> ValidationOutcome {
        let now = crate::time::now();
        ValidationOutcome::new(RunId::new(), SceneId::new("s1").unwrap(), kind, now, now)
    }

    #[test]
    fn should_keep_counter_invariants() {
        let mut stats = Statistics::default();
        for kind in [
            OutcomeKind::Success,
            OutcomeKind::RecoveredLevel2,
            OutcomeKind::RecoveredLevel3,
            OutcomeKind::Critical,
            OutcomeKind::Aborted,
            OutcomeKind::Success,
        ] {
            stats.record(&outcome(kind), "Evening");
        }

        assert_eq!(stats.total, 6);
        assert_eq!(stats.total, stats.success + stats.failed_level1 + stats.aborted);
        assert_eq!(
            stats.failed_level1,
            stats.recovered_level2 + stats.recovered_level3 + stats.critical_failures
        );
    }

    #[test]
    fn should_capture_last_critical_failure() {
        let mut stats = Statistics::default();
        stats.record(&outcome(OutcomeKind::Critical), "Evening");
        let last = stats.last_failure.unwrap();
        assert_eq!(last.scene_name, "Evening");
        assert_eq!(last.level, Level::Individual);
    }

    #[test]
    fn should_exclude_aborted_runs_from_success_rate() {
        let mut stats = Statistics::default();
        assert_eq!(stats.success_rate(), None);
        stats.record(&outcome(OutcomeKind::Success), "a");
        stats.record(&outcome(OutcomeKind::Critical), "a");
        stats.record(&outcome(OutcomeKind::Aborted), "a");
        assert_eq!(stats.success_rate(), Some(50.0));
    }
}
