//! Global circuit breaker guarding corrective actions.
//!
//! ```text
//! CLOSED --(failures >= threshold)--> OPEN --(timeout)--> HALF_OPEN
//!   ^                                   ^                    |
//!   |                                   +-----(failure)------+
//!   +----------------(successes >= threshold)----------------+
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::time::{Timestamp, elapsed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    #[serde(rename = "timeout_secs", with = "crate::time::secs")]
    pub timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    #[default]
    Closed,
    Open,
    HalfOpen,
}

/// Why an attempt was not let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CircuitRejected {
    #[error("circuit breaker is open")]
    Open,
    #[error("a half-open trial is already in flight")]
    TrialInFlight,
}

/// Point-in-time view for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    pub opened_at: Option<Timestamp>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: CircuitState,
    failures: u32,
    successes: u32,
    opened_at: Option<Timestamp>,
    trial_in_flight: bool,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: CircuitState::Closed,
            failures: 0,
            successes: 0,
            opened_at: None,
            trial_in_flight: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// Ask to start one run at `now`.
    ///
    /// # Errors
    ///
    /// Rejects while open (until the timeout elapses) and while another
    /// half-open trial is running. Rejections are not counted as failures.
    pub fn try_acquire(&mut self, now: Timestamp) -> Result<(), CircuitRejected> {
        if self.state == CircuitState::Open {
            let opened_at = self.opened_at.unwrap_or(now);
            if elapsed(now, opened_at) < self.config.timeout {
                return Err(CircuitRejected::Open);
            }
            self.state = CircuitState::HalfOpen;
            self.successes = 0;
            self.trial_in_flight = false;
        }
        if self.state == CircuitState::HalfOpen {
            if self.trial_in_flight {
                return Err(CircuitRejected::TrialInFlight);
            }
            self.trial_in_flight = true;
        }
        Ok(())
    }

    /// Record a successful run.
    pub fn record_success(&mut self) {
        match self.state {
            CircuitState::Closed => self.failures = 0,
            CircuitState::HalfOpen => {
                self.trial_in_flight = false;
                self.successes += 1;
                if self.successes >= self.config.success_threshold {
                    self.state = CircuitState::Closed;
                    self.failures = 0;
                    self.successes = 0;
                    self.opened_at = None;
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed run. Returns `true` when this failure opened the breaker.
    pub fn record_failure(&mut self, now: Timestamp) -> bool {
        match self.state {
            CircuitState::Closed => {
                self.failures += 1;
                self.successes = 0;
                if self.failures >= self.config.failure_threshold {
                    self.open(now);
                    return true;
                }
                false
            }
            CircuitState::HalfOpen => {
                self.trial_in_flight = false;
                self.failures += 1;
                self.open(now);
                true
            }
            CircuitState::Open => false,
        }
    }

    /// Give back a half-open trial whose run ended without a verdict.
    pub fn release_trial(&mut self) {
        if self.state == CircuitState::HalfOpen {
            self.trial_in_flight = false;
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> CircuitSnapshot {
        CircuitSnapshot {
            state: self.state,
            consecutive_failures: self.failures,
            consecutive_successes: self.successes,
            opened_at: self.opened_at,
        }
    }

    fn open(&mut self, now: Timestamp) {
        self.state = CircuitState::Open;
        self.successes = 0;
        self.opened_at = Some(now);
    }
}
