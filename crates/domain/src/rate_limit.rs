//! Sliding-window rate limiting of validation runs.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::id::SceneId;
use crate::time::{Timestamp, elapsed};

/// Window and limits for the two counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    #[serde(rename = "window_secs", with = "crate::time::secs")]
    pub window: Duration,
    pub per_scene: usize,
    pub global: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            per_scene: 5,
            global: 20,
        }
    }
}

/// Which counter rejected an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RateLimited {
    #[error("per-scene limit of {limit} reached")]
    Scene { limit: usize },
    #[error("global limit of {limit} reached")]
    Global { limit: usize },
}

#[derive(Debug, Default)]
struct Window(VecDeque<Timestamp>);

impl Window {
    fn prune(&mut self, now: Timestamp, window: Duration) {
        while self
            .0
            .front()
            .is_some_and(|oldest| elapsed(now, *oldest) >= window)
        {
            self.0.pop_front();
        }
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Per-scene and global sliding windows.
///
/// An accepted attempt is recorded in both windows; a rejected one in
/// neither.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    scenes: HashMap<SceneId, Window>,
    global: Window,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            scenes: HashMap::new(),
            global: Window::default(),
        }
    }

    /// Try to admit one run of `scene_id` at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimited`] naming the counter that is full.
    pub fn try_acquire(&mut self, scene_id: &SceneId, now: Timestamp) -> Result<(), RateLimited> {
        let window = self.config.window;
        self.global.prune(now, window);
        let scene = self.scenes.entry(scene_id.clone()).or_default();
        scene.prune(now, window);

        if scene.len() >= self.config.per_scene {
            return Err(RateLimited::Scene {
                limit: self.config.per_scene,
            });
        }
        if self.global.len() >= self.config.global {
            return Err(RateLimited::Global {
                limit: self.config.global,
            });
        }
        scene.0.push_back(now);
        self.global.0.push_back(now);
        Ok(())
    }

    /// Runs admitted for `scene_id` within the current window.
    #[must_use]
    pub fn scene_count(&self, scene_id: &SceneId) -> usize {
        self.scenes.get(scene_id).map_or(0, Window::len)
    }

    #[must_use]
    pub fn global_count(&self) -> usize {
        self.global.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn id(raw: &str) -> SceneId {
        SceneId::new(raw).unwrap()
    }

    #[test]
    fn should_reject_sixth_activation_within_window() {
        let mut limiter = RateLimiter::new(RateLimitConfig::default());
        let start = crate::time::now();
        for i in 0..5 {
            let now = start + TimeDelta::seconds(i);
            assert!(limiter.try_acquire(&id("a"), now).is_ok());
        }
        let sixth = start + TimeDelta::seconds(10);
        assert_eq!(
            limiter.try_acquire(&id("a"), sixth),
            Err(RateLimited::Scene { limit: 5 })
        );
        assert_eq!(limiter.scene_count(&id("a")), 5);
        assert_eq!(limiter.global_count(), 5);
    }

    #[test]
    fn should_not_affect_other_scenes() {
        let mut limiter = RateLimiter::new(RateLimitConfig::default());
        let now = crate::time::now();
        for _ in 0..5 {
            limiter.try_acquire(&id("a"), now).unwrap();
        }
        assert!(limiter.try_acquire(&id("b"), now).is_ok());
    }

    #[test]
    fn should_admit_again_after_window_slides() {
        let mut limiter = RateLimiter::new(RateLimitConfig::default());
        let start = crate::time::now();
        for _ in 0..5 {
            limiter.try_acquire(&id("a"), start).unwrap();
        }
        let later = start + TimeDelta::seconds(60);
        assert!(limiter.try_acquire(&id("a"), later).is_ok());
        assert_eq!(limiter.scene_count(&id("a")), 1);
    }

    #[test]
    fn should_enforce_global_limit_across_scenes() {
        let mut limiter = RateLimiter::new(RateLimitConfig {
            global: 3,
            ..RateLimitConfig::default()
        });
        let now = crate::time::now();
        for name in ["a", "b", "c"] {
            limiter.try_acquire(&id(name), now).unwrap();
        }
        assert_eq!(
            limiter.try_acquire(&id("d"), now),
            Err(RateLimited::Global { limit: 3 })
        );
        assert_eq!(limiter.scene_count(&id("d")), 0);
    }
}
