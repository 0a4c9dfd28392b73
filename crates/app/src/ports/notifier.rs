//! Notifier port: operator-facing alerts.

use std::fmt;
use std::future::Future;

use serde::Serialize;

use sceneguard_domain::error::SceneGuardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Warning => f.write_str("warning"),
            Self::Critical => f.write_str("critical"),
        }
    }
}

/// Delivers a notification to whoever operates the system.
pub trait Notifier {
    fn notify(
        &self,
        severity: Severity,
        message: String,
    ) -> impl Future<Output = Result<(), SceneGuardError>> + Send;
}

impl<T: Notifier + Send + Sync> Notifier for std::sync::Arc<T> {
    fn notify(
        &self,
        severity: Severity,
        message: String,
    ) -> impl Future<Output = Result<(), SceneGuardError>> + Send {
        (**self).notify(severity, message)
    }
}
