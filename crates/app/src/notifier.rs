//! Notifier that writes operator alerts to the log.

use std::future::Future;

use sceneguard_domain::error::SceneGuardError;

use crate::ports::{Notifier, Severity};

/// Emits every notification as a `tracing` event at a matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(
        &self,
        severity: Severity,
        message: String,
    ) -> impl Future<Output = Result<(), SceneGuardError>> + Send {
        match severity {
            Severity::Info => tracing::info!(%severity, "{message}"),
            Severity::Warning => tracing::warn!(%severity, "{message}"),
            Severity::Critical => tracing::error!(%severity, "{message}"),
        }
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_always_succeed() {
        let notifier = LogNotifier;
        for severity in [Severity::Info, Severity::Warning, Severity::Critical] {
            assert!(notifier.notify(severity, "message".to_string()).await.is_ok());
        }
    }
}
