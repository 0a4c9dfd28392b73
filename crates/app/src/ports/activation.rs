//! Activation port: feeds scene change notifications to the validator.

use std::future::Future;

use sceneguard_domain::activation::ActivationNotice;
use sceneguard_domain::error::SceneGuardError;

/// Publishes activation notices to interested subscribers.
pub trait NoticePublisher {
    /// Publish a notice to all current subscribers.
    fn publish(
        &self,
        notice: ActivationNotice,
    ) -> impl Future<Output = Result<(), SceneGuardError>> + Send;
}

impl<T: NoticePublisher + Send + Sync> NoticePublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        notice: ActivationNotice,
    ) -> impl Future<Output = Result<(), SceneGuardError>> + Send {
        (**self).publish(notice)
    }
}
