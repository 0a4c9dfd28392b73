//! In-process activation bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use sceneguard_domain::activation::ActivationNotice;
use sceneguard_domain::error::SceneGuardError;

use crate::ports::NoticePublisher;

/// In-process notice bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the notice is simply dropped).
#[derive(Debug, Clone)]
pub struct InProcessNoticeBus {
    sender: broadcast::Sender<ActivationNotice>,
}

impl InProcessNoticeBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to notices on this bus.
    ///
    /// Returns a receiver that will get all notices published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ActivationNotice> {
        self.sender.subscribe()
    }
}

impl NoticePublisher for InProcessNoticeBus {
    fn publish(
        &self,
        notice: ActivationNotice,
    ) -> impl Future<Output = Result<(), SceneGuardError>> + Send {
        // send only fails with zero receivers
        let _ = self.sender.send(notice);
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use sceneguard_domain::activation::{ActivityStatus, Marker};
    use sceneguard_domain::id::SceneId;

    use super::*;

    fn notice(id: &str) -> ActivationNotice {
        ActivationNotice::new(
            SceneId::new(id).unwrap(),
            Marker::Status(ActivityStatus::Active),
        )
    }

    #[tokio::test]
    async fn should_deliver_notice_to_every_subscriber() {
        let bus = InProcessNoticeBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(notice("s1")).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap(), notice("s1"));
        assert_eq!(rx2.recv().await.unwrap(), notice("s1"));
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessNoticeBus::new(16);
        assert!(bus.publish(notice("s1")).await.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_notices_published_before_subscription() {
        let bus = InProcessNoticeBus::new(16);
        bus.publish(notice("early")).await.unwrap();

        let mut rx = bus.subscribe();
        bus.publish(notice("late")).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), notice("late"));
    }
}
