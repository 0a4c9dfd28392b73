//! Shared application state for axum handlers.

use std::sync::Arc;

use sceneguard_app::ports::{NoticePublisher, ValidatorControl};

/// Application state shared across all axum handlers.
///
/// Generic over the validator control port and the notice publisher to
/// avoid dynamic dispatch. `Clone` is implemented manually so the
/// underlying types need not be `Clone`; only the `Arc`s are cloned.
pub struct AppState<V, P> {
    /// Validator status, statistics and reload.
    pub validator: Arc<V>,
    /// Where ingested activation notices are published.
    pub publisher: Arc<P>,
}

impl<V, P> Clone for AppState<V, P> {
    fn clone(&self) -> Self {
        Self {
            validator: Arc::clone(&self.validator),
            publisher: Arc::clone(&self.publisher),
        }
    }
}

impl<V, P> AppState<V, P>
where
    V: ValidatorControl + Send + Sync + 'static,
    P: NoticePublisher + Send + Sync + 'static,
{
    pub fn new(validator: V, publisher: P) -> Self {
        Self {
            validator: Arc::new(validator),
            publisher: Arc::new(publisher),
        }
    }
}
