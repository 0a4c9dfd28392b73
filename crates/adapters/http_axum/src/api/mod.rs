//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod activations;
#[allow(clippy::missing_errors_doc)]
pub mod inventory;
pub mod status;

use axum::Router;
use axum::routing::{get, post};

use sceneguard_app::ports::{NoticePublisher, ValidatorControl};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<V, P>() -> Router<AppState<V, P>>
where
    V: ValidatorControl + Send + Sync + 'static,
    P: NoticePublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/status", get(status::status::<V, P>))
        .route("/statistics", get(status::statistics::<V, P>))
        .route("/inventory/reload", post(inventory::reload::<V, P>))
        .route("/activations", post(activations::ingest::<V, P>))
}
