//! Activation ingestion for external trigger sources.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use sceneguard_app::ports::{NoticePublisher, ValidatorControl};
use sceneguard_domain::activation::{ActivationNotice, Marker};
use sceneguard_domain::error::SceneGuardError;
use sceneguard_domain::id::SceneId;
use sceneguard_domain::time;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for [`ingest`].
///
/// Without a marker the notice is treated as a recall happening now.
#[derive(Debug, Deserialize)]
pub struct ActivationRequest {
    pub scene_id: String,
    #[serde(default)]
    pub marker: Option<Marker>,
}

pub enum IngestResponse {
    Accepted(Json<ActivationNotice>),
}

impl IntoResponse for IngestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(json) => (StatusCode::ACCEPTED, json).into_response(),
        }
    }
}

/// `POST /api/activations`: publish an activation notice.
///
/// Acceptance only means the notice was queued; the validator gates decide
/// whether it starts a run.
pub async fn ingest<V, P>(
    State(state): State<AppState<V, P>>,
    Json(req): Json<ActivationRequest>,
) -> Result<IngestResponse, ApiError>
where
    V: ValidatorControl + Send + Sync + 'static,
    P: NoticePublisher + Send + Sync + 'static,
{
    let scene_id = SceneId::new(req.scene_id).map_err(SceneGuardError::from)?;
    let marker = req
        .marker
        .unwrap_or_else(|| Marker::Recalled(Some(time::now())));
    let notice = ActivationNotice::new(scene_id, marker);
    state.publisher.publish(notice.clone()).await?;
    tracing::debug!(scene_id = %notice.scene_id, "activation notice ingested");
    Ok(IngestResponse::Accepted(Json(notice)))
}
