//! Inventory reload.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sceneguard_app::ports::{NoticePublisher, ValidatorControl};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReloadBody {
    pub scenes_loaded: usize,
}

pub enum ReloadResponse {
    Ok(Json<ReloadBody>),
}

impl IntoResponse for ReloadResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/inventory/reload`: re-read scene definitions.
pub async fn reload<V, P>(State(state): State<AppState<V, P>>) -> Result<ReloadResponse, ApiError>
where
    V: ValidatorControl + Send + Sync + 'static,
    P: NoticePublisher + Send + Sync + 'static,
{
    let scenes_loaded = state.validator.reload_inventory().await?;
    Ok(ReloadResponse::Ok(Json(ReloadBody { scenes_loaded })))
}
