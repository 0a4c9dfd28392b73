//! Read-only validator views.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sceneguard_app::ports::{NoticePublisher, ValidatorControl, ValidatorStatus};
use sceneguard_domain::stats::Statistics;

use crate::state::AppState;

pub enum StatusResponse {
    Ok(Json<ValidatorStatus>),
}

impl IntoResponse for StatusResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Counters plus the derived success rate (percent, `null` before the
/// first validated run).
#[derive(Debug, Serialize)]
pub struct StatisticsBody {
    #[serde(flatten)]
    pub counters: Statistics,
    pub success_rate: Option<f64>,
}

pub enum StatisticsResponse {
    Ok(Json<StatisticsBody>),
}

impl IntoResponse for StatisticsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/status`: run states, breaker snapshot and statistics.
pub async fn status<V, P>(State(state): State<AppState<V, P>>) -> StatusResponse
where
    V: ValidatorControl + Send + Sync + 'static,
    P: NoticePublisher + Send + Sync + 'static,
{
    StatusResponse::Ok(Json(state.validator.status()))
}

/// `GET /api/statistics`: outcome counters.
pub async fn statistics<V, P>(State(state): State<AppState<V, P>>) -> StatisticsResponse
where
    V: ValidatorControl + Send + Sync + 'static,
    P: NoticePublisher + Send + Sync + 'static,
{
    let counters = state.validator.statistics();
    let success_rate = counters.success_rate();
    StatisticsResponse::Ok(Json(StatisticsBody {
        counters,
        success_rate,
    }))
}
