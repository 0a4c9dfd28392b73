//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use sceneguard_app::ports::{NoticePublisher, ValidatorControl};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api` and includes a [`TraceLayer`] that logs
/// each HTTP request/response at the `DEBUG` level.
pub fn build<V, P>(state: AppState<V, P>) -> Router
where
    V: ValidatorControl + Send + Sync + 'static,
    P: NoticePublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes::<V, P>())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use sceneguard_app::ports::ValidatorStatus;
    use sceneguard_domain::activation::{ActivationNotice, ActivityStatus, Marker};
    use sceneguard_domain::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
    use sceneguard_domain::error::SceneGuardError;
    use sceneguard_domain::stats::Statistics;

    use super::*;

    #[derive(Default)]
    struct StubValidator {
        fail_reload: AtomicBool,
    }

    impl ValidatorControl for StubValidator {
        fn status(&self) -> ValidatorStatus {
            ValidatorStatus {
                scenes_loaded: 2,
                circuit_breaker: CircuitBreaker::new(CircuitBreakerConfig::default()).snapshot(),
                runs: BTreeMap::new(),
                statistics: Statistics::default(),
            }
        }

        fn statistics(&self) -> Statistics {
            Statistics {
                total: 4,
                success: 3,
                critical_failures: 1,
                ..Statistics::default()
            }
        }

        async fn reload_inventory(&self) -> Result<usize, SceneGuardError> {
            if self.fail_reload.load(Ordering::SeqCst) {
                return Err(SceneGuardError::Inventory(Box::new(std::io::Error::other(
                    "missing directory",
                ))));
            }
            Ok(3)
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        notices: Mutex<Vec<ActivationNotice>>,
    }

    impl NoticePublisher for RecordingPublisher {
        async fn publish(&self, notice: ActivationNotice) -> Result<(), SceneGuardError> {
            self.notices.lock().unwrap().push(notice);
            Ok(())
        }
    }

    fn test_state() -> (
        AppState<StubValidator, RecordingPublisher>,
        Arc<StubValidator>,
        Arc<RecordingPublisher>,
    ) {
        let validator = Arc::new(StubValidator::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let state = AppState {
            validator: Arc::clone(&validator),
            publisher: Arc::clone(&publisher),
        };
        (state, validator, publisher)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let (state, _, _) = test_state();
        let response = build(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_return_status_with_closed_breaker() {
        let (state, _, _) = test_state();
        let response = build(state)
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["scenes_loaded"], 2);
        assert_eq!(json["circuit_breaker"]["state"], "CLOSED");
    }

    #[tokio::test]
    async fn should_return_statistics_with_success_rate() {
        let (state, _, _) = test_state();
        let response = build(state)
            .oneshot(
                Request::builder()
                    .uri("/api/statistics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = json_body(response).await;
        assert_eq!(json["total"], 4);
        assert_eq!(json["critical_failures"], 1);
        assert_eq!(json["success_rate"], 75.0);
    }

    #[tokio::test]
    async fn should_report_loaded_count_when_reloading() {
        let (state, _, _) = test_state();
        let response = build(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/inventory/reload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["scenes_loaded"], 3);
    }

    #[tokio::test]
    async fn should_return_500_when_reload_fails() {
        let (state, validator, _) = test_state();
        validator.fail_reload.store(true, Ordering::SeqCst);

        let response = build(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/inventory/reload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await["error"],
            "inventory could not be loaded"
        );
    }

    #[tokio::test]
    async fn should_publish_recall_notice_when_marker_omitted() {
        let (state, _, publisher) = test_state();

        let response = build(state)
            .oneshot(post_json(
                "/api/activations",
                &serde_json::json!({"scene_id": "scene-1"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let notices = publisher.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].scene_id.as_str(), "scene-1");
        assert!(matches!(notices[0].marker, Marker::Recalled(Some(_))));
    }

    #[tokio::test]
    async fn should_publish_explicit_status_marker() {
        let (state, _, publisher) = test_state();

        let response = build(state)
            .oneshot(post_json(
                "/api/activations",
                &serde_json::json!({
                    "scene_id": "scene-1",
                    "marker": {"kind": "status", "value": "dynamic_palette"}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let notices = publisher.notices.lock().unwrap();
        assert_eq!(notices[0].marker, Marker::Status(ActivityStatus::Active));
    }

    #[tokio::test]
    async fn should_reject_blank_scene_id() {
        let (state, _, publisher) = test_state();

        let response = build(state)
            .oneshot(post_json(
                "/api/activations",
                &serde_json::json!({"scene_id": "  "}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(publisher.notices.lock().unwrap().is_empty());
    }
}
