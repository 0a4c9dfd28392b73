//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sceneguard_domain::error::SceneGuardError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`SceneGuardError`] to an HTTP response with appropriate status code.
pub struct ApiError(SceneGuardError);

impl From<SceneGuardError> for ApiError {
    fn from(err: SceneGuardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            SceneGuardError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            SceneGuardError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            SceneGuardError::Inventory(err) => {
                tracing::error!(error = %err, "inventory error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "inventory could not be loaded".to_string(),
                )
            }
            SceneGuardError::Collaborator(err) => {
                tracing::error!(error = %err, "collaborator error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use sceneguard_domain::error::{NotFoundError, ValidationError};

    use super::*;

    #[test]
    fn should_map_validation_to_bad_request() {
        let response = ApiError::from(SceneGuardError::from(ValidationError::EmptyId)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn should_map_not_found_to_404() {
        let err = NotFoundError {
            entity: "Scene",
            id: "x".to_string(),
        };
        let response = ApiError::from(SceneGuardError::from(err)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn should_map_inventory_to_internal_error() {
        let err = SceneGuardError::Inventory(Box::new(std::io::Error::other("disk")));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
