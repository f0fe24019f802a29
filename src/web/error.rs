use crate::services::ServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

/// Service failure carried up to the HTTP layer, mapped onto a status code
/// and a JSON error body at the edge.
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(ServiceError::Other(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ServiceError::InvalidTitle
            | ServiceError::InvalidPageSize
            | ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            ServiceError::DuplicateEmail | ServiceError::DuplicateSlug(_) => {
                (StatusCode::CONFLICT, self.0.to_string())
            }
            ServiceError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            ServiceError::Forbidden => (StatusCode::FORBIDDEN, "forbidden".to_string()),
            ServiceError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ServiceError::Storage(_) | ServiceError::Pool(_) | ServiceError::Other(_) => {
                tracing::error!("internal error: {:?}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
