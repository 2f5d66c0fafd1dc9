use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scout_persist::PersistError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("A run is already in progress on thread {0}")]
    RunInProgress(String),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ThreadNotFound(_) | ApiError::Persist(PersistError::ThreadNotFound(_)) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::RunInProgress(_) | ApiError::Persist(PersistError::ThreadExists(_)) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
