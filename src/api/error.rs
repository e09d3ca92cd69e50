use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use crate::api::models::ErrorBody;
use crate::error::ServiceError;

/// Boundary translation of engine errors into transport outcomes. This is
/// the single place where error kinds become status codes.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Service(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) => match err {
                ServiceError::InsufficientBalance => StatusCode::CONFLICT,
                ServiceError::DuplicateRequest => StatusCode::CONFLICT,
                ServiceError::IdempotencyKeyMismatch => StatusCode::UNPROCESSABLE_ENTITY,
                ServiceError::LockTimeout => StatusCode::TOO_MANY_REQUESTS,
                ServiceError::NotFound => StatusCode::NOT_FOUND,
                ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::BadRequest(message) => {
                warn!("bad request: {message}");
                message.clone()
            }
            ApiError::Service(ServiceError::LockTimeout) => {
                warn!("balance row contended");
                "too many concurrent requests".to_string()
            }
            ApiError::Service(ServiceError::Store(err)) => {
                error!("store failure: {err}");
                "internal server error".to_string()
            }
            ApiError::Service(err) => {
                warn!("request rejected: {err}");
                err.to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
