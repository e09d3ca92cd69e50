use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::models::CreateWithdrawalRequest;
use crate::api::routes::AppState;
use crate::domain::Withdrawal;

pub async fn create_withdrawal(
    State(state): State<AppState>,
    payload: Result<Json<CreateWithdrawalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Withdrawal>), ApiError> {
    let Json(payload) = payload.map_err(|err| ApiError::BadRequest(err.body_text()))?;
    payload.validate().map_err(ApiError::BadRequest)?;

    let req = payload.into_req();
    let withdrawal = state.service.create_withdrawal(&req).await?;

    info!(id = %withdrawal.id, user_id = %withdrawal.user_id, "withdrawal created");
    Ok((StatusCode::CREATED, Json(withdrawal)))
}

pub async fn get_withdrawal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Withdrawal>, ApiError> {
    let id = parse_id(&id)?;
    let withdrawal = state.service.get_withdrawal(id).await?;
    Ok(Json(withdrawal))
}

pub async fn confirm_withdrawal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.service.confirm_withdrawal(id).await?;

    info!(%id, "withdrawal confirmed");
    Ok(StatusCode::OK)
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn ready(State(state): State<AppState>) -> Response {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (StatusCode::OK, "Ready").into_response(),
        Err(err) => {
            error!("readiness check failed: {err}");
            (StatusCode::SERVICE_UNAVAILABLE, "Not Ready").into_response()
        }
    }
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("invalid withdrawal id".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert!(parse_id("b9c7d3f0-8a41-4a9e-9c55-0de7c2f1a2b3").is_ok());
        assert!(parse_id("not-a-uuid").is_err());
        assert!(parse_id("").is_err());
    }
}
