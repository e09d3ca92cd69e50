use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::api::{auth, handlers};
use crate::service::WithdrawalService;

#[derive(Clone)]
pub struct AppState {
    pub service: WithdrawalService,
    pub pool: PgPool,
    pub auth_token: String,
}

impl AppState {
    pub fn new(pool: PgPool, auth_token: String) -> Self {
        Self {
            service: WithdrawalService::new(pool.clone()),
            pool,
            auth_token,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/withdrawals", post(handlers::create_withdrawal))
        .route("/withdrawals/:id", get(handlers::get_withdrawal))
        .route("/withdrawals/:id/confirm", post(handlers::confirm_withdrawal))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .nest("/v1", v1)
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
