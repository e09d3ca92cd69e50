use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use withdrawal_gateway::api::routes::AppState;
use withdrawal_gateway::config;

pub const TEST_TOKEN: &str = "test-token";

pub struct TestApp {
    pub state: AppState,
    pub pool: PgPool,
}

pub async fn create_test_app() -> TestApp {
    let configuration = config::load_config(Some(Path::new("./config-tests.toml"))).unwrap();

    let pool = PgPoolOptions::new()
        .max_connections(configuration.database.max_connections)
        .connect(&configuration.database.url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let state = AppState::new(pool.clone(), configuration.auth.token.clone());

    TestApp { state, pool }
}

/// Seeds a balance row to an absolute amount.
pub async fn set_balance(pool: &PgPool, user_id: &str, currency: &str, amount: Decimal) {
    sqlx::query(
        r#"
        INSERT INTO balances (user_id, currency, amount, updated_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (user_id, currency) DO UPDATE
        SET amount = $3, updated_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(currency)
    .bind(amount)
    .execute(pool)
    .await
    .expect("Failed to seed balance");
}

pub async fn get_balance(pool: &PgPool, user_id: &str, currency: &str) -> Decimal {
    sqlx::query_scalar("SELECT amount FROM balances WHERE user_id = $1 AND currency = $2")
        .bind(user_id)
        .bind(currency)
        .fetch_one(pool)
        .await
        .expect("Failed to read balance")
}

pub async fn try_get_balance(pool: &PgPool, user_id: &str, currency: &str) -> Option<Decimal> {
    sqlx::query_scalar("SELECT amount FROM balances WHERE user_id = $1 AND currency = $2")
        .bind(user_id)
        .bind(currency)
        .fetch_optional(pool)
        .await
        .expect("Failed to read balance")
}

pub async fn count_withdrawals(pool: &PgPool, user_id: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM withdrawals WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count withdrawals")
}
