use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::db::StoreError;
use crate::domain::{Withdrawal, WithdrawalStatus};

#[derive(Debug, FromRow)]
struct WithdrawalRow {
    id: Uuid,
    user_id: String,
    amount: Decimal,
    currency: String,
    destination: String,
    idempotency_key: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WithdrawalRow> for Withdrawal {
    type Error = StoreError;

    fn try_from(row: WithdrawalRow) -> Result<Self, StoreError> {
        let status: WithdrawalStatus = row.status.parse().map_err(StoreError::Decode)?;
        Ok(Withdrawal {
            id: row.id,
            user_id: row.user_id,
            amount: row.amount,
            currency: row.currency,
            destination: row.destination,
            idempotency_key: row.idempotency_key,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Inserts a withdrawal row. A unique violation on the idempotency key is
/// surfaced as `StoreError::DuplicateKey`.
pub async fn insert<'e, E>(exec: E, withdrawal: &Withdrawal) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO withdrawals (id, user_id, amount, currency, destination, idempotency_key, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(withdrawal.id)
    .bind(&withdrawal.user_id)
    .bind(withdrawal.amount)
    .bind(&withdrawal.currency)
    .bind(&withdrawal.destination)
    .bind(&withdrawal.idempotency_key)
    .bind(withdrawal.status.as_str())
    .bind(withdrawal.created_at)
    .bind(withdrawal.updated_at)
    .execute(exec)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(err) if is_idempotency_key_violation(&err) => Err(StoreError::DuplicateKey),
        Err(err) => Err(err.into()),
    }
}

pub async fn get_by_id<'e, E>(exec: E, id: Uuid) -> Result<Option<Withdrawal>, StoreError>
where
    E: PgExecutor<'e>,
{
    let row: Option<WithdrawalRow> = sqlx::query_as(
        r#"
        SELECT id, user_id, amount, currency, destination, idempotency_key, status, created_at, updated_at
        FROM withdrawals WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(exec)
    .await?;

    row.map(Withdrawal::try_from).transpose()
}

/// Probe by idempotency key. `None` means the key has never been seen, which
/// is not an error.
pub async fn get_by_idempotency_key<'e, E>(
    exec: E,
    key: &str,
) -> Result<Option<Withdrawal>, StoreError>
where
    E: PgExecutor<'e>,
{
    let row: Option<WithdrawalRow> = sqlx::query_as(
        r#"
        SELECT id, user_id, amount, currency, destination, idempotency_key, status, created_at, updated_at
        FROM withdrawals WHERE idempotency_key = $1
        "#,
    )
    .bind(key)
    .fetch_optional(exec)
    .await?;

    row.map(Withdrawal::try_from).transpose()
}

pub async fn update_status<'e, E>(
    exec: E,
    id: Uuid,
    status: WithdrawalStatus,
) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE withdrawals
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .execute(exec)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::RowNotFound);
    }
    Ok(())
}

fn is_idempotency_key_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db)
            if db.code().as_deref() == Some("23505")
                && db.constraint() == Some("withdrawals_idempotency_key_key")
    )
}
