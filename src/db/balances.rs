use rust_decimal::Decimal;
use sqlx::{PgConnection, PgExecutor, PgPool, Postgres, Transaction};

use crate::db::StoreError;
use crate::domain::Balance;

/// Reads the balance for a (user, currency) pair. A missing row reads as
/// zero, never as an error.
pub async fn get<'e, E>(exec: E, user_id: &str, currency: &str) -> Result<Balance, StoreError>
where
    E: PgExecutor<'e>,
{
    let row: Option<(Decimal,)> =
        sqlx::query_as("SELECT amount FROM balances WHERE user_id = $1 AND currency = $2")
            .bind(user_id)
            .bind(currency)
            .fetch_optional(exec)
            .await?;

    Ok(match row {
        Some((amount,)) => Balance {
            user_id: user_id.to_string(),
            currency: currency.to_string(),
            amount,
        },
        None => Balance::zero(user_id, currency),
    })
}

/// Applies a (possibly negative) delta with upsert semantics: a missing row
/// is created holding exactly the delta.
pub async fn apply_delta<'e, E>(
    exec: E,
    user_id: &str,
    currency: &str,
    delta: Decimal,
) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO balances (user_id, currency, amount, updated_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (user_id, currency) DO UPDATE
        SET amount = balances.amount + $3, updated_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(currency)
    .bind(delta)
    .execute(exec)
    .await?;

    Ok(())
}

/// An exclusively locked balance row inside an open serializable transaction.
///
/// Dropping the guard without calling [`BalanceLock::commit`] rolls the
/// transaction back, whether the exit is an early return, a `?`, or a panic
/// unwinding through the holder.
pub struct BalanceLock {
    tx: Transaction<'static, Postgres>,
}

impl BalanceLock {
    /// Executor routing store operations through the locked transaction.
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Opens a serializable transaction and takes an exclusive, non-blocking
/// lock on the user's balance row, creating a zero row for the requested
/// currency first if none exists. Contention surfaces immediately as
/// `StoreError::LockUnavailable` instead of queueing.
pub async fn lock(pool: &PgPool, user_id: &str, currency: &str) -> Result<BalanceLock, StoreError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut *tx)
        .await?;

    if try_lock_row(&mut tx, user_id, currency).await?.is_none() {
        sqlx::query(
            r#"
            INSERT INTO balances (user_id, currency, amount)
            VALUES ($1, $2, 0)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(currency)
        .execute(&mut *tx)
        .await?;

        // The insert either created the row in this transaction or found one
        // committed concurrently; both are lockable now.
        if try_lock_row(&mut tx, user_id, currency).await?.is_none() {
            return Err(StoreError::RowNotFound);
        }
    }

    Ok(BalanceLock { tx })
}

async fn try_lock_row(
    tx: &mut Transaction<'static, Postgres>,
    user_id: &str,
    currency: &str,
) -> Result<Option<String>, StoreError> {
    let locked = sqlx::query_scalar::<_, String>(
        r#"
        SELECT user_id FROM balances
        WHERE user_id = $1 AND currency = $2
        FOR UPDATE NOWAIT
        "#,
    )
    .bind(user_id)
    .bind(currency)
    .fetch_optional(&mut **tx)
    .await;

    match locked {
        Ok(row) => Ok(row),
        Err(err) if is_lock_unavailable(&err) => Err(StoreError::LockUnavailable),
        Err(err) => Err(err.into()),
    }
}

// Postgres lock_not_available
fn is_lock_unavailable(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("55P03")
    )
}
