use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{balances, withdrawals};
use crate::domain::{Withdrawal, WithdrawalReq, WithdrawalStatus};
use crate::error::ServiceError;

/// The withdrawal transaction engine. Stateless apart from the pool; safe to
/// clone across request handlers.
#[derive(Clone)]
pub struct WithdrawalService {
    pool: PgPool,
}

impl WithdrawalService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a withdrawal and debits the balance atomically.
    ///
    /// A replay with a known idempotency key and an identical payload
    /// returns the original withdrawal without touching the balance; the
    /// same key with a different payload is rejected.
    pub async fn create_withdrawal(&self, req: &WithdrawalReq) -> Result<Withdrawal, ServiceError> {
        // Fast path: answer replays without taking the row lock.
        if let Some(existing) =
            withdrawals::get_by_idempotency_key(&self.pool, &req.idempotency_key).await?
        {
            if existing.user_id != req.user_id
                || existing.amount != req.amount
                || existing.currency != req.currency
                || existing.destination != req.destination
            {
                return Err(ServiceError::IdempotencyKeyMismatch);
            }
            return Ok(existing);
        }

        let mut lock = balances::lock(&self.pool, &req.user_id, &req.currency).await?;

        // The probe above ran outside the lock; the balance must be re-read
        // under it before validating.
        let balance = balances::get(lock.conn(), &req.user_id, &req.currency).await?;
        if balance.amount < req.amount {
            return Err(ServiceError::InsufficientBalance);
        }

        let now = Utc::now();
        let withdrawal = Withdrawal {
            id: Uuid::new_v4(),
            user_id: req.user_id.clone(),
            amount: req.amount,
            currency: req.currency.clone(),
            destination: req.destination.clone(),
            idempotency_key: req.idempotency_key.clone(),
            status: WithdrawalStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        // Insert before debit; both commit or neither does.
        withdrawals::insert(lock.conn(), &withdrawal).await?;
        balances::apply_delta(lock.conn(), &req.user_id, &req.currency, -req.amount).await?;

        lock.commit().await?;
        Ok(withdrawal)
    }

    pub async fn get_withdrawal(&self, id: Uuid) -> Result<Withdrawal, ServiceError> {
        withdrawals::get_by_id(&self.pool, id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Marks a pending withdrawal confirmed. Confirming a withdrawal that
    /// already reached a terminal status is a no-op, so retries are safe.
    pub async fn confirm_withdrawal(&self, id: Uuid) -> Result<(), ServiceError> {
        let withdrawal = self.get_withdrawal(id).await?;

        if withdrawal.status != WithdrawalStatus::Pending {
            return Ok(());
        }

        withdrawals::update_status(&self.pool, id, WithdrawalStatus::Confirmed).await?;
        Ok(())
    }
}
