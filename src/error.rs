use thiserror::Error;

use crate::db::StoreError;

/// Error kinds surfaced by the withdrawal engine. The HTTP boundary is the
/// only layer that turns these into transport outcomes.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("duplicate request")]
    DuplicateRequest,
    #[error("withdrawal not found")]
    NotFound,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("idempotency key mismatch")]
    IdempotencyKeyMismatch,
    #[error("lock timeout")]
    LockTimeout,
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            // A unique violation on the idempotency key means a concurrent
            // create with the same key won the race.
            StoreError::DuplicateKey => ServiceError::DuplicateRequest,
            StoreError::LockUnavailable => ServiceError::LockTimeout,
            StoreError::RowNotFound => ServiceError::NotFound,
            other => ServiceError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_translation() {
        assert!(matches!(
            ServiceError::from(StoreError::DuplicateKey),
            ServiceError::DuplicateRequest
        ));
        assert!(matches!(
            ServiceError::from(StoreError::LockUnavailable),
            ServiceError::LockTimeout
        ));
        assert!(matches!(
            ServiceError::from(StoreError::RowNotFound),
            ServiceError::NotFound
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Db(sqlx::Error::PoolClosed)),
            ServiceError::Store(_)
        ));
    }
}
