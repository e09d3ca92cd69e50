use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle of a withdrawal: `Pending` on creation, `Confirmed` or `Failed`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Confirmed,
    Failed,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Confirmed => "confirmed",
            WithdrawalStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WithdrawalStatus::Confirmed | WithdrawalStatus::Failed)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WithdrawalStatus::Pending),
            "confirmed" => Ok(WithdrawalStatus::Confirmed),
            "failed" => Ok(WithdrawalStatus::Failed),
            other => Err(format!("unknown withdrawal status: {other}")),
        }
    }
}

/// A recorded withdrawal. Immutable after creation except for `status` and
/// `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: Uuid,
    pub user_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub destination: String,
    pub idempotency_key: String,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-(user, currency) balance. A missing row reads as a zero balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: String,
    pub currency: String,
    pub amount: Decimal,
}

impl Balance {
    pub fn zero(user_id: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            currency: currency.into(),
            amount: Decimal::ZERO,
        }
    }
}

/// Validated request to create a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalReq {
    pub user_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub destination: String,
    pub idempotency_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            WithdrawalStatus::Pending,
            WithdrawalStatus::Confirmed,
            WithdrawalStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<WithdrawalStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_status_unknown_rejected() {
        assert!("processed".parse::<WithdrawalStatus>().is_err());
        assert!("PENDING".parse::<WithdrawalStatus>().is_err());
    }

    #[test]
    fn test_status_terminality() {
        assert!(!WithdrawalStatus::Pending.is_terminal());
        assert!(WithdrawalStatus::Confirmed.is_terminal());
        assert!(WithdrawalStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&WithdrawalStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }

    #[test]
    fn test_zero_balance() {
        let balance = Balance::zero("user-1", "USDT");
        assert_eq!(balance.amount, Decimal::ZERO);
        assert_eq!(balance.currency, "USDT");
    }
}
