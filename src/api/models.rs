use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::WithdrawalReq;

#[derive(Debug, Deserialize)]
pub struct CreateWithdrawalRequest {
    pub user_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub destination: String,
    pub idempotency_key: String,
}

impl CreateWithdrawalRequest {
    /// Boundary validation; the engine never sees empty fields or a
    /// non-positive amount.
    pub fn validate(&self) -> Result<(), String> {
        if self.user_id.trim().is_empty() {
            return Err("user_id must not be empty".to_string());
        }
        if self.amount <= Decimal::ZERO {
            return Err("amount must be positive".to_string());
        }
        if self.currency.trim().is_empty() {
            return Err("currency must not be empty".to_string());
        }
        if self.destination.trim().is_empty() {
            return Err("destination must not be empty".to_string());
        }
        if self.idempotency_key.trim().is_empty() {
            return Err("idempotency_key must not be empty".to_string());
        }
        Ok(())
    }

    pub fn into_req(self) -> WithdrawalReq {
        WithdrawalReq {
            user_id: self.user_id,
            amount: self.amount,
            currency: self.currency,
            destination: self.destination,
            idempotency_key: self.idempotency_key,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateWithdrawalRequest {
        CreateWithdrawalRequest {
            user_id: "user-123".to_string(),
            amount: "100".parse().unwrap(),
            currency: "USDT".to_string(),
            destination: "0x123".to_string(),
            idempotency_key: "key-123".to_string(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut req = valid_request();
        req.amount = Decimal::ZERO;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut req = valid_request();
        req.amount = "-5".parse().unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_blank_fields_rejected() {
        for field in ["user_id", "currency", "destination", "idempotency_key"] {
            let mut req = valid_request();
            match field {
                "user_id" => req.user_id = "  ".to_string(),
                "currency" => req.currency = String::new(),
                "destination" => req.destination = String::new(),
                _ => req.idempotency_key = String::new(),
            }
            assert!(req.validate().is_err(), "{field} should be required");
        }
    }
}
