//! Payment records
//!
//! A payment is a monetary transaction from a student, optionally earmarked
//! against a specific invoice. Payments are created once and never mutated
//! by the reconciliation path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{InvoiceId, Money, PaymentId, StudentId, UserId};

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Cash at the front desk
    Cash,
    /// Cheque
    Cheque,
    /// Bank transfer
    BankTransfer,
    /// Online payment
    Online,
}

impl PaymentMethod {
    /// Returns the wire representation used in the database and the API
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::BankTransfer => "bank-transfer",
            PaymentMethod::Online => "online",
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "cheque" => Ok(PaymentMethod::Cheque),
            "bank-transfer" => Ok(PaymentMethod::BankTransfer),
            "online" => Ok(PaymentMethod::Online),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

/// A payment record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Student the money came from
    pub student_id: StudentId,
    /// Payment amount
    pub amount: Money,
    /// When the payment was made
    pub payment_date: DateTime<Utc>,
    /// Payment method
    pub method: PaymentMethod,
    /// Free-text note
    pub description: Option<String>,
    /// Invoice this payment is earmarked against, if any
    pub invoice_id: Option<InvoiceId>,
    /// Staff member who recorded the payment
    pub recorded_by: Option<UserId>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_round_trip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Cheque,
            PaymentMethod::BankTransfer,
            PaymentMethod::Online,
        ] {
            let parsed: PaymentMethod = method.as_str().parse().unwrap();
            assert_eq!(parsed, method);
        }
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        assert!("crypto".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_method_serde_uses_kebab_case() {
        let json = serde_json::to_string(&PaymentMethod::BankTransfer).unwrap();
        assert_eq!(json, "\"bank-transfer\"");
    }
}
