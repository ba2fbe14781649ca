//! Billing domain errors

use thiserror::Error;

use core_kernel::{InvoiceId, MoneyError, PaymentId, PortError, StudentId};

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Referenced student does not exist
    #[error("Student not found: {0}")]
    StudentNotFound(StudentId),

    /// Referenced invoice does not exist
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Referenced payment does not exist
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// Malformed amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Generated or supplied invoice number is already in use
    #[error("Duplicate invoice number: {0}")]
    DuplicateInvoiceNumber(String),

    /// Currency arithmetic failure
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Failure reported by a collaborator port
    #[error(transparent)]
    Store(#[from] PortError),
}

impl BillingError {
    /// Returns true if this error means a referenced record was absent
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BillingError::StudentNotFound(_)
                | BillingError::InvoiceNotFound(_)
                | BillingError::PaymentNotFound(_)
        ) || matches!(self, BillingError::Store(e) if e.is_not_found())
    }
}
