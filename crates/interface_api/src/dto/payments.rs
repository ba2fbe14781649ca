//! Payment DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_billing::Payment;

#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub student_id: Uuid,
    /// Amount in the school's billing currency (INR)
    pub amount: Decimal,
    pub payment_date: Option<DateTime<Utc>>,
    /// One of: cash, cheque, bank-transfer, online. Defaults to cash.
    pub method: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub invoice_id: Option<Uuid>,
    pub recorded_by: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    pub student_id: Option<Uuid>,
    pub invoice_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub payment_date: DateTime<Utc>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: (*payment.id.as_uuid()),
            student_id: (*payment.student_id.as_uuid()),
            amount: payment.amount.amount(),
            currency: payment.amount.currency().code().to_string(),
            payment_date: payment.payment_date,
            method: payment.method.as_str().to_string(),
            description: payment.description.clone(),
            invoice_id: payment.invoice_id.map(|id| *id.as_uuid()),
            created_at: payment.created_at,
        }
    }
}

/// Response for a recorded payment, carrying the reconciled invoice status
#[derive(Debug, Serialize)]
pub struct PaymentAppliedResponse {
    pub payment: PaymentResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_status: Option<String>,
}
