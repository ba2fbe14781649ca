//! Student billing DTOs

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use domain_billing::StudentFinancials;

/// Financial summary for one student
///
/// `outstanding` carries its sign: an overpaid student reports a negative
/// balance rather than zero.
#[derive(Debug, Serialize)]
pub struct FinancialsResponse {
    pub student_id: Uuid,
    pub total_paid: Decimal,
    pub total_invoiced: Decimal,
    pub outstanding: Decimal,
    pub currency: String,
}

impl FinancialsResponse {
    pub fn new(student_id: Uuid, financials: &StudentFinancials) -> Self {
        Self {
            student_id,
            total_paid: financials.total_paid.amount(),
            total_invoiced: financials.total_invoiced.amount(),
            outstanding: financials.outstanding.amount(),
            currency: financials.outstanding.currency().code().to_string(),
        }
    }
}
