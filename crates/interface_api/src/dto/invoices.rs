//! Invoice DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_billing::{Invoice, InvoiceItem};

use super::payments::PaymentResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub student_id: Uuid,
    #[validate(nested)]
    #[serde(default)]
    pub items: Vec<InvoiceItemRequest>,
    /// Billed total; derived from the items when absent
    pub total_amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InvoiceItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub description: String,
    pub quantity: Option<Decimal>,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// One of: pending, partial, paid, cancelled
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    pub student_id: Option<Uuid>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceItemResponse {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
}

impl From<&InvoiceItem> for InvoiceItemResponse {
    fn from(item: &InvoiceItem) -> Self {
        Self {
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.amount(),
            total: item.total().amount(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub student_id: Uuid,
    pub items: Vec<InvoiceItemResponse>,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: String,
    pub generated_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Invoice> for InvoiceResponse {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: (*invoice.id.as_uuid()),
            invoice_number: invoice.invoice_number.clone(),
            student_id: (*invoice.student_id.as_uuid()),
            items: invoice.items.iter().map(InvoiceItemResponse::from).collect(),
            total_amount: invoice.total_amount.amount(),
            currency: invoice.total_amount.currency().code().to_string(),
            status: invoice.status.as_str().to_string(),
            generated_date: invoice.generated_date,
            due_date: invoice.due_date,
            pdf_path: invoice.pdf_path.clone(),
            created_at: invoice.created_at,
        }
    }
}

/// Invoice detail including its payment history, newest first
#[derive(Debug, Serialize)]
pub struct InvoiceDetailResponse {
    #[serde(flatten)]
    pub invoice: InvoiceResponse,
    pub payments: Vec<PaymentResponse>,
}
