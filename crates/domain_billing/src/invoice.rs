//! Invoice management
//!
//! This module holds the invoice entity billed to a student for lessons
//! and fees, tracked through a payment-status lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use core_kernel::{InvoiceId, Money, StudentId};

/// Invoice status
///
/// `Pending` and `Cancelled` are set externally; `Partial` and `Paid` are
/// derived by reconciliation against the payment ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Issued, nothing paid yet
    Pending,
    /// Partial payment received
    Partial,
    /// Fully paid
    Paid,
    /// Cancelled/voided by an explicit update
    Cancelled,
}

impl InvoiceStatus {
    /// Returns the wire representation used in the database and the API
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "partial" => Ok(InvoiceStatus::Partial),
            "paid" => Ok(InvoiceStatus::Paid),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            other => Err(format!("unknown invoice status: {}", other)),
        }
    }
}

/// An invoice issued to a student
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Invoice number (human-readable, globally unique)
    pub invoice_number: String,
    /// Student being billed
    pub student_id: StudentId,
    /// Line items
    pub items: Vec<InvoiceItem>,
    /// Total billed amount
    pub total_amount: Money,
    /// Status
    pub status: InvoiceStatus,
    /// When the invoice was generated
    pub generated_date: DateTime<Utc>,
    /// Payment due date
    pub due_date: Option<NaiveDate>,
    /// Path of the rendered document, if one was produced
    pub pdf_path: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a new pending invoice
    ///
    /// # Arguments
    ///
    /// * `invoice_number` - Globally unique, generated number
    /// * `student_id` - Student being billed
    /// * `items` - Line items
    /// * `total_amount` - Total billed amount
    pub fn new(
        invoice_number: impl Into<String>,
        student_id: StudentId,
        items: Vec<InvoiceItem>,
        total_amount: Money,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: InvoiceId::new_v7(),
            invoice_number: invoice_number.into(),
            student_id,
            items,
            total_amount,
            status: InvoiceStatus::Pending,
            generated_date: now,
            due_date: None,
            pdf_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the due date
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sums the line item totals
    pub fn items_total(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(self.total_amount.currency()), |acc, item| {
                acc + item.total()
            })
    }

    /// Checks if the invoice is past due and still collectible
    pub fn is_overdue(&self) -> bool {
        match self.due_date {
            Some(due) => {
                Utc::now().date_naive() > due
                    && !matches!(self.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
            }
            None => false,
        }
    }
}

/// A line item on an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Item ID
    pub id: Uuid,
    /// Description
    pub description: String,
    /// Quantity
    pub quantity: Decimal,
    /// Unit price
    pub unit_price: Money,
}

impl InvoiceItem {
    /// Creates a new single-quantity line item
    pub fn new(description: impl Into<String>, unit_price: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            quantity: Decimal::ONE,
            unit_price,
        }
    }

    /// Sets the quantity
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    /// Calculates the total for this item
    pub fn total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn rupees(amount: Decimal) -> Money {
        Money::new(amount, Currency::INR)
    }

    #[test]
    fn test_new_invoice_is_pending() {
        let invoice = Invoice::new(
            "INV-123456-001",
            StudentId::new(),
            vec![],
            rupees(dec!(1000)),
        );

        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert!(invoice.pdf_path.is_none());
        assert!(invoice.due_date.is_none());
    }

    #[test]
    fn test_items_total() {
        let items = vec![
            InvoiceItem::new("Basic driving course", rupees(dec!(500))).with_quantity(dec!(2)),
            InvoiceItem::new("Highway lesson", rupees(dec!(300))),
        ];
        let invoice = Invoice::new("INV-1", StudentId::new(), items, rupees(dec!(1300)));

        assert_eq!(invoice.items_total().amount(), dec!(1300));
    }

    #[test]
    fn test_overdue_requires_due_date() {
        let invoice = Invoice::new("INV-1", StudentId::new(), vec![], rupees(dec!(100)));
        assert!(!invoice.is_overdue());

        let past_due = invoice.with_due_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(past_due.is_overdue());
    }

    #[test]
    fn test_paid_invoice_is_never_overdue() {
        let mut invoice = Invoice::new("INV-1", StudentId::new(), vec![], rupees(dec!(100)))
            .with_due_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        invoice.status = InvoiceStatus::Paid;

        assert!(!invoice.is_overdue());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            InvoiceStatus::Pending,
            InvoiceStatus::Partial,
            InvoiceStatus::Paid,
            InvoiceStatus::Cancelled,
        ] {
            let parsed: InvoiceStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("overdue".parse::<InvoiceStatus>().is_err());
    }
}
