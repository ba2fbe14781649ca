//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and take defaults for the rest.

use chrono::NaiveDate;
use core_kernel::{Money, StudentId};
use domain_billing::{Invoice, InvoiceItem, InvoiceStatus};
use rust_decimal::Decimal;

use crate::fixtures::MoneyFixtures;

/// Builder for constructing test invoices
pub struct TestInvoiceBuilder {
    invoice_number: String,
    student_id: StudentId,
    items: Vec<InvoiceItem>,
    total_amount: Money,
    status: InvoiceStatus,
    due_date: Option<NaiveDate>,
}

impl Default for TestInvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestInvoiceBuilder {
    /// Creates a builder with a pending 1000-rupee invoice
    pub fn new() -> Self {
        Self {
            invoice_number: "INV-000001-001".to_string(),
            student_id: StudentId::new(),
            items: Vec::new(),
            total_amount: MoneyFixtures::course_total(),
            status: InvoiceStatus::Pending,
            due_date: None,
        }
    }

    /// Sets the invoice number
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.invoice_number = number.into();
        self
    }

    /// Sets the owning student
    pub fn with_student(mut self, student_id: StudentId) -> Self {
        self.student_id = student_id;
        self
    }

    /// Sets the total amount
    pub fn with_total(mut self, total: Money) -> Self {
        self.total_amount = total;
        self
    }

    /// Sets the status
    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the due date
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Adds a line item
    pub fn with_item(mut self, description: &str, quantity: Decimal, unit_price: Money) -> Self {
        self.items
            .push(InvoiceItem::new(description, unit_price).with_quantity(quantity));
        self
    }

    /// Builds the invoice
    pub fn build(self) -> Invoice {
        let mut invoice = Invoice::new(
            self.invoice_number,
            self.student_id,
            self.items,
            self.total_amount,
        );
        invoice.status = self.status;
        invoice.due_date = self.due_date;
        invoice
    }
}
