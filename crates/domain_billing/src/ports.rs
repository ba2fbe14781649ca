//! Billing Domain Ports
//!
//! The billing engine talks to two collaborators through these traits:
//!
//! - [`BillingStore`]: the persistence layer holding invoices and payments,
//!   with the handful of filtered lookups and sum aggregations the engine
//!   needs. Implemented by `infra_db::PgBillingStore` and the in-memory
//!   store in `test_utils`.
//! - [`InvoiceRenderer`]: the document generator producing a printable
//!   invoice artifact. Implemented by `infra_documents`. Its failures are
//!   swallowed by the service; an invoice without a document is still a
//!   valid invoice.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use core_kernel::{DomainPort, InvoiceId, Money, PaymentId, PortError, StudentId, UserId};
use domain_student::Student;

use crate::invoice::{Invoice, InvoiceStatus};
use crate::payment::{Payment, PaymentMethod};

/// Data for recording a new payment
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Student the money came from
    pub student_id: StudentId,
    /// Payment amount
    pub amount: Money,
    /// When the payment was made; defaults to now
    pub payment_date: Option<DateTime<Utc>>,
    /// Payment method
    pub method: PaymentMethod,
    /// Free-text note
    pub description: Option<String>,
    /// Invoice this payment is earmarked against
    pub invoice_id: Option<InvoiceId>,
    /// Staff member recording the payment
    pub recorded_by: Option<UserId>,
}

impl NewPayment {
    /// Materializes the payment record, assigning an id and defaulting the
    /// payment date to now
    pub fn into_payment(self) -> Payment {
        let now = Utc::now();
        Payment {
            id: PaymentId::new_v7(),
            student_id: self.student_id,
            amount: self.amount,
            payment_date: self.payment_date.unwrap_or(now),
            method: self.method,
            description: self.description,
            invoice_id: self.invoice_id,
            recorded_by: self.recorded_by,
            created_at: now,
        }
    }
}

/// Result of applying a payment to the ledger
#[derive(Debug, Clone)]
pub struct PaymentApplied {
    /// The persisted payment
    pub payment: Payment,
    /// The reconciled invoice, when the payment referenced one that exists
    pub invoice: Option<Invoice>,
}

/// An inclusive date-time window for report and listing filters
///
/// Mirrors the query-parameter convention of the HTTP layer: an end *date*
/// covers the whole day it names.
#[derive(Debug, Clone, Default)]
pub struct Period {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Period {
    /// Builds a period from optional calendar dates, extending the end date
    /// to the last instant of that day
    pub fn from_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            from: start.map(|d| d.and_time(NaiveTime::MIN).and_utc()),
            to: end.map(|d| {
                d.and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap())
                    .and_utc()
            }),
        }
    }

    /// Returns true if the instant falls inside the period
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }

    /// Returns true if no bound is set
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Query parameters for listing invoices
#[derive(Debug, Clone, Default)]
pub struct InvoiceQuery {
    /// Filter by owning student
    pub student_id: Option<StudentId>,
    /// Filter by status
    pub status: Option<InvoiceStatus>,
    /// Filter by generation date
    pub generated_within: Period,
}

/// Query parameters for listing payments
#[derive(Debug, Clone, Default)]
pub struct PaymentQuery {
    /// Filter by paying student
    pub student_id: Option<StudentId>,
    /// Filter by referenced invoice
    pub invoice_id: Option<InvoiceId>,
    /// Filter by payment date
    pub paid_within: Period,
    /// Limit results
    pub limit: Option<u32>,
}

/// Lifetime payment/invoice sums for one student
#[derive(Debug, Clone, Copy)]
pub struct StudentTotals {
    /// Σ invoice total_amount over the student's invoices
    pub total_invoiced: Money,
    /// Σ payment amount over the student's payments
    pub total_paid: Money,
}

/// Aggregated payments for one method
#[derive(Debug, Clone)]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub total: Money,
    pub count: u64,
}

/// Aggregated invoices for one status
#[derive(Debug, Clone)]
pub struct StatusTotal {
    pub status: InvoiceStatus,
    pub total: Money,
    pub count: u64,
}

/// Port over the invoice/payment collections
///
/// Listing operations return records newest first (payments by payment
/// date, invoices by generation date).
#[async_trait]
pub trait BillingStore: DomainPort {
    /// Persists a new invoice
    ///
    /// # Errors
    ///
    /// Returns `PortError::Conflict` if the invoice number is already taken.
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), PortError>;

    /// Fetches an invoice by id
    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError>;

    /// Lists invoices matching the query, newest first
    async fn list_invoices(&self, query: InvoiceQuery) -> Result<Vec<Invoice>, PortError>;

    /// Applies an explicit status update (e.g. cancellation) and returns the
    /// updated invoice
    async fn update_invoice_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
    ) -> Result<Invoice, PortError>;

    /// Records the path of the rendered invoice document
    async fn set_invoice_pdf_path(&self, id: InvoiceId, path: &str) -> Result<(), PortError>;

    /// Returns true if an invoice already carries this number
    async fn invoice_number_exists(&self, number: &str) -> Result<bool, PortError>;

    /// Persists a payment and reconciles the referenced invoice, atomically
    ///
    /// When the payment names an invoice that exists, the implementation
    /// must, within a single transaction serialized on that invoice row:
    /// insert the payment, recompute the paid sum over all payments
    /// referencing the invoice, and write the status derived by
    /// [`crate::reconcile_status`]. A payment naming a missing invoice is
    /// persisted without any invoice update.
    async fn apply_payment(&self, payment: NewPayment) -> Result<PaymentApplied, PortError>;

    /// Fetches a payment by id
    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError>;

    /// Lists payments matching the query, newest first
    async fn list_payments(&self, query: PaymentQuery) -> Result<Vec<Payment>, PortError>;

    /// Σ payment amount per invoice, for every listed invoice that has
    /// payments; invoices with none are absent from the map
    async fn paid_totals(
        &self,
        ids: &[InvoiceId],
    ) -> Result<HashMap<InvoiceId, Money>, PortError>;

    /// Lifetime invoice/payment sums for a student
    async fn student_totals(&self, id: StudentId) -> Result<StudentTotals, PortError>;

    /// Payments within the period grouped by method
    async fn payments_by_method(&self, period: &Period) -> Result<Vec<MethodTotal>, PortError>;

    /// Invoices generated within the period grouped by status
    async fn invoices_by_status(&self, period: &Period) -> Result<Vec<StatusTotal>, PortError>;
}

/// Port producing a printable artifact for a reconciled invoice
#[async_trait]
pub trait InvoiceRenderer: DomainPort {
    /// Renders the invoice and returns the storage path of the artifact
    async fn render_invoice(&self, invoice: &Invoice, student: &Student)
        -> Result<String, PortError>;
}
