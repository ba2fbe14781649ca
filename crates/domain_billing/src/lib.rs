//! Billing Domain - Invoice/Payment Reconciliation
//!
//! This crate keeps an invoice's status consistent with the payment ledger
//! and derives per-student financial summaries on demand.
//!
//! # Reconciliation Rules
//!
//! An invoice's status is a function of its total and the sum of payments
//! recorded against it:
//!
//! - `Paid` once the paid sum reaches the total
//! - `Partial` once any positive amount is paid
//! - `Cancelled` is only ever set by an explicit external update and is
//!   never overwritten by reconciliation
//! - reconciliation never demotes a status
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{BillingService, RecordPayment};
//!
//! let service = BillingService::new(store, students, renderer);
//!
//! // Recording a payment against an invoice reconciles its status
//! let applied = service.record_payment(RecordPayment {
//!     student_id,
//!     amount: Money::rupees(dec!(400)),
//!     invoice_id: Some(invoice_id),
//!     ..Default::default()
//! }).await?;
//! ```

pub mod invoice;
pub mod payment;
pub mod reconcile;
pub mod invoice_number;
pub mod financials;
pub mod ports;
pub mod services;
pub mod error;

pub use invoice::{Invoice, InvoiceItem, InvoiceStatus};
pub use payment::{Payment, PaymentMethod};
pub use reconcile::reconcile_status;
pub use invoice_number::next_invoice_number;
pub use financials::StudentFinancials;
pub use ports::{
    BillingStore, InvoiceRenderer, NewPayment, PaymentApplied,
    InvoiceQuery, PaymentQuery, Period, StudentTotals, MethodTotal, StatusTotal,
};
pub use services::{BillingService, CreateInvoice, RecordPayment, FinancialReport};
pub use error::BillingError;
