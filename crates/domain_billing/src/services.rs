//! Billing application service
//!
//! `BillingService` is the entry point the HTTP layer calls. It owns the
//! billing operations: recording payments (with reconciliation),
//! creating invoices (with number generation and best-effort document
//! rendering), student financial summaries, and the financial report.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use core_kernel::{InvoiceId, Money, PaymentId, StudentId, UserId};
use domain_student::StudentDirectory;

use crate::error::BillingError;
use crate::financials::StudentFinancials;
use crate::invoice::{Invoice, InvoiceItem, InvoiceStatus};
use crate::invoice_number::next_invoice_number;
use crate::payment::{Payment, PaymentMethod};
use crate::ports::{
    BillingStore, InvoiceQuery, InvoiceRenderer, MethodTotal, NewPayment, PaymentApplied,
    PaymentQuery, Period, StatusTotal,
};

/// Command for recording a payment
#[derive(Debug, Clone)]
pub struct RecordPayment {
    pub student_id: StudentId,
    pub amount: Money,
    pub payment_date: Option<chrono::DateTime<chrono::Utc>>,
    pub method: PaymentMethod,
    pub description: Option<String>,
    pub invoice_id: Option<InvoiceId>,
    pub recorded_by: Option<UserId>,
}

/// Command for creating an invoice
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub student_id: StudentId,
    pub items: Vec<InvoiceItem>,
    /// Billed total; derived from the items when absent
    pub total_amount: Option<Money>,
    pub due_date: Option<NaiveDate>,
}

/// Aggregated financial report over a period
#[derive(Debug, Clone, Serialize)]
pub struct FinancialReport {
    /// Σ payment amount in the period
    pub total_revenue: Money,
    /// Σ invoice total_amount generated in the period
    pub total_invoiced: Money,
    /// Σ per-invoice `max(0, total − paid)`; unlike the per-student
    /// outstanding balance, the report view floors each invoice at zero
    pub outstanding: Money,
    /// Payments in the period grouped by method
    #[serde(skip)]
    pub payments_by_method: Vec<MethodTotal>,
    /// Invoices generated in the period grouped by status
    #[serde(skip)]
    pub invoices_by_status: Vec<StatusTotal>,
    /// Most recent payments in the period, newest first
    #[serde(skip)]
    pub recent_payments: Vec<Payment>,
}

/// The billing reconciliation engine
///
/// Holds the collaborator ports; all operations run to completion within
/// one call, with the only transactional boundary living inside
/// [`BillingStore::apply_payment`].
#[derive(Clone)]
pub struct BillingService {
    store: Arc<dyn BillingStore>,
    students: Arc<dyn StudentDirectory>,
    renderer: Arc<dyn InvoiceRenderer>,
}

impl BillingService {
    /// Creates the service over its collaborator ports
    pub fn new(
        store: Arc<dyn BillingStore>,
        students: Arc<dyn StudentDirectory>,
        renderer: Arc<dyn InvoiceRenderer>,
    ) -> Self {
        Self {
            store,
            students,
            renderer,
        }
    }

    /// Records a payment and reconciles the referenced invoice, if any
    ///
    /// # Errors
    ///
    /// - `StudentNotFound` if the student does not exist; no payment is
    ///   persisted in that case
    /// - `InvalidAmount` for negative amounts
    pub async fn record_payment(
        &self,
        command: RecordPayment,
    ) -> Result<PaymentApplied, BillingError> {
        if command.amount.is_negative() {
            return Err(BillingError::InvalidAmount(format!(
                "payment amount must not be negative, got {}",
                command.amount
            )));
        }

        self.require_student(command.student_id).await?;

        let applied = self
            .store
            .apply_payment(NewPayment {
                student_id: command.student_id,
                amount: command.amount,
                payment_date: command.payment_date,
                method: command.method,
                description: command.description,
                invoice_id: command.invoice_id,
                recorded_by: command.recorded_by,
            })
            .await?;

        match &applied.invoice {
            Some(invoice) => info!(
                payment = %applied.payment.id,
                invoice = %invoice.invoice_number,
                status = %invoice.status,
                "payment recorded and invoice reconciled"
            ),
            None => info!(payment = %applied.payment.id, "payment recorded"),
        }

        Ok(applied)
    }

    /// Creates a pending invoice and renders its document best-effort
    ///
    /// Rendering failure is logged and swallowed; the invoice stands with
    /// `pdf_path` unset.
    pub async fn create_invoice(&self, command: CreateInvoice) -> Result<Invoice, BillingError> {
        let student = self
            .students
            .get_student(command.student_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    BillingError::StudentNotFound(command.student_id)
                } else {
                    BillingError::Store(e)
                }
            })?;

        let total_amount = match command.total_amount {
            Some(total) => total,
            None => command
                .items
                .iter()
                .try_fold(Money::zero(Default::default()), |acc, item| {
                    acc.checked_add(&item.total())
                })?,
        };
        if total_amount.is_negative() {
            return Err(BillingError::InvalidAmount(format!(
                "invoice total must not be negative, got {}",
                total_amount
            )));
        }

        let number = next_invoice_number(self.store.as_ref()).await?;
        let mut invoice = Invoice::new(number, command.student_id, command.items, total_amount);
        if let Some(due) = command.due_date {
            invoice = invoice.with_due_date(due);
        }

        self.store.insert_invoice(&invoice).await.map_err(|e| {
            if e.is_conflict() {
                BillingError::DuplicateInvoiceNumber(invoice.invoice_number.clone())
            } else {
                BillingError::Store(e)
            }
        })?;

        // Non-fatal: the invoice write stands even when rendering fails.
        match self.renderer.render_invoice(&invoice, &student).await {
            Ok(path) => {
                self.store.set_invoice_pdf_path(invoice.id, &path).await?;
                invoice.pdf_path = Some(path);
            }
            Err(e) => {
                warn!(
                    invoice = %invoice.invoice_number,
                    error = %e,
                    "invoice document rendering failed, continuing without artifact"
                );
            }
        }

        info!(invoice = %invoice.invoice_number, total = %invoice.total_amount, "invoice created");
        Ok(invoice)
    }

    /// Computes the on-demand financial summary for a student
    pub async fn student_financials(
        &self,
        student_id: StudentId,
    ) -> Result<StudentFinancials, BillingError> {
        self.require_student(student_id).await?;
        let totals = self.store.student_totals(student_id).await?;
        Ok(StudentFinancials::from_totals(totals)?)
    }

    /// Fetches an invoice together with its payments, newest first
    pub async fn invoice_with_payments(
        &self,
        id: InvoiceId,
    ) -> Result<(Invoice, Vec<Payment>), BillingError> {
        let invoice = self.store.get_invoice(id).await.map_err(|e| {
            if e.is_not_found() {
                BillingError::InvoiceNotFound(id)
            } else {
                BillingError::Store(e)
            }
        })?;
        let payments = self
            .store
            .list_payments(PaymentQuery {
                invoice_id: Some(id),
                ..Default::default()
            })
            .await?;
        Ok((invoice, payments))
    }

    /// Lists invoices matching the query
    pub async fn list_invoices(&self, query: InvoiceQuery) -> Result<Vec<Invoice>, BillingError> {
        Ok(self.store.list_invoices(query).await?)
    }

    /// Lists payments matching the query
    pub async fn list_payments(&self, query: PaymentQuery) -> Result<Vec<Payment>, BillingError> {
        Ok(self.store.list_payments(query).await?)
    }

    /// Fetches a single payment
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, BillingError> {
        self.store.get_payment(id).await.map_err(|e| {
            if e.is_not_found() {
                BillingError::PaymentNotFound(id)
            } else {
                BillingError::Store(e)
            }
        })
    }

    /// Applies an explicit status update to an invoice
    ///
    /// This is the only path that may set `Cancelled`; reconciliation never
    /// will, and never moves an invoice away from it.
    pub async fn update_invoice_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
    ) -> Result<Invoice, BillingError> {
        self.store.update_invoice_status(id, status).await.map_err(|e| {
            if e.is_not_found() {
                BillingError::InvoiceNotFound(id)
            } else {
                BillingError::Store(e)
            }
        })
    }

    /// Builds the financial report over a period
    pub async fn financial_report(&self, period: Period) -> Result<FinancialReport, BillingError> {
        let invoices = self
            .store
            .list_invoices(InvoiceQuery {
                generated_within: period.clone(),
                ..Default::default()
            })
            .await?;

        let invoice_ids: Vec<InvoiceId> = invoices.iter().map(|inv| inv.id).collect();
        let paid_totals = self.store.paid_totals(&invoice_ids).await?;

        let mut total_invoiced = Money::zero(Default::default());
        let mut outstanding = Money::zero(Default::default());
        for invoice in &invoices {
            total_invoiced = total_invoiced.checked_add(&invoice.total_amount)?;
            let paid = paid_totals
                .get(&invoice.id)
                .copied()
                .unwrap_or_else(|| Money::zero(invoice.total_amount.currency()));
            if paid < invoice.total_amount {
                let shortfall = invoice.total_amount.checked_sub(&paid)?;
                outstanding = outstanding.checked_add(&shortfall)?;
            }
        }

        let payments_by_method = self.store.payments_by_method(&period).await?;
        let mut total_revenue = Money::zero(Default::default());
        for bucket in &payments_by_method {
            total_revenue = total_revenue.checked_add(&bucket.total)?;
        }

        let invoices_by_status = self.store.invoices_by_status(&period).await?;
        let recent_payments = self
            .store
            .list_payments(PaymentQuery {
                paid_within: period,
                limit: Some(10),
                ..Default::default()
            })
            .await?;

        Ok(FinancialReport {
            total_revenue,
            total_invoiced,
            outstanding,
            payments_by_method,
            invoices_by_status,
            recent_payments,
        })
    }

    async fn require_student(&self, id: StudentId) -> Result<(), BillingError> {
        match self.students.get_student(id).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Err(BillingError::StudentNotFound(id)),
            Err(e) => Err(BillingError::Store(e)),
        }
    }
}
