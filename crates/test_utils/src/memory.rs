//! In-memory port implementations
//!
//! Hash-map backed implementations of the domain ports, used by the
//! service-level tests. `apply_payment` mirrors the transactional contract
//! of the real store: the paid sum includes the just-inserted payment and
//! the status is derived by `reconcile_status` before the lock is released.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use core_kernel::{Currency, DomainPort, InvoiceId, Money, PaymentId, PortError, StudentId};
use domain_billing::{
    reconcile_status, BillingStore, Invoice, InvoiceQuery, InvoiceRenderer, InvoiceStatus,
    MethodTotal, NewPayment, Payment, PaymentApplied, PaymentQuery, Period, StatusTotal,
    StudentTotals,
};
use domain_student::{Student, StudentDirectory, StudentQuery};

#[derive(Default)]
struct BillingState {
    invoices: HashMap<InvoiceId, Invoice>,
    payments: Vec<Payment>,
}

/// In-memory [`BillingStore`]
#[derive(Default)]
pub struct InMemoryBillingStore {
    state: Mutex<BillingState>,
}

impl InMemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an invoice directly, bypassing number generation
    pub fn seed_invoice(&self, invoice: Invoice) {
        let mut state = self.state.lock().unwrap();
        state.invoices.insert(invoice.id, invoice);
    }

    /// Number of payments currently stored
    pub fn payment_count(&self) -> usize {
        self.state.lock().unwrap().payments.len()
    }
}

impl DomainPort for InMemoryBillingStore {}

fn sum_amounts<'a>(amounts: impl Iterator<Item = &'a Money>) -> Result<Money, PortError> {
    let mut total = Money::zero(Currency::INR);
    for amount in amounts {
        total = total
            .checked_add(amount)
            .map_err(|e| PortError::internal(e.to_string()))?;
    }
    Ok(total)
}

#[async_trait]
impl BillingStore for InMemoryBillingStore {
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        if state
            .invoices
            .values()
            .any(|existing| existing.invoice_number == invoice.invoice_number)
        {
            return Err(PortError::conflict(format!(
                "invoice number {} already exists",
                invoice.invoice_number
            )));
        }
        state.invoices.insert(invoice.id, invoice.clone());
        Ok(())
    }

    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        self.state
            .lock()
            .unwrap()
            .invoices
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Invoice", id))
    }

    async fn list_invoices(&self, query: InvoiceQuery) -> Result<Vec<Invoice>, PortError> {
        let state = self.state.lock().unwrap();
        let mut invoices: Vec<Invoice> = state
            .invoices
            .values()
            .filter(|inv| query.student_id.map_or(true, |id| inv.student_id == id))
            .filter(|inv| query.status.map_or(true, |s| inv.status == s))
            .filter(|inv| query.generated_within.contains(inv.generated_date))
            .cloned()
            .collect();
        invoices.sort_by(|a, b| b.generated_date.cmp(&a.generated_date));
        Ok(invoices)
    }

    async fn update_invoice_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
    ) -> Result<Invoice, PortError> {
        let mut state = self.state.lock().unwrap();
        let invoice = state
            .invoices
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Invoice", id))?;
        invoice.status = status;
        invoice.updated_at = Utc::now();
        Ok(invoice.clone())
    }

    async fn set_invoice_pdf_path(&self, id: InvoiceId, path: &str) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        let invoice = state
            .invoices
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Invoice", id))?;
        invoice.pdf_path = Some(path.to_string());
        invoice.updated_at = Utc::now();
        Ok(())
    }

    async fn invoice_number_exists(&self, number: &str) -> Result<bool, PortError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .invoices
            .values()
            .any(|inv| inv.invoice_number == number))
    }

    async fn apply_payment(&self, payment: NewPayment) -> Result<PaymentApplied, PortError> {
        let mut state = self.state.lock().unwrap();
        let payment = payment.into_payment();
        state.payments.push(payment.clone());

        let invoice = match payment.invoice_id {
            Some(invoice_id) if state.invoices.contains_key(&invoice_id) => {
                let paid = sum_amounts(
                    state
                        .payments
                        .iter()
                        .filter(|p| p.invoice_id == Some(invoice_id))
                        .map(|p| &p.amount),
                )?;
                let invoice = state.invoices.get_mut(&invoice_id).unwrap();
                invoice.status = reconcile_status(invoice.status, invoice.total_amount, paid);
                invoice.updated_at = Utc::now();
                Some(invoice.clone())
            }
            _ => None,
        };

        Ok(PaymentApplied { payment, invoice })
    }

    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
        self.state
            .lock()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Payment", id))
    }

    async fn list_payments(&self, query: PaymentQuery) -> Result<Vec<Payment>, PortError> {
        let state = self.state.lock().unwrap();
        let mut payments: Vec<Payment> = state
            .payments
            .iter()
            .filter(|p| query.student_id.map_or(true, |id| p.student_id == id))
            .filter(|p| query.invoice_id.map_or(true, |id| p.invoice_id == Some(id)))
            .filter(|p| query.paid_within.contains(p.payment_date))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        if let Some(limit) = query.limit {
            payments.truncate(limit as usize);
        }
        Ok(payments)
    }

    async fn paid_totals(
        &self,
        ids: &[InvoiceId],
    ) -> Result<HashMap<InvoiceId, Money>, PortError> {
        let state = self.state.lock().unwrap();
        let mut totals = HashMap::new();
        for id in ids {
            let amounts: Vec<&Money> = state
                .payments
                .iter()
                .filter(|p| p.invoice_id == Some(*id))
                .map(|p| &p.amount)
                .collect();
            if !amounts.is_empty() {
                totals.insert(*id, sum_amounts(amounts.into_iter())?);
            }
        }
        Ok(totals)
    }

    async fn student_totals(&self, id: StudentId) -> Result<StudentTotals, PortError> {
        let state = self.state.lock().unwrap();
        let total_invoiced = sum_amounts(
            state
                .invoices
                .values()
                .filter(|inv| inv.student_id == id)
                .map(|inv| &inv.total_amount),
        )?;
        let total_paid = sum_amounts(
            state
                .payments
                .iter()
                .filter(|p| p.student_id == id)
                .map(|p| &p.amount),
        )?;
        Ok(StudentTotals {
            total_invoiced,
            total_paid,
        })
    }

    async fn payments_by_method(&self, period: &Period) -> Result<Vec<MethodTotal>, PortError> {
        let state = self.state.lock().unwrap();
        let mut buckets: HashMap<&'static str, MethodTotal> = HashMap::new();
        for payment in state
            .payments
            .iter()
            .filter(|p| period.contains(p.payment_date))
        {
            let bucket = buckets
                .entry(payment.method.as_str())
                .or_insert_with(|| MethodTotal {
                    method: payment.method,
                    total: Money::zero(Currency::INR),
                    count: 0,
                });
            bucket.total = bucket
                .total
                .checked_add(&payment.amount)
                .map_err(|e| PortError::internal(e.to_string()))?;
            bucket.count += 1;
        }
        Ok(buckets.into_values().collect())
    }

    async fn invoices_by_status(&self, period: &Period) -> Result<Vec<StatusTotal>, PortError> {
        let state = self.state.lock().unwrap();
        let mut buckets: HashMap<&'static str, StatusTotal> = HashMap::new();
        for invoice in state
            .invoices
            .values()
            .filter(|inv| period.contains(inv.generated_date))
        {
            let bucket = buckets
                .entry(invoice.status.as_str())
                .or_insert_with(|| StatusTotal {
                    status: invoice.status,
                    total: Money::zero(Currency::INR),
                    count: 0,
                });
            bucket.total = bucket
                .total
                .checked_add(&invoice.total_amount)
                .map_err(|e| PortError::internal(e.to_string()))?;
            bucket.count += 1;
        }
        Ok(buckets.into_values().collect())
    }
}

/// In-memory [`StudentDirectory`]
#[derive(Default)]
pub struct InMemoryStudentDirectory {
    students: Mutex<HashMap<StudentId, Student>>,
}

impl InMemoryStudentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a student to the directory and returns its id
    pub fn seed_student(&self, student: Student) -> StudentId {
        let id = student.id;
        self.students.lock().unwrap().insert(id, student);
        id
    }
}

impl DomainPort for InMemoryStudentDirectory {}

#[async_trait]
impl StudentDirectory for InMemoryStudentDirectory {
    async fn get_student(&self, id: StudentId) -> Result<Student, PortError> {
        self.students
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Student", id))
    }

    async fn list_students(&self, query: StudentQuery) -> Result<Vec<Student>, PortError> {
        let students = self.students.lock().unwrap();
        Ok(students
            .values()
            .filter(|s| query.status.map_or(true, |status| s.status == status))
            .cloned()
            .collect())
    }
}

/// Renderer that always succeeds, remembering what it rendered
#[derive(Default)]
pub struct RecordingRenderer {
    rendered: Mutex<Vec<String>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoice numbers rendered so far
    pub fn rendered_numbers(&self) -> Vec<String> {
        self.rendered.lock().unwrap().clone()
    }
}

impl DomainPort for RecordingRenderer {}

#[async_trait]
impl InvoiceRenderer for RecordingRenderer {
    async fn render_invoice(
        &self,
        invoice: &Invoice,
        _student: &Student,
    ) -> Result<String, PortError> {
        self.rendered
            .lock()
            .unwrap()
            .push(invoice.invoice_number.clone());
        Ok(format!(
            "uploads/invoices/invoice-{}.pdf",
            invoice.invoice_number
        ))
    }
}

/// Renderer that always fails, for exercising the non-fatal rendering path
#[derive(Default)]
pub struct FailingRenderer;

impl DomainPort for FailingRenderer {}

#[async_trait]
impl InvoiceRenderer for FailingRenderer {
    async fn render_invoice(
        &self,
        _invoice: &Invoice,
        _student: &Student,
    ) -> Result<String, PortError> {
        Err(PortError::internal("document backend unavailable"))
    }
}
