//! Billing repository implementation
//!
//! This module provides database access for invoices and payments. The
//! reconciliation write path (`apply_payment`) runs inside a single
//! transaction that locks the invoice row, so concurrent payments against
//! the same invoice serialize and the stored status always reflects the
//! full paid sum.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use core_kernel::{Currency, DomainPort, InvoiceId, Money, PaymentId, PortError, StudentId, UserId};
use domain_billing::{
    reconcile_status, BillingStore, Invoice, InvoiceItem, InvoiceQuery, InvoiceStatus, MethodTotal,
    NewPayment, Payment, PaymentApplied, PaymentMethod, PaymentQuery, Period, StatusTotal,
    StudentTotals,
};

use crate::error::DatabaseError;

/// `BillingStore` implementation over PostgreSQL
#[derive(Debug, Clone)]
pub struct PgBillingStore {
    pool: PgPool,
}

impl PgBillingStore {
    /// Creates a new store over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgBillingStore {}

fn map_sqlx(error: sqlx::Error) -> PortError {
    PortError::from(DatabaseError::from(&error))
}

fn decode_error(message: impl std::fmt::Display) -> PortError {
    PortError::from(DatabaseError::DecodeError(message.to_string()))
}

fn money_from_row(row: &PgRow, amount_col: &str, currency_col: &str) -> Result<Money, PortError> {
    let amount: Decimal = row.try_get(amount_col).map_err(map_sqlx)?;
    let currency: String = row.try_get(currency_col).map_err(map_sqlx)?;
    let currency = Currency::from_str(&currency).map_err(decode_error)?;
    Ok(Money::new(amount, currency))
}

fn invoice_from_row(row: &PgRow) -> Result<Invoice, PortError> {
    let items: serde_json::Value = row.try_get("items").map_err(map_sqlx)?;
    let items: Vec<InvoiceItem> = serde_json::from_value(items).map_err(decode_error)?;
    let status: String = row.try_get("status").map_err(map_sqlx)?;

    Ok(Invoice {
        id: InvoiceId::from_uuid(row.try_get("id").map_err(map_sqlx)?),
        invoice_number: row.try_get("invoice_number").map_err(map_sqlx)?,
        student_id: StudentId::from_uuid(row.try_get("student_id").map_err(map_sqlx)?),
        items,
        total_amount: money_from_row(row, "total_amount", "currency")?,
        status: InvoiceStatus::from_str(&status).map_err(decode_error)?,
        generated_date: row.try_get("generated_date").map_err(map_sqlx)?,
        due_date: row.try_get("due_date").map_err(map_sqlx)?,
        pdf_path: row.try_get("pdf_path").map_err(map_sqlx)?,
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
        updated_at: row.try_get("updated_at").map_err(map_sqlx)?,
    })
}

fn payment_from_row(row: &PgRow) -> Result<Payment, PortError> {
    let method: String = row.try_get("method").map_err(map_sqlx)?;
    let invoice_id: Option<Uuid> = row.try_get("invoice_id").map_err(map_sqlx)?;
    let recorded_by: Option<Uuid> = row.try_get("recorded_by").map_err(map_sqlx)?;

    Ok(Payment {
        id: PaymentId::from_uuid(row.try_get("id").map_err(map_sqlx)?),
        student_id: StudentId::from_uuid(row.try_get("student_id").map_err(map_sqlx)?),
        amount: money_from_row(row, "amount", "currency")?,
        payment_date: row.try_get("payment_date").map_err(map_sqlx)?,
        method: PaymentMethod::from_str(&method).map_err(decode_error)?,
        description: row.try_get("description").map_err(map_sqlx)?,
        invoice_id: invoice_id.map(InvoiceId::from_uuid),
        recorded_by: recorded_by.map(UserId::from_uuid),
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
    })
}

const SELECT_INVOICE: &str = "SELECT id, invoice_number, student_id, items, total_amount, \
     currency, status, generated_date, due_date, pdf_path, created_at, updated_at \
     FROM invoices";

const SELECT_PAYMENT: &str = "SELECT id, student_id, amount, currency, payment_date, method, \
     description, invoice_id, recorded_by, created_at \
     FROM payments";

#[async_trait]
impl BillingStore for PgBillingStore {
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
        let items = serde_json::to_value(&invoice.items).map_err(decode_error)?;
        sqlx::query(
            "INSERT INTO invoices (id, invoice_number, student_id, items, total_amount, \
             currency, status, generated_date, due_date, pdf_path, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(invoice.id.as_uuid())
        .bind(&invoice.invoice_number)
        .bind(invoice.student_id.as_uuid())
        .bind(items)
        .bind(invoice.total_amount.amount())
        .bind(invoice.total_amount.currency().code())
        .bind(invoice.status.as_str())
        .bind(invoice.generated_date)
        .bind(invoice.due_date)
        .bind(&invoice.pdf_path)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        let row = sqlx::query(&format!("{SELECT_INVOICE} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| PortError::not_found("invoice", id))?;
        invoice_from_row(&row)
    }

    async fn list_invoices(&self, query: InvoiceQuery) -> Result<Vec<Invoice>, PortError> {
        let rows = sqlx::query(&format!(
            "{SELECT_INVOICE} \
             WHERE ($1::uuid IS NULL OR student_id = $1) \
               AND ($2::text IS NULL OR status = $2) \
               AND ($3::timestamptz IS NULL OR generated_date >= $3) \
               AND ($4::timestamptz IS NULL OR generated_date <= $4) \
             ORDER BY generated_date DESC"
        ))
        .bind(query.student_id.map(|id| *id.as_uuid()))
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.generated_within.from)
        .bind(query.generated_within.to)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(invoice_from_row).collect()
    }

    async fn update_invoice_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
    ) -> Result<Invoice, PortError> {
        let row = sqlx::query(
            "UPDATE invoices SET status = $2, updated_at = $3 WHERE id = $1 \
             RETURNING id, invoice_number, student_id, items, total_amount, currency, \
                       status, generated_date, due_date, pdf_path, created_at, updated_at",
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| PortError::not_found("invoice", id))?;
        invoice_from_row(&row)
    }

    async fn set_invoice_pdf_path(&self, id: InvoiceId, path: &str) -> Result<(), PortError> {
        let result = sqlx::query(
            "UPDATE invoices SET pdf_path = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(path)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(PortError::not_found("invoice", id));
        }
        Ok(())
    }

    async fn invoice_number_exists(&self, number: &str) -> Result<bool, PortError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM invoices WHERE invoice_number = $1)")
            .bind(number)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.try_get::<bool, _>(0).map_err(map_sqlx)
    }

    async fn apply_payment(&self, payment: NewPayment) -> Result<PaymentApplied, PortError> {
        let payment = payment.into_payment();
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        // Lock the invoice row first so concurrent payments against the
        // same invoice serialize on it for the rest of the transaction.
        let locked = match payment.invoice_id {
            Some(invoice_id) => sqlx::query(&format!("{SELECT_INVOICE} WHERE id = $1 FOR UPDATE"))
                .bind(invoice_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx)?
                .map(|row| invoice_from_row(&row))
                .transpose()?,
            None => None,
        };

        sqlx::query(
            "INSERT INTO payments (id, student_id, amount, currency, payment_date, method, \
             description, invoice_id, recorded_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(payment.id.as_uuid())
        .bind(payment.student_id.as_uuid())
        .bind(payment.amount.amount())
        .bind(payment.amount.currency().code())
        .bind(payment.payment_date)
        .bind(payment.method.as_str())
        .bind(&payment.description)
        .bind(payment.invoice_id.map(|id| *id.as_uuid()))
        .bind(payment.recorded_by.map(|id| *id.as_uuid()))
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        let invoice = match locked {
            Some(mut invoice) => {
                let row = sqlx::query(
                    "SELECT COALESCE(SUM(amount), 0) AS paid FROM payments WHERE invoice_id = $1",
                )
                .bind(invoice.id.as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx)?;
                let paid: Decimal = row.try_get("paid").map_err(map_sqlx)?;
                let paid = Money::new(paid, invoice.total_amount.currency());

                let status = reconcile_status(invoice.status, invoice.total_amount, paid);
                let now = Utc::now();
                sqlx::query("UPDATE invoices SET status = $2, updated_at = $3 WHERE id = $1")
                    .bind(invoice.id.as_uuid())
                    .bind(status.as_str())
                    .bind(now)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx)?;
                invoice.status = status;
                invoice.updated_at = now;
                Some(invoice)
            }
            None => None,
        };

        tx.commit().await.map_err(map_sqlx)?;
        Ok(PaymentApplied { payment, invoice })
    }

    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
        let row = sqlx::query(&format!("{SELECT_PAYMENT} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| PortError::not_found("payment", id))?;
        payment_from_row(&row)
    }

    async fn list_payments(&self, query: PaymentQuery) -> Result<Vec<Payment>, PortError> {
        let rows = sqlx::query(&format!(
            "{SELECT_PAYMENT} \
             WHERE ($1::uuid IS NULL OR student_id = $1) \
               AND ($2::uuid IS NULL OR invoice_id = $2) \
               AND ($3::timestamptz IS NULL OR payment_date >= $3) \
               AND ($4::timestamptz IS NULL OR payment_date <= $4) \
             ORDER BY payment_date DESC \
             LIMIT $5"
        ))
        .bind(query.student_id.map(|id| *id.as_uuid()))
        .bind(query.invoice_id.map(|id| *id.as_uuid()))
        .bind(query.paid_within.from)
        .bind(query.paid_within.to)
        .bind(query.limit.map(i64::from))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(payment_from_row).collect()
    }

    async fn paid_totals(
        &self,
        ids: &[InvoiceId],
    ) -> Result<HashMap<InvoiceId, Money>, PortError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(
            "SELECT invoice_id, SUM(amount) AS paid, MIN(currency) AS currency \
             FROM payments WHERE invoice_id = ANY($1) GROUP BY invoice_id",
        )
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        let mut totals = HashMap::with_capacity(rows.len());
        for row in rows {
            let invoice_id: Uuid = row.try_get("invoice_id").map_err(map_sqlx)?;
            let paid = money_from_row(&row, "paid", "currency")?;
            totals.insert(InvoiceId::from_uuid(invoice_id), paid);
        }
        Ok(totals)
    }

    async fn student_totals(&self, id: StudentId) -> Result<StudentTotals, PortError> {
        let row = sqlx::query(
            "SELECT \
               COALESCE((SELECT SUM(total_amount) FROM invoices WHERE student_id = $1), 0) AS invoiced, \
               COALESCE((SELECT SUM(amount) FROM payments WHERE student_id = $1), 0) AS paid",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        let invoiced: Decimal = row.try_get("invoiced").map_err(map_sqlx)?;
        let paid: Decimal = row.try_get("paid").map_err(map_sqlx)?;
        Ok(StudentTotals {
            total_invoiced: Money::new(invoiced, Currency::default()),
            total_paid: Money::new(paid, Currency::default()),
        })
    }

    async fn payments_by_method(&self, period: &Period) -> Result<Vec<MethodTotal>, PortError> {
        let rows = sqlx::query(
            "SELECT method, COALESCE(SUM(amount), 0) AS total, COUNT(*) AS count \
             FROM payments \
             WHERE ($1::timestamptz IS NULL OR payment_date >= $1) \
               AND ($2::timestamptz IS NULL OR payment_date <= $2) \
             GROUP BY method \
             ORDER BY method",
        )
        .bind(period.from)
        .bind(period.to)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter()
            .map(|row| {
                let method: String = row.try_get("method").map_err(map_sqlx)?;
                let total: Decimal = row.try_get("total").map_err(map_sqlx)?;
                let count: i64 = row.try_get("count").map_err(map_sqlx)?;
                Ok(MethodTotal {
                    method: PaymentMethod::from_str(&method).map_err(decode_error)?,
                    total: Money::new(total, Currency::default()),
                    count: count as u64,
                })
            })
            .collect()
    }

    async fn invoices_by_status(&self, period: &Period) -> Result<Vec<StatusTotal>, PortError> {
        let rows = sqlx::query(
            "SELECT status, COALESCE(SUM(total_amount), 0) AS total, COUNT(*) AS count \
             FROM invoices \
             WHERE ($1::timestamptz IS NULL OR generated_date >= $1) \
               AND ($2::timestamptz IS NULL OR generated_date <= $2) \
             GROUP BY status \
             ORDER BY status",
        )
        .bind(period.from)
        .bind(period.to)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter()
            .map(|row| {
                let status: String = row.try_get("status").map_err(map_sqlx)?;
                let total: Decimal = row.try_get("total").map_err(map_sqlx)?;
                let count: i64 = row.try_get("count").map_err(map_sqlx)?;
                Ok(StatusTotal {
                    status: InvoiceStatus::from_str(&status).map_err(decode_error)?,
                    total: Money::new(total, Currency::default()),
                    count: count as u64,
                })
            })
            .collect()
    }
}
