//! Invoice handlers

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{InvoiceId, Money, StudentId};
use domain_billing::{CreateInvoice, InvoiceItem, InvoiceQuery, InvoiceStatus, Period};

use crate::dto::invoices::*;
use crate::dto::payments::PaymentResponse;
use crate::{error::ApiError, AppState};

/// Creates an invoice with a generated number and best-effort document
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    request.validate()?;

    let items = request
        .items
        .iter()
        .map(|item| {
            let mut built = InvoiceItem::new(&item.description, Money::rupees(item.unit_price));
            if let Some(quantity) = item.quantity {
                built = built.with_quantity(quantity);
            }
            built
        })
        .collect();

    let invoice = state
        .service
        .create_invoice(CreateInvoice {
            student_id: StudentId::from_uuid(request.student_id),
            items,
            total_amount: request.total_amount.map(Money::rupees),
            due_date: request.due_date,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(&invoice))))
}

/// Lists invoices, optionally filtered by student, status, or date range
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(InvoiceStatus::from_str)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let invoices = state
        .service
        .list_invoices(InvoiceQuery {
            student_id: query.student_id.map(StudentId::from_uuid),
            status,
            generated_within: Period::from_dates(query.start_date, query.end_date),
        })
        .await?;

    Ok(Json(invoices.iter().map(InvoiceResponse::from).collect()))
}

/// Gets an invoice by ID together with its payment history
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceDetailResponse>, ApiError> {
    let (invoice, payments) = state
        .service
        .invoice_with_payments(InvoiceId::from_uuid(id))
        .await?;

    Ok(Json(InvoiceDetailResponse {
        invoice: InvoiceResponse::from(&invoice),
        payments: payments.iter().map(PaymentResponse::from).collect(),
    }))
}

/// Applies an explicit status update (e.g. cancellation)
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let status = InvoiceStatus::from_str(&request.status).map_err(ApiError::BadRequest)?;

    let invoice = state
        .service
        .update_invoice_status(InvoiceId::from_uuid(id), status)
        .await?;

    Ok(Json(InvoiceResponse::from(&invoice)))
}
