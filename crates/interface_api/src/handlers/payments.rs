//! Payment handlers

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{InvoiceId, Money, PaymentId, StudentId, UserId};
use domain_billing::{PaymentMethod, PaymentQuery, Period, RecordPayment};

use crate::dto::payments::*;
use crate::{error::ApiError, AppState};

/// Records a payment, reconciling the referenced invoice if any
pub async fn record_payment(
    State(state): State<AppState>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentAppliedResponse>), ApiError> {
    request.validate()?;

    let method = match &request.method {
        Some(raw) => PaymentMethod::from_str(raw).map_err(ApiError::BadRequest)?,
        None => PaymentMethod::default(),
    };

    let applied = state
        .service
        .record_payment(RecordPayment {
            student_id: StudentId::from_uuid(request.student_id),
            amount: Money::rupees(request.amount),
            payment_date: request.payment_date,
            method,
            description: request.description,
            invoice_id: request.invoice_id.map(InvoiceId::from_uuid),
            recorded_by: request.recorded_by.map(UserId::from_uuid),
        })
        .await?;

    let response = PaymentAppliedResponse {
        payment: PaymentResponse::from(&applied.payment),
        invoice_status: applied
            .invoice
            .map(|invoice| invoice.status.as_str().to_string()),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Lists payments, optionally filtered by student, invoice, or date range
pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = state
        .service
        .list_payments(PaymentQuery {
            student_id: query.student_id.map(StudentId::from_uuid),
            invoice_id: query.invoice_id.map(InvoiceId::from_uuid),
            paid_within: Period::from_dates(query.start_date, query.end_date),
            limit: query.limit,
        })
        .await?;

    Ok(Json(payments.iter().map(PaymentResponse::from).collect()))
}

/// Gets a payment by ID
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment = state.service.get_payment(PaymentId::from_uuid(id)).await?;
    Ok(Json(PaymentResponse::from(&payment)))
}
