//! Report handlers

use axum::{
    extract::{Query, State},
    Json,
};

use domain_billing::Period;

use crate::dto::reports::{FinancialReportResponse, ReportQuery};
use crate::{error::ApiError, AppState};

/// Builds the financial report, optionally bounded by a date range
///
/// The end date is inclusive: it covers the whole day it names.
pub async fn financial_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<FinancialReportResponse>, ApiError> {
    let report = state
        .service
        .financial_report(Period::from_dates(query.start_date, query.end_date))
        .await?;

    Ok(Json(FinancialReportResponse::from(&report)))
}
