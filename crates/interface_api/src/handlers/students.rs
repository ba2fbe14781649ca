//! Student billing handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use core_kernel::StudentId;

use crate::dto::students::FinancialsResponse;
use crate::{error::ApiError, AppState};

/// Gets the financial summary for a student
pub async fn get_financials(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FinancialsResponse>, ApiError> {
    let financials = state
        .service
        .student_financials(StudentId::from_uuid(id))
        .await?;

    Ok(Json(FinancialsResponse::new(id, &financials)))
}
