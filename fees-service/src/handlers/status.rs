use crate::dtos::FeeStatusResponse;
use crate::middleware::StaffContext;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use tracing::instrument;
use uuid::Uuid;

/// Fee status for one student: per-structure obligations, rolled-up totals
/// and recent payments. Computed live from source rows.
#[instrument(skip(state, _staff), fields(user_id, user_role, %student_id))]
pub async fn get_fee_status(
    State(state): State<AppState>,
    _staff: StaffContext,
    Path(student_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let status = state.db.get_fee_status(student_id).await?;
    Ok(Json(FeeStatusResponse::from(status)))
}
