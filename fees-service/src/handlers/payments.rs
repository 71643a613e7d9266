use crate::dtos::{
    PaymentListParams, PaymentRecordResponse, PaymentResponse, RecordPaymentRequest,
};
use crate::middleware::StaffContext;
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use tracing::instrument;
use validator::Validate;

/// Record a fee payment and allocate its receipt number.
#[instrument(skip(state, staff, request), fields(user_id, user_role))]
pub async fn record_payment(
    State(state): State<AppState>,
    staff: StaffContext,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    staff.require_fee_collection()?;
    request.validate()?;

    let payment = state.db.record_payment(&request.into_record()).await?;

    tracing::info!(
        receipt_number = %payment.receipt_number,
        recorded_by = %staff.user_id,
        "Payment accepted"
    );

    Ok((
        StatusCode::CREATED,
        Json(PaymentResponse::from(payment)),
    ))
}

/// List payments, newest first, with optional student/status/date filters.
#[instrument(skip(state, _staff, params), fields(user_id, user_role))]
pub async fn list_payments(
    State(state): State<AppState>,
    _staff: StaffContext,
    Query(params): Query<PaymentListParams>,
) -> Result<impl IntoResponse, AppError> {
    let records = state.db.list_payments(&params.into_filter()).await?;
    let payments: Vec<PaymentRecordResponse> =
        records.into_iter().map(PaymentRecordResponse::from).collect();

    Ok(Json(payments))
}
