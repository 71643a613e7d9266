use crate::dtos::{ReportParams, ReportType};
use crate::middleware::StaffContext;
use crate::models::ReportFilter;
use crate::services::metrics::REPORTS_GENERATED;
use crate::services::Database;
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Datelike;
use service_core::error::AppError;
use tracing::instrument;

/// Dispatch `GET /fees/reports` on the `type` query parameter.
#[instrument(skip(state, _staff, params), fields(user_id, user_role))]
pub async fn get_report(
    State(state): State<AppState>,
    _staff: StaffContext,
    Query(params): Query<ReportParams>,
) -> Result<Response, AppError> {
    let report_type = params.report_type;
    let filter = ReportFilter {
        from_date: params.from_date,
        to_date: params.to_date,
        class_id: params.class_id,
    };

    let response = match report_type {
        ReportType::CollectionSummary => {
            Json(state.db.collection_summary(&filter).await?).into_response()
        }
        ReportType::Defaulters => Json(state.db.defaulters().await?).into_response(),
        ReportType::PaymentMode => {
            Json(state.db.payment_mode_breakdown(&filter).await?).into_response()
        }
        ReportType::ClassWise => {
            Json(state.db.class_wise_breakdown(&filter).await?).into_response()
        }
        ReportType::MonthlyCollection => {
            let year = params
                .from_date
                .map(|d| d.year())
                .unwrap_or_else(Database::current_year);
            Json(state.db.monthly_collection(year).await?).into_response()
        }
    };

    REPORTS_GENERATED
        .with_label_values(&[report_type.as_str()])
        .inc();

    Ok(response)
}
