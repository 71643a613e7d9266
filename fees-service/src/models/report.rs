//! Report shapes produced by the reporting aggregator.

use crate::models::payment::PaymentMode;
use crate::models::structure::FeeType;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Common filter for the collection-side reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFilter {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTypeBreakdown {
    pub fee_type: FeeType,
    pub total_paid: Decimal,
    pub transaction_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub total_paid: Decimal,
    pub total_discount: Decimal,
    pub total_late_fee: Decimal,
    pub transaction_count: i64,
    pub by_fee_type: Vec<FeeTypeBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeBreakdown {
    pub payment_mode: PaymentMode,
    pub total_paid: Decimal,
    pub transaction_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBreakdown {
    pub class_id: Uuid,
    pub class_name: String,
    pub total_paid: Decimal,
    pub transaction_count: i64,
}

/// One calendar-month bucket; `month` is 1-12.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    pub month: u32,
    pub total_paid: Decimal,
    pub transaction_count: i64,
}

/// Jan-Dec series for one calendar year, always 12 buckets.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCollection {
    pub year: i32,
    pub months: Vec<MonthlyBucket>,
}

/// A student owing money: net payable across all applicable structures
/// exceeds the total paid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaulter {
    pub student_id: Uuid,
    pub admission_no: String,
    pub full_name: String,
    pub class_name: String,
    pub net_payable: Decimal,
    pub total_paid: Decimal,
    pub balance_due: Decimal,
}
