//! Request/response shapes for the fees HTTP API.

use crate::models::{
    receipt_period, AcademicYear, FeePayment, FeeStatus, FeeStatusSummary, FeeType,
    ListPaymentsFilter, PaymentMode, PaymentRecord, PaymentStatus, RecordPayment,
    StructureFeeStatus, StudentSummary,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Body of `POST /fees/payments`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub student_id: Uuid,
    pub fee_structure_id: Uuid,
    pub amount: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub late_fee: Decimal,
    pub paid_amount: Decimal,
    pub payment_mode: PaymentMode,
    pub transaction_id: Option<String>,
    pub for_month: String,
    pub remarks: Option<String>,
    /// Defaults to today when omitted.
    pub payment_date: Option<NaiveDate>,
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

impl Validate for RecordPaymentRequest {
    /// Field-level checks the derive cannot express for `Decimal` values.
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.amount <= Decimal::ZERO {
            errors.add("amount", field_error("positive", "must be greater than zero"));
        }
        if self.paid_amount <= Decimal::ZERO {
            errors.add(
                "paidAmount",
                field_error("positive", "must be greater than zero"),
            );
        }
        if self.discount < Decimal::ZERO {
            errors.add("discount", field_error("non_negative", "must not be negative"));
        }
        if self.late_fee < Decimal::ZERO {
            errors.add("lateFee", field_error("non_negative", "must not be negative"));
        }
        if receipt_period(&self.for_month).is_none() {
            errors.add(
                "forMonth",
                field_error("format", "must be a YYYY-MM month"),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl RecordPaymentRequest {
    pub fn into_record(self) -> RecordPayment {
        RecordPayment {
            student_id: self.student_id,
            structure_id: self.fee_structure_id,
            amount: self.amount,
            discount: self.discount,
            late_fee: self.late_fee,
            paid_amount: self.paid_amount,
            payment_mode: self.payment_mode,
            payment_date: self
                .payment_date
                .unwrap_or_else(|| Utc::now().date_naive()),
            for_month: self.for_month,
            transaction_id: self.transaction_id,
            remarks: self.remarks,
        }
    }
}

/// A payment row with enum columns parsed for the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub payment_id: Uuid,
    pub receipt_number: String,
    pub student_id: Uuid,
    pub fee_structure_id: Uuid,
    pub amount: Decimal,
    pub discount: Decimal,
    pub late_fee: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub due_amount: Decimal,
    pub payment_mode: PaymentMode,
    pub status: PaymentStatus,
    pub payment_date: NaiveDate,
    pub for_month: String,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl From<FeePayment> for PaymentResponse {
    fn from(p: FeePayment) -> Self {
        let payment_mode = p.parsed_mode();
        let status = p.parsed_status();
        Self {
            payment_id: p.payment_id,
            receipt_number: p.receipt_number,
            student_id: p.student_id,
            fee_structure_id: p.structure_id,
            amount: p.amount,
            discount: p.discount,
            late_fee: p.late_fee,
            total_amount: p.total_amount,
            paid_amount: p.paid_amount,
            due_amount: p.due_amount,
            payment_mode,
            status,
            payment_date: p.payment_date,
            for_month: p.for_month,
            transaction_id: p.transaction_id,
            remarks: p.remarks,
            created_utc: p.created_utc,
        }
    }
}

/// Listing entry: payment joined with student and structure summaries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecordResponse {
    #[serde(flatten)]
    pub payment: PaymentResponse,
    pub student_name: String,
    pub admission_no: String,
    pub class_name: String,
    pub fee_type: FeeType,
}

impl From<PaymentRecord> for PaymentRecordResponse {
    fn from(r: PaymentRecord) -> Self {
        let fee_type = FeeType::from_string(&r.fee_type);
        Self {
            payment: PaymentResponse {
                payment_id: r.payment_id,
                receipt_number: r.receipt_number,
                student_id: r.student_id,
                fee_structure_id: r.structure_id,
                amount: r.amount,
                discount: r.discount,
                late_fee: r.late_fee,
                total_amount: r.total_amount,
                paid_amount: r.paid_amount,
                due_amount: r.due_amount,
                payment_mode: PaymentMode::from_string(&r.payment_mode),
                status: PaymentStatus::from_string(&r.status),
                payment_date: r.payment_date,
                for_month: r.for_month,
                transaction_id: r.transaction_id,
                remarks: r.remarks,
                created_utc: r.created_utc,
            },
            student_name: r.student_name,
            admission_no: r.admission_no,
            class_name: r.class_name,
            fee_type,
        }
    }
}

/// Query parameters for `GET /fees/payments`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentListParams {
    pub student_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl PaymentListParams {
    pub fn into_filter(self) -> ListPaymentsFilter {
        ListPaymentsFilter {
            student_id: self.student_id,
            status: self.status,
            from_date: self.from_date,
            to_date: self.to_date,
        }
    }
}

/// Report selector for `GET /fees/reports`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    CollectionSummary,
    Defaulters,
    PaymentMode,
    ClassWise,
    MonthlyCollection,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::CollectionSummary => "collection-summary",
            ReportType::Defaulters => "defaulters",
            ReportType::PaymentMode => "payment-mode",
            ReportType::ClassWise => "class-wise",
            ReportType::MonthlyCollection => "monthly-collection",
        }
    }
}

/// Query parameters for `GET /fees/reports`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub class_id: Option<Uuid>,
}

/// Response of `GET /fees/status/{student_id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeStatusResponse {
    pub student: StudentSummary,
    pub academic_year: AcademicYear,
    pub fee_status: Vec<StructureFeeStatus>,
    pub summary: FeeStatusSummary,
    pub recent_payments: Vec<PaymentResponse>,
}

impl From<FeeStatus> for FeeStatusResponse {
    fn from(status: FeeStatus) -> Self {
        Self {
            student: status.student,
            academic_year: status.academic_year,
            fee_status: status.per_structure,
            summary: status.summary,
            recent_payments: status
                .recent_payments
                .into_iter()
                .map(PaymentResponse::from)
                .collect(),
        }
    }
}
