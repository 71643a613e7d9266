//! Obligation calculation: frequency expansion plus concession netting.
//!
//! Pure arithmetic over `rust_decimal` values; resolution of which structure
//! and concession apply happens in the database layer.

use crate::models::concession::FeeConcession;
use crate::models::payment::FeePayment;
use crate::models::school::{AcademicYear, StudentSummary};
use crate::models::structure::{BillingFrequency, FeeType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a student owes for one structure over the academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obligation {
    pub total_amount: Decimal,
    pub concession_amount: Decimal,
    pub net_amount: Decimal,
}

/// Compute the yearly obligation for a structure.
///
/// A concession outside its validity window on `as_of` contributes nothing.
/// The concession is capped at the yearly total, so `net_amount` is never
/// negative.
pub fn compute_obligation(
    base_amount: Decimal,
    frequency: BillingFrequency,
    concession: Option<&FeeConcession>,
    as_of: NaiveDate,
) -> Obligation {
    let total_amount = base_amount * frequency.multiplier();

    let concession_amount = concession
        .filter(|c| c.is_valid_on(as_of))
        .map(|c| c.discount_against(total_amount))
        .unwrap_or(Decimal::ZERO);

    Obligation {
        total_amount,
        concession_amount,
        net_amount: total_amount - concession_amount,
    }
}

/// Live per-structure view joining the obligation with recorded payments.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureFeeStatus {
    pub structure_id: Uuid,
    pub fee_type: FeeType,
    pub frequency: BillingFrequency,
    pub base_amount: Decimal,
    pub total_amount: Decimal,
    pub concession_amount: Decimal,
    pub net_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance: Decimal,
}

/// Rolled-up totals across every applicable structure.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeStatusSummary {
    pub total_amount: Decimal,
    pub total_concession: Decimal,
    pub total_paid: Decimal,
    pub total_balance: Decimal,
}

impl FeeStatusSummary {
    pub fn accumulate(&mut self, status: &StructureFeeStatus) {
        self.total_amount += status.total_amount;
        self.total_concession += status.concession_amount;
        self.total_paid += status.paid_amount;
        self.total_balance += status.balance;
    }
}

/// Full fee-status projection for one student. Recomputed from source rows
/// on every call; nothing here is cached or materialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeStatus {
    pub student: StudentSummary,
    pub academic_year: AcademicYear,
    pub per_structure: Vec<StructureFeeStatus>,
    pub summary: FeeStatusSummary,
    pub recent_payments: Vec<FeePayment>,
}
