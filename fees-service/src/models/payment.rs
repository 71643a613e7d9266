//! Fee payment model. Payments are append-only facts: once a row is
//! committed there is no edit, void, or delete operation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How the money arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    Cash,
    Card,
    Upi,
    NetBanking,
    Cheque,
    Dd,
}

impl PaymentMode {
    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "cash",
            PaymentMode::Card => "card",
            PaymentMode::Upi => "upi",
            PaymentMode::NetBanking => "net_banking",
            PaymentMode::Cheque => "cheque",
            PaymentMode::Dd => "dd",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "card" => PaymentMode::Card,
            "upi" => PaymentMode::Upi,
            "net_banking" => PaymentMode::NetBanking,
            "cheque" => PaymentMode::Cheque,
            "dd" => PaymentMode::Dd,
            _ => PaymentMode::Cash,
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settlement status of a payment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "completed" => PaymentStatus::Completed,
            _ => PaymentStatus::Pending,
        }
    }
}

/// One payment transaction against a fee structure.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePayment {
    pub payment_id: Uuid,
    pub receipt_number: String,
    pub student_id: Uuid,
    pub structure_id: Uuid,
    pub amount: Decimal,
    pub discount: Decimal,
    pub late_fee: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub due_amount: Decimal,
    pub payment_mode: String,
    pub status: String,
    pub payment_date: NaiveDate,
    pub for_month: String,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl FeePayment {
    /// Get parsed payment mode.
    pub fn parsed_mode(&self) -> PaymentMode {
        PaymentMode::from_string(&self.payment_mode)
    }

    /// Get parsed status.
    pub fn parsed_status(&self) -> PaymentStatus {
        PaymentStatus::from_string(&self.status)
    }
}

/// Payment row joined with student and structure summaries for listings.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRecord {
    pub payment_id: Uuid,
    pub receipt_number: String,
    pub student_id: Uuid,
    pub structure_id: Uuid,
    pub amount: Decimal,
    pub discount: Decimal,
    pub late_fee: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub due_amount: Decimal,
    pub payment_mode: String,
    pub status: String,
    pub payment_date: NaiveDate,
    pub for_month: String,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub student_name: String,
    pub admission_no: String,
    pub class_name: String,
    pub fee_type: String,
}

/// Input for recording a payment, already validated at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct RecordPayment {
    pub student_id: Uuid,
    pub structure_id: Uuid,
    pub amount: Decimal,
    pub discount: Decimal,
    pub late_fee: Decimal,
    pub paid_amount: Decimal,
    pub payment_mode: PaymentMode,
    pub payment_date: NaiveDate,
    pub for_month: String,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
}

/// Filter parameters for listing payments.
#[derive(Debug, Clone, Default)]
pub struct ListPaymentsFilter {
    pub student_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Derived amounts for a payment at creation time. These are computed once
/// and stored; they are never recomputed retroactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentTotals {
    pub total_amount: Decimal,
    pub due_amount: Decimal,
    pub status: PaymentStatus,
}

/// total = amount + late_fee - discount, due = total - paid,
/// status COMPLETED iff due <= 0. Overpayment leaves a negative due and a
/// COMPLETED status; the due amount is not clamped.
pub fn payment_totals(
    amount: Decimal,
    discount: Decimal,
    late_fee: Decimal,
    paid_amount: Decimal,
) -> PaymentTotals {
    let total_amount = amount + late_fee - discount;
    let due_amount = total_amount - paid_amount;
    let status = if due_amount > Decimal::ZERO {
        PaymentStatus::Pending
    } else {
        PaymentStatus::Completed
    };
    PaymentTotals {
        total_amount,
        due_amount,
        status,
    }
}

/// Receipt counter period (`YYMM`) for a `YYYY-MM` billing month.
///
/// Receipts file under the month the payment applies to, so the sequence
/// restarts with each billing month and numbers within one never collide
/// with another.
pub fn receipt_period(for_month: &str) -> Option<String> {
    let (year, month) = for_month.split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    year.parse::<u16>().ok()?;
    let m: u8 = month.parse().ok()?;
    if !(1..=12).contains(&m) {
        return None;
    }
    Some(format!("{}{}", &year[2..], month))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn totals_hold_the_creation_invariant() {
        let t = payment_totals(dec("1000"), dec("100"), dec("50"), dec("500"));
        assert_eq!(t.total_amount, dec("950"));
        assert_eq!(t.due_amount, dec("450"));
        assert_eq!(t.status, PaymentStatus::Pending);
    }

    #[test]
    fn exact_payment_is_completed_with_zero_due() {
        let t = payment_totals(dec("1000"), dec("0"), dec("0"), dec("1000"));
        assert_eq!(t.total_amount, dec("1000"));
        assert_eq!(t.due_amount, Decimal::ZERO);
        assert_eq!(t.status, PaymentStatus::Completed);
    }

    #[test]
    fn overpayment_is_completed_with_negative_due() {
        let t = payment_totals(dec("1000"), dec("0"), dec("0"), dec("1200"));
        assert_eq!(t.due_amount, dec("-200"));
        assert_eq!(t.status, PaymentStatus::Completed);
    }

    #[test]
    fn a_paisa_short_is_still_pending() {
        let t = payment_totals(dec("1000"), dec("0"), dec("0"), dec("999.99"));
        assert_eq!(t.due_amount, dec("0.01"));
        assert_eq!(t.status, PaymentStatus::Pending);
    }

    #[test]
    fn receipt_period_from_for_month() {
        assert_eq!(receipt_period("2024-01").as_deref(), Some("2401"));
        assert_eq!(receipt_period("2026-12").as_deref(), Some("2612"));
    }

    #[test]
    fn receipt_period_rejects_malformed_months() {
        for bad in ["2024-13", "2024-00", "2024-1", "24-01", "202401", "abcd-ef", ""] {
            assert_eq!(receipt_period(bad), None, "accepted {:?}", bad);
        }
    }

    #[test]
    fn mode_round_trips_through_database_strings() {
        for mode in [
            PaymentMode::Cash,
            PaymentMode::Card,
            PaymentMode::Upi,
            PaymentMode::NetBanking,
            PaymentMode::Cheque,
            PaymentMode::Dd,
        ] {
            assert_eq!(PaymentMode::from_string(mode.as_str()), mode);
        }
    }
}
