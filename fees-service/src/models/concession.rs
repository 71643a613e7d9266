//! Fee concession model: a time-bounded discount for one (student, structure) pair.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A concession row. Either `percentage` (0-100) or `amount` is set;
/// percentage takes precedence when both are present.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeConcession {
    pub concession_id: Uuid,
    pub student_id: Uuid,
    pub structure_id: Uuid,
    pub percentage: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub created_utc: DateTime<Utc>,
}

impl FeeConcession {
    /// Whether the validity window contains the given date.
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_to
    }

    /// Discount this concession grants against a yearly total.
    ///
    /// Percentage wins over flat amount, results are rounded to 2 decimal
    /// places, and the discount never exceeds the total (a flat amount
    /// larger than the total is capped rather than driving the net
    /// payable negative).
    pub fn discount_against(&self, total: Decimal) -> Decimal {
        let raw = if let Some(pct) = self.percentage {
            (total * pct / Decimal::ONE_HUNDRED).round_dp(2)
        } else {
            self.amount.unwrap_or(Decimal::ZERO)
        };
        raw.clamp(Decimal::ZERO, total)
    }
}
