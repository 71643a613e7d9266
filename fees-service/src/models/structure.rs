//! Fee structure model: a scoped charge definition for an academic year.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Category of charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeType {
    Tuition,
    Admission,
    Transport,
    Hostel,
    Library,
    Laboratory,
    Sports,
    Exam,
    Other,
}

impl FeeType {
    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeType::Tuition => "tuition",
            FeeType::Admission => "admission",
            FeeType::Transport => "transport",
            FeeType::Hostel => "hostel",
            FeeType::Library => "library",
            FeeType::Laboratory => "laboratory",
            FeeType::Sports => "sports",
            FeeType::Exam => "exam",
            FeeType::Other => "other",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "tuition" => FeeType::Tuition,
            "admission" => FeeType::Admission,
            "transport" => FeeType::Transport,
            "hostel" => FeeType::Hostel,
            "library" => FeeType::Library,
            "laboratory" => FeeType::Laboratory,
            "sports" => FeeType::Sports,
            "exam" => FeeType::Exam,
            _ => FeeType::Other,
        }
    }
}

impl std::fmt::Display for FeeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Billing frequency. The yearly payable amount is base_amount scaled by
/// the number of billing periods in a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingFrequency {
    OneTime,
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl BillingFrequency {
    /// Number of billing periods in an academic year.
    pub fn multiplier(&self) -> Decimal {
        match self {
            BillingFrequency::OneTime => Decimal::ONE,
            BillingFrequency::Monthly => Decimal::from(12),
            BillingFrequency::Quarterly => Decimal::from(4),
            BillingFrequency::HalfYearly => Decimal::from(2),
            BillingFrequency::Yearly => Decimal::ONE,
        }
    }

    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingFrequency::OneTime => "one_time",
            BillingFrequency::Monthly => "monthly",
            BillingFrequency::Quarterly => "quarterly",
            BillingFrequency::HalfYearly => "half_yearly",
            BillingFrequency::Yearly => "yearly",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "one_time" => Some(BillingFrequency::OneTime),
            "monthly" => Some(BillingFrequency::Monthly),
            "quarterly" => Some(BillingFrequency::Quarterly),
            "half_yearly" => Some(BillingFrequency::HalfYearly),
            "yearly" => Some(BillingFrequency::Yearly),
            _ => None,
        }
    }
}

/// A fee structure row. `class_id` NULL means the charge applies to every
/// class in the academic year. Read-only from the ledger engine's
/// perspective; the administrative workflow owns creation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeStructure {
    pub structure_id: Uuid,
    pub academic_year_id: Uuid,
    pub class_id: Option<Uuid>,
    pub fee_type: String,
    pub base_amount: Decimal,
    pub frequency: String,
    pub created_utc: DateTime<Utc>,
}

impl FeeStructure {
    /// Get parsed billing frequency.
    pub fn parsed_frequency(&self) -> Option<BillingFrequency> {
        BillingFrequency::from_string(&self.frequency)
    }

    /// Get parsed fee type.
    pub fn parsed_fee_type(&self) -> FeeType {
        FeeType::from_string(&self.fee_type)
    }
}
