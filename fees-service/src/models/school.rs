//! Read-only collaborator records: students, classes, academic years.
//! Owned by the administrative workflow; the ledger engine only reads them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolClass {
    pub class_id: Uuid,
    pub name: String,
    pub created_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicYear {
    pub academic_year_id: Uuid,
    pub name: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub is_current: bool,
    pub created_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub student_id: Uuid,
    pub admission_no: String,
    pub full_name: String,
    pub class_id: Uuid,
    pub active: bool,
    pub created_utc: DateTime<Utc>,
}

/// Student joined with the class name, the shape most fee views need.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: Uuid,
    pub admission_no: String,
    pub full_name: String,
    pub class_id: Uuid,
    pub class_name: String,
    pub active: bool,
}
