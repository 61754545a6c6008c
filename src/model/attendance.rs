use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attendance {
    pub id: u64,
    pub student_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub present: bool,
    pub marked_by: u64,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    pub student_id: u64,
    pub date: NaiveDate,
    pub present: bool,
    pub marked_by: u64,
}

/// Raw per-student counts over a window, as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceTally {
    pub student_id: u64,
    pub name: String,
    pub dept: String,
    pub present_days: u64,
    pub total_days: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AttendanceStats {
    pub student_id: u64,
    pub present_days: u64,
    pub total_days: u64,
    #[schema(example = 86.5)]
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LowAttendanceEntry {
    pub student_id: u64,
    pub name: String,
    pub dept: String,
    pub present_days: u64,
    pub total_days: u64,
    #[schema(example = 42.0)]
    pub percentage: f64,
}
