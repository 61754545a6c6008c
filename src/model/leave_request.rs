use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr,
)]
pub enum LeaveType {
    Medical,
    Personal,
    Emergency,
    Academic,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// Outcome an approver may record on a pending leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for LeaveStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => LeaveStatus::Approved,
            Decision::Rejected => LeaveStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "student_id": 1000,
    "leave_type": "Medical",
    "reason": "Fever",
    "start_date": "2026-01-01",
    "end_date": "2026-01-03",
    "status": "pending",
    "created_at": "2025-12-30T09:00:00Z",
    "updated_at": "2025-12-30T09:00:00Z"
}))]
pub struct LeaveRequest {
    pub id: u64,
    pub student_id: u64,
    pub leave_type: LeaveType,
    pub reason: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
    /// set only once the leave has been decided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
impl LeaveRequest {
    /// Inclusive number of calendar days covered by the leave.
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Insert payload for a freshly applied leave; always starts out pending.
#[derive(Debug, Clone)]
pub struct NewLeave {
    pub student_id: u64,
    pub leave_type: LeaveType,
    pub reason: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
