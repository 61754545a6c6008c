//! Persistence seam for the leave lifecycle.
//!
//! Components receive an `Arc<dyn Store>` at construction, so the workflow can be
//! exercised against the in-memory store in tests and MySQL in production.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::attendance::{Attendance, AttendanceTally, NewAttendance};
use crate::model::leave_request::{LeaveRequest, LeaveType, NewLeave};
use crate::model::student::Student;
use crate::model::window::DateWindow;

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MySqlStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_leave(&self, leave: NewLeave) -> Result<LeaveRequest, StoreError>;

    async fn find_leave_by_id(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError>;

    /// Newest first.
    async fn find_leaves_by_student(&self, student_id: u64)
    -> Result<Vec<LeaveRequest>, StoreError>;

    /// Oldest first, so approvers work through the queue in arrival order.
    async fn find_pending_leaves(&self) -> Result<Vec<LeaveRequest>, StoreError>;

    /// Persists a decision only while the stored row is still pending.
    /// Returns `false` when nothing was updated.
    async fn update_leave_decision(&self, leave: &LeaveRequest) -> Result<bool, StoreError>;

    async fn delete_leave(&self, id: u64) -> Result<bool, StoreError>;

    /// Counts the student's non-rejected leaves intersecting `[start, end]`,
    /// ignoring `exclude_id` when it is non-zero.
    async fn count_overlapping(
        &self,
        student_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: u64,
    ) -> Result<u64, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when the (student, date) pair exists.
    async fn create_attendance(&self, record: NewAttendance) -> Result<Attendance, StoreError>;

    async fn find_attendance(
        &self,
        student_id: u64,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, StoreError>;

    /// Per-student present/total counts for students with at least one record
    /// in the window, optionally narrowed to one student.
    async fn aggregate_attendance(
        &self,
        window: DateWindow,
        student_id: Option<u64>,
    ) -> Result<Vec<AttendanceTally>, StoreError>;

    /// Leaves created inside the window, counted per type.
    async fn aggregate_leave_types(
        &self,
        window: DateWindow,
    ) -> Result<Vec<(LeaveType, u64)>, StoreError>;

    async fn find_student(&self, id: u64) -> Result<Option<Student>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Duplicate,
    #[error("stored value is invalid: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
