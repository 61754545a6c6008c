use std::sync::Arc;

use tracing::{debug, warn};

use super::locks::{KeyedLocks, LockKey};
use super::tasks::TaskOutcome;
use crate::model::attendance::NewAttendance;
use crate::model::leave_request::LeaveRequest;
use crate::store::{Store, StoreError};

/// One absent record per day of the leave, ascending, marked by the approver.
pub fn derive_absences(leave: &LeaveRequest, approver_id: u64) -> Vec<NewAttendance> {
    leave
        .start_date
        .iter_days()
        .take_while(|date| *date <= leave.end_date)
        .map(|date| NewAttendance {
            student_id: leave.student_id,
            date,
            present: false,
            marked_by: approver_id,
        })
        .collect()
}

/// Materializes derived absences for an approved leave.
///
/// Each day is inserted on its own under the student's lock, so a day that is
/// already marked is skipped and a failed day does not stop the rest.
pub struct AttendanceDeriver {
    store: Arc<dyn Store>,
    locks: Arc<KeyedLocks>,
}

impl AttendanceDeriver {
    pub fn new(store: Arc<dyn Store>, locks: Arc<KeyedLocks>) -> Self {
        Self { store, locks }
    }

    pub async fn apply(&self, leave: &LeaveRequest, approver_id: u64) -> TaskOutcome {
        let mut inserted = 0;
        let mut skipped = 0;
        let mut failed = 0;

        for record in derive_absences(leave, approver_id) {
            let date = record.date;
            let _guard = self.locks.acquire(LockKey::Student(record.student_id)).await;

            match self.store.find_attendance(record.student_id, date).await {
                Ok(Some(_)) => {
                    debug!(leave_id = leave.id, %date, "Attendance already marked, skipping");
                    skipped += 1;
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(leave_id = leave.id, %date, error = %e, "Attendance lookup failed");
                    failed += 1;
                    continue;
                }
            }

            match self.store.create_attendance(record).await {
                Ok(_) => inserted += 1,
                Err(StoreError::Duplicate) => skipped += 1,
                Err(e) => {
                    warn!(leave_id = leave.id, %date, error = %e, "Failed to insert derived attendance");
                    failed += 1;
                }
            }
        }

        TaskOutcome::Derived {
            inserted,
            skipped,
            failed,
        }
    }
}
