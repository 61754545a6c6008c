use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use super::clock::Clock;
use super::locks::{KeyedLocks, LockKey};
use super::stats::StatsAggregator;
use crate::error::{ConflictError, LeaveError, NotFoundError, ValidationError};
use crate::model::attendance::{Attendance, AttendanceStats, LowAttendanceEntry, NewAttendance};
use crate::model::window::DateWindow;
use crate::store::{Store, StoreError};

pub struct AttendanceService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    locks: Arc<KeyedLocks>,
    stats: StatsAggregator,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, locks: Arc<KeyedLocks>) -> Self {
        Self {
            stats: StatsAggregator::new(store.clone()),
            store,
            clock,
            locks,
        }
    }

    /// Records one day for one student; a second mark for the same day conflicts.
    #[instrument(skip(self))]
    pub async fn mark_attendance(
        &self,
        student_id: u64,
        date: NaiveDate,
        present: bool,
        marked_by: u64,
    ) -> Result<Attendance, LeaveError> {
        if self.store.find_student(student_id).await?.is_none() {
            return Err(NotFoundError::Student(student_id).into());
        }

        let _guard = self.locks.acquire(LockKey::Student(student_id)).await;

        if self.store.find_attendance(student_id, date).await?.is_some() {
            return Err(ConflictError::AttendanceExists.into());
        }

        let record = self
            .store
            .create_attendance(NewAttendance {
                student_id,
                date,
                present,
                marked_by,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate => LeaveError::from(ConflictError::AttendanceExists),
                other => other.into(),
            })?;

        info!(attendance_id = record.id, "Attendance marked");
        Ok(record)
    }

    pub async fn get_attendance_stats(
        &self,
        student_id: u64,
        window: DateWindow,
    ) -> Result<AttendanceStats, LeaveError> {
        Ok(self.stats.attendance_stats(student_id, window).await?)
    }

    /// Worst-first students below `threshold`; defaults to the month ending today.
    pub async fn get_low_attendance(
        &self,
        threshold: f64,
        window: Option<DateWindow>,
    ) -> Result<Vec<LowAttendanceEntry>, LeaveError> {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ValidationError::InvalidThreshold.into());
        }
        let window = window.unwrap_or_else(|| DateWindow::last_month(self.clock.today()));
        Ok(self.stats.low_attendance(threshold, window).await?)
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}
