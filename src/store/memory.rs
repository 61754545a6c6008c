use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::{Store, StoreError};
use crate::leave::overlap::overlaps;
use crate::model::attendance::{Attendance, AttendanceTally, NewAttendance};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, NewLeave};
use crate::model::student::Student;
use crate::model::window::DateWindow;

/// Test double mirroring the MySQL schema, including the (student, date) unique key.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    leaves: BTreeMap<u64, LeaveRequest>,
    attendance: Vec<Attendance>,
    students: BTreeMap<u64, Student>,
    next_leave_id: u64,
    next_attendance_id: u64,
    failing_dates: HashSet<NaiveDate>,
}

impl MemoryStore {
    pub fn with_students(students: impl IntoIterator<Item = Student>) -> Self {
        let store = Self::default();
        {
            let mut inner = store.inner.lock().expect("memory store poisoned");
            for student in students {
                inner.students.insert(student.id, student);
            }
        }
        store
    }

    /// Seeds a leave exactly as given, bypassing the workflow.
    pub fn insert_leave(&self, leave: LeaveRequest) {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.next_leave_id = inner.next_leave_id.max(leave.id);
        inner.leaves.insert(leave.id, leave);
    }

    pub fn leave(&self, id: u64) -> Option<LeaveRequest> {
        let inner = self.inner.lock().expect("memory store poisoned");
        inner.leaves.get(&id).cloned()
    }

    pub fn leave_count(&self) -> usize {
        self.inner.lock().expect("memory store poisoned").leaves.len()
    }

    pub fn attendance_rows(&self) -> Vec<Attendance> {
        let inner = self.inner.lock().expect("memory store poisoned");
        inner.attendance.clone()
    }

    /// Makes attendance inserts for `date` fail with a database error.
    pub fn fail_attendance_on(&self, date: NaiveDate) {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.failing_dates.insert(date);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_leave(&self, leave: NewLeave) -> Result<LeaveRequest, StoreError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.next_leave_id += 1;
        let record = LeaveRequest {
            id: inner.next_leave_id,
            student_id: leave.student_id,
            leave_type: leave.leave_type,
            reason: leave.reason,
            start_date: leave.start_date,
            end_date: leave.end_date,
            status: LeaveStatus::Pending,
            approved_by: None,
            remarks: None,
            created_at: leave.created_at,
            updated_at: leave.created_at,
        };
        inner.leaves.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_leave_by_id(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        Ok(self.leave(id))
    }

    async fn find_leaves_by_student(
        &self,
        student_id: u64,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let mut leaves: Vec<_> = inner
            .leaves
            .values()
            .filter(|leave| leave.student_id == student_id)
            .cloned()
            .collect();
        leaves.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(leaves)
    }

    async fn find_pending_leaves(&self) -> Result<Vec<LeaveRequest>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let mut leaves: Vec<_> = inner
            .leaves
            .values()
            .filter(|leave| leave.status == LeaveStatus::Pending)
            .cloned()
            .collect();
        leaves.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(leaves)
    }

    async fn update_leave_decision(&self, leave: &LeaveRequest) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        match inner.leaves.get_mut(&leave.id) {
            Some(stored) if stored.status == LeaveStatus::Pending => {
                stored.status = leave.status;
                stored.approved_by = leave.approved_by;
                stored.remarks = leave.remarks.clone();
                stored.updated_at = leave.updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_leave(&self, id: u64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner.leaves.remove(&id).is_some())
    }

    async fn count_overlapping(
        &self,
        student_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: u64,
    ) -> Result<u64, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let count = inner
            .leaves
            .values()
            .filter(|leave| leave.student_id == student_id)
            .filter(|leave| leave.status != LeaveStatus::Rejected)
            .filter(|leave| exclude_id == 0 || leave.id != exclude_id)
            .filter(|leave| overlaps(leave.start_date, leave.end_date, start, end))
            .count();
        Ok(count as u64)
    }

    async fn create_attendance(&self, record: NewAttendance) -> Result<Attendance, StoreError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        if inner.failing_dates.contains(&record.date) {
            return Err(StoreError::Corrupt(format!("insert failed for {}", record.date)));
        }
        if inner
            .attendance
            .iter()
            .any(|row| row.student_id == record.student_id && row.date == record.date)
        {
            return Err(StoreError::Duplicate);
        }
        inner.next_attendance_id += 1;
        let now = Utc::now();
        let row = Attendance {
            id: inner.next_attendance_id,
            student_id: record.student_id,
            date: record.date,
            present: record.present,
            marked_by: record.marked_by,
            created_at: now,
            updated_at: now,
        };
        inner.attendance.push(row.clone());
        Ok(row)
    }

    async fn find_attendance(
        &self,
        student_id: u64,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .attendance
            .iter()
            .find(|row| row.student_id == student_id && row.date == date)
            .cloned())
    }

    async fn aggregate_attendance(
        &self,
        window: DateWindow,
        student_id: Option<u64>,
    ) -> Result<Vec<AttendanceTally>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let mut tallies: BTreeMap<u64, AttendanceTally> = BTreeMap::new();
        for row in &inner.attendance {
            if !window.contains(row.date) || student_id.is_some_and(|id| id != row.student_id) {
                continue;
            }
            let Some(student) = inner.students.get(&row.student_id) else {
                continue;
            };
            let tally = tallies
                .entry(row.student_id)
                .or_insert_with(|| AttendanceTally {
                    student_id: student.id,
                    name: student.name.clone(),
                    dept: student.dept.clone(),
                    present_days: 0,
                    total_days: 0,
                });
            tally.total_days += 1;
            if row.present {
                tally.present_days += 1;
            }
        }
        Ok(tallies.into_values().collect())
    }

    async fn aggregate_leave_types(
        &self,
        window: DateWindow,
    ) -> Result<Vec<(LeaveType, u64)>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let mut counts: BTreeMap<LeaveType, u64> = BTreeMap::new();
        for leave in inner.leaves.values() {
            if window.contains_instant(leave.created_at) {
                *counts.entry(leave.leave_type).or_default() += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }

    async fn find_student(&self, id: u64) -> Result<Option<Student>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner.students.get(&id).cloned())
    }
}
