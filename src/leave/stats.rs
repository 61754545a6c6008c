use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::model::attendance::{AttendanceStats, AttendanceTally, LowAttendanceEntry};
use crate::model::leave_request::LeaveType;
use crate::model::window::DateWindow;
use crate::store::{Store, StoreError};

/// The low-attendance ranking never lists more students than this.
pub const LOW_ATTENDANCE_LIMIT: usize = 10;

/// Leave counts keyed by type; serializes as `{"Medical": 3, ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LeaveTypeBreakdown(pub BTreeMap<LeaveType, u64>);

#[cfg(test)]
impl LeaveTypeBreakdown {
    pub fn count(&self, leave_type: LeaveType) -> u64 {
        self.0.get(&leave_type).copied().unwrap_or(0)
    }
}

/// `present / total * 100`, with an empty history counting as 0%.
pub fn percentage(present_days: u64, total_days: u64) -> f64 {
    if total_days == 0 {
        return 0.0;
    }
    present_days as f64 / total_days as f64 * 100.0
}

/// Worst-first list of students strictly below `threshold`.
///
/// Students without records are left out rather than reported at 0%.
pub fn rank_low_attendance(tallies: Vec<AttendanceTally>, threshold: f64) -> Vec<LowAttendanceEntry> {
    let mut entries: Vec<LowAttendanceEntry> = tallies
        .into_iter()
        .filter(|tally| tally.total_days > 0)
        .map(|tally| LowAttendanceEntry {
            percentage: percentage(tally.present_days, tally.total_days),
            student_id: tally.student_id,
            name: tally.name,
            dept: tally.dept,
            present_days: tally.present_days,
            total_days: tally.total_days,
        })
        .filter(|entry| entry.percentage < threshold)
        .collect();

    entries.sort_by(|a, b| {
        a.percentage
            .total_cmp(&b.percentage)
            .then(a.student_id.cmp(&b.student_id))
    });
    entries.truncate(LOW_ATTENDANCE_LIMIT);
    entries
}

#[derive(Clone)]
pub struct StatsAggregator {
    store: Arc<dyn Store>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn leave_type_breakdown(
        &self,
        window: DateWindow,
    ) -> Result<LeaveTypeBreakdown, StoreError> {
        let counts = self.store.aggregate_leave_types(window).await?;
        let mut breakdown = BTreeMap::new();
        for (leave_type, count) in counts {
            *breakdown.entry(leave_type).or_default() += count;
        }
        Ok(LeaveTypeBreakdown(breakdown))
    }

    pub async fn low_attendance(
        &self,
        threshold: f64,
        window: DateWindow,
    ) -> Result<Vec<LowAttendanceEntry>, StoreError> {
        let tallies = self.store.aggregate_attendance(window, None).await?;
        Ok(rank_low_attendance(tallies, threshold))
    }

    pub async fn attendance_stats(
        &self,
        student_id: u64,
        window: DateWindow,
    ) -> Result<AttendanceStats, StoreError> {
        let tallies = self
            .store
            .aggregate_attendance(window, Some(student_id))
            .await?;
        let (present_days, total_days) = tallies
            .iter()
            .filter(|tally| tally.student_id == student_id)
            .fold((0, 0), |(present, total), tally| {
                (present + tally.present_days, total + tally.total_days)
            });

        Ok(AttendanceStats {
            student_id,
            present_days,
            total_days,
            percentage: percentage(present_days, total_days),
        })
    }
}
