use std::sync::Arc;

use chrono::NaiveDate;

use crate::store::{Store, StoreError};

/// Closed-interval intersection; ranges sharing an endpoint overlap.
#[cfg(test)]
pub fn overlaps(a_start: NaiveDate, a_end: NaiveDate, b_start: NaiveDate, b_end: NaiveDate) -> bool {
    a_start <= b_end && b_start <= a_end
}

#[derive(Clone)]
pub struct OverlapChecker {
    store: Arc<dyn Store>,
}

impl OverlapChecker {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// True when any of the student's pending or approved leaves intersects
    /// `[start, end]`. A non-zero `exclude_leave_id` is left out of the comparison.
    pub async fn has_conflict(
        &self,
        student_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        exclude_leave_id: u64,
    ) -> Result<bool, StoreError> {
        let count = self
            .store
            .count_overlapping(student_id, start, end, exclude_leave_id)
            .await?;
        Ok(count > 0)
    }
}
