use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ValidationError;

/// Checks a requested range against the moment the request is made.
///
/// The range check runs first, so an inverted range in the past reports
/// `InvalidDateRange`. "Past" means before the start of the current UTC day;
/// a leave starting today is accepted.
pub fn validate_dates(
    start_date: NaiveDate,
    end_date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if end_date < start_date {
        return Err(ValidationError::InvalidDateRange);
    }
    if start_date < now.date_naive() {
        return Err(ValidationError::PastDate);
    }
    Ok(())
}

/// A reason made only of whitespace counts as missing.
pub fn validate_reason(reason: &str) -> Result<(), ValidationError> {
    if reason.trim().is_empty() {
        return Err(ValidationError::MissingReason);
    }
    Ok(())
}
