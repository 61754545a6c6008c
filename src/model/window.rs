use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ValidationError;

/// Inclusive range of calendar dates used by every statistics query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DateWindow {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-31", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

impl DateWindow {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, ValidationError> {
        if end_date < start_date {
            return Err(ValidationError::InvalidWindow);
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// The month ending on `today`, both ends included.
    pub fn last_month(today: NaiveDate) -> Self {
        let start_date = today
            .checked_sub_months(Months::new(1))
            .unwrap_or(NaiveDate::MIN);
        Self {
            start_date,
            end_date: today,
        }
    }

    /// Fills missing bounds from the default window ending on `today`.
    pub fn resolve(
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let default = Self::last_month(today);
        Self::new(
            start_date.unwrap_or(default.start_date),
            end_date.unwrap_or(default.end_date),
        )
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Half-open instant range `[start 00:00, day after end 00:00)` for timestamp columns.
    pub fn instant_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start_date.and_time(NaiveTime::MIN).and_utc();
        let end = self
            .end_date
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN)
            .and_utc();
        (start, end)
    }

    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        let (start, end) = self.instant_bounds();
        start <= instant && instant < end
    }
}
