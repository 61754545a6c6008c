use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::LeaveError;
use crate::leave::stats::LeaveTypeBreakdown;
use crate::leave::{AttendanceService, LeaveService};
use crate::model::attendance::LowAttendanceEntry;
use crate::model::window::DateWindow;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AnalyticsQuery {
    /// Window start (defaults to one month before today)
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    #[param(value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    /// Window end (defaults to today)
    #[schema(example = "2026-01-31", format = "date", value_type = Option<String>)]
    #[param(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    /// Attendance percentage below which a student is listed
    #[schema(example = 75.0)]
    pub threshold: Option<f64>,
}

impl AnalyticsQuery {
    fn window(&self, today: NaiveDate) -> Result<DateWindow, LeaveError> {
        Ok(DateWindow::resolve(self.start_date, self.end_date, today)?)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "window": { "start_date": "2026-01-01", "end_date": "2026-01-31" },
    "threshold": 75.0,
    "leave_types": { "Medical": 4, "Personal": 2 },
    "low_attendance": [{
        "student_id": 42,
        "name": "Asha Rao",
        "dept": "CSE",
        "present_days": 3,
        "total_days": 10,
        "percentage": 30.0
    }]
}))]
pub struct AnalyticsSummary {
    pub window: DateWindow,
    pub threshold: f64,
    #[schema(value_type = Object)]
    pub leave_types: LeaveTypeBreakdown,
    pub low_attendance: Vec<LowAttendanceEntry>,
}

/// Leave requests per type, counted by submission time (Admin)
#[utoipa::path(
    get,
    path = "/api/analytics/leave-types",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Leave count per type", body = Object, example = json!({
            "Medical": 4,
            "Personal": 2
        })),
        (status = 400, description = "Inverted window"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Analytics"
)]
pub async fn leave_types(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    query: web::Query<AnalyticsQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let window = query.window(service.today())?;
    let breakdown = service.get_leave_stats(window).await?;
    Ok(HttpResponse::Ok().json(breakdown))
}

/// Students under the attendance threshold, worst first (at most 10)
#[utoipa::path(
    get,
    path = "/api/analytics/low-attendance",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Students below the threshold", body = [LowAttendanceEntry]),
        (status = 400, description = "Threshold outside 0..=100 or inverted window"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Analytics"
)]
pub async fn low_attendance(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    config: web::Data<Config>,
    query: web::Query<AnalyticsQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let threshold = query.threshold.unwrap_or(config.low_attendance_threshold);
    let window = match (query.start_date, query.end_date) {
        (None, None) => None,
        _ => Some(query.window(service.today())?),
    };

    let entries = service.get_low_attendance(threshold, window).await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// Leave breakdown and low-attendance list for the same window (Admin)
#[utoipa::path(
    get,
    path = "/api/analytics/summary",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Combined analytics", body = AnalyticsSummary),
        (status = 400, description = "Threshold outside 0..=100 or inverted window"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Analytics"
)]
pub async fn summary(
    auth: AuthUser,
    leaves: web::Data<LeaveService>,
    attendance: web::Data<AttendanceService>,
    config: web::Data<Config>,
    query: web::Query<AnalyticsQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let threshold = query.threshold.unwrap_or(config.low_attendance_threshold);
    let window = query.window(leaves.today())?;

    let (leave_types, low_attendance) = futures::try_join!(
        leaves.get_leave_stats(window),
        attendance.get_low_attendance(threshold, Some(window)),
    )?;

    Ok(HttpResponse::Ok().json(AnalyticsSummary {
        window,
        threshold,
        leave_types,
        low_attendance,
    }))
}
