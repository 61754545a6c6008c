use crate::auth::auth::AuthUser;
use crate::error::LeaveError;
use crate::leave::AttendanceService;
use crate::model::window::DateWindow;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkAttendance {
    #[schema(example = 42)]
    pub student_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = true)]
    pub present: bool,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceStatsQuery {
    /// Student to report on; ignored for students, who always see their own
    #[schema(example = 42)]
    pub student_id: Option<u64>,
    /// Window start (defaults to one month before today)
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    #[param(value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    /// Window end (defaults to today)
    #[schema(example = "2026-01-31", format = "date", value_type = Option<String>)]
    #[param(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
}

/// Mark one day of attendance for a student
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body(
        content = MarkAttendance,
        description = "Attendance record",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Attendance marked", body = Attendance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Attendance already marked for this date", body = Object, example = json!({
            "error": "attendance already marked for this date"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    payload: web::Json<MarkAttendance>,
) -> actix_web::Result<impl Responder> {
    auth.require_marker()?;

    let record = service
        .mark_attendance(payload.student_id, payload.date, payload.present, auth.user_id)
        .await?;

    Ok(HttpResponse::Created().json(record))
}

/// Attendance percentage of one student over a window
#[utoipa::path(
    get,
    path = "/api/attendance/stats",
    params(AttendanceStatsQuery),
    responses(
        (status = 200, description = "Attendance statistics", body = AttendanceStats),
        (status = 400, description = "Missing student_id or inverted window"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_stats(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    query: web::Query<AttendanceStatsQuery>,
) -> actix_web::Result<impl Responder> {
    let student_id = if auth.is_student() {
        auth.user_id
    } else {
        query
            .student_id
            .ok_or_else(|| actix_web::error::ErrorBadRequest("student_id is required"))?
    };

    let window = DateWindow::resolve(query.start_date, query.end_date, service.today())
        .map_err(LeaveError::from)?;

    let stats = service.get_attendance_stats(student_id, window).await?;
    Ok(HttpResponse::Ok().json(stats))
}
