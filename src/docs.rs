use crate::api::analytics::{AnalyticsQuery, AnalyticsSummary};
use crate::api::attendance::{AttendanceStatsQuery, MarkAttendance};
use crate::api::leave_request::DecideLeave;
use crate::leave::ApplyLeave;
use crate::model::attendance::{Attendance, AttendanceStats, LowAttendanceEntry};
use crate::model::leave_request::{Decision, LeaveRequest, LeaveStatus, LeaveType};
use crate::model::window::DateWindow;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campus Leave API",
        version = "1.0.0",
        description = r#"
## Campus Leave & Attendance Service

Students apply for leave; faculty, wardens and administrators decide on it.

### Key Features
- **Leave Management**
  - Apply for leave, approve/reject requests, view history and the pending queue
- **Attendance**
  - Mark daily attendance; approved leave days are recorded as absences automatically
- **Analytics**
  - Leave counts by type and students below an attendance threshold
- **Notifications**
  - Email on every decision and a reminder the day before an approved leave starts

### Security
Every endpoint requires a **JWT Bearer** access token.
Roles: `admin`, `faculty`, `warden`, `student`.

### Errors
Failures return `{"error": "..."}` with 400, 404, 409 or 500.
"#,
    ),
    paths(
        crate::api::leave_request::apply_leave,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::pending_leaves,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::decide_leave,
        crate::api::leave_request::delete_leave,

        crate::api::attendance::mark_attendance,
        crate::api::attendance::attendance_stats,

        crate::api::analytics::leave_types,
        crate::api::analytics::low_attendance,
        crate::api::analytics::summary
    ),
    components(
        schemas(
            ApplyLeave,
            DecideLeave,
            Decision,
            LeaveRequest,
            LeaveStatus,
            LeaveType,
            MarkAttendance,
            Attendance,
            AttendanceStats,
            AttendanceStatsQuery,
            AnalyticsQuery,
            AnalyticsSummary,
            LowAttendanceEntry,
            DateWindow
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request APIs"),
        (name = "Attendance", description = "Attendance APIs"),
        (name = "Analytics", description = "Leave and attendance statistics"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
