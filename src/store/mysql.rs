use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use super::{Store, StoreError};
use crate::model::attendance::{Attendance, AttendanceTally, NewAttendance};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, NewLeave};
use crate::model::student::Student;
use crate::model::window::DateWindow;

const LEAVE_COLUMNS: &str = r#"
    id, student_id, leave_type, reason, start_date, end_date,
    status, approved_by, remarks, created_at, updated_at
"#;

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: u64,
    student_id: u64,
    leave_type: String,
    reason: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
    approved_by: Option<u64>,
    remarks: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let leave_type = row
            .leave_type
            .parse::<LeaveType>()
            .map_err(|_| StoreError::Corrupt(format!("leave type `{}`", row.leave_type)))?;
        let status = row
            .status
            .parse::<LeaveStatus>()
            .map_err(|_| StoreError::Corrupt(format!("leave status `{}`", row.status)))?;

        Ok(LeaveRequest {
            id: row.id,
            student_id: row.student_id,
            leave_type,
            reason: row.reason,
            start_date: row.start_date,
            end_date: row.end_date,
            status,
            approved_by: row.approved_by,
            remarks: row.remarks,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    student_id: u64,
    date: NaiveDate,
    present: bool,
    marked_by: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AttendanceRow> for Attendance {
    fn from(row: AttendanceRow) -> Self {
        Attendance {
            id: row.id,
            student_id: row.student_id,
            date: row.date,
            present: row.present,
            marked_by: row.marked_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct TallyRow {
    student_id: u64,
    name: String,
    dept: String,
    total_days: i64,
    present_days: i64,
}

#[derive(FromRow)]
struct LeaveTypeCountRow {
    leave_type: String,
    total: i64,
}

// SQLSTATE 23000 also covers foreign key failures, so only unique keys count
fn is_duplicate(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

fn into_leaves(rows: Vec<LeaveRow>) -> Result<Vec<LeaveRequest>, StoreError> {
    rows.into_iter().map(LeaveRequest::try_from).collect()
}

#[async_trait]
impl Store for MySqlStore {
    async fn create_leave(&self, leave: NewLeave) -> Result<LeaveRequest, StoreError> {
        let status = LeaveStatus::Pending;
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (student_id, leave_type, reason, start_date, end_date, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(leave.student_id)
        .bind(leave.leave_type.as_ref())
        .bind(&leave.reason)
        .bind(leave.start_date)
        .bind(leave.end_date)
        .bind(status.as_ref())
        .bind(leave.created_at)
        .bind(leave.created_at)
        .execute(&self.pool)
        .await?;

        Ok(LeaveRequest {
            id: result.last_insert_id(),
            student_id: leave.student_id,
            leave_type: leave.leave_type,
            reason: leave.reason,
            start_date: leave.start_date,
            end_date: leave.end_date,
            status,
            approved_by: None,
            remarks: None,
            created_at: leave.created_at,
            updated_at: leave.created_at,
        })
    }

    async fn find_leave_by_id(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(LeaveRequest::try_from).transpose()
    }

    async fn find_leaves_by_student(
        &self,
        student_id: u64,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE student_id = ? ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await?;

        into_leaves(rows)
    }

    async fn find_pending_leaves(&self) -> Result<Vec<LeaveRequest>, StoreError> {
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE status = ? ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(LeaveStatus::Pending.as_ref())
            .fetch_all(&self.pool)
            .await?;

        into_leaves(rows)
    }

    async fn update_leave_decision(&self, leave: &LeaveRequest) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, approved_by = ?, remarks = ?, updated_at = ?
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(leave.status.as_ref())
        .bind(leave.approved_by)
        .bind(leave.remarks.as_deref())
        .bind(leave.updated_at)
        .bind(leave.id)
        .bind(LeaveStatus::Pending.as_ref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_leave(&self, id: u64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_overlapping(
        &self,
        student_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: u64,
    ) -> Result<u64, StoreError> {
        // ids start at 1, so `id <> 0` excludes nothing
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM leave_requests
            WHERE student_id = ?
            AND status <> ?
            AND start_date <= ?
            AND end_date >= ?
            AND id <> ?
            "#,
        )
        .bind(student_id)
        .bind(LeaveStatus::Rejected.as_ref())
        .bind(end)
        .bind(start)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn create_attendance(&self, record: NewAttendance) -> Result<Attendance, StoreError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO attendances (student_id, date, present, marked_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.student_id)
        .bind(record.date)
        .bind(record.present)
        .bind(record.marked_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_duplicate(&e) {
                StoreError::Duplicate
            } else {
                StoreError::Database(e)
            }
        })?;

        Ok(Attendance {
            id: result.last_insert_id(),
            student_id: record.student_id,
            date: record.date,
            present: record.present,
            marked_by: record.marked_by,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_attendance(
        &self,
        student_id: u64,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, StoreError> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, student_id, date, present, marked_by, created_at, updated_at
            FROM attendances
            WHERE student_id = ? AND date = ?
            LIMIT 1
            "#,
        )
        .bind(student_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Attendance::from))
    }

    async fn aggregate_attendance(
        &self,
        window: DateWindow,
        student_id: Option<u64>,
    ) -> Result<Vec<AttendanceTally>, StoreError> {
        let mut sql = String::from(
            r#"
            SELECT
                u.id AS student_id,
                u.name,
                COALESCE(u.dept, '') AS dept,
                COUNT(*) AS total_days,
                CAST(SUM(CASE WHEN a.present THEN 1 ELSE 0 END) AS SIGNED) AS present_days
            FROM users u
            INNER JOIN attendances a ON u.id = a.student_id
            WHERE u.role = 'student'
            AND a.date BETWEEN ? AND ?
            "#,
        );
        if student_id.is_some() {
            sql.push_str(" AND u.id = ?");
        }
        sql.push_str(" GROUP BY u.id, u.name, u.dept");

        let mut query = sqlx::query_as::<_, TallyRow>(&sql)
            .bind(window.start_date)
            .bind(window.end_date);
        if let Some(id) = student_id {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| AttendanceTally {
                student_id: row.student_id,
                name: row.name,
                dept: row.dept,
                present_days: row.present_days.max(0) as u64,
                total_days: row.total_days.max(0) as u64,
            })
            .collect())
    }

    async fn aggregate_leave_types(
        &self,
        window: DateWindow,
    ) -> Result<Vec<(LeaveType, u64)>, StoreError> {
        let (from, until) = window.instant_bounds();
        let rows = sqlx::query_as::<_, LeaveTypeCountRow>(
            r#"
            SELECT leave_type, COUNT(*) AS total
            FROM leave_requests
            WHERE created_at >= ? AND created_at < ?
            GROUP BY leave_type
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let leave_type = row.leave_type.parse::<LeaveType>().map_err(|_| {
                    StoreError::Corrupt(format!("leave type `{}`", row.leave_type))
                })?;
                Ok((leave_type, row.total.max(0) as u64))
            })
            .collect()
    }

    async fn find_student(&self, id: u64) -> Result<Option<Student>, StoreError> {
        let row = sqlx::query_as::<_, (u64, String, String, String)>(
            r#"
            SELECT id, name, email, COALESCE(dept, '')
            FROM users
            WHERE id = ? AND role = 'student'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name, email, dept)| Student {
            id,
            name,
            email,
            dept,
        }))
    }
}
