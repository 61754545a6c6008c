use chrono::{Duration, TimeZone, Utc};

use super::common::{Harness, OTHER_STUDENT, STUDENT, date, noon_march_20, seed_leave};
use crate::error::{ConflictError, LeaveError, NotFoundError, ValidationError};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::window::DateWindow;

const FACULTY: u64 = 7;

/// Marks ten consecutive days from March 1st, the first `present` of them present.
async fn mark_ten_days(h: &Harness, student_id: u64, present: usize) {
    for day in 0..10 {
        h.attendance
            .mark_attendance(
                student_id,
                date(2024, 3, 1) + Duration::days(day),
                (day as usize) < present,
                FACULTY,
            )
            .await
            .expect("mark");
    }
}

fn march() -> DateWindow {
    DateWindow::new(date(2024, 3, 1), date(2024, 3, 31)).expect("window")
}

#[tokio::test]
async fn marking_records_one_row() {
    let h = Harness::at(noon_march_20());
    let record = h
        .attendance
        .mark_attendance(STUDENT, date(2024, 3, 20), true, FACULTY)
        .await
        .expect("mark");

    assert_eq!(record.student_id, STUDENT);
    assert!(record.present);
    assert_eq!(record.marked_by, FACULTY);
    assert_eq!(h.store.attendance_rows(), vec![record]);
}

#[tokio::test]
async fn second_mark_for_the_same_day_conflicts() {
    let h = Harness::at(noon_march_20());
    h.attendance
        .mark_attendance(STUDENT, date(2024, 3, 20), true, FACULTY)
        .await
        .expect("first mark");

    let err = h
        .attendance
        .mark_attendance(STUDENT, date(2024, 3, 20), false, FACULTY)
        .await
        .expect_err("already marked");

    assert!(matches!(
        err,
        LeaveError::Conflict(ConflictError::AttendanceExists)
    ));
    assert_eq!(h.store.attendance_rows().len(), 1);
    assert!(h.store.attendance_rows()[0].present);
}

#[tokio::test]
async fn unknown_student_cannot_be_marked() {
    let h = Harness::at(noon_march_20());
    let err = h
        .attendance
        .mark_attendance(404, date(2024, 3, 20), true, FACULTY)
        .await
        .expect_err("no such student");
    assert!(matches!(
        err,
        LeaveError::NotFound(NotFoundError::Student(404))
    ));
}

#[tokio::test]
async fn low_attendance_lists_only_students_below_threshold() {
    let h = Harness::at(noon_march_20());
    mark_ten_days(&h, STUDENT, 3).await;
    mark_ten_days(&h, OTHER_STUDENT, 8).await;

    let low = h
        .attendance
        .get_low_attendance(75.0, Some(march()))
        .await
        .expect("stats");

    assert_eq!(low.len(), 1);
    assert_eq!(low[0].student_id, STUDENT);
    assert_eq!(low[0].name, "Asha Rao");
    assert_eq!(low[0].dept, "CSE");
    assert_eq!((low[0].present_days, low[0].total_days), (3, 10));
    assert!((low[0].percentage - 30.0).abs() < 1e-9);
}

#[tokio::test]
async fn low_attendance_defaults_to_the_last_month() {
    let h = Harness::at(noon_march_20());
    mark_ten_days(&h, STUDENT, 0).await;
    // outside the month ending 2024-03-20
    h.attendance
        .mark_attendance(OTHER_STUDENT, date(2024, 2, 1), false, FACULTY)
        .await
        .expect("mark");

    let low = h
        .attendance
        .get_low_attendance(75.0, None)
        .await
        .expect("stats");

    let ids: Vec<_> = low.iter().map(|entry| entry.student_id).collect();
    assert_eq!(ids, vec![STUDENT]);
}

#[tokio::test]
async fn threshold_outside_percent_range_is_rejected() {
    let h = Harness::at(noon_march_20());
    for threshold in [-1.0, 100.5] {
        let err = h
            .attendance
            .get_low_attendance(threshold, Some(march()))
            .await
            .expect_err("out of range");
        assert!(matches!(
            err,
            LeaveError::Validation(ValidationError::InvalidThreshold)
        ));
    }
}

#[tokio::test]
async fn student_without_records_has_zero_percent() {
    let h = Harness::at(noon_march_20());
    mark_ten_days(&h, STUDENT, 5).await;

    let stats = h
        .attendance
        .get_attendance_stats(OTHER_STUDENT, march())
        .await
        .expect("stats");
    assert_eq!((stats.present_days, stats.total_days), (0, 0));
    assert_eq!(stats.percentage, 0.0);

    let low = h
        .attendance
        .get_low_attendance(100.0, Some(march()))
        .await
        .expect("stats");
    assert!(low.iter().all(|entry| entry.student_id != OTHER_STUDENT));

    let mine = h
        .attendance
        .get_attendance_stats(STUDENT, march())
        .await
        .expect("stats");
    assert_eq!((mine.present_days, mine.total_days), (5, 10));
    assert!((mine.percentage - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn leave_type_breakdown_counts_requests_created_in_window() {
    let h = Harness::at(noon_march_20());
    // seeded leaves are created 2024-03-01
    seed_leave(
        &h.store,
        1,
        date(2024, 3, 25),
        date(2024, 3, 26),
        LeaveStatus::Approved,
    );
    seed_leave(
        &h.store,
        2,
        date(2024, 4, 5),
        date(2024, 4, 6),
        LeaveStatus::Rejected,
    );
    let february = Utc.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap();
    h.store.insert_leave(LeaveRequest {
        id: 3,
        student_id: OTHER_STUDENT,
        leave_type: LeaveType::Medical,
        reason: "flu".into(),
        start_date: date(2024, 2, 12),
        end_date: date(2024, 2, 13),
        status: LeaveStatus::Approved,
        approved_by: Some(900),
        remarks: None,
        created_at: february,
        updated_at: february,
    });

    let breakdown = h.leaves.get_leave_stats(march()).await.expect("stats");
    assert_eq!(breakdown.count(LeaveType::Personal), 2);
    assert_eq!(breakdown.count(LeaveType::Medical), 0);

    let quarter = DateWindow::new(date(2024, 1, 1), date(2024, 3, 31)).expect("window");
    let breakdown = h.leaves.get_leave_stats(quarter).await.expect("stats");
    assert_eq!(breakdown.count(LeaveType::Medical), 1);
    assert_eq!(breakdown.count(LeaveType::Emergency), 0);
}
