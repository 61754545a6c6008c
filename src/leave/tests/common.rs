use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::leave::clock::Clock;
use crate::leave::tasks::{TaskKind, TaskReport};
use crate::leave::{ApplyLeave, AttendanceService, KeyedLocks, LeaveService, TaskQueue};
use crate::messenger::{Messenger, MessengerError};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::student::Student;
use crate::store::memory::MemoryStore;

pub(crate) const STUDENT: u64 = 42;
pub(crate) const OTHER_STUDENT: u64 = 43;
pub(crate) const APPROVER: u64 = 900;

pub(crate) struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SentMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub(crate) struct RecordingMessenger {
    sent: Mutex<Vec<SentMessage>>,
    fail: bool,
}

impl RecordingMessenger {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("messenger poisoned").clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MessengerError> {
        if self.fail {
            return Err(MessengerError::Transport("connection refused".into()));
        }
        self.sent.lock().expect("messenger poisoned").push(SentMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// 2024-03-20 12:00 UTC
pub(crate) fn noon_march_20() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
}

pub(crate) fn students() -> Vec<Student> {
    vec![
        Student {
            id: STUDENT,
            name: "Asha Rao".into(),
            email: "asha@campus.edu".into(),
            dept: "CSE".into(),
        },
        Student {
            id: OTHER_STUDENT,
            name: "Ben Okafor".into(),
            email: "ben@campus.edu".into(),
            dept: "EEE".into(),
        },
    ]
}

pub(crate) fn request(leave_type: LeaveType, start: NaiveDate, end: NaiveDate) -> ApplyLeave {
    ApplyLeave {
        leave_type,
        reason: "Fever".into(),
        start_date: start,
        end_date: end,
    }
}

pub(crate) struct Harness {
    pub store: Arc<MemoryStore>,
    pub messenger: Arc<RecordingMessenger>,
    pub tasks: TaskQueue,
    pub reports: UnboundedReceiver<TaskReport>,
    pub held: Vec<TaskReport>,
    pub leaves: LeaveService,
    pub attendance: AttendanceService,
}

impl Harness {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self::with_messenger(now, RecordingMessenger::default())
    }

    pub fn with_messenger(now: DateTime<Utc>, messenger: RecordingMessenger) -> Self {
        let store = Arc::new(MemoryStore::with_students(students()));
        let messenger = Arc::new(messenger);
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(now));
        let locks = Arc::new(KeyedLocks::new());
        let (tasks, reports) = TaskQueue::new();

        let leaves = LeaveService::new(
            store.clone(),
            messenger.clone(),
            clock.clone(),
            locks.clone(),
            tasks.clone(),
        );
        let attendance = AttendanceService::new(store.clone(), clock, locks);

        Self {
            store,
            messenger,
            tasks,
            reports,
            held: Vec::new(),
            leaves,
            attendance,
        }
    }

    pub async fn report(&mut self, kind: TaskKind) -> TaskReport {
        self.report_within(kind, Duration::from_secs(5)).await
    }

    /// Waits for the next report of `kind`, holding reports of other kinds
    /// for later calls. Under paused time the limit must exceed any sleep
    /// being waited on.
    pub async fn report_within(&mut self, kind: TaskKind, limit: Duration) -> TaskReport {
        if let Some(pos) = self.held.iter().position(|r| r.kind == kind) {
            return self.held.remove(pos);
        }
        let held = &mut self.held;
        let reports = &mut self.reports;
        let wait = async move {
            loop {
                let report = reports.recv().await.expect("task queue closed");
                if report.kind == kind {
                    return report;
                }
                held.push(report);
            }
        };
        tokio::time::timeout(limit, wait)
            .await
            .unwrap_or_else(|_| panic!("no {kind} report"))
    }
}

/// Seeds a leave created at 2024-03-01 09:00 UTC with the given status.
pub(crate) fn seed_leave(
    store: &MemoryStore,
    id: u64,
    start: NaiveDate,
    end: NaiveDate,
    status: LeaveStatus,
) {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    store.insert_leave(LeaveRequest {
        id,
        student_id: STUDENT,
        leave_type: LeaveType::Personal,
        reason: "seeded".into(),
        start_date: start,
        end_date: end,
        status,
        approved_by: None,
        remarks: None,
        created_at: created,
        updated_at: created,
    });
}
