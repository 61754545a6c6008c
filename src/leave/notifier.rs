use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use tracing::info;

use super::clock::Clock;
use super::tasks::{TaskError, TaskKind, TaskOutcome, TaskQueue};
use crate::messenger::Messenger;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub subject: String,
    pub body: String,
}

pub fn status_message(leave: &LeaveRequest) -> OutgoingMessage {
    OutgoingMessage {
        subject: format!("Leave Request {}", leave.status),
        body: format!(
            "Your leave request from {} to {} has been {}.",
            leave.start_date, leave.end_date, leave.status
        ),
    }
}

pub fn reminder_message(leave: &LeaveRequest) -> OutgoingMessage {
    OutgoingMessage {
        subject: "Upcoming Leave Reminder".to_string(),
        body: format!(
            "Your leave starts tomorrow ({}). Please make necessary arrangements.",
            leave.start_date
        ),
    }
}

/// 24 hours before the leave starts (midnight UTC on the start date).
pub fn reminder_at(leave: &LeaveRequest) -> DateTime<Utc> {
    leave.start_date.and_time(NaiveTime::MIN).and_utc() - Duration::hours(24)
}

/// Fire-and-forget status and reminder messages.
///
/// Sends run on the task queue; a failed send is reported there and never retried.
#[derive(Clone)]
pub struct NotificationDispatcher {
    store: Arc<dyn Store>,
    messenger: Arc<dyn Messenger>,
    clock: Arc<dyn Clock>,
    tasks: TaskQueue,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn Store>,
        messenger: Arc<dyn Messenger>,
        clock: Arc<dyn Clock>,
        tasks: TaskQueue,
    ) -> Self {
        Self {
            store,
            messenger,
            clock,
            tasks,
        }
    }

    pub fn notify_status(&self, leave: &LeaveRequest) -> u64 {
        let leave = leave.clone();
        let this = self.clone();
        self.tasks
            .submit(TaskKind::StatusNotification, leave.id, async move {
                this.deliver(&leave, status_message(&leave)).await
            })
    }

    /// Returns the task id, or `None` when the reminder moment has already passed.
    ///
    /// A scheduled reminder cannot be revoked. When it wakes it re-reads the
    /// leave and stays silent if the leave was deleted or is no longer approved.
    pub fn schedule_reminder(&self, leave: &LeaveRequest) -> Option<u64> {
        let remind_at = reminder_at(leave);
        let delay = (remind_at - self.clock.now()).to_std().ok()?;
        if delay.is_zero() {
            return None;
        }

        let leave_id = leave.id;
        let this = self.clone();
        let task_id = self.tasks.submit(TaskKind::Reminder, leave_id, async move {
            tokio::time::sleep(delay).await;

            let current = this
                .store
                .find_leave_by_id(leave_id)
                .await
                .map_err(|e| TaskError::Store(e.to_string()))?;
            match current {
                Some(leave) if leave.status == LeaveStatus::Approved => {
                    this.deliver(&leave, reminder_message(&leave)).await
                }
                Some(leave) => Ok(TaskOutcome::Skipped(format!("leave is {}", leave.status))),
                None => Ok(TaskOutcome::Skipped("leave was deleted".to_string())),
            }
        });
        info!(leave_id, task_id, %remind_at, "Leave reminder scheduled");
        Some(task_id)
    }

    async fn deliver(
        &self,
        leave: &LeaveRequest,
        message: OutgoingMessage,
    ) -> Result<TaskOutcome, TaskError> {
        let student = self
            .store
            .find_student(leave.student_id)
            .await
            .map_err(|e| TaskError::Store(e.to_string()))?
            .ok_or(TaskError::StudentMissing(leave.student_id))?;

        self.messenger
            .send(&student.email, &message.subject, &message.body)
            .await
            .map_err(|e| TaskError::Messenger(e.to_string()))?;

        info!(leave_id = leave.id, to = %student.email, subject = %message.subject, "Email sent");
        Ok(TaskOutcome::Sent)
    }
}
