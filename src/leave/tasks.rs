//! Background work submitted by the leave workflow.
//!
//! Jobs run detached on their own tokio task; the submitter never waits for
//! them. Each finished job publishes a [`TaskReport`] so failures stay
//! observable: the server drains the channel into the log, tests assert on it.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use strum_macros::Display;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    DeriveAttendance,
    StatusNotification,
    Reminder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Sent,
    Derived {
        inserted: u32,
        skipped: u32,
        failed: u32,
    },
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("student {0} not found")]
    StudentMissing(u64),
    #[error("store error: {0}")]
    Store(String),
    #[error("message not sent: {0}")]
    Messenger(String),
}

#[derive(Debug, Clone)]
pub struct TaskReport {
    pub task_id: u64,
    pub kind: TaskKind,
    pub leave_id: u64,
    pub result: Result<TaskOutcome, TaskError>,
}

#[derive(Clone)]
pub struct TaskQueue {
    reports: mpsc::UnboundedSender<TaskReport>,
    sequence: Arc<AtomicU64>,
}

impl TaskQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TaskReport>) {
        let (reports, receiver) = mpsc::unbounded_channel();
        let queue = Self {
            reports,
            sequence: Arc::new(AtomicU64::new(0)),
        };
        (queue, receiver)
    }

    /// Number of jobs submitted so far.
    #[cfg(test)]
    pub fn submitted(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Spawns `job` and returns its task id without waiting for it.
    pub fn submit<F>(&self, kind: TaskKind, leave_id: u64, job: F) -> u64
    where
        F: Future<Output = Result<TaskOutcome, TaskError>> + Send + 'static,
    {
        let task_id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let reports = self.reports.clone();
        debug!(task_id, %kind, leave_id, "Background task submitted");

        tokio::spawn(async move {
            let result = job.await;
            if let Err(e) = &result {
                error!(task_id, %kind, leave_id, error = %e, "Background task failed");
            }
            // a closed channel only means nobody is listening any more
            let _ = reports.send(TaskReport {
                task_id,
                kind,
                leave_id,
                result,
            });
        });

        task_id
    }
}

/// Logs every report until all queue handles are dropped.
pub async fn drain_reports(mut receiver: mpsc::UnboundedReceiver<TaskReport>) {
    while let Some(report) = receiver.recv().await {
        match &report.result {
            Ok(TaskOutcome::Derived {
                inserted,
                skipped,
                failed,
            }) => info!(
                task_id = report.task_id,
                leave_id = report.leave_id,
                inserted,
                skipped,
                failed,
                "Attendance derived from approved leave"
            ),
            Ok(TaskOutcome::Skipped(reason)) => info!(
                task_id = report.task_id,
                kind = %report.kind,
                leave_id = report.leave_id,
                reason = %reason,
                "Background task skipped"
            ),
            Ok(TaskOutcome::Sent) => debug!(
                task_id = report.task_id,
                kind = %report.kind,
                leave_id = report.leave_id,
                "Message sent"
            ),
            // already logged at the failure site
            Err(_) => {}
        }
    }
}
