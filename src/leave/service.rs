use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use super::approval;
use super::clock::Clock;
use super::deriver::AttendanceDeriver;
use super::locks::{KeyedLocks, LockKey};
use super::notifier::NotificationDispatcher;
use super::overlap::OverlapChecker;
use super::stats::{LeaveTypeBreakdown, StatsAggregator};
use super::tasks::{TaskKind, TaskQueue};
use super::validator::{validate_dates, validate_reason};
use crate::error::{ConflictError, LeaveError, NotFoundError, StateError};
use crate::messenger::Messenger;
use crate::model::leave_request::{Decision, LeaveRequest, LeaveStatus, LeaveType, NewLeave};
use crate::model::window::DateWindow;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApplyLeave {
    #[schema(example = "Medical")]
    pub leave_type: LeaveType,
    #[schema(example = "Fever and doctor's advice to rest")]
    pub reason: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

/// Leave lifecycle: apply, decide, query, delete.
pub struct LeaveService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    locks: Arc<KeyedLocks>,
    overlap: OverlapChecker,
    deriver: Arc<AttendanceDeriver>,
    notifier: NotificationDispatcher,
    stats: StatsAggregator,
    tasks: TaskQueue,
}

impl LeaveService {
    pub fn new(
        store: Arc<dyn Store>,
        messenger: Arc<dyn Messenger>,
        clock: Arc<dyn Clock>,
        locks: Arc<KeyedLocks>,
        tasks: TaskQueue,
    ) -> Self {
        Self {
            overlap: OverlapChecker::new(store.clone()),
            deriver: Arc::new(AttendanceDeriver::new(store.clone(), locks.clone())),
            notifier: NotificationDispatcher::new(
                store.clone(),
                messenger,
                clock.clone(),
                tasks.clone(),
            ),
            stats: StatsAggregator::new(store.clone()),
            store,
            clock,
            locks,
            tasks,
        }
    }

    #[instrument(skip(self, request), fields(leave_type = %request.leave_type))]
    pub async fn apply_leave(
        &self,
        student_id: u64,
        request: ApplyLeave,
    ) -> Result<LeaveRequest, LeaveError> {
        let now = self.clock.now();
        validate_dates(request.start_date, request.end_date, now)?;
        validate_reason(&request.reason)?;

        // overlap check and insert must not interleave with another apply
        let _guard = self.locks.acquire(LockKey::Student(student_id)).await;

        if self
            .overlap
            .has_conflict(student_id, request.start_date, request.end_date, 0)
            .await?
        {
            info!("Leave request rejected: overlaps existing leave");
            return Err(ConflictError::OverlappingLeave.into());
        }

        let leave = self
            .store
            .create_leave(NewLeave {
                student_id,
                leave_type: request.leave_type,
                reason: request.reason,
                start_date: request.start_date,
                end_date: request.end_date,
                created_at: now,
            })
            .await?;

        info!(leave_id = leave.id, "Leave request submitted");
        Ok(leave)
    }

    /// Records the decision, then hands follow-up work to the task queue
    /// without waiting for it.
    #[instrument(skip(self, remarks))]
    pub async fn approve_leave(
        &self,
        leave_id: u64,
        approver_id: u64,
        decision: Decision,
        remarks: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        let decided = {
            let _guard = self.locks.acquire(LockKey::Leave(leave_id)).await;

            let leave = self
                .store
                .find_leave_by_id(leave_id)
                .await?
                .ok_or(NotFoundError::Leave(leave_id))?;

            let decided = approval::decide(leave, approver_id, decision, remarks, self.clock.now())?;

            if !self.store.update_leave_decision(&decided).await? {
                return Err(self.stale_decision(leave_id).await);
            }
            decided
        };

        info!(status = %decided.status, "Leave decided");

        if decided.status == LeaveStatus::Approved {
            let deriver = self.deriver.clone();
            let leave = decided.clone();
            self.tasks
                .submit(TaskKind::DeriveAttendance, leave_id, async move {
                    Ok(deriver.apply(&leave, approver_id).await)
                });
            self.notifier.schedule_reminder(&decided);
        }
        self.notifier.notify_status(&decided);

        Ok(decided)
    }

    /// Explains a conditional update that touched no row.
    async fn stale_decision(&self, leave_id: u64) -> LeaveError {
        match self.store.find_leave_by_id(leave_id).await {
            Ok(Some(current)) => {
                warn!(leave_id, status = %current.status, "Leave decided concurrently");
                StateError::InvalidStateTransition {
                    leave_id,
                    from: current.status,
                }
                .into()
            }
            Ok(None) => NotFoundError::Leave(leave_id).into(),
            Err(e) => e.into(),
        }
    }

    pub async fn get_my_leaves(&self, student_id: u64) -> Result<Vec<LeaveRequest>, LeaveError> {
        Ok(self.store.find_leaves_by_student(student_id).await?)
    }

    pub async fn get_pending_leaves(&self) -> Result<Vec<LeaveRequest>, LeaveError> {
        Ok(self.store.find_pending_leaves().await?)
    }

    pub async fn get_leave(&self, leave_id: u64) -> Result<LeaveRequest, LeaveError> {
        self.store
            .find_leave_by_id(leave_id)
            .await?
            .ok_or_else(|| NotFoundError::Leave(leave_id).into())
    }

    /// Administrative removal; attendance already derived from the leave stays.
    #[instrument(skip(self))]
    pub async fn delete_leave(&self, leave_id: u64) -> Result<(), LeaveError> {
        if !self.store.delete_leave(leave_id).await? {
            return Err(NotFoundError::Leave(leave_id).into());
        }
        info!("Leave request deleted");
        Ok(())
    }

    pub async fn get_leave_stats(&self, window: DateWindow) -> Result<LeaveTypeBreakdown, LeaveError> {
        Ok(self.stats.leave_type_breakdown(window).await?)
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}
