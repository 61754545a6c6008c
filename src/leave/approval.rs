use chrono::{DateTime, Utc};

use crate::error::StateError;
use crate::model::leave_request::{Decision, LeaveRequest, LeaveStatus};

/// Applies an approver's decision to a pending leave.
///
/// `Pending` is the only state with outgoing transitions; `Approved` and
/// `Rejected` are terminal. The caller persists the returned leave and
/// triggers any follow-up work.
pub fn decide(
    mut leave: LeaveRequest,
    approver_id: u64,
    decision: Decision,
    remarks: Option<String>,
    decided_at: DateTime<Utc>,
) -> Result<LeaveRequest, StateError> {
    if leave.status != LeaveStatus::Pending {
        return Err(StateError::InvalidStateTransition {
            leave_id: leave.id,
            from: leave.status,
        });
    }

    leave.status = decision.into();
    leave.approved_by = Some(approver_id);
    leave.remarks = remarks;
    leave.updated_at = decided_at;
    Ok(leave)
}
