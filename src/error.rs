use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::model::leave_request::LeaveStatus;
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("end date cannot be before start date")]
    InvalidDateRange,
    #[error("start date cannot be in the past")]
    PastDate,
    #[error("reason is required")]
    MissingReason,
    #[error("window end date cannot be before its start date")]
    InvalidWindow,
    #[error("threshold must be a percentage between 0 and 100")]
    InvalidThreshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("leave request overlaps with existing leave")]
    OverlappingLeave,
    #[error("attendance already marked for this date")]
    AttendanceExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    #[error("leave request {0} not found")]
    Leave(u64),
    #[error("student {0} not found")]
    Student(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("leave request {leave_id} is already {from} and cannot be decided again")]
    InvalidStateTransition { leave_id: u64, from: LeaveStatus },
}

/// Every failure a leave or attendance operation reports to its caller.
#[derive(Debug, thiserror::Error)]
pub enum LeaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::Validation(_) => StatusCode::BAD_REQUEST,
            LeaveError::Conflict(_) | LeaveError::State(_) => StatusCode::CONFLICT,
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // never leak driver details
            LeaveError::Store(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_client_statuses() {
        assert_eq!(
            LeaveError::from(ValidationError::PastDate).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LeaveError::from(ConflictError::OverlappingLeave).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            LeaveError::from(NotFoundError::Leave(7)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            LeaveError::from(StateError::InvalidStateTransition {
                leave_id: 7,
                from: LeaveStatus::Approved,
            })
            .status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn missing_reason_is_a_bad_request() {
        let err = LeaveError::from(ValidationError::MissingReason);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "reason is required");
    }

    #[test]
    fn state_error_names_current_status() {
        let err = StateError::InvalidStateTransition {
            leave_id: 3,
            from: LeaveStatus::Rejected,
        };
        assert_eq!(
            err.to_string(),
            "leave request 3 is already rejected and cannot be decided again"
        );
    }
}
