use crate::auth::auth::AuthUser;
use crate::leave::{ApplyLeave, LeaveService};
use crate::error::{LeaveError, NotFoundError};
use crate::model::leave_request::Decision;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecideLeave {
    /// `approved` or `rejected`
    #[schema(example = "approved")]
    pub status: Decision,
    #[schema(example = "Get well soon")]
    pub remarks: Option<String>,
}

/* =========================
Apply for leave (Student)
========================= */
/// Swagger doc for apply_leave endpoint
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = ApplyLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Invalid date range or start date in the past", body = Object, example = json!({
            "error": "start date cannot be in the past"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Overlaps an existing leave", body = Object, example = json!({
            "error": "leave request overlaps with existing leave"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn apply_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    payload: web::Json<ApplyLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_student()?;

    let leave = service
        .apply_leave(auth.user_id, payload.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(leave))
}

/// Own leave history, newest first
#[utoipa::path(
    get,
    path = "/api/leave/mine",
    responses(
        (status = 200, description = "Leave requests of the caller", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    service: web::Data<LeaveService>,
) -> actix_web::Result<impl Responder> {
    auth.require_student()?;

    let leaves = service.get_my_leaves(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// Pending queue for approvers, oldest first
#[utoipa::path(
    get,
    path = "/api/leave/pending",
    responses(
        (status = 200, description = "Pending leave requests", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn pending_leaves(
    auth: AuthUser,
    service: web::Data<LeaveService>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let leaves = service.get_pending_leaves().await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leave request not found, or owned by another student", body = Object, example = json!({
            "error": "leave request 7 not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave = service.get_leave(path.into_inner()).await?;

    // other students' requests look the same as missing ones
    if auth.is_student() && leave.student_id != auth.user_id {
        return Err(LeaveError::from(NotFoundError::Leave(leave.id)).into());
    }

    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Decide leave (Faculty/Warden/Admin)
========================= */
/// Swagger doc for decide_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/decision",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to decide")
    ),
    request_body(
        content = DecideLeave,
        description = "Decision and optional remarks",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave decided", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already decided", body = Object, example = json!({
            "error": "leave request 7 is already approved and cannot be decided again"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn decide_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    payload: web::Json<DecideLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let DecideLeave { status, remarks } = payload.into_inner();
    tracing::debug!(approver = %auth.username, ?status, "Decision received");
    let leave = service
        .approve_leave(path.into_inner(), auth.user_id, status, remarks)
        .await?;

    Ok(HttpResponse::Ok().json(leave))
}

/// Administrative removal of a leave request
#[utoipa::path(
    delete,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to delete")
    ),
    responses(
        (status = 204, description = "Leave request deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    service.delete_leave(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
