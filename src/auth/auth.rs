use crate::model::role::Role;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorForbidden,
    error::ErrorUnauthorized,
};
use futures::future::{Ready, ready};

/// Caller identity placed in request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized("Missing token"))),
        }
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ErrorForbidden("Admin only"))
        }
    }

    /// Faculty, Warden or Admin.
    pub fn require_approver(&self) -> actix_web::Result<()> {
        if self.role.can_decide_leave() {
            Ok(())
        } else {
            Err(ErrorForbidden("Faculty/Warden/Admin only"))
        }
    }

    pub fn require_marker(&self) -> actix_web::Result<()> {
        if self.role.can_mark_attendance() {
            Ok(())
        } else {
            Err(ErrorForbidden("Faculty/Warden/Admin only"))
        }
    }

    pub fn require_student(&self) -> actix_web::Result<()> {
        if self.is_student() {
            Ok(())
        } else {
            Err(ErrorForbidden("Students only"))
        }
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}
