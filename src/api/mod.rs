pub mod analytics;
pub mod attendance;
pub mod leave_request;
