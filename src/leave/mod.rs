//! Leave-request lifecycle: validation, overlap detection, the approval state
//! machine, derived attendance, notifications and statistics.

pub mod approval;
pub mod attendance;
pub mod clock;
pub mod deriver;
pub mod locks;
pub mod notifier;
pub mod overlap;
pub mod service;
pub mod stats;
pub mod tasks;
pub mod validator;

#[cfg(test)]
pub(crate) mod tests;

pub use attendance::AttendanceService;
pub use clock::{Clock, SystemClock};
pub use locks::KeyedLocks;
pub use service::{ApplyLeave, LeaveService};
pub use tasks::TaskQueue;
