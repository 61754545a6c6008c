pub(crate) mod common;

mod attendance;
