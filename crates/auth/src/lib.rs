//! `tenderflow-auth`: authorization guard for tender and bid operations.
//!
//! Pure policy checks against [`tenderflow_directory::Directory`] facts; no IO
//! of its own and no knowledge of entity storage.

pub mod action;
pub mod authorize;

pub use action::Action;
pub use authorize::{AuthzError, Guard, authorize};
