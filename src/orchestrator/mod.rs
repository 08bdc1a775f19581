//! Run lifecycle.
//!
//! `runner` holds the pure task-sequencing state machine; `session` binds it to
//! a launcher and relay so UI and text front-ends can drive a run by feeding it
//! one activity message at a time.

mod runner;
mod session;

#[cfg(feature = "tui")]
pub(crate) use runner::{RunnerState, NOTHING_TO_DO};
pub(crate) use session::RunSession;
