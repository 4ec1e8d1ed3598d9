//! Backbeat is:
//! * a push-based, observer pattern based reactive operator engine where a
//!   source of events is transformed by a chain of operators and delivered to
//!   a consumer with deterministic termination and resource cleanup.
//! * a small timer synchronization layer used to drive time-windowed
//!   operators from a background thread or a virtual clock.
#[macro_use]
extern crate lazy_static;

pub mod event;
pub mod sync;
pub mod utils;
