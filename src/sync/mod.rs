//! Backbeat synchronization mechanisms.
//!
//! Time-windowed operators need a way to run a unit of work after a delay.
//! The [TimerWorker](worker::TimerWorker) is a single background thread
//! ordering such work by deadline, it is what the worker based
//! [schedulers](crate::event::scheduler) are built on.
pub mod task;
pub mod worker;
