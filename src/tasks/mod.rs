//! Background Tasks Module
//!
//! Deferred work that runs outside request handling.
//!
//! # Tasks
//! - Detail expiry: removes movie details once their sliding window lapses

mod scheduler;

pub(crate) use scheduler::lock;
pub use scheduler::{ManualScheduler, Scheduler, Task, TimerHandle, TokioScheduler};
