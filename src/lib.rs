//! Minimal cooperative task loop with timers, non-blocking fetch, and promises.
//!
//! This crate provides a strictly single-threaded scheduler that drains a FIFO
//! queue of one-shot tasks. Suspension is simulated, not real: anything that
//! "waits" (a timer deadline, a socket read) is a task that checks its
//! condition once per tick and re-submits a fresh continuation until the
//! condition holds.
//!
//! # Architecture
//!
//! - **Scheduler**: owns the task queue; `enqueue`/`do_next`/`run`/`stop`,
//!   plus `block_on` to drain the queue until a promise settles
//! - **TaskQueue**: FIFO queue storing ready tasks
//! - **Task**: a one-shot computation returning a [`Step`] continuation
//! - **Timers**: [`timeout`] and [`interval`] deadline-polling tasks
//! - **Fetch**: non-blocking HTTP/1.1 GET, polled once per tick until the
//!   peer closes the connection
//! - **Promise**: single-assignment settlement cell with `then`/`catch`
//!   chaining and an [`all`] combinator
//! - **SchedulerBuilder**: fluent builder for scheduler instantiation

mod builder;
mod error;
pub mod net;
mod promise;
mod runtime;
mod signal;
mod task;
mod timer;

pub use builder::SchedulerBuilder;
pub use error::Error;
pub use net::fetch::{fetch, fetch_with};
pub use promise::{Promise, Settle, all};
pub use runtime::{Scheduler, StopHandle};
pub use signal::stop_on_signals;
pub use task::{Step, Task};
pub use timer::{interval, timeout};
