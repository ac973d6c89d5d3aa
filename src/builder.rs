//! Fluent builder for Scheduler construction.
//!
//! Provides a builder pattern interface for creating and configuring
//! Scheduler instances.

use crate::runtime::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_YIELD_EVERY, Scheduler};

use std::time::Duration;

/// Builder for constructing Scheduler instances with fluent API.
///
/// # Example
/// ```ignore
/// use looper::SchedulerBuilder;
/// use std::time::Duration;
///
/// let scheduler = SchedulerBuilder::new()
///     .yield_every(25)
///     .connect_timeout(Duration::from_secs(2))
///     .build();
/// ```
pub struct SchedulerBuilder {
    yield_every: u32,
    connect_timeout: Duration,
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerBuilder {
    /// Creates a new scheduler builder with default settings.
    pub fn new() -> Self {
        Self {
            yield_every: DEFAULT_YIELD_EVERY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets how many ticks run between zero-duration host yields.
    ///
    /// Lower values keep the process more responsive to signals under a
    /// dense task load; higher values trade that for throughput.
    pub fn yield_every(mut self, ticks: u32) -> Self {
        self.yield_every = ticks;
        self
    }

    /// Bounds the blocking connect phase of [`fetch`].
    ///
    /// Only the connect is bounded; the read phase polls until the peer
    /// closes the connection.
    ///
    /// [`fetch`]: crate::fetch
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builds and returns a configured Scheduler instance.
    pub fn build(self) -> Scheduler {
        Scheduler::with_config(self.yield_every, self.connect_timeout)
    }
}
