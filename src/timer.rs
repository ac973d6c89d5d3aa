//! Timer primitives for the cooperative loop.
//!
//! Provides [`timeout`] to run a callback once after a duration, and
//! [`interval`] for a repeating schedule. Both are ordinary queue citizens:
//! a timer is a polling task that compares `Instant::now()` against its
//! deadline once per tick and re-submits a fresh continuation until the
//! deadline has passed. Deadlines are therefore best-effort — bounded below
//! by the requested duration and above by the queue backlog at expiry time.
//!
//! # Example
//!
//! ```ignore
//! use looper::{timeout, Scheduler};
//! use std::time::Duration;
//!
//! let scheduler = Scheduler::new();
//! timeout(&scheduler, Duration::from_millis(100), |_| {
//!     println!("fired after ~100ms");
//! });
//! scheduler.run();
//! ```

use crate::runtime::Scheduler;
use crate::task::{Step, Task};

use log::trace;
use std::time::{Duration, Instant};

/// Runs `callback` once, no earlier than `duration` from now.
///
/// The countdown starts at the call, not at the first tick.
///
/// # Arguments
/// * `scheduler` - The loop to schedule on
/// * `duration` - Minimum delay before the callback runs
/// * `callback` - Invoked exactly once, with the scheduler, after the
///   deadline has elapsed
pub fn timeout<F>(scheduler: &Scheduler, duration: Duration, callback: F)
where
    F: FnOnce(&Scheduler) + 'static,
{
    scheduler.enqueue(poll_deadline(Instant::now(), duration, callback));
}

// Each tick either fires or hands back a fresh task carrying the same
// deadline state.
fn poll_deadline<F>(start: Instant, duration: Duration, callback: F) -> Task
where
    F: FnOnce(&Scheduler) + 'static,
{
    Task::new(move |scheduler| {
        if start.elapsed() >= duration {
            trace!("timer fired after {:?}", start.elapsed());
            callback(scheduler);
            Step::Done
        } else {
            Step::Again(poll_deadline(start, duration, callback))
        }
    })
}

/// Runs `callback` repeatedly, approximately every `duration`.
///
/// Built from [`timeout`] composed with itself: each expiry invokes the
/// callback and then arms the next timeout. The schedule never terminates
/// on its own; it ends when the loop is stopped.
pub fn interval<F>(scheduler: &Scheduler, duration: Duration, callback: F)
where
    F: FnMut(&Scheduler) + 'static,
{
    rearm(scheduler, duration, callback);
}

fn rearm<F>(scheduler: &Scheduler, duration: Duration, mut callback: F)
where
    F: FnMut(&Scheduler) + 'static,
{
    timeout(scheduler, duration, move |scheduler| {
        callback(scheduler);
        rearm(scheduler, duration, callback);
    });
}
