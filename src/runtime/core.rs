//! Cooperative scheduler that drains the task queue.
//!
//! The scheduler is the single logical thread of execution: it dequeues one
//! task at a time, runs it to completion, and re-enqueues whatever
//! continuation the task hands back. `run` drains until the queue empties or
//! `stop` is requested; `block_on` drains until a specific promise settles.
//!
//! # Fairness
//!
//! A tight chain of instantly re-enqueueing tasks would otherwise never
//! return control to the host operating system, starving asynchronous signal
//! delivery. After every task invocation the scheduler counts a tick; past a
//! threshold it resets the counter and performs a zero-duration sleep. That
//! sleep is the only point where the loop cooperates with the host scheduler.

use crate::error::Error;
use crate::promise::Promise;
use crate::runtime::TaskQueue;
use crate::task::{Step, Task};

use log::debug;
use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Ticks between zero-duration host yields.
pub(crate) const DEFAULT_YIELD_EVERY: u32 = 10;

/// Bound on the blocking connect phase of a fetch.
pub(crate) const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Single-threaded cooperative scheduler.
///
/// Owns the task queue and the run flag. One instance per process is the
/// intended shape: the entry point creates it and lends it (`&Scheduler`) to
/// every component that needs to enqueue work.
pub struct Scheduler {
    queue: TaskQueue,
    active: Arc<AtomicBool>,
    ticks: Cell<u32>,
    yield_every: u32,
    connect_timeout: Duration,
}

impl Scheduler {
    /// Creates a scheduler with default settings.
    ///
    /// Use [`SchedulerBuilder`] to tune the fairness threshold or the fetch
    /// connect timeout.
    ///
    /// [`SchedulerBuilder`]: crate::SchedulerBuilder
    pub fn new() -> Self {
        Self::with_config(DEFAULT_YIELD_EVERY, DEFAULT_CONNECT_TIMEOUT)
    }

    pub(crate) fn with_config(yield_every: u32, connect_timeout: Duration) -> Self {
        Self {
            queue: TaskQueue::new(),
            active: Arc::new(AtomicBool::new(false)),
            ticks: Cell::new(0),
            yield_every,
            connect_timeout,
        }
    }

    /// Appends a task at the back of the queue. Always succeeds.
    pub fn enqueue(&self, task: Task) {
        self.queue.push(task);
    }

    /// Enqueues a plain closure as a one-shot task.
    ///
    /// Convenience over [`enqueue`] for work with no continuation: the
    /// closure runs once and the task is done.
    ///
    /// # Example
    /// ```ignore
    /// scheduler.spawn(|_| println!("deferred"));
    /// ```
    ///
    /// [`enqueue`]: Scheduler::enqueue
    pub fn spawn<F>(&self, work: F)
    where
        F: FnOnce(&Scheduler) + 'static,
    {
        self.enqueue(Task::new(move |scheduler| {
            work(scheduler);
            Step::Done
        }));
    }

    /// Dequeues and invokes the head task, then applies the fairness policy.
    ///
    /// No-op on an empty queue. A task that returns [`Step::Again`] has its
    /// continuation appended at the back of the queue, behind everything the
    /// task itself enqueued while running.
    ///
    /// # Returns
    /// true if a task ran, false if the queue was empty
    pub fn do_next(&self) -> bool {
        let Some(task) = self.queue.pop() else {
            return false;
        };

        if let Step::Again(next) = task.invoke(self) {
            self.queue.push(next);
        }

        let ticks = self.ticks.get() + 1;
        if ticks > self.yield_every {
            self.ticks.set(0);
            thread::sleep(Duration::from_millis(0));
        } else {
            self.ticks.set(ticks);
        }

        true
    }

    /// Drains the queue until it empties or [`stop`] is requested.
    ///
    /// The in-flight task always completes; the stop flag is honored between
    /// invocations. The scheduler is inactive again when this returns.
    ///
    /// [`stop`]: Scheduler::stop
    pub fn run(&self) {
        self.active.store(true, Ordering::SeqCst);
        debug!("loop started");

        while self.active.load(Ordering::SeqCst) && !self.queue.is_empty() {
            self.do_next();
        }

        self.active.store(false, Ordering::SeqCst);
        debug!("loop stopped");
    }

    /// Requests the loop to stop after the current task.
    ///
    /// A single atomic store: safe to call from a signal-handling context
    /// through [`stop_handle`], and the only scheduler operation that is.
    ///
    /// [`stop_handle`]: Scheduler::stop_handle
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Whether the loop is currently inside [`run`].
    ///
    /// [`run`]: Scheduler::run
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Returns a cloneable, thread-safe handle to the run flag.
    ///
    /// Hand this to signal-handling glue; see [`stop_on_signals`].
    ///
    /// [`stop_on_signals`]: crate::stop_on_signals
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            active: self.active.clone(),
        }
    }

    /// Steps the scheduler until the promise settles, then returns its
    /// outcome.
    ///
    /// An already-settled promise returns immediately without advancing the
    /// scheduler. Otherwise every step runs whatever task is at the head of
    /// the queue, related to this promise or not, so callers must not assume
    /// nothing else happened between the call and its return. Nested calls
    /// from inside a task are fine as long as no promise waits on itself
    /// transitively.
    ///
    /// A promise that nothing in the queue can ever settle keeps this loop
    /// waiting forever; steps that find the queue empty yield to the host so
    /// the process stays responsive to signals while it waits.
    ///
    /// # Returns
    /// The fulfilled value, or the rejection error
    pub fn block_on<T: Clone + 'static>(&self, promise: &Promise<T>) -> Result<T, Error> {
        loop {
            if let Some(outcome) = promise.outcome() {
                return outcome;
            }
            if !self.do_next() {
                thread::sleep(Duration::from_millis(0));
            }
        }
    }

    pub(crate) fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle that can stop the scheduler from another thread or from
/// a signal handler.
///
/// Wraps the scheduler's run flag; [`stop`] performs exactly one atomic
/// store, which is the only operation safe in a signal-handling context.
///
/// [`stop`]: StopHandle::stop
#[derive(Clone)]
pub struct StopHandle {
    active: Arc<AtomicBool>,
}

impl StopHandle {
    /// Clears the run flag. The loop exits after the in-flight task.
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}
