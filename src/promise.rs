//! Single-assignment settlement cells with chained continuations.
//!
//! A [`Promise`] starts pending and settles exactly once, either fulfilled
//! with a value or rejected with an [`Error`]. Settlement is monotonic:
//! later attempts are silently ignored. Chaining with [`then`] and [`catch`]
//! produces child promises whose settlement is derived from the parent's;
//! a child attached after the parent already settled is activated
//! immediately and synchronously, never delayed by a tick.
//!
//! Promises are driven externally, by whoever holds the [`Settle`] handle —
//! a fetch's polling task, a timer callback, or user code. The scheduler is
//! only involved at the consumption end, where `Scheduler::block_on` drains
//! the queue until a promise settles, and in [`all`], which collects a batch
//! of results while still inside the cooperative loop.
//!
//! # Example
//!
//! ```ignore
//! use looper::{Promise, Scheduler};
//!
//! let scheduler = Scheduler::new();
//! let (promise, settle) = Promise::pending();
//! scheduler.spawn(move |_| settle.fulfill(21));
//!
//! let doubled = promise.then(|n| Ok(n * 2));
//! assert_eq!(scheduler.block_on(&doubled), Ok(42));
//! ```

use crate::error::Error;
use crate::runtime::Scheduler;

use std::cell::RefCell;
use std::rc::Rc;

/// Settlement states. Once out of `Pending`, a cell never changes again.
enum State<T> {
    Pending,
    Fulfilled(T),
    Rejected(Error),
}

/// A continuation registered by a child promise, run once with the parent's
/// outcome.
type Listener<T> = Box<dyn FnOnce(&Result<T, Error>)>;

struct Inner<T> {
    state: State<T>,
    listeners: Vec<Listener<T>>,
}

/// A single-assignment settlement cell.
///
/// Cloning a `Promise` clones the handle, not the cell: all clones observe
/// the same settlement. The payload is `Clone` because one settlement may
/// fan out to any number of children, each receiving its own copy.
pub struct Promise<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Promise {
            inner: self.inner.clone(),
        }
    }
}

/// The producing end of a promise.
///
/// Held by whatever computation will eventually settle the cell. Both
/// operations are idempotent-safe: the first settlement wins and every
/// later attempt is a no-op.
pub struct Settle<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Settle<T> {
    fn clone(&self) -> Self {
        Settle {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Settle<T> {
    /// Fulfills the promise. No-op if it already settled.
    pub fn fulfill(&self, value: T) {
        settle(&self.inner, Ok(value));
    }

    /// Rejects the promise. No-op if it already settled.
    pub fn reject(&self, error: Error) {
        settle(&self.inner, Err(error));
    }
}

/// Stores the first settlement and runs the registered listeners with it.
///
/// The borrow is released before any listener runs, so listeners are free to
/// attach to or settle this promise and any other.
fn settle<T: Clone>(inner: &Rc<RefCell<Inner<T>>>, outcome: Result<T, Error>) {
    let listeners = {
        let mut cell = inner.borrow_mut();
        if !matches!(cell.state, State::Pending) {
            return;
        }
        cell.state = match &outcome {
            Ok(value) => State::Fulfilled(value.clone()),
            Err(error) => State::Rejected(error.clone()),
        };
        std::mem::take(&mut cell.listeners)
    };

    for listener in listeners {
        listener(&outcome);
    }
}

impl<T: Clone + 'static> Promise<T> {
    /// Creates a promise and runs `setup` synchronously with its settle
    /// handle.
    ///
    /// The setup computation is not deferred; by the time `new` returns it
    /// has already run. If it returns an error before settling the cell, the
    /// promise rejects with that error. An error returned after settlement
    /// is ignored, since the first settlement won.
    pub fn new<F>(setup: F) -> Self
    where
        F: FnOnce(&Settle<T>) -> Result<(), Error>,
    {
        let (promise, settle) = Promise::pending();
        if let Err(error) = setup(&settle) {
            settle.reject(error);
        }
        promise
    }

    /// Creates a pending promise along with its producing end.
    pub fn pending() -> (Self, Settle<T>) {
        let inner = Rc::new(RefCell::new(Inner {
            state: State::Pending,
            listeners: Vec::new(),
        }));
        (
            Promise {
                inner: inner.clone(),
            },
            Settle { inner },
        )
    }

    /// Creates a promise already fulfilled with `value`.
    pub fn fulfilled(value: T) -> Self {
        let (promise, settle) = Promise::pending();
        settle.fulfill(value);
        promise
    }

    /// Creates a promise already rejected with `error`.
    pub fn rejected(error: Error) -> Self {
        let (promise, settle) = Promise::pending();
        settle.reject(error);
        promise
    }

    /// Whether the promise has not settled yet.
    pub fn is_pending(&self) -> bool {
        matches!(self.inner.borrow().state, State::Pending)
    }

    /// Returns the settled outcome, or None while pending.
    pub fn outcome(&self) -> Option<Result<T, Error>> {
        match &self.inner.borrow().state {
            State::Pending => None,
            State::Fulfilled(value) => Some(Ok(value.clone())),
            State::Rejected(error) => Some(Err(error.clone())),
        }
    }

    /// Chains a fulfillment transform, returning the derived child promise.
    ///
    /// When this promise fulfills, `on_fulfilled` maps the value into the
    /// child's settlement; an `Err` from the transform rejects the child
    /// with that new error. A rejection of this promise passes through to
    /// the child unchanged.
    pub fn then<U, F>(&self, on_fulfilled: F) -> Promise<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Result<U, Error> + 'static,
    {
        self.derive(on_fulfilled, Err)
    }

    /// Chains a rejection handler, returning the derived child promise.
    ///
    /// When this promise rejects, `on_rejected` maps the error into the
    /// child's settlement — recovering with `Ok` or re-raising with `Err`.
    /// A fulfillment passes through to the child unchanged.
    pub fn catch<F>(&self, on_rejected: F) -> Promise<T>
    where
        F: FnOnce(Error) -> Result<T, Error> + 'static,
    {
        self.derive(Ok, on_rejected)
    }

    /// Chains both a fulfillment transform and a rejection handler at once.
    pub fn then_catch<U, F, G>(&self, on_fulfilled: F, on_rejected: G) -> Promise<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Result<U, Error> + 'static,
        G: FnOnce(Error) -> Result<U, Error> + 'static,
    {
        self.derive(on_fulfilled, on_rejected)
    }

    /// Wires a child promise to this one's settlement.
    ///
    /// Exactly one of the two transforms runs, with this promise's outcome,
    /// and its result settles the child.
    fn derive<U, F, G>(&self, on_fulfilled: F, on_rejected: G) -> Promise<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Result<U, Error> + 'static,
        G: FnOnce(Error) -> Result<U, Error> + 'static,
    {
        let (child, settle) = Promise::pending();
        self.attach(Box::new(move |outcome: &Result<T, Error>| {
            let derived = match outcome {
                Ok(value) => on_fulfilled(value.clone()),
                Err(error) => on_rejected(error.clone()),
            };
            match derived {
                Ok(value) => settle.fulfill(value),
                Err(error) => settle.reject(error),
            }
        }));
        child
    }

    /// Registers a listener, running it immediately if already settled.
    fn attach(&self, listener: Listener<T>) {
        let outcome = {
            let cell = self.inner.borrow();
            match &cell.state {
                State::Pending => None,
                State::Fulfilled(value) => Some(Ok(value.clone())),
                State::Rejected(error) => Some(Err(error.clone())),
            }
        };

        match outcome {
            None => self.inner.borrow_mut().listeners.push(listener),
            Some(outcome) => listener(&outcome),
        }
    }
}

/// Collects every input promise's value, in input order.
///
/// The members are awaited sequentially, but their underlying tasks were
/// already enqueued when the inputs were created, so their real progress
/// interleaves regardless; the sequential order only decides how results
/// are collected. On the first rejection the combined promise rejects with
/// that error immediately — the remaining members' background tasks keep
/// running and their results are discarded.
///
/// # Example
/// ```ignore
/// use looper::{all, fetch, Scheduler};
///
/// let scheduler = Scheduler::new();
/// let batch = all(&scheduler, vec![
///     fetch(&scheduler, "http://localhost:8000/a"),
///     fetch(&scheduler, "http://localhost:8000/b"),
/// ]);
/// let bodies = scheduler.block_on(&batch)?;
/// ```
pub fn all<T: Clone + 'static>(scheduler: &Scheduler, promises: Vec<Promise<T>>) -> Promise<Vec<T>> {
    Promise::new(|settle| {
        let mut values = Vec::with_capacity(promises.len());
        for promise in &promises {
            match scheduler.block_on(promise) {
                Ok(value) => values.push(value),
                Err(error) => {
                    settle.reject(error);
                    return Ok(());
                }
            }
        }
        settle.fulfill(values);
        Ok(())
    })
}
