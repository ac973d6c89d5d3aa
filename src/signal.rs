//! OS signal glue for stopping the loop.
//!
//! Registers handlers for the interrupt, terminate, and hangup signals that
//! do exactly one thing: clear the scheduler's run flag through a
//! [`StopHandle`]. Signals arrive on an arbitrary thread at an arbitrary
//! point; a single atomic store is the only scheduler operation safe from
//! that context.

use crate::runtime::StopHandle;

use log::debug;
use std::sync::OnceLock;

// The handle the handler stops. Installed once per process.
static INSTALLED: OnceLock<StopHandle> = OnceLock::new();

/// Stops the scheduler on SIGINT, SIGTERM, or SIGHUP.
///
/// Only the first installation takes effect; later calls are no-ops so the
/// handler never dangles to a replaced scheduler.
///
/// # Example
/// ```ignore
/// use looper::{stop_on_signals, Scheduler};
///
/// let scheduler = Scheduler::new();
/// stop_on_signals(scheduler.stop_handle());
/// scheduler.run();
/// ```
pub fn stop_on_signals(handle: StopHandle) {
    if INSTALLED.set(handle).is_err() {
        return;
    }

    let handler = on_signal as extern "C" fn(libc::c_int);
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
        libc::signal(libc::SIGTERM, handler as libc::sighandler_t);
        libc::signal(libc::SIGHUP, handler as libc::sighandler_t);
    }

    debug!("signal handlers installed");
}

extern "C" fn on_signal(_signal: libc::c_int) {
    if let Some(handle) = INSTALLED.get() {
        handle.stop();
    }
}
