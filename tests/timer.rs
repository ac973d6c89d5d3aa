use looper::{Scheduler, interval, timeout};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[test]
fn timeout_waits_at_least_the_duration() {
    let scheduler = Scheduler::new();
    let fired = Rc::new(RefCell::new(0u32));

    let start = Instant::now();
    {
        let fired = fired.clone();
        timeout(&scheduler, Duration::from_millis(50), move |_| {
            *fired.borrow_mut() += 1;
        });
    }
    scheduler.run();
    let elapsed = start.elapsed();

    assert_eq!(*fired.borrow(), 1, "callback must fire exactly once");
    assert!(
        elapsed >= Duration::from_millis(50),
        "callback fired after {elapsed:?}, before the deadline"
    );
}

#[test]
fn timeout_zero_duration_fires_promptly() {
    let scheduler = Scheduler::new();
    let fired = Rc::new(RefCell::new(false));

    let start = Instant::now();
    {
        let fired = fired.clone();
        timeout(&scheduler, Duration::from_millis(0), move |_| {
            *fired.borrow_mut() = true;
        });
    }
    scheduler.run();

    assert!(*fired.borrow());
    assert!(
        start.elapsed() < Duration::from_millis(20),
        "zero-duration timeout should not linger"
    );
}

#[test]
fn timeouts_fire_in_deadline_order_under_backlog() {
    let scheduler = Scheduler::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    {
        let order = order.clone();
        timeout(&scheduler, Duration::from_millis(40), move |_| {
            order.borrow_mut().push("slow")
        });
    }
    {
        let order = order.clone();
        timeout(&scheduler, Duration::from_millis(10), move |_| {
            order.borrow_mut().push("fast")
        });
    }
    scheduler.run();

    assert_eq!(*order.borrow(), vec!["fast", "slow"]);
}

#[test]
fn interval_repeats_until_stopped() {
    let scheduler = Scheduler::new();
    let count = Rc::new(RefCell::new(0u32));

    let start = Instant::now();
    {
        let count = count.clone();
        interval(&scheduler, Duration::from_millis(10), move |scheduler| {
            let mut count = count.borrow_mut();
            *count += 1;
            if *count == 3 {
                scheduler.stop();
            }
        });
    }
    scheduler.run();
    let elapsed = start.elapsed();

    assert_eq!(
        *count.borrow(),
        3,
        "interval must keep firing until the loop stops"
    );
    assert!(
        elapsed >= Duration::from_millis(30),
        "three periods of 10ms should take at least 30ms, took {elapsed:?}"
    );
}
