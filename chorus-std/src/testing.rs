//! Testing utilities for chorus.
//!
//! The asynchronous policies never tell the caller when a fan-out has
//! finished. These helpers let listeners signal completion themselves.
//!
//! - [`CountdownLatch`]: a counter that listeners decrement and tests wait on
//! - [`CallLog`]: an ordered record of listener calls, with timed waits

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

// ============================================================================
// Countdown Latch
// ============================================================================

/// A thread-safe counter that blocks waiters until it reaches zero.
///
/// # Example
///
/// ```rust,ignore
/// let latch = Arc::new(CountdownLatch::new(listeners));
/// // each listener calls `latch.count_down()`
/// support.fire_in_parallel().ping()?;
/// assert!(latch.wait_timeout(Duration::from_secs(1)));
/// ```
#[derive(Debug)]
pub struct CountdownLatch {
    remaining: Mutex<usize>,
    zero: Condvar,
}

impl CountdownLatch {
    /// Creates a latch that opens after `count` calls to
    /// [`count_down`](Self::count_down).
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            zero: Condvar::new(),
        }
    }

    /// Decrements the counter, waking every waiter when it reaches zero.
    ///
    /// Counting down an open latch does nothing.
    pub fn count_down(&self) {
        let mut remaining = self.remaining.lock();
        if *remaining == 0 {
            return;
        }
        *remaining -= 1;
        if *remaining == 0 {
            self.zero.notify_all();
        }
    }

    /// The number of outstanding counts.
    pub fn count(&self) -> usize {
        *self.remaining.lock()
    }

    /// Returns `true` once the counter has reached zero.
    pub fn is_open(&self) -> bool {
        self.count() == 0
    }

    /// Blocks until the counter reaches zero.
    pub fn wait(&self) {
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            self.zero.wait(&mut remaining);
        }
    }

    /// Blocks until the counter reaches zero or `timeout` elapses.
    ///
    /// Returns `true` if the latch opened.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            if self.zero.wait_until(&mut remaining, deadline).timed_out() {
                return *remaining == 0;
            }
        }
        true
    }
}

// ============================================================================
// Call Log
// ============================================================================

/// An ordered, shareable record of the calls listeners received.
///
/// Recording listeners push one entry per call; tests read the entries back
/// or wait until enough of them have arrived.
#[derive(Debug)]
pub struct CallLog<E> {
    entries: Mutex<Vec<E>>,
    changed: Condvar,
}

impl<E> CallLog<E> {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            changed: Condvar::new(),
        }
    }

    /// Appends one entry and wakes waiters.
    pub fn record(&self, entry: E) {
        self.entries.lock().push(entry);
        self.changed.notify_all();
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Blocks until at least `count` entries exist or `timeout` elapses.
    ///
    /// Returns `true` if the count was reached.
    pub fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut entries = self.entries.lock();
        while entries.len() < count {
            if self.changed.wait_until(&mut entries, deadline).timed_out() {
                return entries.len() >= count;
            }
        }
        true
    }
}

impl<E: Clone> CallLog<E> {
    /// A copy of the entries, in recording order.
    pub fn entries(&self) -> Vec<E> {
        self.entries.lock().clone()
    }
}

impl<E> Default for CallLog<E> {
    fn default() -> Self {
        Self::new()
    }
}
