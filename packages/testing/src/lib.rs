#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for testing and examples in slot_list.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Runs a test with a timeout to prevent infinite hangs.
///
/// This function wraps a test closure with a timeout mechanism. If the test
/// takes longer than the timeout to complete, the process will be terminated
/// to prevent CI/build systems from hanging.
///
/// The timeout is 10 seconds under normal conditions and 60 seconds under
/// Miri, where thread synchronization primitives are significantly slower.
///
/// When the `MUTATION_TESTING` environment variable is set to "1", the watchdog
/// is disabled and the test function is executed directly. This allows mutation
/// testing to properly detect hanging mutations.
///
/// # Panics
///
/// Panics if the test exceeds the timeout (when not in mutation testing mode).
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// with_watchdog(|| {
///     // Your test code here
///     assert_eq!(2 + 2, 4);
/// });
/// ```
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    // Check if we are running under mutation testing.
    if std::env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        // Under mutation testing, disable the watchdog to allow hanging mutations.
        return test_fn();
    }

    let (tx, rx) = mpsc::channel();

    // Run the test in a separate thread
    let test_handle = thread::spawn(move || {
        let result = test_fn();
        // Send the result back - if this fails, the receiver has timed out
        drop(tx.send(result));
    });

    // Miri is dramatically slower for thread synchronization, so we use a
    // longer timeout to avoid false positives while still catching real hangs.
    let timeout = if cfg!(miri) {
        Duration::from_secs(60)
    } else {
        Duration::from_secs(10)
    };

    // Wait for either the test to complete or timeout.
    match rx.recv_timeout(timeout) {
        Ok(result) => {
            // Test completed successfully, join the thread to clean up
            test_handle.join().expect("Test thread should not panic");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            // Test timed out - this indicates the test is hanging
            panic!("Test exceeded 10-second timeout");
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            // Thread panicked, join it to get the panic
            match test_handle.join() {
                Ok(()) => panic!("Test thread disconnected unexpectedly"),
                Err(e) => std::panic::resume_unwind(e),
            }
        }
    }
}

/// Counts values as they are created and dropped, to verify that a container drops every
/// value exactly once.
///
/// Clones share the same counts.
///
/// # Example
///
/// ```rust
/// use testing::LiveCounter;
///
/// let counter = LiveCounter::new();
///
/// let value = counter.track(5_u32);
/// assert_eq!(*value, 5);
/// assert_eq!(counter.live(), 1);
///
/// drop(value);
/// assert_eq!(counter.live(), 0);
/// assert_eq!(counter.dropped(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LiveCounter {
    counts: Arc<Counts>,
}

#[derive(Debug, Default)]
struct Counts {
    live: AtomicUsize,
    created: AtomicUsize,
    dropped: AtomicUsize,
}

impl LiveCounter {
    /// Creates a counter with all counts at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps `value` so that its creation and drop are counted by this counter.
    #[must_use]
    pub fn track<T>(&self, value: T) -> Tracked<T> {
        self.counts.live.fetch_add(1, Ordering::Relaxed);
        self.counts.created.fetch_add(1, Ordering::Relaxed);

        Tracked {
            value,
            counts: Arc::clone(&self.counts),
        }
    }

    /// The number of tracked values that have been created but not yet dropped.
    #[must_use]
    pub fn live(&self) -> usize {
        self.counts.live.load(Ordering::Relaxed)
    }

    /// The number of tracked values ever created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.counts.created.load(Ordering::Relaxed)
    }

    /// The number of tracked values dropped so far.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.counts.dropped.load(Ordering::Relaxed)
    }
}

/// A value whose drop is counted by the [`LiveCounter`] that created it.
///
/// Dereferences to the wrapped value. Dropping the same value twice (e.g. due to a bug in
/// unsafe code) panics instead of silently corrupting the counts.
pub struct Tracked<T> {
    value: T,
    counts: Arc<Counts>,
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T> DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tracked").field(&self.value).finish()
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.counts
            .live
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |live| live.checked_sub(1))
            .expect("tracked value dropped more often than it was created");

        self.counts.dropped.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn watchdog_allows_fast_tests() {
        let result = with_watchdog(|| {
            // A test that completes quickly
            42
        });
        assert_eq!(result, 42);
    }

    #[test]
    fn watchdog_returns_correct_value() {
        let result = with_watchdog(|| "hello world");
        assert_eq!(result, "hello world");
    }

    #[test]
    fn counter_starts_at_zero() {
        let counter = LiveCounter::new();

        assert_eq!(counter.live(), 0);
        assert_eq!(counter.created(), 0);
        assert_eq!(counter.dropped(), 0);
    }

    #[test]
    fn counter_tracks_create_and_drop() {
        let counter = LiveCounter::new();

        let first = counter.track("first".to_string());
        let second = counter.track("second".to_string());

        assert_eq!(counter.live(), 2);
        assert_eq!(counter.created(), 2);
        assert_eq!(first.len(), 5);

        drop(first);

        assert_eq!(counter.live(), 1);
        assert_eq!(counter.dropped(), 1);

        drop(second);

        assert_eq!(counter.live(), 0);
        assert_eq!(counter.created(), 2);
        assert_eq!(counter.dropped(), 2);
    }

    #[test]
    fn clones_share_counts() {
        let counter = LiveCounter::new();
        let clone = counter.clone();

        let mut value = clone.track(1_u32);
        *value += 1;

        assert_eq!(*value, 2);
        assert_eq!(counter.live(), 1);
        assert_eq!(format!("{value:?}"), "Tracked(2)");
    }
}
