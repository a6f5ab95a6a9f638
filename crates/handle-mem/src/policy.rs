//! Reference-count policy abstraction.
//!
//! `CountPolicy` picks the counter that lives inside a shared handle's
//! control block: a plain `Cell` for single-threaded use, or an atomic for
//! handles that are duplicated and dropped from several threads.

use std::cell::Cell;
use std::sync::atomic::{self, AtomicUsize, Ordering};

/// Counts above this are treated as a leak of handles and abort the process,
/// before the counter can wrap and free a live value.
const MAX_REFCOUNT: usize = isize::MAX as usize;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::SingleThreaded {}
    impl Sealed for super::ThreadSafe {}
    impl Sealed for std::cell::Cell<usize> {}
    impl Sealed for std::sync::atomic::AtomicUsize {}
}

/// Selects the counter type used by a control block.
///
/// Sealed: a shared handle frees its block on the count the policy reports,
/// so only [`SingleThreaded`] and [`ThreadSafe`] exist.
///
/// ```compile_fail
/// use handle_mem::CountPolicy;
/// use std::cell::Cell;
///
/// struct Custom;
///
/// impl CountPolicy for Custom {
///     type Counter = Cell<usize>;
///
///     fn new_counter(initial: usize) -> Cell<usize> {
///         Cell::new(initial)
///     }
/// }
/// ```
pub trait CountPolicy: sealed::Sealed + 'static {
    /// Counter type (`Cell<usize>` or `AtomicUsize`).
    type Counter: Counter;

    /// Create a new counter initialized to the given value.
    fn new_counter(initial: usize) -> Self::Counter;
}

/// Operations on a reference count.
///
/// `decrement` reports the transition to zero to exactly one caller, however
/// many threads decrement concurrently. Sealed like [`CountPolicy`].
///
/// ```compile_fail
/// use handle_mem::Counter;
/// use std::cell::Cell;
///
/// struct Stuck(Cell<usize>);
///
/// impl Counter for Stuck {
///     fn get(&self) -> usize {
///         self.0.get()
///     }
///     fn increment(&self) -> usize {
///         1
///     }
///     fn decrement(&self) -> usize {
///         0
///     }
///     fn try_claim_unique(&self) -> bool {
///         true
///     }
/// }
/// ```
pub trait Counter: sealed::Sealed {
    fn get(&self) -> usize;
    fn increment(&self) -> usize;
    fn decrement(&self) -> usize;

    /// Move the count from 1 to 0 if this is the only holder.
    ///
    /// Returns false, leaving the count untouched, otherwise.
    fn try_claim_unique(&self) -> bool;
}

// ============================================================================
// SingleThreaded Policy
// ============================================================================

/// Single-threaded policy using `Cell`.
///
/// Handles using it are neither `Send` nor `Sync`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleThreaded;

impl CountPolicy for SingleThreaded {
    type Counter = Cell<usize>;

    #[inline]
    fn new_counter(initial: usize) -> Self::Counter {
        Cell::new(initial)
    }
}

impl Counter for Cell<usize> {
    #[inline]
    fn get(&self) -> usize {
        Cell::get(self)
    }

    #[inline]
    fn increment(&self) -> usize {
        let val = self.get();
        if val >= MAX_REFCOUNT {
            std::process::abort();
        }
        self.set(val + 1);
        val + 1
    }

    #[inline]
    fn decrement(&self) -> usize {
        let val = self.get();
        debug_assert!(val > 0, "Decrementing zero reference count");
        self.set(val - 1);
        val - 1
    }

    #[inline]
    fn try_claim_unique(&self) -> bool {
        if self.get() == 1 {
            self.set(0);
            true
        } else {
            false
        }
    }
}

// ============================================================================
// ThreadSafe Policy
// ============================================================================

/// Thread-safe policy using `AtomicUsize`.
///
/// Only the count is synchronized. Access to the shared value itself still
/// needs a `Guarded` or a `SharedCell` owner when it is mutated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSafe;

impl CountPolicy for ThreadSafe {
    type Counter = AtomicUsize;

    #[inline]
    fn new_counter(initial: usize) -> Self::Counter {
        AtomicUsize::new(initial)
    }
}

impl Counter for AtomicUsize {
    #[inline]
    fn get(&self) -> usize {
        self.load(Ordering::Acquire)
    }

    #[inline]
    fn increment(&self) -> usize {
        // A new handle is made from an existing one, so no ordering is needed here.
        let prev = self.fetch_add(1, Ordering::Relaxed);
        if prev >= MAX_REFCOUNT {
            std::process::abort();
        }
        prev + 1
    }

    #[inline]
    fn decrement(&self) -> usize {
        let prev = self.fetch_sub(1, Ordering::Release);
        debug_assert!(prev > 0, "Decrementing zero reference count");
        if prev == 1 {
            // Synchronize with every earlier Release decrement before the value is dropped.
            atomic::fence(Ordering::Acquire);
        }
        prev - 1
    }

    #[inline]
    fn try_claim_unique(&self) -> bool {
        self.compare_exchange(1, 0, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }
}

/// Policy behind the [`Shared`](crate::Shared) alias, chosen by the `thread-safe` feature.
#[cfg(feature = "thread-safe")]
pub type DefaultPolicy = ThreadSafe;

/// Policy behind the [`Shared`](crate::Shared) alias, chosen by the `thread-safe` feature.
#[cfg(not(feature = "thread-safe"))]
pub type DefaultPolicy = SingleThreaded;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_counter() {
        let counter = SingleThreaded::new_counter(0);
        assert_eq!(counter.get(), 0);
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.decrement(), 1);
        assert_eq!(Counter::get(&counter), 1);
    }

    #[test]
    fn test_atomic_counter() {
        let counter = ThreadSafe::new_counter(0);
        assert_eq!(counter.get(), 0);
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.decrement(), 1);
        assert_eq!(Counter::get(&counter), 1);
    }

    #[test]
    fn test_claim_unique() {
        let counter = ThreadSafe::new_counter(2);
        assert!(!counter.try_claim_unique());
        counter.decrement();
        assert!(counter.try_claim_unique());
        assert_eq!(Counter::get(&counter), 0);

        let cell = SingleThreaded::new_counter(1);
        assert!(cell.try_claim_unique());
        assert!(!cell.try_claim_unique());
    }

    #[test]
    fn test_atomic_counter_concurrent() {
        let counter = ThreadSafe::new_counter(1);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        counter.increment();
                    }
                });
            }
        });
        assert_eq!(Counter::get(&counter), 8001);

        let zero_crossings = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        if counter.decrement() == 0 {
                            zero_crossings.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });
        assert_eq!(Counter::get(&counter), 1);
        assert_eq!(zero_crossings.load(Ordering::Relaxed), 0);
        assert_eq!(counter.decrement(), 0);
    }
}
