//! Scoped lock around a value.
//!
//! The guarded value is only reachable through a `GuardedRef`, and the lock
//! is released when that guard leaves scope on any path: normal return,
//! early return, `?` propagation or unwinding.

use crate::error::{MemError, Result};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

/// A value that can only be touched while holding its lock.
///
/// `Guarded::new` is `const`, so a `static` can hold process-wide state.
///
/// # Example
///
/// ```
/// use handle_mem::Guarded;
///
/// static LOG: Guarded<Vec<&str>> = Guarded::new(Vec::new());
///
/// LOG.with(|log| log.push("started")).unwrap();
/// assert_eq!(LOG.lock().unwrap().len(), 1);
/// ```
pub struct Guarded<T> {
    inner: Mutex<T>,
}

/// Exclusive access to a [`Guarded`] value for the lifetime of the guard.
pub struct GuardedRef<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T> Guarded<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Block until the lock is acquired.
    ///
    /// Fails with `LockPoisoned` if a previous holder panicked; the lock is not
    /// held after such a failure.
    pub fn lock(&self) -> Result<GuardedRef<'_, T>> {
        match self.inner.lock() {
            Ok(guard) => Ok(GuardedRef { guard }),
            Err(_) => Err(MemError::LockPoisoned),
        }
    }

    /// Run `f` with the lock held, releasing it before returning.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut guard = self.lock()?;
        Ok(f(&mut *guard))
    }

    /// Clear a poisoned state left by a panicking holder.
    ///
    /// The value may be half-updated; the caller accepts it as-is.
    pub fn recover(&self) {
        if self.inner.is_poisoned() {
            log::warn!("recovering poisoned guarded value");
            self.inner.clear_poison();
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.inner.is_poisoned()
    }

    /// Direct access; `&mut self` already rules out other holders.
    pub fn get_mut(&mut self) -> Result<&mut T> {
        self.inner.get_mut().map_err(|_| MemError::LockPoisoned)
    }

    pub fn into_inner(self) -> Result<T> {
        self.inner.into_inner().map_err(|_| MemError::LockPoisoned)
    }
}

impl<T: Default> Default for Guarded<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for Guarded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guarded")
            .field("poisoned", &self.is_poisoned())
            .finish_non_exhaustive()
    }
}

impl<T> Deref for GuardedRef<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for GuardedRef<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::shared::SharedHandle;
    use crate::policy::ThreadSafe;

    fn bump_unless_negative(g: &Guarded<i32>, delta: i32) -> Result<i32> {
        let mut value = g.lock()?;
        if delta < 0 {
            return Ok(*value);
        }
        *value += delta;
        Ok(*value)
    }

    #[test]
    fn test_early_return_releases_lock() {
        let g = Guarded::new(1);
        assert_eq!(bump_unless_negative(&g, -1), Ok(1));
        assert_eq!(bump_unless_negative(&g, 2), Ok(3));
        assert_eq!(g.into_inner(), Ok(3));
    }

    #[test]
    fn test_shared_guarded_across_threads() {
        let total: SharedHandle<Guarded<u64>, ThreadSafe> = SharedHandle::acquire(Guarded::new(0));
        std::thread::scope(|s| {
            for _ in 0..8 {
                let total = total.duplicate();
                s.spawn(move || {
                    for _ in 0..250 {
                        total.with(|n| *n += 1).unwrap();
                    }
                });
            }
        });
        assert_eq!(*total.lock().unwrap(), 2000);
        assert_eq!(total.count(), 1);
    }

    #[test]
    fn test_poison_reported_and_recovered() {
        let g = Guarded::new(vec![1]);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _held = g.lock().unwrap();
            panic!("holder failed");
        }));
        assert!(result.is_err());

        assert_eq!(g.with(|v| v.len()).unwrap_err(), MemError::LockPoisoned);
        g.recover();
        assert_eq!(g.with(|v| v.len()), Ok(1));
    }
}
