//! Exclusive-ownership handle.

use crate::error::{MemError, Result};
use crate::policy::CountPolicy;
use crate::shared::SharedHandle;
use std::fmt;

/// Sole owner of one heap-allocated value.
///
/// An `Exclusive` is either owning or empty. Ownership only moves through
/// [`transfer`](Exclusive::transfer) or [`transfer_from`](Exclusive::transfer_from),
/// which always leave the source empty. It is never duplicated: there is no
/// `Clone` impl.
///
/// The owned value is dropped exactly once, when the handle goes out of scope,
/// is assigned over, or is [`reset`](Exclusive::reset).
///
/// # Example
///
/// ```
/// use handle_mem::{Exclusive, MemError};
///
/// let mut first = Exclusive::acquire(42);
/// let mut second = first.transfer();
///
/// assert!(first.is_empty());
/// assert_eq!(second.release(), Ok(42));
/// assert_eq!(second.release(), Err(MemError::EmptyHandle));
/// ```
pub struct Exclusive<T> {
    slot: Option<Box<T>>,
}

impl<T> Exclusive<T> {
    /// Take ownership of a freshly produced value.
    #[inline]
    pub fn acquire(value: T) -> Self {
        Self {
            slot: Some(Box::new(value)),
        }
    }

    /// A handle that owns nothing.
    #[inline]
    pub const fn empty() -> Self {
        Self { slot: None }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Move ownership into a new handle, leaving `self` empty.
    #[inline]
    pub fn transfer(&mut self) -> Self {
        Self {
            slot: self.slot.take(),
        }
    }

    /// Move ownership out of `source` into `self`.
    ///
    /// Whatever `self` owned before is dropped. The move itself runs no user
    /// code, so it cannot fail halfway: afterwards exactly one of the two
    /// handles owns the value `source` held.
    pub fn transfer_from(&mut self, source: &mut Self) {
        let incoming = source.slot.take();
        let outgoing = std::mem::replace(&mut self.slot, incoming);
        if outgoing.is_some() {
            log::trace!("exclusive handle dropping previous value on assignment");
        }
        drop(outgoing);
    }

    /// Extract the owned value, leaving the handle empty.
    pub fn release(&mut self) -> Result<T> {
        match self.slot.take() {
            Some(boxed) => {
                log::trace!("exclusive handle released");
                Ok(*boxed)
            }
            None => Err(MemError::EmptyHandle),
        }
    }

    /// Consume the handle, returning the owned value.
    pub fn into_inner(mut self) -> Result<T> {
        self.release()
    }

    /// Drop the owned value now. Does nothing on an empty handle.
    pub fn reset(&mut self) {
        if let Some(boxed) = self.slot.take() {
            log::trace!("exclusive handle reset");
            drop(boxed);
        }
    }

    /// Put `value` in the handle, returning the value it replaces (if any).
    pub fn replace(&mut self, value: T) -> Option<T> {
        self.slot.replace(Box::new(value)).map(|boxed| *boxed)
    }

    /// Borrow the owned value.
    pub fn get(&self) -> Result<&T> {
        self.slot.as_deref().ok_or(MemError::EmptyHandle)
    }

    /// Mutably borrow the owned value.
    pub fn get_mut(&mut self) -> Result<&mut T> {
        self.slot.as_deref_mut().ok_or(MemError::EmptyHandle)
    }

    /// Hand the value over to a new shared handle.
    ///
    /// The value moves into a fresh control block; `self` is left empty.
    pub fn into_shared<P: CountPolicy>(&mut self) -> Result<SharedHandle<T, P>> {
        self.release().map(SharedHandle::acquire)
    }
}

impl<T> Default for Exclusive<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Box<T>> for Exclusive<T> {
    /// Adopt an existing allocation without moving the value.
    fn from(boxed: Box<T>) -> Self {
        Self { slot: Some(boxed) }
    }
}

impl<T: fmt::Debug> fmt::Debug for Exclusive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(value) => f.debug_tuple("Exclusive").field(value).finish(),
            None => f.write_str("Exclusive(<empty>)"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct DropTracker(Rc<Cell<usize>>);
    impl Drop for DropTracker {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_acquire_and_get() {
        let mut h = Exclusive::acquire(String::from("hello"));
        assert_eq!(h.get().map(String::as_str), Ok("hello"));
        h.get_mut().unwrap().push('!');
        assert_eq!(h.get().unwrap(), "hello!");
    }

    #[test]
    fn test_transfer_empties_source() {
        let mut a = Exclusive::acquire(42);
        let b = a.transfer();
        assert!(a.is_empty());
        assert!(!b.is_empty());
        assert_eq!(a.get(), Err(MemError::EmptyHandle));
    }

    #[test]
    fn test_release_twice_fails() {
        let mut a = Exclusive::acquire(42);
        let mut b = a.transfer();
        assert_eq!(b.release(), Ok(42));
        assert_eq!(b.release(), Err(MemError::EmptyHandle));
        assert_eq!(a.release(), Err(MemError::EmptyHandle));
    }

    #[test]
    fn test_transfer_from_drops_previous() {
        let drops = Rc::new(Cell::new(0));
        let mut dest = Exclusive::acquire(DropTracker(drops.clone()));
        let mut src = Exclusive::acquire(DropTracker(drops.clone()));

        dest.transfer_from(&mut src);
        assert_eq!(drops.get(), 1);
        assert!(src.is_empty());
        assert!(!dest.is_empty());

        drop(dest);
        drop(src);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_transfer_from_empty_source() {
        let drops = Rc::new(Cell::new(0));
        let mut dest = Exclusive::acquire(DropTracker(drops.clone()));
        let mut src = Exclusive::empty();

        dest.transfer_from(&mut src);
        assert_eq!(drops.get(), 1);
        assert!(dest.is_empty());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let drops = Rc::new(Cell::new(0));
        let mut h = Exclusive::acquire(DropTracker(drops.clone()));
        h.reset();
        h.reset();
        assert_eq!(drops.get(), 1);
        assert!(h.is_empty());
    }

    #[test]
    fn test_replace() {
        let mut h = Exclusive::empty();
        assert_eq!(h.replace(1), None);
        assert_eq!(h.replace(2), Some(1));
        assert_eq!(h.into_inner(), Ok(2));
    }

    #[test]
    fn test_from_box_keeps_address() {
        let boxed = Box::new([7u8; 16]);
        let addr = &*boxed as *const [u8; 16];
        let h = Exclusive::from(boxed);
        assert!(std::ptr::eq(h.get().unwrap(), addr));
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", Exclusive::acquire(3)), "Exclusive(3)");
        assert_eq!(format!("{:?}", Exclusive::<i32>::empty()), "Exclusive(<empty>)");
    }
}
