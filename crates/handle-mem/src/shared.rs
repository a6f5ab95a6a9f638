//! Shared-ownership handle with an inline control block.

use crate::policy::{CountPolicy, Counter, DefaultPolicy, SingleThreaded, ThreadSafe};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::Deref;
use std::ptr::NonNull;

/// The count and the value, allocated together.
///
/// One allocation per shared value. The count always equals the number of
/// live `SharedHandle`s pointing at this block.
pub struct ControlBlock<T, P: CountPolicy> {
    count: P::Counter,
    value: T,
}

impl<T, P: CountPolicy> ControlBlock<T, P> {
    /// Number of live handles referencing this block.
    #[inline]
    pub fn count(&self) -> usize {
        self.count.get()
    }

    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }
}

/// A reference-counted handle to a shared value.
///
/// Duplicating a handle increments the count in the control block; dropping
/// one decrements it. The value and its block are freed exactly when the count
/// goes from 1 to 0, on whichever thread drops the last handle.
///
/// Only the count is synchronized (under [`ThreadSafe`]). The handle hands out
/// `&T`, never `&mut T` while shared; mutate a shared value through a
/// [`Guarded`](crate::Guarded) or a [`SharedCell`](crate::SharedCell).
///
/// Prefer [`Exclusive`](crate::Exclusive) when ownership isn't really shared:
/// with several owners the moment of release is hard to predict.
///
/// # Example
///
/// ```
/// use handle_mem::Shared;
///
/// let data = Shared::acquire(vec![1, 2, 3]);
/// let other = data.duplicate();
///
/// assert_eq!(data.count(), 2);
/// assert_eq!(*other, vec![1, 2, 3]);
/// drop(data);
/// assert_eq!(other.count(), 1);
/// ```
pub struct SharedHandle<T, P: CountPolicy = DefaultPolicy> {
    block: NonNull<ControlBlock<T, P>>,
    _marker: PhantomData<ControlBlock<T, P>>,
}

/// Shared handle using the feature-selected default policy.
pub type Shared<T> = SharedHandle<T, DefaultPolicy>;

/// Shared handle that is neither `Send` nor `Sync`, with a plain counter.
pub type LocalShared<T> = SharedHandle<T, SingleThreaded>;

// SAFETY: the count is atomic under ThreadSafe, and the value is only reachable
// through `&T` (needs Sync) or moved out/dropped on another thread (needs Send).
unsafe impl<T: Send + Sync> Send for SharedHandle<T, ThreadSafe> {}
// SAFETY: as above.
unsafe impl<T: Send + Sync> Sync for SharedHandle<T, ThreadSafe> {}

impl<T, P: CountPolicy> SharedHandle<T, P> {
    /// Allocate `value` and its count together, with a count of 1.
    pub fn acquire(value: T) -> Self {
        let block = Box::new(ControlBlock {
            count: P::new_counter(1),
            value,
        });
        Self {
            block: NonNull::from(Box::leak(block)),
            _marker: PhantomData,
        }
    }

    #[inline]
    fn block(&self) -> &ControlBlock<T, P> {
        // SAFETY: the block stays allocated while this handle holds a count on it.
        unsafe { self.block.as_ref() }
    }

    /// Make another handle to the same value.
    ///
    /// Safe to call concurrently from several threads holding handles to the
    /// same block when `P` is [`ThreadSafe`].
    #[inline]
    pub fn duplicate(&self) -> Self {
        self.block().count.increment();
        Self {
            block: self.block,
            _marker: PhantomData,
        }
    }

    /// Borrow the shared value.
    #[inline]
    pub fn get(&self) -> &T {
        &self.block().value
    }

    /// The control block shared by every duplicate of this handle.
    #[inline]
    pub fn control_block(&self) -> &ControlBlock<T, P> {
        self.block()
    }

    /// Current number of live handles.
    #[inline]
    pub fn count(&self) -> usize {
        self.block().count()
    }

    /// Returns true if this is the only handle.
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.count() == 1
    }

    /// Returns true if both handles share one control block.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.block == other.block
    }

    /// Mutable access if this is the only handle, `None` otherwise.
    #[inline]
    pub fn try_get_mut(&mut self) -> Option<&mut T> {
        if self.is_unique() {
            // SAFETY: count is 1 and we hold `&mut self`, so no other handle
            // exists and none can be made while the borrow lives.
            Some(unsafe { &mut (*self.block.as_ptr()).value })
        } else {
            None
        }
    }

    /// Take the value out if this is the only handle; otherwise hand the handle back.
    pub fn try_unwrap(self) -> Result<T, Self> {
        let this = ManuallyDrop::new(self);
        if this.block().count.try_claim_unique() {
            // SAFETY: the count was 1 and is now 0: we are the last handle and
            // reclaim the block that `acquire` leaked.
            let block = unsafe { Box::from_raw(this.block.as_ptr()) };
            let ControlBlock { value, .. } = *block;
            Ok(value)
        } else {
            Err(ManuallyDrop::into_inner(this))
        }
    }
}

impl<T: Clone, P: CountPolicy> SharedHandle<T, P> {
    /// Mutable access, cloning the value into a fresh block first if shared.
    ///
    /// Other handles keep seeing the original value.
    pub fn make_mut(&mut self) -> &mut T {
        if !self.is_unique() {
            *self = Self::acquire(self.get().clone());
        }
        // SAFETY: unique by construction above, and we hold `&mut self`.
        unsafe { &mut (*self.block.as_ptr()).value }
    }

    /// Consume the handle, cloning the value if other handles remain.
    pub fn into_inner(self) -> T {
        match self.try_unwrap() {
            Ok(value) => value,
            Err(shared) => shared.get().clone(),
        }
    }
}

impl<T, P: CountPolicy> Drop for SharedHandle<T, P> {
    fn drop(&mut self) {
        if self.block().count.decrement() == 0 {
            log::trace!("releasing shared control block");
            // SAFETY: the count just reached zero, so this was the last handle
            // and nothing else can observe the block.
            drop(unsafe { Box::from_raw(self.block.as_ptr()) });
        }
    }
}

impl<T, P: CountPolicy> Clone for SharedHandle<T, P> {
    #[inline]
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

impl<T, P: CountPolicy> Deref for SharedHandle<T, P> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.get()
    }
}

impl<T, P: CountPolicy> AsRef<T> for SharedHandle<T, P> {
    fn as_ref(&self) -> &T {
        self.get()
    }
}

impl<T: fmt::Debug, P: CountPolicy> fmt::Debug for SharedHandle<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHandle")
            .field("value", self.get())
            .field("count", &self.count())
            .finish()
    }
}

impl<T: PartialEq, P: CountPolicy> PartialEq for SharedHandle<T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl<T: Eq, P: CountPolicy> Eq for SharedHandle<T, P> {}

impl<T: Hash, P: CountPolicy> Hash for SharedHandle<T, P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get().hash(state);
    }
}
