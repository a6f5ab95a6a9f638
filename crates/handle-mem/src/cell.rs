//! Owner-checked mutation of shared values.
//!
//! A `SharedCell<T>` is a shared handle around a `QCell<T>`. Reading or
//! writing the value requires borrowing a `CellOwner`, so the borrow checker
//! proves at compile time that at most one `&mut T` exists, without the
//! runtime panics of a `RefCell`.

use crate::policy::{CountPolicy, DefaultPolicy};
use crate::shared::SharedHandle;
use qcell::{QCell, QCellOwner};

/// Token that grants access to every cell created from it.
pub type CellOwner = QCellOwner;

/// Shared handle to a value guarded by a [`CellOwner`].
pub type SharedCell<T, P = DefaultPolicy> = SharedHandle<QCell<T>, P>;

impl<T, P: CountPolicy> SharedHandle<QCell<T>, P> {
    /// Allocate a shared cell tied to `owner`.
    ///
    /// # Example
    ///
    /// ```
    /// use handle_mem::{CellOwner, SharedCell};
    ///
    /// let mut owner = CellOwner::new();
    /// let a: SharedCell<Vec<i32>> = SharedCell::new_cell(&owner, vec![1]);
    /// let b = a.duplicate();
    ///
    /// b.rw(&mut owner).push(2);
    /// assert_eq!(a.ro(&owner), &vec![1, 2]);
    /// ```
    pub fn new_cell(owner: &CellOwner, value: T) -> Self {
        SharedHandle::acquire(owner.cell(value))
    }

    /// Read the value; any number of readers may hold `&owner` at once.
    #[inline]
    pub fn ro<'a>(&'a self, owner: &'a CellOwner) -> &'a T {
        owner.ro(self.get())
    }

    /// Write the value; `&mut owner` excludes every other reader and writer.
    #[inline]
    pub fn rw<'a>(&'a self, owner: &'a mut CellOwner) -> &'a mut T {
        owner.rw(self.get())
    }
}
