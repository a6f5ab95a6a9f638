//! Non-owning, bounds-checked views over contiguous storage.
//!
//! A view is a (pointer, length) pair borrowed from storage owned elsewhere.
//! It never allocates, frees or grows. The lifetime `'a` ties the view to its
//! source, so a view that would outlive a `Vec` or array is rejected at
//! compile time. Only [`View::from_raw_parts`] steps outside that, and it is
//! `unsafe` for exactly that reason.
//!
//! There are two ways in:
//!
//! - the implicit one, `From<&[T]>` / `From<&Vec<T>>` / `From<&[T; N]>`,
//!   which always takes the length from the container itself;
//! - the explicit one, [`View::new`], where the caller states a range and the
//!   range is checked against the source.
//!
//! A view cannot outlive what it looks at:
//!
//! ```compile_fail
//! use handle_mem::View;
//!
//! let data = vec![1, 2, 3];
//! let view = View::from(&data);
//! drop(data);
//! assert_eq!(view.len(), 3);
//! ```
//!
//! ```compile_fail
//! use handle_mem::View;
//!
//! fn numbers<'a>() -> View<'a, i32> {
//!     let data = vec![1, 2, 3];
//!     View::from(&data)
//! }
//! ```

use crate::error::{MemError, Result};
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::slice;

/// Read-only view over `len` consecutive `T`s.
///
/// # Example
///
/// ```
/// use handle_mem::{MemError, View};
///
/// let data = [0, 1, 2, 3, 4];
/// let view = View::new(&data, 2, 2).unwrap();
///
/// assert_eq!(view.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
/// assert_eq!(view.get(2), Err(MemError::IndexOutOfBounds { index: 2, len: 2 }));
/// ```
pub struct View<'a, T> {
    ptr: NonNull<T>,
    len: usize,
    _marker: PhantomData<&'a [T]>,
}

/// Read-write view over `len` consecutive `T`s.
pub struct ViewMut<'a, T> {
    ptr: NonNull<T>,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

// SAFETY: a View behaves like `&'a [T]` and a ViewMut like `&'a mut [T]`.
unsafe impl<T: Sync> Send for View<'_, T> {}
// SAFETY: as above.
unsafe impl<T: Sync> Sync for View<'_, T> {}
// SAFETY: as above.
unsafe impl<T: Send> Send for ViewMut<'_, T> {}
// SAFETY: as above.
unsafe impl<T: Sync> Sync for ViewMut<'_, T> {}

fn check_range(start: usize, len: usize, source_len: usize) -> Result<()> {
    match start.checked_add(len) {
        Some(end) if end <= source_len => Ok(()),
        _ => Err(MemError::RangeOutOfBounds {
            start,
            len,
            source_len,
        }),
    }
}

impl<'a, T> View<'a, T> {
    /// View `len` elements of `source` starting at `start`.
    ///
    /// A range reaching past the end of `source` is rejected, never truncated.
    pub fn new(source: &'a [T], start: usize, len: usize) -> Result<Self> {
        check_range(start, len, source.len())?;
        Ok(Self::from_slice(&source[start..start + len]))
    }

    /// View from a raw pointer and an element count.
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null, aligned, and point to `len` initialized `T`s
    /// that stay alive and unmodified for `'a`. The view cannot detect that
    /// its storage was freed or resized; reading through it afterwards is
    /// undefined behaviour.
    pub unsafe fn from_raw_parts(ptr: *const T, len: usize) -> Self {
        // SAFETY: upheld by the caller.
        Self::from_slice(unsafe { slice::from_raw_parts(ptr, len) })
    }

    #[inline]
    fn from_slice(slice: &'a [T]) -> Self {
        Self {
            ptr: NonNull::from(slice).cast(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    /// An empty view.
    pub fn empty() -> Self {
        Self::from_slice(&[])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The viewed elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        // SAFETY: ptr/len come from a slice borrowed for 'a.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Checked element access.
    #[inline]
    pub fn get(&self, index: usize) -> Result<&'a T> {
        self.as_slice().get(index).ok_or(MemError::IndexOutOfBounds {
            index,
            len: self.len,
        })
    }

    pub fn first(&self) -> Option<&'a T> {
        self.as_slice().first()
    }

    pub fn last(&self) -> Option<&'a T> {
        self.as_slice().last()
    }

    /// A narrower view inside this one.
    pub fn subview(&self, start: usize, len: usize) -> Result<Self> {
        View::new(self.as_slice(), start, len)
    }

    /// Split into `[0, mid)` and `[mid, len)`.
    pub fn split_at(&self, mid: usize) -> Result<(Self, Self)> {
        if mid > self.len {
            return Err(MemError::IndexOutOfBounds {
                index: mid,
                len: self.len,
            });
        }
        let (head, tail) = self.as_slice().split_at(mid);
        Ok((Self::from_slice(head), Self::from_slice(tail)))
    }

    /// Iterate over `[start, start + len)`. Each call starts afresh.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'a, T> {
        self.as_slice().iter()
    }
}

impl<T> Clone for View<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for View<'_, T> {}

impl<T> Default for View<'_, T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, T> From<&'a [T]> for View<'a, T> {
    fn from(slice: &'a [T]) -> Self {
        Self::from_slice(slice)
    }
}

impl<'a, T, const N: usize> From<&'a [T; N]> for View<'a, T> {
    fn from(array: &'a [T; N]) -> Self {
        Self::from_slice(array)
    }
}

impl<'a, T> From<&'a Vec<T>> for View<'a, T> {
    fn from(vec: &'a Vec<T>) -> Self {
        Self::from_slice(vec)
    }
}

impl<'a, T> IntoIterator for View<'a, T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &View<'a, T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for View<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq> PartialEq<[T]> for View<'_, T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: fmt::Debug> fmt::Debug for View<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<'a, T> ViewMut<'a, T> {
    /// Mutably view `len` elements of `source` starting at `start`.
    pub fn new(source: &'a mut [T], start: usize, len: usize) -> Result<Self> {
        check_range(start, len, source.len())?;
        Ok(Self::from_slice(&mut source[start..start + len]))
    }

    /// Mutable view from a raw pointer and an element count.
    ///
    /// # Safety
    ///
    /// As [`View::from_raw_parts`], and additionally no other reference to the
    /// same elements may be used while the view is alive.
    pub unsafe fn from_raw_parts(ptr: *mut T, len: usize) -> Self {
        // SAFETY: upheld by the caller.
        Self::from_slice(unsafe { slice::from_raw_parts_mut(ptr, len) })
    }

    #[inline]
    fn from_slice(slice: &'a mut [T]) -> Self {
        Self {
            len: slice.len(),
            ptr: NonNull::from(slice).cast(),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: ptr/len come from a slice borrowed mutably for 'a.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and `&mut self` makes this the only live access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> View<'_, T> {
        View::from_slice(self.as_slice())
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(MemError::IndexOutOfBounds { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(MemError::IndexOutOfBounds { index, len })
    }

    /// Overwrite the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        self.get_mut(index)
            .map(|slot| std::mem::replace(slot, value))
    }

    /// A narrower mutable view, borrowing this one.
    pub fn subview_mut(&mut self, start: usize, len: usize) -> Result<ViewMut<'_, T>> {
        ViewMut::new(self.as_mut_slice(), start, len)
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }
}

impl<T: Clone> ViewMut<'_, T> {
    /// Set every element in the view to `value`.
    pub fn fill(&mut self, value: T) {
        self.as_mut_slice().fill(value);
    }
}

impl<'a, T> From<&'a mut [T]> for ViewMut<'a, T> {
    fn from(slice: &'a mut [T]) -> Self {
        Self::from_slice(slice)
    }
}

impl<'a, T, const N: usize> From<&'a mut [T; N]> for ViewMut<'a, T> {
    fn from(array: &'a mut [T; N]) -> Self {
        Self::from_slice(array)
    }
}

impl<'a, T> From<&'a mut Vec<T>> for ViewMut<'a, T> {
    fn from(vec: &'a mut Vec<T>) -> Self {
        Self::from_slice(vec)
    }
}

impl<'a, T> From<ViewMut<'a, T>> for View<'a, T> {
    fn from(view: ViewMut<'a, T>) -> Self {
        Self {
            ptr: view.ptr,
            len: view.len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> IntoIterator for ViewMut<'a, T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        // SAFETY: the view is consumed, handing its unique borrow to the iterator.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }.iter_mut()
    }
}

impl<T: fmt::Debug> fmt::Debug for ViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn sum(view: View<'_, i32>) -> i32 {
        view.iter().sum()
    }

    fn zero(mut view: ViewMut<'_, i32>) {
        view.fill(0);
    }

    #[test]
    fn test_implicit_from_array_carries_length() {
        let a = [1, 2, 3, 4];
        let view = View::from(&a);
        assert_eq!(view.len(), 4);
        assert_eq!(sum(view), 10);
        assert_eq!(sum((&a).into()), 10);
    }

    #[test]
    fn test_explicit_range() {
        let data = [0, 1, 2, 3, 4];
        let view = View::new(&data, 2, 2).unwrap();
        assert_eq!(view.as_slice(), &[2, 3]);
        assert_eq!(view.get(1), Ok(&3));
        assert_eq!(
            view.get(2),
            Err(MemError::IndexOutOfBounds { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_overlong_range_rejected() {
        let data = vec![0; 100];
        assert_eq!(
            View::new(&data, 10, 100).unwrap_err(),
            MemError::RangeOutOfBounds {
                start: 10,
                len: 100,
                source_len: 100
            }
        );
        assert!(View::new(&data, usize::MAX, 2).is_err());
        assert!(View::new(&data, 100, 0).is_ok());
    }

    #[test]
    fn test_iteration_restartable() {
        let v = vec!['a', 'b', 'c'];
        let view = View::from(&v);
        let first: String = view.iter().collect();
        let second: String = view.into_iter().collect();
        assert_eq!(first, "abc");
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_view() {
        let view: View<'_, u8> = View::empty();
        assert!(view.is_empty());
        assert_eq!(view.first(), None);
        assert_eq!(view.iter().count(), 0);
    }

    #[test]
    fn test_subview_and_split() {
        let data: Vec<u32> = (0..10).collect();
        let view = View::from(&data);
        let sub = view.subview(3, 4).unwrap();
        assert_eq!(sub.as_slice(), &[3, 4, 5, 6]);
        assert!(sub.subview(2, 3).is_err());

        let (head, tail) = sub.split_at(1).unwrap();
        assert_eq!(head.as_slice(), &[3]);
        assert_eq!(tail.last(), Some(&6));
        assert!(sub.split_at(5).is_err());
    }

    #[test]
    fn test_view_mut_fill_and_set() {
        let mut a = [5; 8];
        zero(ViewMut::new(&mut a, 2, 3).unwrap());
        assert_eq!(a, [5, 5, 0, 0, 0, 5, 5, 5]);

        let mut view = ViewMut::from(&mut a);
        assert_eq!(view.set(0, 9), Ok(5));
        assert!(view.set(8, 1).is_err());
        for x in view.iter_mut() {
            *x += 1;
        }
        assert_eq!(a, [10, 6, 1, 1, 1, 6, 6, 6]);
    }

    #[test]
    fn test_raw_parts() {
        let v = vec![1u16, 2, 3];
        // SAFETY: v outlives the view and is not modified.
        let view = unsafe { View::from_raw_parts(v.as_ptr(), 2) };
        assert_eq!(view.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_view_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<View<'_, i32>>();
        assert_send_sync::<ViewMut<'_, i32>>();
    }
}
