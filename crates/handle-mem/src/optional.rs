//! Value-or-absent wrapper with checked access.

use crate::error::{MemError, Result};
use std::ops::Add;

const ABSENT: &str = "<absent>";

/// Either a present `T` or nothing.
///
/// Unlike a bare pointer, reading an absent `Optional` through [`get`](Optional::get)
/// is a reported `TypeMismatch`, never a silent default.
///
/// # Example
///
/// ```
/// use handle_mem::Optional;
///
/// assert_eq!(Optional::present(17).get_or(0), 17);
/// assert_eq!(Optional::absent().get_or(0), 0);
/// assert!(Optional::<i32>::absent().get().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Optional<T> {
    Present(T),
    Absent,
}

impl<T> Optional<T> {
    #[inline]
    pub const fn present(value: T) -> Self {
        Optional::Present(value)
    }

    #[inline]
    pub const fn absent() -> Self {
        Optional::Absent
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, Optional::Present(_))
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        !self.is_present()
    }

    /// Borrow the value, failing if absent.
    pub fn get(&self) -> Result<&T> {
        match self {
            Optional::Present(value) => Ok(value),
            Optional::Absent => Err(MemError::mismatch::<T>(ABSENT)),
        }
    }

    pub fn get_mut(&mut self) -> Result<&mut T> {
        match self {
            Optional::Present(value) => Ok(value),
            Optional::Absent => Err(MemError::mismatch::<T>(ABSENT)),
        }
    }

    /// The value, or `default` if absent.
    pub fn get_or(self, default: T) -> T {
        match self {
            Optional::Present(value) => value,
            Optional::Absent => default,
        }
    }

    /// Consume, returning the value or failing if absent.
    pub fn into_value(self) -> Result<T> {
        match self {
            Optional::Present(value) => Ok(value),
            Optional::Absent => Err(MemError::mismatch::<T>(ABSENT)),
        }
    }

    /// Move the value out, leaving `Absent`.
    pub fn take(&mut self) -> Optional<T> {
        std::mem::replace(self, Optional::Absent)
    }

    /// Store `value`, returning what was there before.
    pub fn replace(&mut self, value: T) -> Optional<T> {
        std::mem::replace(self, Optional::Present(value))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Optional<U> {
        match self {
            Optional::Present(value) => Optional::Present(f(value)),
            Optional::Absent => Optional::Absent,
        }
    }

    pub fn as_ref(&self) -> Optional<&T> {
        match self {
            Optional::Present(value) => Optional::Present(value),
            Optional::Absent => Optional::Absent,
        }
    }
}

impl<T: Add<Output = T> + Default> Optional<T> {
    /// Sum the present values of `items`; absent ones count as nothing.
    ///
    /// ```
    /// use handle_mem::Optional;
    ///
    /// let total = Optional::sum_present([Optional::present(17), Optional::absent()]);
    /// assert_eq!(total, 17);
    /// ```
    pub fn sum_present(items: impl IntoIterator<Item = Optional<T>>) -> T {
        items
            .into_iter()
            .fold(T::default(), |acc, item| match item {
                Optional::Present(value) => acc + value,
                Optional::Absent => acc,
            })
    }
}

impl<T> Default for Optional<T> {
    fn default() -> Self {
        Optional::Absent
    }
}

impl<T> From<Option<T>> for Optional<T> {
    fn from(option: Option<T>) -> Self {
        match option {
            Some(value) => Optional::Present(value),
            None => Optional::Absent,
        }
    }
}

impl<T> From<Optional<T>> for Option<T> {
    fn from(optional: Optional<T>) -> Self {
        match optional {
            Optional::Present(value) => Some(value),
            Optional::Absent => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_present_round_trip() {
        let o = Optional::present(String::from("x"));
        assert!(o.is_present());
        assert_eq!(o.get().map(String::as_str), Ok("x"));
        assert_eq!(o.into_value().unwrap(), "x");
    }

    #[test]
    fn test_absent_get_is_mismatch() {
        let o: Optional<i32> = Optional::absent();
        let err = o.get().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(
            err,
            MemError::TypeMismatch {
                expected: "i32",
                found: "<absent>"
            }
        );
    }

    #[test]
    fn test_get_or() {
        assert_eq!(Optional::present(17).get_or(0), 17);
        assert_eq!(Optional::absent().get_or(0), 0);
    }

    #[test]
    fn test_take_and_replace() {
        let mut o = Optional::present(1);
        assert_eq!(o.replace(2), Optional::Present(1));
        assert_eq!(o.take(), Optional::Present(2));
        assert!(o.is_absent());
        assert!(o.get_mut().is_err());

        o.replace(5);
        *o.get_mut().unwrap() += 1;
        assert_eq!(o, Optional::Present(6));
    }

    #[test]
    fn test_option_conversion() {
        let o: Optional<u8> = Some(3).into();
        let back: Option<u8> = o.into();
        assert_eq!(back, Some(3));
        let none: Option<u8> = Optional::absent().into();
        assert_eq!(none, None);
    }

    #[test]
    fn test_sum_present() {
        assert_eq!(Optional::sum_present([Optional::present(17), Optional::present(19)]), 36);
        assert_eq!(Optional::sum_present([Optional::present(17), Optional::absent()]), 17);
        assert_eq!(Optional::<i32>::sum_present([Optional::absent(), Optional::absent()]), 0);
    }
}
