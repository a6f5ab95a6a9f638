//! Closed sum types over two to four alternatives.
//!
//! `Union2<A, B>`, `Union3<A, B, C>` and `Union4<A, B, C, D>` hold exactly one
//! alternative at a time. Extraction by type is checked: asking for an
//! alternative that isn't active is a `TypeMismatch`, and asking for a type
//! that isn't an alternative at all is `NotAnAlternative`.
//!
//! Dispatch is exhaustive by construction. `visit` takes one closure per
//! alternative and `accept` takes a visitor whose trait requires one method per
//! alternative, so leaving one out does not compile:
//!
//! ```compile_fail
//! use handle_mem::Union3;
//!
//! let u: Union3<i32, String, bool> = Union3::First(1);
//! let label = u.visit(|n| n.to_string(), |s| s.clone());
//! ```
//!
//! ```compile_fail
//! use handle_mem::{Union2, Visit2};
//!
//! struct OnlyNumbers;
//!
//! impl Visit2<i32, String> for OnlyNumbers {
//!     type Output = i32;
//!     fn first(&mut self, value: &i32) -> i32 {
//!         *value
//!     }
//! }
//!
//! let u: Union2<i32, String> = Union2::First(1);
//! u.accept(&mut OnlyNumbers);
//! ```
//!
//! For unions over named domain types, see [`tagged_union!`](crate::tagged_union),
//! which also rejects non-alternative types at compile time.

use crate::error::{MemError, Result};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::mem::ManuallyDrop;

/// Position of the active alternative in a generic union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    First,
    Second,
    Third,
    Fourth,
}

impl Slot {
    pub const fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
            Slot::Third => 2,
            Slot::Fourth => 3,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alternative #{}", self.index())
    }
}

/// Typed access to one alternative of a union declared with
/// [`tagged_union!`](crate::tagged_union).
///
/// Implemented once per alternative type, so `get::<X>()` only compiles when
/// `X` is one of the union's alternatives.
pub trait Alternative<X>: Sized {
    /// The value if `X` is active.
    fn alternative(&self) -> Option<&X>;

    fn alternative_mut(&mut self) -> Option<&mut X>;

    /// The value if `X` is active, or the union back unchanged.
    fn into_alternative(self) -> std::result::Result<X, Self>;
}

/// Move `value` out as `X` when `X` and `V` are the same type.
fn downcast_owned<X: 'static, V: 'static>(value: V) -> std::result::Result<X, V> {
    if TypeId::of::<X>() == TypeId::of::<V>() {
        let value = ManuallyDrop::new(value);
        // SAFETY: X and V are the same type, and `value` is never dropped as a V.
        Ok(unsafe { std::ptr::read(&*value as *const V as *const X) })
    } else {
        Err(value)
    }
}

macro_rules! define_union {
    (
        $(#[$meta:meta])*
        $name:ident, $visit:ident {
            $( $variant:ident($T:ident) => $method:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name<$($T),+> {
            $( $variant($T), )+
        }

        /// Visitor with one required method per alternative.
        pub trait $visit<$($T),+> {
            type Output;
            $( fn $method(&mut self, value: &$T) -> Self::Output; )+
        }

        impl<$($T),+> $name<$($T),+> {
            /// Which alternative is live.
            #[inline]
            pub fn active_type(&self) -> Slot {
                match self {
                    $( Self::$variant(_) => Slot::$variant, )+
                }
            }

            /// Zero-based position of the live alternative.
            #[inline]
            pub fn index(&self) -> usize {
                self.active_type().index()
            }

            /// Type name of the live alternative.
            pub fn type_name(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => type_name::<$T>(), )+
                }
            }

            /// Call exactly the closure matching the live alternative.
            pub fn visit<R>(&self, $( $method: impl FnOnce(&$T) -> R ),+) -> R {
                match self {
                    $( Self::$variant(value) => $method(value), )+
                }
            }

            /// Like [`visit`](Self::visit), consuming the union.
            pub fn fold<R>(self, $( $method: impl FnOnce($T) -> R ),+) -> R {
                match self {
                    $( Self::$variant(value) => $method(value), )+
                }
            }

            /// Dispatch to the visitor method matching the live alternative.
            pub fn accept<V: $visit<$($T),+>>(&self, visitor: &mut V) -> V::Output {
                match self {
                    $( Self::$variant(value) => visitor.$method(value), )+
                }
            }
        }

        impl<$($T: 'static),+> $name<$($T),+> {
            fn check_alternative<X: 'static>() -> Result<()> {
                if [$( TypeId::of::<$T>() ),+].contains(&TypeId::of::<X>()) {
                    Ok(())
                } else {
                    Err(MemError::NotAnAlternative { ty: type_name::<X>() })
                }
            }

            /// True if the live alternative has type `X`.
            pub fn holds<X: 'static>(&self) -> bool {
                self.get::<X>().is_ok()
            }

            /// Borrow the live value as `X`.
            pub fn get<X: 'static>(&self) -> Result<&X> {
                Self::check_alternative::<X>()?;
                let value: &dyn Any = match self {
                    $( Self::$variant(value) => value, )+
                };
                value
                    .downcast_ref::<X>()
                    .ok_or_else(|| MemError::mismatch::<X>(self.type_name()))
            }

            pub fn get_mut<X: 'static>(&mut self) -> Result<&mut X> {
                Self::check_alternative::<X>()?;
                let found = self.type_name();
                let value: &mut dyn Any = match self {
                    $( Self::$variant(value) => value, )+
                };
                value
                    .downcast_mut::<X>()
                    .ok_or_else(|| MemError::mismatch::<X>(found))
            }

            /// Move the live value out as `X`, or hand the union back.
            pub fn into_value<X: 'static>(self) -> std::result::Result<X, Self> {
                match self {
                    $( Self::$variant(value) => downcast_owned::<X, $T>(value).map_err(Self::$variant), )+
                }
            }

            /// Drop the live value and make `value` the active alternative.
            ///
            /// The first alternative whose type is `X` is chosen. Fails, leaving
            /// `self` untouched, if `X` is not an alternative.
            pub fn assign<X: 'static>(&mut self, value: X) -> Result<()> {
                Self::check_alternative::<X>()?;
                $(
                    let value = match downcast_owned::<$T, X>(value) {
                        Ok(value) => {
                            log::trace!(
                                "union switching {} -> {}",
                                self.type_name(),
                                type_name::<$T>()
                            );
                            *self = Self::$variant(value);
                            return Ok(());
                        }
                        Err(value) => value,
                    };
                )+
                drop(value);
                Err(MemError::NotAnAlternative { ty: type_name::<X>() })
            }
        }
    };
}

define_union! {
    /// One of two alternatives.
    ///
    /// # Example
    ///
    /// ```
    /// use handle_mem::Union2;
    ///
    /// let mut u: Union2<i32, String> = Union2::Second("hello".to_string());
    /// assert!(u.get::<i32>().is_err());
    /// assert_eq!(u.get::<String>().unwrap(), "hello");
    ///
    /// u.assign(7).unwrap();
    /// assert_eq!(u.get::<i32>(), Ok(&7));
    /// ```
    Union2, Visit2 {
        First(A) => first,
        Second(B) => second,
    }
}

define_union! {
    /// One of three alternatives.
    Union3, Visit3 {
        First(A) => first,
        Second(B) => second,
        Third(C) => third,
    }
}

define_union! {
    /// One of four alternatives.
    Union4, Visit4 {
        First(A) => first,
        Second(B) => second,
        Third(C) => third,
        Fourth(D) => fourth,
    }
}

impl<A, B> From<Union2<A, B>> for (Option<A>, Option<B>) {
    /// Spread into a pair with exactly one slot filled.
    fn from(union: Union2<A, B>) -> Self {
        match union {
            Union2::First(a) => (Some(a), None),
            Union2::Second(b) => (None, Some(b)),
        }
    }
}

impl<A, B> TryFrom<(Option<A>, Option<B>)> for Union2<A, B> {
    type Error = MemError;

    /// Collapse a pair with exactly one slot filled.
    fn try_from(pair: (Option<A>, Option<B>)) -> Result<Self> {
        match pair {
            (Some(a), None) => Ok(Union2::First(a)),
            (None, Some(b)) => Ok(Union2::Second(b)),
            (Some(_), Some(_)) => Err(MemError::TypeMismatch {
                expected: "exactly one filled slot",
                found: "two filled slots",
            }),
            (None, None) => Err(MemError::TypeMismatch {
                expected: "exactly one filled slot",
                found: "no filled slot",
            }),
        }
    }
}
