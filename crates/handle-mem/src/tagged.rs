//! Named closed unions.

/// Declare a closed union over named alternative types.
///
/// Besides the enum itself this generates:
///
/// - a `Copy` discriminant enum (`$kind`) returned by `active_type()`;
/// - `From<T>` for each alternative, used by `assign`;
/// - [`Alternative<T>`](crate::Alternative) for each alternative, so `get::<T>()`
///   compiles only for alternative types and fails with `TypeMismatch` when
///   `T` is not the active one;
/// - a visitor trait (`$visitor`) with one required method per alternative,
///   and a closure-based `visit` taking one closure per alternative. Either
///   way, a missing handler is a compile error.
///
/// Each alternative type may appear only once.
///
/// # Example
///
/// ```
/// use handle_mem::tagged_union;
///
/// #[derive(Debug)]
/// pub struct Expression(String);
/// #[derive(Debug)]
/// pub struct Statement(u32);
///
/// tagged_union! {
///     #[derive(Debug)]
///     pub enum Node: NodeKind, NodeVisitor {
///         Expression(Expression) => expression,
///         Statement(Statement) => statement,
///     }
/// }
///
/// let mut node = Node::from(Expression("x + 1".into()));
/// assert_eq!(node.active_type(), NodeKind::Expression);
/// assert!(node.get::<Statement>().is_err());
///
/// node.assign(Statement(3));
/// let label = node.visit(|e| format!("expr {}", e.0), |s| format!("stmt {}", s.0));
/// assert_eq!(label, "stmt 3");
/// ```
///
/// Asking for a type that is not an alternative is rejected:
///
/// ```compile_fail
/// use handle_mem::tagged_union;
///
/// tagged_union! {
///     pub enum Node: NodeKind, NodeVisitor {
///         Text(String) => text,
///         Count(i32) => count,
///     }
/// }
///
/// let node = Node::from(3i32);
/// let _ = node.get::<u8>();
/// ```
///
/// So is a `visit` missing a closure:
///
/// ```compile_fail
/// use handle_mem::tagged_union;
///
/// tagged_union! {
///     pub enum Node: NodeKind, NodeVisitor {
///         Text(String) => text,
///         Count(i32) => count,
///     }
/// }
///
/// let node = Node::from(3i32);
/// let _ = node.visit(|s| s.len());
/// ```
///
/// And a visitor missing a method:
///
/// ```compile_fail
/// use handle_mem::tagged_union;
///
/// tagged_union! {
///     pub enum Node: NodeKind, NodeVisitor {
///         Text(String) => text,
///         Count(i32) => count,
///     }
/// }
///
/// struct TextOnly;
///
/// impl NodeVisitor for TextOnly {
///     type Output = usize;
///     fn text(&mut self, value: &String) -> usize {
///         value.len()
///     }
/// }
///
/// let node = Node::from(3i32);
/// node.accept(&mut TextOnly);
/// ```
#[macro_export]
macro_rules! tagged_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:ident, $visitor:ident {
            $( $(#[$vmeta:meta])* $variant:ident($ty:ty) => $method:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $( $(#[$vmeta])* $variant($ty), )+
        }

        /// Discriminant of the live alternative.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $kind {
            $( $variant, )+
        }

        impl $kind {
            /// Every alternative, in declaration order.
            pub const ALL: &'static [$kind] = &[$( $kind::$variant ),+];

            pub const fn name(self) -> &'static str {
                match self {
                    $( $kind::$variant => stringify!($variant), )+
                }
            }
        }

        impl ::core::fmt::Display for $kind {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.name())
            }
        }

        /// Visitor with one required method per alternative.
        $vis trait $visitor {
            type Output;
            $( fn $method(&mut self, value: &$ty) -> Self::Output; )+
        }

        $(
            impl ::core::convert::From<$ty> for $name {
                #[inline]
                fn from(value: $ty) -> Self {
                    $name::$variant(value)
                }
            }

            impl $crate::Alternative<$ty> for $name {
                #[inline]
                fn alternative(&self) -> ::core::option::Option<&$ty> {
                    match self {
                        $name::$variant(value) => ::core::option::Option::Some(value),
                        #[allow(unreachable_patterns)]
                        _ => ::core::option::Option::None,
                    }
                }

                #[inline]
                fn alternative_mut(&mut self) -> ::core::option::Option<&mut $ty> {
                    match self {
                        $name::$variant(value) => ::core::option::Option::Some(value),
                        #[allow(unreachable_patterns)]
                        _ => ::core::option::Option::None,
                    }
                }

                fn into_alternative(self) -> ::core::result::Result<$ty, Self> {
                    match self {
                        $name::$variant(value) => ::core::result::Result::Ok(value),
                        #[allow(unreachable_patterns)]
                        other => ::core::result::Result::Err(other),
                    }
                }
            }
        )+

        #[allow(dead_code)]
        impl $name {
            /// Which alternative is live.
            #[inline]
            pub fn active_type(&self) -> $kind {
                match self {
                    $( $name::$variant(_) => $kind::$variant, )+
                }
            }

            /// Type name of the live alternative.
            pub fn type_name(&self) -> &'static str {
                match self {
                    $( $name::$variant(_) => ::core::any::type_name::<$ty>(), )+
                }
            }

            /// True if the live alternative is `X`.
            pub fn holds<X>(&self) -> bool
            where
                Self: $crate::Alternative<X>,
            {
                $crate::Alternative::<X>::alternative(self).is_some()
            }

            /// Borrow the live value as `X`.
            pub fn get<X>(&self) -> $crate::Result<&X>
            where
                Self: $crate::Alternative<X>,
            {
                $crate::Alternative::<X>::alternative(self).ok_or_else(|| {
                    $crate::MemError::TypeMismatch {
                        expected: ::core::any::type_name::<X>(),
                        found: self.type_name(),
                    }
                })
            }

            pub fn get_mut<X>(&mut self) -> $crate::Result<&mut X>
            where
                Self: $crate::Alternative<X>,
            {
                let found = self.type_name();
                $crate::Alternative::<X>::alternative_mut(self).ok_or_else(|| {
                    $crate::MemError::TypeMismatch {
                        expected: ::core::any::type_name::<X>(),
                        found,
                    }
                })
            }

            /// Move the live value out as `X`, or hand the union back.
            pub fn into_value<X>(self) -> ::core::result::Result<X, Self>
            where
                Self: $crate::Alternative<X>,
            {
                $crate::Alternative::<X>::into_alternative(self)
            }

            /// Drop the live value and make `value` the active alternative.
            pub fn assign<X>(&mut self, value: X)
            where
                Self: ::core::convert::From<X>,
            {
                let previous = self.type_name();
                *self = <Self as ::core::convert::From<X>>::from(value);
                $crate::__log::trace!(
                    "union switching {} -> {}",
                    previous,
                    self.type_name()
                );
            }

            /// Call exactly the closure matching the live alternative.
            pub fn visit<R>(&self, $( $method: impl FnOnce(&$ty) -> R ),+) -> R {
                match self {
                    $( $name::$variant(value) => $method(value), )+
                }
            }

            /// Dispatch to the visitor method matching the live alternative.
            pub fn accept<V: $visitor>(&self, visitor: &mut V) -> V::Output {
                match self {
                    $( $name::$variant(value) => visitor.$method(value), )+
                }
            }
        }
    };
}
