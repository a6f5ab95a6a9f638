//! Error type shared by every handle, view and union in the crate.

use std::fmt;

/// Result alias used throughout `handle-mem`.
pub type Result<T, E = MemError> = std::result::Result<T, E>;

/// A recoverable access failure.
///
/// None of these are fatal: they are reported to the immediate caller,
/// which decides whether to escalate.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemError {
    /// Release or access through an `Exclusive` that owns nothing.
    #[error("handle is empty")]
    EmptyHandle,

    /// Element access past the end of a view.
    #[error("index {index} out of bounds for view of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A view range that does not fit inside its source.
    #[error("range {start}..{start}+{len} exceeds source of length {source_len}")]
    RangeOutOfBounds {
        start: usize,
        len: usize,
        source_len: usize,
    },

    /// The requested alternative is not the active one (or the optional is absent).
    #[error("expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The requested type is not one of the union's alternatives at all.
    #[error("`{ty}` is not an alternative of this union")]
    NotAnAlternative { ty: &'static str },

    /// A thread panicked while holding a `Guarded` lock.
    #[error("lock poisoned by a panicking holder")]
    LockPoisoned,
}

/// Coarse classification of a [`MemError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyHandle,
    Index,
    TypeMismatch,
    Lock,
}

impl MemError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MemError::EmptyHandle => ErrorKind::EmptyHandle,
            MemError::IndexOutOfBounds { .. } | MemError::RangeOutOfBounds { .. } => {
                ErrorKind::Index
            }
            MemError::TypeMismatch { .. } | MemError::NotAnAlternative { .. } => {
                ErrorKind::TypeMismatch
            }
            MemError::LockPoisoned => ErrorKind::Lock,
        }
    }

    pub(crate) fn mismatch<X>(found: &'static str) -> Self {
        MemError::TypeMismatch {
            expected: std::any::type_name::<X>(),
            found,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::EmptyHandle => "empty handle",
            ErrorKind::Index => "index",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::Lock => "lock",
        };
        f.write_str(name)
    }
}
