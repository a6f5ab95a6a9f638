//! # Handle-Mem
//!
//! Small generic primitives that make the lifetime and type validity of a
//! value something the compiler (or a cheap runtime check) enforces.
//!
//! ## Features
//!
//! - **Exclusive handles**: one owner, explicit transfer, release exactly once
//! - **Shared handles**: value and count in one allocation, atomic or `Cell` counting via `CountPolicy`
//! - **Bounded views**: borrowed (pointer, length) pairs with checked indexing
//! - **Tagged unions**: closed sum types with checked extraction and exhaustive visitation
//! - **Optional**: value-or-absent with reported, never silent, absent access
//! - **Guarded / SharedCell**: scoped locking and QCell owner-checked mutation for shared values
//!
//! ## Quick Start
//!
//! ```rust
//! use handle_mem::{Exclusive, Shared, View};
//!
//! let mut owner = Exclusive::acquire(vec![0, 1, 2, 3, 4]);
//! let moved = owner.transfer();
//! assert!(owner.is_empty());
//!
//! let shared = moved.into_inner().map(Shared::acquire).unwrap();
//! let view = View::new(shared.as_slice(), 2, 2).unwrap();
//! assert_eq!(view.as_slice(), &[2, 3]);
//! assert!(view.get(2).is_err());
//! ```

mod cell;
mod error;
mod exclusive;
mod guard;
mod optional;
mod policy;
mod shared;
mod tagged;
mod union;
mod view;

pub use cell::{CellOwner, SharedCell};
pub use error::{ErrorKind, MemError, Result};
pub use exclusive::Exclusive;
pub use guard::{Guarded, GuardedRef};
pub use optional::Optional;
pub use policy::{CountPolicy, Counter, DefaultPolicy, SingleThreaded, ThreadSafe};
pub use shared::{ControlBlock, LocalShared, Shared, SharedHandle};
pub use union::{Alternative, Slot, Union2, Union3, Union4, Visit2, Visit3, Visit4};
pub use view::{View, ViewMut};

#[doc(hidden)]
pub use log as __log;
