//! Contiguous growable array engine for Stowage.
//!
//! [`Vector<T>`] stores its elements in one [`RawBuf`](stowage_alloc::RawBuf)
//! with the invariant `len <= capacity`: slots `[0, len)` hold live elements
//! and `[len, capacity)` are raw.
//!
//! # Growth
//!
//! When an insertion does not fit, a new buffer of
//! `max(1, 2 * capacity, len + n)` slots (capped at [`max_size`]) is
//! allocated, the new elements are built there first, and only then are
//! the existing elements relocated and the old buffer released. A failing
//! allocation or element build therefore leaves the vector untouched.
//!
//! # Errors
//!
//! Operations that may grow return `Result<_, StowError>`; builders that
//! can fail return `Result<_, BuildError<E>>`. Trait impls that cannot
//! return a `Result` (`Clone`, `FromIterator`, `Extend`) escalate through
//! [`StowError::raise`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod iter;
mod traits;
pub mod vector;

pub use config::{max_size, GROWTH_FACTOR};
pub use iter::IntoIter;
pub use stowage_core::{BuildError, StowError};
pub use vector::Vector;
