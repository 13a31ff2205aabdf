//! Sentinel-ring doubly linked list engine for Stowage.
//!
//! [`List<T>`] keeps every element in its own heap node. A payload-free
//! sentinel node closes the ring: its `next`/`prev` links are the first and
//! last elements, so insertion and removal never branch on the list
//! boundaries.
//!
//! ```text
//!        ┌────────────────────────────────────┐
//!        ▼                                    │
//!   [sentinel] ⇄ [a] ⇄ [b] ⇄ [c] ⇄ ───────────┘
//! ```
//!
//! A [`Pos`] is the address of a node. Nodes never move, so a position
//! stays valid until its element is removed, including across splices and
//! merges into another list. Operations taking a `Pos` are `unsafe`; see
//! [position validity](list#position-validity).
//!
//! Every structural mutation is expressed as build chain, unlink, link,
//! adjust length. Sorting, merging and splicing, within a list or between
//! lists, only relink nodes: they never move, clone or allocate a payload,
//! and they cannot fail.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod cursor;
pub mod list;
mod node;
mod ops;
mod traits;

pub use cursor::{Cursor, IntoIter, Iter, IterMut};
pub use list::{List, Pos};
pub use stowage_core::{BuildError, StowError};
