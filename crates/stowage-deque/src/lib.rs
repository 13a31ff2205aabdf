//! Segmented double-ended array engine for Stowage.
//!
//! A [`Deque`] keeps its elements in fixed-size buffers. A *map*, itself a
//! contiguous array of buffer pointers, orders the buffers; only the map
//! slots between the first and last buffer in use hold live buffers.
//!
//! ```text
//!   map:   [ ∅ | ∅ | b0 | b1 | b2 | ∅ | ∅ | ∅ ]
//!                    │    │    │
//!   b0:  [ · · s x ] │    │          s = start, f = finish (one past end)
//!   b1:  [ x x x x ] ◄    │
//!   b2:  [ x f · · ] ◄────┘
//! ```
//!
//! Growing at either end fills the free slots of the end buffer, then
//! allocates a new buffer. When the map runs out of slots on one side its
//! live window is recentred, or the map reallocated, without moving any
//! element. Positions are tracked by segment pointers that carry the
//! current slot, the bounds of its buffer and its map slot, so stepping and
//! random jumps are O(1).
//!
//! Buffers emptied by pops are released straight away.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod deque;
pub mod iter;
mod map;
mod seg;
mod traits;

pub use config::{buffer_len, max_size, BUFFER_BYTES, MIN_MAP_SLOTS};
pub use deque::Deque;
pub use iter::{Cursor, IntoIter, Iter, IterMut};
pub use stowage_core::{BuildError, StowError};
