//! Stowage: generic containers built on explicit allocation and iterator
//! categories.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Stowage sub-crates. For most users, adding `stowage` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use stowage::prelude::*;
//!
//! let mut v: Vector<i32> = (1..=4).collect();
//! v.insert(0, 0).unwrap();
//!
//! let mut d: Deque<i32> = Deque::from_range(v.begin(), v.end()).unwrap();
//! d.push_front(-1).unwrap();
//! assert_eq!(d[0], -1);
//! assert_eq!(distance(&d.begin(), &d.end()), 6);
//!
//! let mut l: List<i32> = [5, 3, 3, 1, 4].into_iter().collect();
//! l.sort();
//! l.unique();
//! assert_eq!(l.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4, 5]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`core`] | `stowage-core` | Errors, category tags, cursor traits, range comparison |
//! | [`alloc`] | `stowage-alloc` | Raw allocation and bulk construction into raw slots |
//! | [`vector`] | `stowage-vector` | Contiguous growable array |
//! | [`list`] | `stowage-list` | Sentinel-ring doubly linked list |
//! | [`deque`] | `stowage-deque` | Segmented double-ended array |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Errors, iterator categories and cursor operations (`stowage-core`).
///
/// [`core::distance`] and [`core::advance`] pick their algorithm from the
/// cursor's category tag.
pub use stowage_core as core;

/// Raw allocation and uninitialized bulk operations (`stowage-alloc`).
pub use stowage_alloc as alloc;

/// Contiguous growable array (`stowage-vector`).
pub use stowage_vector as vector;

/// Sentinel-ring doubly linked list (`stowage-list`).
///
/// Elements are addressed by [`list::Pos`] handles that stay valid until
/// the element is removed, even when splicing moves it to another list.
pub use stowage_list as list;

/// Segmented double-ended array (`stowage-deque`).
pub use stowage_deque as deque;

/// Common imports for typical Stowage usage.
///
/// ```rust
/// use stowage::prelude::*;
/// ```
pub mod prelude {
    // Containers
    pub use stowage_deque::Deque;
    pub use stowage_list::{List, Pos};
    pub use stowage_vector::Vector;

    // Cursors
    pub use stowage_core::{
        advance, distance, next, prev, BidirectionalCursor, Cursor, RandomAccessCursor,
        ReadCursor, Reverse,
    };

    // Errors
    pub use stowage_core::{BuildError, StowError};
}
