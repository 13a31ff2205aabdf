//! Error taxonomy and iterator-category model for Stowage containers.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary every container engine speaks:
//!
//! - [`StowError`] / [`BuildError`] — the error taxonomy (allocation
//!   failure, length violation, element-construction failure).
//! - Category tags ([`InputTag`] ⊂ [`ForwardTag`] ⊂ [`BidirectionalTag`] ⊂
//!   [`RandomAccessTag`]) and the [`Category`] dispatch trait.
//! - Cursor capability traits ([`Cursor`], [`BidirectionalCursor`],
//!   [`RandomAccessCursor`], [`ReadCursor`]) with raw pointers treated as
//!   random-access cursors.
//! - Generic traversal utilities ([`distance`], [`advance`]) whose
//!   complexity is fixed by the cursor's tag type.
//! - The [`Reverse`] adapter and range comparison helpers.
//!
//! # Dispatch
//!
//! ```text
//! distance(first, last)
//!   └── <C::Category as Category<C>>::distance
//!         ├── InputTag / ForwardTag / BidirectionalTag → O(n) walk
//!         └── RandomAccessTag                          → O(1) offset_from
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod category;
pub mod compare;
pub mod cursor;
pub mod error;
pub mod ops;
pub mod reverse;

pub use category::{
    BidirectionalTag, Category, CategoryKind, ForwardTag, InputTag, RandomAccessTag, Refines, Tag,
};
pub use compare::CursorIter;
pub use cursor::{
    BidirectionalCursor, CategoryOf, Cursor, Distance, PointerOf, RandomAccessCursor,
    ReadCursor, ReferenceOf, SliceCursor, ValueOf,
};
pub use error::{BuildError, StowError};
pub use ops::{advance, category_of, distance, next, prev};
pub use reverse::Reverse;
