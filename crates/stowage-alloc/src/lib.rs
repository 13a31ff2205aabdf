//! Raw allocation and uninitialized bulk construction for Stowage containers.
//!
//! This crate is one of four that may contain `unsafe` code (along with
//! `stowage-vector`, `stowage-list` and `stowage-deque`). Every unsafe block carries a
//! `// SAFETY:` comment.
//!
//! # Layers
//!
//! ```text
//! RawAlloc<T>        allocate / deallocate / construct / destroy
//! └── RawBuf<T>      scoped owner of one block, released on every exit path
//! SlotCursor         raw destination positions (pointers, deque segments)
//! └── uninit::*      copy / move / fill into raw slots with rollback
//! ```
//!
//! # Failure model
//!
//! Allocation is the only fallible primitive and returns
//! [`StowError`](stowage_core::StowError). Bulk builders destroy exactly the
//! elements they constructed before reporting a failure, whether the failure
//! is an `Err` from a fallible builder ([`BuildError`](stowage_core::BuildError))
//! or a panic unwinding through a `Clone` impl.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod allocator;
pub mod buffer;
pub mod slot;
pub mod uninit;

pub use allocator::RawAlloc;
pub use buffer::RawBuf;
pub use slot::SlotCursor;
