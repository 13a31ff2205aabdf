//! Segment pointers: positions inside the deque's buffers.
//!
//! A [`SegPtr`] is the 4-tuple `(cur, first, last, node)`: the current
//! slot, the bounds of the buffer it lies in, and the map slot that owns
//! that buffer. All arithmetic is wrapping; the pointers are only
//! dereferenced when the position lies inside a live deque.

#![allow(unsafe_code)]

use std::fmt;
use std::mem;
use std::ptr;

use stowage_alloc::SlotCursor;
use stowage_core::{BidirectionalCursor, Cursor, RandomAccessCursor, RandomAccessTag};

use crate::config::buffer_len;

/// Signed element count from `lo` to `hi`.
#[inline]
fn elems_between<T>(hi: *mut T, lo: *mut T) -> isize {
    let bytes = (hi as usize).wrapping_sub(lo as usize) as isize;
    bytes / mem::size_of::<T>().max(1) as isize
}

/// A position in a segmented buffer sequence.
///
/// Invariant for a position in `[start, finish]` of a deque: `node` is a
/// map slot holding the buffer `[first, last)` and `first <= cur < last`.
pub(crate) struct SegPtr<T, const B: usize> {
    pub cur: *mut T,
    pub first: *mut T,
    pub last: *mut T,
    pub node: *mut *mut T,
}

impl<T, const B: usize> SegPtr<T, B> {
    /// Elements per buffer.
    pub const BUF: usize = buffer_len::<T>(B);

    /// The position of a deque that owns no storage yet.
    pub const fn null() -> Self {
        Self {
            cur: ptr::null_mut(),
            first: ptr::null_mut(),
            last: ptr::null_mut(),
            node: ptr::null_mut(),
        }
    }

    /// Re-anchor on the buffer held by map slot `node`; `cur` is kept.
    ///
    /// # Safety
    ///
    /// `node` must point at an initialized map slot.
    #[inline]
    pub unsafe fn set_node(&mut self, node: *mut *mut T) {
        self.node = node;
        // SAFETY: forwarded to the caller.
        self.first = unsafe { *node };
        self.last = self.first.wrapping_add(Self::BUF);
    }

    /// The position `n` elements away.
    #[inline]
    pub fn at(&self, n: isize) -> Self {
        let mut out = *self;
        out.jump(n);
        out
    }

    /// Elements from `cur` to the end of its buffer.
    #[inline]
    pub fn room_after(&self) -> usize {
        elems_between(self.last, self.cur) as usize
    }

    /// Elements from the start of the buffer to `cur`.
    #[inline]
    pub fn room_before(&self) -> usize {
        elems_between(self.cur, self.first) as usize
    }

    /// Map slots from `origin.node` to `self.node`.
    #[inline]
    pub fn nodes_from(&self, origin: &Self) -> isize {
        elems_between(self.node, origin.node)
    }
}

impl<T, const B: usize> Clone for SegPtr<T, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const B: usize> Copy for SegPtr<T, B> {}

impl<T, const B: usize> PartialEq for SegPtr<T, B> {
    fn eq(&self, other: &Self) -> bool {
        self.cur == other.cur
    }
}

impl<T, const B: usize> Eq for SegPtr<T, B> {}

impl<T, const B: usize> fmt::Debug for SegPtr<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegPtr")
            .field("cur", &self.cur)
            .field("first", &self.first)
            .field("node", &self.node)
            .finish()
    }
}

impl<T, const B: usize> Cursor for SegPtr<T, B> {
    type Category = RandomAccessTag;
    type Value = T;

    #[inline]
    fn step(&mut self) {
        self.cur = self.cur.wrapping_add(1);
        if self.cur == self.last {
            // SAFETY: a full buffer is always followed by an allocated map
            // slot while the position stays within `[start, finish]`.
            unsafe { self.set_node(self.node.wrapping_add(1)) };
            self.cur = self.first;
        }
    }
}

impl<T, const B: usize> BidirectionalCursor for SegPtr<T, B> {
    #[inline]
    fn step_back(&mut self) {
        if self.cur == self.first {
            // SAFETY: stepping back from a buffer start stays at or after
            // `start`, so the previous map slot holds a buffer.
            unsafe { self.set_node(self.node.wrapping_sub(1)) };
            self.cur = self.last;
        }
        self.cur = self.cur.wrapping_sub(1);
    }
}

impl<T, const B: usize> RandomAccessCursor for SegPtr<T, B> {
    fn jump(&mut self, n: isize) {
        let buf = Self::BUF as isize;
        let offset = n + self.room_before() as isize;
        if (0..buf).contains(&offset) {
            self.cur = self.cur.wrapping_offset(n);
        } else {
            let node_offset = offset.div_euclid(buf);
            // SAFETY: the target position lies within `[start, finish]`,
            // whose map slots all hold buffers.
            unsafe { self.set_node(self.node.wrapping_offset(node_offset)) };
            self.cur = self.first.wrapping_offset(offset.rem_euclid(buf));
        }
    }

    fn offset_from(&self, origin: &Self) -> isize {
        let buf = Self::BUF as isize;
        buf * (self.nodes_from(origin) - 1)
            + self.room_before() as isize
            + origin.room_after() as isize
    }
}

// SAFETY: `[cur, last)` is one buffer, contiguous and in address order.
// Going back, `[first, cur)` precedes `cur` in the same buffer; at a buffer
// start the previous buffer is reported whole, matching the contract.
unsafe impl<T, const B: usize> SlotCursor for SegPtr<T, B> {
    #[inline]
    fn slot(&self) -> *mut T {
        self.cur
    }

    #[inline]
    fn run_len(&self) -> usize {
        self.room_after()
    }

    #[inline]
    fn run_len_back(&self) -> usize {
        if self.cur == self.first {
            Self::BUF
        } else {
            self.room_before()
        }
    }
}
