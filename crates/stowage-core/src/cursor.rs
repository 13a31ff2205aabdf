//! Cursor capability traits and the trait-extraction aliases.
//!
//! A cursor is a position in some sequence. The capability traits mirror
//! the category tags: [`Cursor`] (step forward), [`BidirectionalCursor`]
//! (step back), [`RandomAccessCursor`] (jump and subtract). Reading is a
//! separate capability ([`ReadCursor`]) because positions inside raw
//! storage cannot be dereferenced safely.
//!
//! Raw pointers `*const T` and `*mut T` are random-access cursors.

use std::fmt;
use std::mem;

use crate::category::{RandomAccessTag, Tag};

/// A position that can step forward.
pub trait Cursor: Clone + PartialEq {
    /// The category tag; the weakest one that is still correct.
    type Category: Tag;
    /// The element type this cursor walks over.
    type Value;

    /// Move to the next position.
    fn step(&mut self);
}

/// A cursor that can also step backward.
pub trait BidirectionalCursor: Cursor {
    /// Move to the previous position.
    fn step_back(&mut self);
}

/// A cursor with constant-time jumps and differences.
pub trait RandomAccessCursor: BidirectionalCursor {
    /// Move by `n` positions (negative moves backward).
    fn jump(&mut self, n: isize);

    /// Signed number of positions from `origin` to `self`.
    fn offset_from(&self, origin: &Self) -> isize;
}

/// A cursor whose current element can be borrowed for `'a`.
pub trait ReadCursor<'a>: Cursor<Value: 'a> {
    /// The element at the current position.
    ///
    /// # Panics
    ///
    /// May panic when the cursor sits at an end position.
    fn get(&self) -> &'a Self::Value;
}

/// Category tag of cursor `C`.
pub type CategoryOf<C> = <C as Cursor>::Category;

/// Element type of cursor `C`.
pub type ValueOf<C> = <C as Cursor>::Value;

/// Pointer type of cursor `C`.
pub type PointerOf<C> = *const <C as Cursor>::Value;

/// Reference type of cursor `C` for lifetime `'a`.
pub type ReferenceOf<'a, C> = &'a <C as Cursor>::Value;

/// Distance type shared by every cursor.
pub type Distance = isize;

fn pointer_offset<T>(to: usize, from: usize) -> isize {
    let size = mem::size_of::<T>();
    if size == 0 {
        return 0;
    }
    (to.wrapping_sub(from) as isize) / size as isize
}

impl<T> Cursor for *const T {
    type Category = RandomAccessTag;
    type Value = T;

    fn step(&mut self) {
        *self = self.wrapping_add(1);
    }
}

impl<T> BidirectionalCursor for *const T {
    fn step_back(&mut self) {
        *self = self.wrapping_sub(1);
    }
}

impl<T> RandomAccessCursor for *const T {
    fn jump(&mut self, n: isize) {
        *self = self.wrapping_offset(n);
    }

    fn offset_from(&self, origin: &Self) -> isize {
        pointer_offset::<T>(*self as usize, *origin as usize)
    }
}

impl<T> Cursor for *mut T {
    type Category = RandomAccessTag;
    type Value = T;

    fn step(&mut self) {
        *self = self.wrapping_add(1);
    }
}

impl<T> BidirectionalCursor for *mut T {
    fn step_back(&mut self) {
        *self = self.wrapping_sub(1);
    }
}

impl<T> RandomAccessCursor for *mut T {
    fn jump(&mut self, n: isize) {
        *self = self.wrapping_offset(n);
    }

    fn offset_from(&self, origin: &Self) -> isize {
        pointer_offset::<T>(*self as usize, *origin as usize)
    }
}

/// Random-access read cursor over contiguous storage.
///
/// Used by [`Vector`](https://docs.rs/stowage-vector) for `begin`/`end` and
/// by every engine to build from slices.
pub struct SliceCursor<'a, T> {
    slice: &'a [T],
    index: usize,
}

impl<'a, T> SliceCursor<'a, T> {
    /// Cursor at `index` within `slice` (`index == slice.len()` is the end).
    pub fn new(slice: &'a [T], index: usize) -> Self {
        debug_assert!(index <= slice.len());
        Self { slice, index }
    }

    /// Cursor at the first element.
    pub fn begin(slice: &'a [T]) -> Self {
        Self::new(slice, 0)
    }

    /// Cursor one past the last element.
    pub fn end(slice: &'a [T]) -> Self {
        Self::new(slice, slice.len())
    }

    /// Current index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The underlying slice.
    pub fn slice(&self) -> &'a [T] {
        self.slice
    }
}

impl<T> Clone for SliceCursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SliceCursor<'_, T> {}

impl<T> PartialEq for SliceCursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.slice.as_ptr(), other.slice.as_ptr()) && self.index == other.index
    }
}

impl<T> Eq for SliceCursor<'_, T> {}

impl<T> fmt::Debug for SliceCursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceCursor")
            .field("index", &self.index)
            .field("len", &self.slice.len())
            .finish()
    }
}

impl<T> Cursor for SliceCursor<'_, T> {
    type Category = RandomAccessTag;
    type Value = T;

    fn step(&mut self) {
        self.index += 1;
    }
}

impl<T> BidirectionalCursor for SliceCursor<'_, T> {
    fn step_back(&mut self) {
        self.index -= 1;
    }
}

impl<T> RandomAccessCursor for SliceCursor<'_, T> {
    fn jump(&mut self, n: isize) {
        self.index = self.index.wrapping_add_signed(n);
    }

    fn offset_from(&self, origin: &Self) -> isize {
        self.index as isize - origin.index as isize
    }
}

impl<'a, T> ReadCursor<'a> for SliceCursor<'a, T> {
    fn get(&self) -> &'a T {
        &self.slice[self.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{advance, distance};

    #[test]
    fn raw_pointers_are_random_access() {
        let data = [1u64, 2, 3, 4, 5];
        let first: *const u64 = data.as_ptr();
        let last = first.wrapping_add(data.len());
        assert_eq!(distance(&first, &last), 5);

        let mut mid = first;
        advance(&mut mid, 3);
        assert_eq!(RandomAccessCursor::offset_from(&mid, &first), 3);
        assert_eq!(RandomAccessCursor::offset_from(&first, &mid), -3);
    }

    #[test]
    fn zero_sized_pointer_offsets_are_zero() {
        let data = [(), (), ()];
        let first: *const () = data.as_ptr();
        let mut last = first;
        last.jump(3);
        assert_eq!(RandomAccessCursor::offset_from(&last, &first), 0);
    }

    #[test]
    fn slice_cursor_reads_and_jumps() {
        let data = [10, 20, 30, 40];
        let mut c = SliceCursor::begin(&data);
        assert_eq!(*c.get(), 10);
        c.jump(2);
        assert_eq!(*c.get(), 30);
        c.step_back();
        assert_eq!(*c.get(), 20);
        assert_eq!(distance(&c, &SliceCursor::end(&data)), 3);
    }

    #[test]
    fn slice_cursors_over_different_slices_differ() {
        let a = [1, 2];
        let b = [1, 2];
        assert_ne!(SliceCursor::begin(&a), SliceCursor::begin(&b));
        assert_eq!(SliceCursor::begin(&a), SliceCursor::new(&a, 0));
    }
}
