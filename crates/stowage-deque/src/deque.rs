//! The [`Deque`] container.

#![allow(unsafe_code)]

use std::convert::Infallible;
use std::marker::PhantomData;
use std::mem;
use std::ops::Range;

use stowage_alloc::uninit::{
    destroy_n, relocate, relocate_backward, try_uninit_fill_with, uninit_copy,
    uninit_copy_trivial, uninit_fill, uninit_fill_with,
};
use stowage_alloc::{RawAlloc, RawBuf};
use stowage_core::{
    distance, BuildError, Category, RandomAccessCursor, ReadCursor, Reverse, SliceCursor,
    StowError,
};

use crate::config;
use crate::iter::{Cursor, Iter, IterMut};
use crate::seg::SegPtr;

/// A double-ended array stored in fixed-size buffers.
///
/// `B` fixes the number of elements per buffer; `0` selects
/// [`buffer_len`](crate::config::buffer_len)'s default of about 512 bytes
/// per buffer. Pushing at either end never moves existing elements, and
/// indexing is O(1). Zero-sized element types are rejected at compile time.
pub struct Deque<T, const B: usize = 0> {
    pub(crate) map: RawBuf<*mut T>,
    pub(crate) start: SegPtr<T, B>,
    pub(crate) finish: SegPtr<T, B>,
    _owns: PhantomData<T>,
}

// SAFETY: the deque exclusively owns its map, buffers and elements.
unsafe impl<T: Send, const B: usize> Send for Deque<T, B> {}

// SAFETY: shared access only hands out `&T`.
unsafe impl<T: Sync, const B: usize> Sync for Deque<T, B> {}

fn storage_only(err: BuildError<Infallible>) -> StowError {
    match err {
        BuildError::Storage(err) => err,
        BuildError::Element { source, .. } => match source {},
    }
}

enum Side {
    Front,
    Back,
}

/// Closes an insertion gap if the element build fails or panics.
///
/// `moved` elements were shifted away from the gap towards `side`, and the
/// deque's end on that side was moved by `n`.
struct GapGuard<'a, T, const B: usize> {
    deque: &'a mut Deque<T, B>,
    gap: SegPtr<T, B>,
    n: usize,
    moved: usize,
    side: Side,
}

impl<T, const B: usize> GapGuard<'_, T, B> {
    fn commit(self) {
        mem::forget(self);
    }
}

impl<T, const B: usize> Drop for GapGuard<'_, T, B> {
    fn drop(&mut self) {
        let n = self.n as isize;
        // SAFETY: the gap slots are raw again (the builder rolled back), and
        // the moved elements sit right next to the gap on `side`.
        unsafe {
            match self.side {
                Side::Front => {
                    relocate_backward(self.gap, self.moved, self.gap.at(n));
                    self.deque.start = self.deque.start.at(n);
                }
                Side::Back => {
                    relocate(self.gap.at(n), self.moved, self.gap);
                    self.deque.finish = self.deque.finish.at(-n);
                }
            }
        }
        self.deque.release_spare_buffers();
    }
}

/// Closes the hole left by erased elements, also when a destructor
/// panics. The shorter side moves.
struct HoleGuard<'a, T, const B: usize> {
    deque: &'a mut Deque<T, B>,
    hole: SegPtr<T, B>,
    n: usize,
    before: usize,
    after: usize,
}

impl<T, const B: usize> Drop for HoleGuard<'_, T, B> {
    fn drop(&mut self) {
        let n = self.n as isize;
        if self.before < self.after {
            // SAFETY: `[start, hole)` is live and the `n` slots after it are
            // raw.
            unsafe { relocate_backward(self.hole, self.before, self.hole.at(n)) };
            self.deque.forget_front(self.n);
        } else {
            // SAFETY: `[hole + n, finish)` is live and the hole is raw.
            unsafe { relocate(self.hole.at(n), self.after, self.hole) };
            self.deque.forget_back(self.n);
        }
    }
}

impl<T, const B: usize> Deque<T, B> {
    const NOT_ZST: () = assert!(
        mem::size_of::<T>() != 0,
        "Deque does not support zero-sized element types"
    );

    // ── Construction ────────────────────────────────────────────

    /// An empty deque. Does not allocate.
    pub const fn new() -> Self {
        let () = Self::NOT_ZST;
        Self {
            map: RawBuf::empty(),
            start: SegPtr::null(),
            finish: SegPtr::null(),
            _owns: PhantomData,
        }
    }

    /// `n` elements written by `fill` into freshly created storage.
    ///
    /// `fill` either constructs all `n` elements or rolls back its own work;
    /// the storage is released on failure.
    fn build<E, F>(n: usize, fill: F) -> Result<Self, BuildError<E>>
    where
        F: FnOnce(SegPtr<T, B>) -> Result<(), BuildError<E>>,
    {
        StowError::check_len(n, config::max_size::<T>())?;
        let mut d = Self::new();
        if n == 0 {
            return Ok(d);
        }
        d.create_map_and_nodes(n)?;
        let end = d.finish;
        // Nothing is live until the fill completes.
        d.finish = d.start;
        fill(d.start)?;
        d.finish = end;
        Ok(d)
    }

    /// `n` clones of `value`.
    pub fn from_elem(n: usize, value: &T) -> Result<Self, StowError>
    where
        T: Clone,
    {
        Self::build(n, |at| {
            // SAFETY: `n` raw slots start at `at`.
            unsafe { uninit_fill(at, n, value) };
            Ok(())
        })
        .map_err(storage_only)
    }

    /// `n` default-constructed elements.
    pub fn with_len(n: usize) -> Result<Self, StowError>
    where
        T: Default,
    {
        Self::build(n, |at| {
            // SAFETY: `n` raw slots start at `at`.
            unsafe { uninit_fill_with(at, n, T::default) };
            Ok(())
        })
        .map_err(storage_only)
    }

    /// `n` elements built by `f(index)`, stopping at the first error.
    ///
    /// On failure the elements already built are dropped, in order, and
    /// all storage is released.
    pub fn try_from_fn<E, F>(n: usize, f: F) -> Result<Self, BuildError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        // SAFETY: `n` raw slots start at `at`.
        Self::build(n, |at| unsafe { try_uninit_fill_with(at, n, f) }.map(|_| ()))
    }

    /// Clones of every element of `src`.
    pub fn from_slice(src: &[T]) -> Result<Self, StowError>
    where
        T: Clone,
    {
        Self::build(src.len(), |at| {
            // SAFETY: `src.len()` raw slots start at `at`.
            unsafe { uninit_copy(SliceCursor::begin(src), SliceCursor::end(src), at) };
            Ok(())
        })
        .map_err(storage_only)
    }

    /// Bitwise copies of every element of `src`, one `memcpy` per buffer.
    pub fn from_copy_slice(src: &[T]) -> Result<Self, StowError>
    where
        T: Copy,
    {
        Self::build(src.len(), |at| {
            // SAFETY: `src.len()` raw slots start at `at`.
            unsafe { uninit_copy_trivial(src, at) };
            Ok(())
        })
        .map_err(storage_only)
    }

    /// Clones of the elements in the cursor range `[first, last)`.
    pub fn from_range<'a, C>(first: C, last: C) -> Result<Self, StowError>
    where
        C: ReadCursor<'a, Value = T>,
        C::Category: Category<C>,
        T: Clone + 'a,
    {
        let n = usize::try_from(distance(&first, &last)).unwrap_or(0);
        Self::build(n, |at| {
            // SAFETY: `n` raw slots start at `at`; the range holds `n`
            // elements.
            unsafe { uninit_copy(first, last, at) };
            Ok(())
        })
        .map_err(storage_only)
    }

    // ── Iteration ───────────────────────────────────────────────

    /// Cursor at the first element.
    pub fn begin(&self) -> Cursor<'_, T, B> {
        Cursor::new(self, 0)
    }

    /// Cursor one past the last element.
    pub fn end(&self) -> Cursor<'_, T, B> {
        Cursor::new(self, self.len() as isize)
    }

    /// Reverse cursor at the last element.
    pub fn rbegin(&self) -> Reverse<Cursor<'_, T, B>> {
        Reverse::new(self.end())
    }

    /// Reverse cursor one before the first element.
    pub fn rend(&self) -> Reverse<Cursor<'_, T, B>> {
        Reverse::new(self.begin())
    }

    /// Iterator over shared references, front to back.
    pub fn iter(&self) -> Iter<'_, T, B> {
        Iter::new(self.start, self.finish, self.len())
    }

    /// Iterator over mutable references, front to back.
    pub fn iter_mut(&mut self) -> IterMut<'_, T, B> {
        IterMut::new(self.start, self.finish, self.len())
    }

    // ── Capacity and access ─────────────────────────────────────

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        if self.is_empty() {
            // Also covers the storage-less deque, whose positions are null.
            return 0;
        }
        self.finish.offset_from(&self.start) as usize
    }

    /// `true` if the deque holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.finish
    }

    /// Largest element count a deque of `T` can hold.
    pub fn max_size(&self) -> usize {
        config::max_size::<T>()
    }

    /// The element at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        // SAFETY: `index < len`, so the position is live.
        Some(unsafe { &*self.start.at(index as isize).cur })
    }

    /// The element at `index`, mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }
        // SAFETY: as in `get`; `&mut self` makes the borrow unique.
        Some(unsafe { &mut *self.start.at(index as isize).cur })
    }

    /// The first element.
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// The first element, mutably.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// The last element.
    pub fn back(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// The last element, mutably.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let last = self.len().checked_sub(1)?;
        self.get_mut(last)
    }

    // ── Insertion ───────────────────────────────────────────────

    /// Append `value`.
    ///
    /// Existing elements never move. On failure `value` is dropped and the
    /// deque is unchanged.
    pub fn push_back(&mut self, value: T) -> Result<(), StowError> {
        StowError::grown_len(self.len(), 1, self.max_size())?;
        let end = self.reserve_elements_at_back(1)?;
        // SAFETY: `finish` is a raw slot inside an allocated buffer.
        unsafe { RawAlloc::construct(self.finish.cur, value) };
        self.finish = end;
        Ok(())
    }

    /// Prepend `value`.
    pub fn push_front(&mut self, value: T) -> Result<(), StowError> {
        StowError::grown_len(self.len(), 1, self.max_size())?;
        let new_start = self.reserve_elements_at_front(1)?;
        // SAFETY: the slot before `start` is raw and its buffer allocated.
        unsafe { RawAlloc::construct(new_start.cur, value) };
        self.start = new_start;
        Ok(())
    }

    /// Append an element built by `f`.
    ///
    /// The element is built before any storage is touched, so a failure of
    /// `f` leaves the deque unchanged.
    pub fn try_emplace_back<E, F>(&mut self, f: F) -> Result<&mut T, BuildError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let value = f().map_err(|source| BuildError::Element {
            constructed: 0,
            source,
        })?;
        self.push_back(value)?;
        // SAFETY: the element just pushed is live.
        Ok(unsafe { &mut *self.finish.at(-1).cur })
    }

    /// Prepend an element built by `f`.
    pub fn try_emplace_front<E, F>(&mut self, f: F) -> Result<&mut T, BuildError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let value = f().map_err(|source| BuildError::Element {
            constructed: 0,
            source,
        })?;
        self.push_front(value)?;
        // SAFETY: the element just pushed is live.
        Ok(unsafe { &mut *self.start.cur })
    }

    /// Open a gap of `n` raw slots at `index` and let `build` fill it.
    ///
    /// Elements on the shorter side of `index` are shifted away from it.
    /// If `build` fails or panics the shift is undone and any buffer
    /// reserved for the gap is released.
    fn splice_in<E, F>(&mut self, index: usize, n: usize, build: F) -> Result<(), BuildError<E>>
    where
        F: FnOnce(SegPtr<T, B>) -> Result<(), BuildError<E>>,
    {
        let len = self.len();
        assert!(
            index <= len,
            "insertion index {index} out of bounds (len {len})"
        );
        if n == 0 {
            return Ok(());
        }
        StowError::grown_len(len, n, self.max_size())?;

        if index < len / 2 {
            let new_start = self.reserve_elements_at_front(n)?;
            // SAFETY: the `n` slots before `start` are raw; the prefix
            // moves towards lower positions.
            unsafe { relocate(self.start, index, new_start) };
            self.start = new_start;
            let gap = new_start.at(index as isize);
            let guard = GapGuard {
                deque: self,
                gap,
                n,
                moved: index,
                side: Side::Front,
            };
            build(gap)?;
            guard.commit();
        } else {
            let new_finish = self.reserve_elements_at_back(n)?;
            let gap = self.start.at(index as isize);
            let tail = len - index;
            // SAFETY: the `n` slots from `finish` are raw; the tail moves
            // towards higher positions.
            unsafe { relocate_backward(self.finish, tail, new_finish) };
            self.finish = new_finish;
            let guard = GapGuard {
                deque: self,
                gap,
                n,
                moved: tail,
                side: Side::Back,
            };
            build(gap)?;
            guard.commit();
        }
        Ok(())
    }

    /// Insert `value` before position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), StowError> {
        self.splice_in(index, 1, |gap| {
            // SAFETY: the gap is one raw slot.
            unsafe { RawAlloc::construct(gap.cur, value) };
            Ok(())
        })
        .map_err(storage_only)
    }

    /// Insert `n` clones of `value` before position `index`.
    ///
    /// If a clone panics the deque is left as it was.
    pub fn insert_n(&mut self, index: usize, n: usize, value: &T) -> Result<(), StowError>
    where
        T: Clone,
    {
        self.splice_in(index, n, |gap| {
            // SAFETY: the gap is `n` raw slots.
            unsafe { uninit_fill(gap, n, value) };
            Ok(())
        })
        .map_err(storage_only)
    }

    /// Insert clones of `src` before position `index`.
    pub fn insert_slice(&mut self, index: usize, src: &[T]) -> Result<(), StowError>
    where
        T: Clone,
    {
        self.splice_in(index, src.len(), |gap| {
            // SAFETY: the gap is `src.len()` raw slots.
            unsafe { uninit_copy(SliceCursor::begin(src), SliceCursor::end(src), gap) };
            Ok(())
        })
        .map_err(storage_only)
    }

    /// Insert bitwise copies of `src` before position `index`.
    pub fn insert_copy_slice(&mut self, index: usize, src: &[T]) -> Result<(), StowError>
    where
        T: Copy,
    {
        self.splice_in(index, src.len(), |gap| {
            // SAFETY: the gap is `src.len()` raw slots.
            unsafe { uninit_copy_trivial(src, gap) };
            Ok(())
        })
        .map_err(storage_only)
    }

    // ── Removal ─────────────────────────────────────────────────

    /// Remove and return the first element.
    ///
    /// A buffer is released as soon as its last element is popped.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: `start` is live; forgetting it makes the slot raw.
        let value = unsafe { self.start.cur.read() };
        self.forget_front(1);
        Some(value)
    }

    /// Remove and return the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the slot before `finish` is live; forgetting it makes it
        // raw.
        let value = unsafe { self.finish.at(-1).cur.read() };
        self.forget_back(1);
        Some(value)
    }

    /// Remove and return the element at `index`.
    ///
    /// The shorter side is shifted to close the hole.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn erase(&mut self, index: usize) -> T {
        let len = self.len();
        assert!(
            index < len,
            "erase index {index} out of range for deque of length {len}"
        );
        let pos = self.start.at(index as isize);
        // SAFETY: `pos` is live; the relocation below overwrites or
        // forgets its slot.
        let value = unsafe { pos.cur.read() };
        if index < len / 2 {
            // SAFETY: `[start, pos)` is live and `pos` is now raw.
            unsafe { relocate_backward(pos, index, pos.at(1)) };
            self.forget_front(1);
        } else {
            // SAFETY: `(pos, finish)` is live and `pos` is now raw.
            unsafe { relocate(pos.at(1), len - index - 1, pos) };
            self.forget_back(1);
        }
        value
    }

    /// Remove the elements in `range`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn erase_range(&mut self, range: Range<usize>) {
        let len = self.len();
        assert!(
            range.start <= range.end && range.end <= len,
            "erase range {range:?} out of range for deque of length {len}"
        );
        let n = range.end - range.start;
        if n == 0 {
            return;
        }
        let hole = self.start.at(range.start as isize);
        let guard = HoleGuard {
            deque: self,
            hole,
            n,
            before: range.start,
            after: len - range.end,
        };
        // SAFETY: the `n` elements from `hole` are live and are not touched
        // again; the guard closes the hole even if a destructor panics.
        unsafe { destroy_n(hole, n) };
        drop(guard);
    }

    /// Drop every element.
    ///
    /// The buffer `start` points into is kept; all others are released.
    pub fn clear(&mut self) {
        self.erase_range(0..self.len());
    }

    /// Drop elements from the back until at most `len` remain.
    pub fn truncate(&mut self, len: usize) {
        let cur = self.len();
        if len < cur {
            self.erase_range(len..cur);
        }
    }

    // ── Bulk replacement ────────────────────────────────────────

    /// Grow with clones of `value`, or shrink, to exactly `n` elements.
    pub fn resize(&mut self, n: usize, value: &T) -> Result<(), StowError>
    where
        T: Clone,
    {
        self.resize_with(n, || value.clone())
    }

    /// Grow with elements built by `f`, or shrink, to exactly `n`.
    pub fn resize_with<F>(&mut self, n: usize, f: F) -> Result<(), StowError>
    where
        F: FnMut() -> T,
    {
        let len = self.len();
        if n <= len {
            self.truncate(n);
            return Ok(());
        }
        let extra = n - len;
        StowError::grown_len(len, extra, self.max_size())?;
        let end = self.reserve_elements_at_back(extra)?;
        // SAFETY: `extra` raw slots start at `finish`.
        unsafe { uninit_fill_with(self.finish, extra, f) };
        self.finish = end;
        Ok(())
    }

    /// Replace the contents with `n` clones of `value`.
    pub fn assign(&mut self, n: usize, value: &T) -> Result<(), StowError>
    where
        T: Clone,
    {
        self.clear();
        self.resize(n, value)
    }

    /// Replace the contents with clones of `src`.
    pub fn assign_slice(&mut self, src: &[T]) -> Result<(), StowError>
    where
        T: Clone,
    {
        self.clear();
        self.insert_slice(0, src)
    }

    /// Replace the contents with the items of `iter`.
    pub fn assign_iter<I>(&mut self, iter: I) -> Result<(), StowError>
    where
        I: IntoIterator<Item = T>,
    {
        self.clear();
        for value in iter {
            self.push_back(value)?;
        }
        Ok(())
    }

    /// Exchange contents with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<T, const B: usize> Drop for Deque<T, B> {
    fn drop(&mut self) {
        /// Releases the buffers even if an element destructor panics.
        struct Buffers<'a, T, const B: usize>(&'a mut Deque<T, B>);

        impl<T, const B: usize> Drop for Buffers<'_, T, B> {
            fn drop(&mut self) {
                self.0.release_all_buffers();
            }
        }

        if self.map_len() == 0 {
            return;
        }
        let (start, len) = (self.start, self.len());
        let _buffers = Buffers(self);
        // SAFETY: `[start, finish)` is live and never used again.
        unsafe { destroy_n(start, len) };
    }
}

impl<T, const B: usize> Default for Deque<T, B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use stowage_test_utils::{BuildFailed, DropCounter, FailAfter, Fuse};

    fn contents<const B: usize>(d: &Deque<i32, B>) -> Vec<i32> {
        d.iter().copied().collect()
    }

    #[test]
    fn alternating_pushes_cross_buffers() {
        let mut d: Deque<i32, 4> = Deque::new();
        for i in 0..10 {
            if i % 2 == 0 {
                d.push_back(i).unwrap();
            } else {
                d.push_front(i).unwrap();
            }
        }
        assert_eq!(contents(&d), vec![9, 7, 5, 3, 1, 0, 2, 4, 6, 8]);
        assert_eq!(d.len(), 10);
        assert_eq!(d.front(), Some(&9));
        assert_eq!(d.back(), Some(&8));
        assert_eq!(d.get(5), Some(&0));
        assert_eq!(d.get(10), None);
    }

    #[test]
    fn insert_shifts_the_shorter_side() {
        let mut d: Deque<i32, 4> = (0..10).collect();
        d.insert(2, 100).unwrap();
        d.insert(9, 200).unwrap();
        assert_eq!(contents(&d), vec![0, 1, 100, 2, 3, 4, 5, 6, 7, 200, 8, 9]);
        d.insert_n(1, 5, &-1).unwrap();
        d.insert_slice(d.len(), &[50, 51]).unwrap();
        assert_eq!(
            contents(&d),
            vec![0, -1, -1, -1, -1, -1, 1, 100, 2, 3, 4, 5, 6, 7, 200, 8, 9, 50, 51]
        );
    }

    #[test]
    fn insert_into_empty_and_at_ends() {
        let mut d: Deque<i32, 4> = Deque::new();
        d.insert(0, 2).unwrap();
        d.insert(0, 1).unwrap();
        d.insert(2, 3).unwrap();
        d.insert_n(0, 0, &9).unwrap();
        assert_eq!(contents(&d), vec![1, 2, 3]);
    }

    #[test]
    fn erase_closes_the_hole() {
        let mut d: Deque<i32, 4> = (0..12).collect();
        assert_eq!(d.erase(1), 1);
        assert_eq!(d.erase(9), 10);
        assert_eq!(contents(&d), vec![0, 2, 3, 4, 5, 6, 7, 8, 9, 11]);
        d.erase_range(2..7);
        assert_eq!(contents(&d), vec![0, 2, 8, 9, 11]);
        d.erase_range(0..1);
        d.erase_range(3..4);
        assert_eq!(contents(&d), vec![2, 8, 9]);
    }

    #[test]
    fn clear_is_idempotent_and_keeps_one_buffer() {
        let counter = DropCounter::new();
        let mut d: Deque<_, 4> = (0..20).map(|i| counter.track(i)).collect();
        d.clear();
        assert_eq!(counter.live(), 0);
        assert!(d.is_empty());
        assert_eq!(d.buffer_count(), 1);
        d.clear();
        assert!(d.is_empty());
        d.push_back(counter.track(1)).unwrap();
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn failing_builder_rolls_back_construction() {
        let counter = DropCounter::new();
        let err = Deque::<_, 4>::try_from_fn(5, FailAfter::new(2).builder(&counter)).unwrap_err();
        assert_eq!(err.constructed(), 2);
        assert_eq!(err.into_source(), Some(BuildFailed { after: 2 }));
        assert_eq!(counter.created(), 2);
        assert_eq!(counter.drops(), 2);

        let d = Deque::<_, 4>::try_from_fn(5, FailAfter::new(5).builder(&counter)).unwrap();
        assert_eq!(d.iter().map(|t| *t.value()).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn panicking_clone_leaves_deque_unchanged() {
        let counter = DropCounter::new();
        let fuse = Fuse::new(0);
        let mut d: Deque<_, 4> = (0..10).map(|i| counter.bomb(i, &fuse)).collect();
        let buffers = d.buffer_count();
        let bomb = counter.bomb(99, &fuse);

        for index in [1, 8] {
            fuse.reset(3);
            let result = catch_unwind(AssertUnwindSafe(|| d.insert_n(index, 6, &bomb)));
            assert!(result.is_err());
            assert_eq!(d.len(), 10);
            assert_eq!(
                d.iter().map(|b| *b.value()).collect::<Vec<_>>(),
                (0..10).collect::<Vec<_>>()
            );
            assert_eq!(d.buffer_count(), buffers);
        }
        drop(d);
        drop(bomb);
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn failed_emplace_leaves_deque_unchanged() {
        let counter = DropCounter::new();
        let mut d: Deque<_, 4> = Deque::new();
        d.push_back(counter.track(0usize)).unwrap();
        let mut fail = FailAfter::new(0);
        assert!(d.try_emplace_front(|| fail.build(&counter, 1usize)).is_err());
        assert_eq!(d.len(), 1);
        let front = d
            .try_emplace_front(|| Ok::<_, BuildFailed>(counter.track(7usize)))
            .unwrap();
        assert_eq!(*front.value(), 7);
        let back = d
            .try_emplace_back(|| Ok::<_, BuildFailed>(counter.track(8usize)))
            .unwrap();
        assert_eq!(*back.value(), 8);
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn resize_and_assign() {
        let mut d: Deque<i32, 4> = Deque::with_len(3).unwrap();
        d.resize(9, &5).unwrap();
        assert_eq!(contents(&d), vec![0, 0, 0, 5, 5, 5, 5, 5, 5]);
        d.resize(2, &0).unwrap();
        assert_eq!(contents(&d), vec![0, 0]);
        d.assign(3, &7).unwrap();
        assert_eq!(contents(&d), vec![7, 7, 7]);
        d.assign_slice(&[1, 2]).unwrap();
        assert_eq!(contents(&d), vec![1, 2]);
        d.assign_iter(10..15).unwrap();
        assert_eq!(contents(&d), vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn pops_drain_both_ends() {
        let mut d: Deque<i32, 4> = (0..9).collect();
        assert_eq!(d.pop_front(), Some(0));
        assert_eq!(d.pop_back(), Some(8));
        let mut rest = Vec::new();
        while let Some(x) = d.pop_front() {
            rest.push(x);
        }
        assert_eq!(rest, (1..8).collect::<Vec<_>>());
        assert_eq!(d.pop_back(), None);
    }

    #[test]
    fn drop_releases_every_element() {
        let counter = DropCounter::new();
        {
            let mut d: Deque<_, 4> = Deque::new();
            for i in 0..25 {
                d.push_front(counter.track(i)).unwrap();
            }
            d.erase(12);
        }
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn copy_slices_fill_across_buffers() {
        let mut d: Deque<u8, 4> = Deque::from_copy_slice(&[0, 1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(d.buffer_count(), 2);
        d.insert_copy_slice(1, &[10, 11, 12, 13, 14]).unwrap();
        d.insert_copy_slice(d.len(), &[20]).unwrap();
        assert_eq!(
            d.iter().copied().collect::<Vec<_>>(),
            vec![0, 10, 11, 12, 13, 14, 1, 2, 3, 4, 5, 6, 20]
        );
        assert!(Deque::<u8, 4>::from_copy_slice(&[]).unwrap().is_empty());
    }

    #[test]
    fn panicking_element_drop_still_drops_the_rest() {
        struct Loud(bool);

        impl Drop for Loud {
            fn drop(&mut self) {
                if self.0 {
                    panic!("element destructor failed");
                }
            }
        }

        let counter = DropCounter::new();
        let mut d: Deque<_, 4> = Deque::new();
        for i in 0..6 {
            d.push_back((Loud(i == 5), counter.track(i))).unwrap();
        }
        assert!(catch_unwind(AssertUnwindSafe(|| drop(d))).is_err());
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn default_buffer_length_is_used() {
        let mut d: Deque<u64> = Deque::new();
        for i in 0..200 {
            d.push_back(i).unwrap();
        }
        assert_eq!(d.buffer_count(), 200 / 64 + 1);
        assert_eq!(d[150], 150);
    }
}
