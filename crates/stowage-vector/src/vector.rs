//! The [`Vector`] container.

#![allow(unsafe_code)]

use std::convert::Infallible;
use std::mem;
use std::ops::{Deref, DerefMut, Range};
use std::ptr;
use std::slice;

use log::debug;
use stowage_alloc::uninit::{
    try_uninit_fill_with, uninit_copy, uninit_copy_trivial, uninit_extend, uninit_fill,
    uninit_fill_with, uninit_move,
};
use stowage_alloc::{RawAlloc, RawBuf};
use stowage_core::{
    distance, BuildError, Category, ReadCursor, Reverse, SliceCursor, StowError,
};

use crate::config;

/// A contiguous growable array.
///
/// Elements live in `[0, len)` of a single owned buffer. Cursors
/// ([`begin`](Self::begin)/[`end`](Self::end)) are [`SliceCursor`]s and
/// borrow the vector, so any reallocation is ruled out while one is alive.
pub struct Vector<T> {
    buf: RawBuf<T>,
    len: usize,
}

/// Collapse the error of an infallible build into its storage part.
fn storage_only(err: BuildError<Infallible>) -> StowError {
    match err {
        BuildError::Storage(err) => err,
        BuildError::Element { source, .. } => match source {},
    }
}

/// Closes an insertion gap if the element build fails or panics.
///
/// While the gap is open the tail `[index, index + tail)` has been moved to
/// `[index + n, index + n + tail)` and the vector's length is `index`.
struct GapGuard<'a, T> {
    gap: *mut T,
    n: usize,
    tail: usize,
    len: &'a mut usize,
    index: usize,
}

impl<T> GapGuard<'_, T> {
    fn commit(self) {
        *self.len = self.index + self.n + self.tail;
        mem::forget(self);
    }
}

impl<T> Drop for GapGuard<'_, T> {
    fn drop(&mut self) {
        // SAFETY: the gap slots are raw again (the builder rolled back), and
        // the tail sits `n` slots to the right of the gap.
        unsafe { ptr::copy(self.gap.add(self.n), self.gap, self.tail) };
        *self.len = self.index + self.tail;
    }
}

impl<T> Vector<T> {
    // ── Construction ────────────────────────────────────────────

    /// An empty vector. Does not allocate.
    pub const fn new() -> Self {
        Self {
            buf: RawBuf::empty(),
            len: 0,
        }
    }

    /// An empty vector with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Result<Self, StowError> {
        StowError::check_len(capacity, config::max_size::<T>())?;
        Ok(Self {
            buf: RawBuf::allocate(capacity)?,
            len: 0,
        })
    }

    /// `n` clones of `value`.
    pub fn from_elem(n: usize, value: &T) -> Result<Self, StowError>
    where
        T: Clone,
    {
        let mut v = Self::with_capacity(n)?;
        // SAFETY: `n` raw slots were just allocated.
        unsafe { uninit_fill(v.buf.ptr(), n, value) };
        v.len = n;
        Ok(v)
    }

    /// `n` default-constructed elements.
    pub fn with_len(n: usize) -> Result<Self, StowError>
    where
        T: Default,
    {
        let mut v = Self::with_capacity(n)?;
        // SAFETY: `n` raw slots were just allocated.
        unsafe { uninit_fill_with(v.buf.ptr(), n, T::default) };
        v.len = n;
        Ok(v)
    }

    /// `n` elements built by `f(index)`, stopping at the first error.
    ///
    /// On failure every element already built is dropped and the storage
    /// released.
    pub fn try_from_fn<E, F>(n: usize, f: F) -> Result<Self, BuildError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        let mut v = Self::with_capacity(n)?;
        // SAFETY: `n` raw slots were just allocated.
        unsafe { try_uninit_fill_with(v.buf.ptr(), n, f)? };
        v.len = n;
        Ok(v)
    }

    /// Clones of every element of `src`.
    pub fn from_slice(src: &[T]) -> Result<Self, StowError>
    where
        T: Clone,
    {
        Self::from_range(SliceCursor::begin(src), SliceCursor::end(src))
    }

    /// Bitwise copies of every element of `src`.
    ///
    /// The `Copy` counterpart of [`from_slice`](Self::from_slice): the
    /// elements are copied with one `memcpy`.
    pub fn from_copy_slice(src: &[T]) -> Result<Self, StowError>
    where
        T: Copy,
    {
        let mut v = Self::with_capacity(src.len())?;
        // SAFETY: `src.len()` raw slots were just allocated.
        unsafe { uninit_copy_trivial(src, v.buf.ptr()) };
        v.len = src.len();
        Ok(v)
    }

    /// Clones of the elements in the cursor range `[first, last)`.
    ///
    /// The range is measured once with [`distance`] so storage is
    /// allocated up front.
    pub fn from_range<'a, C>(first: C, last: C) -> Result<Self, StowError>
    where
        C: ReadCursor<'a, Value = T>,
        C::Category: Category<C>,
        T: Clone + 'a,
    {
        let n = usize::try_from(distance(&first, &last)).unwrap_or(0);
        let mut v = Self::with_capacity(n)?;
        // SAFETY: `n` raw slots were just allocated; the range holds `n`
        // elements.
        unsafe { uninit_copy(first, last, v.buf.ptr()) };
        v.len = n;
        Ok(v)
    }

    // ── Iteration ───────────────────────────────────────────────

    /// Cursor at the first element.
    pub fn begin(&self) -> SliceCursor<'_, T> {
        SliceCursor::begin(self.as_slice())
    }

    /// Cursor one past the last element.
    pub fn end(&self) -> SliceCursor<'_, T> {
        SliceCursor::end(self.as_slice())
    }

    /// Reverse cursor at the last element.
    pub fn rbegin(&self) -> Reverse<SliceCursor<'_, T>> {
        Reverse::new(self.end())
    }

    /// Reverse cursor one before the first element.
    pub fn rend(&self) -> Reverse<SliceCursor<'_, T>> {
        Reverse::new(self.begin())
    }

    /// Iterator over shared references.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterator over mutable references.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// The live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` is initialized and the pointer is non-null and
        // aligned (dangling only when `len == 0` or `T` is zero-sized).
        unsafe { slice::from_raw_parts(self.buf.ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, with unique access through `&mut self`.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }

    /// Raw pointer to the start of storage.
    pub fn as_ptr(&self) -> *const T {
        self.buf.ptr()
    }

    /// Mutable raw pointer to the start of storage.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr()
    }

    // ── Capacity ────────────────────────────────────────────────

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if there are no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest element count this vector can hold.
    pub fn max_size(&self) -> usize {
        config::max_size::<T>()
    }

    /// Number of slots in the current buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Ensure room for at least `capacity` elements in total.
    ///
    /// Allocates exactly `capacity` slots when growing. A no-op if the
    /// current buffer is already large enough.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), StowError> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        StowError::check_len(capacity, self.max_size())?;
        self.reallocate(capacity)
    }

    /// Ensure room for `additional` more elements, growing geometrically.
    pub(crate) fn grow_for(&mut self, additional: usize) -> Result<(), StowError> {
        if self.capacity() - self.len >= additional {
            return Ok(());
        }
        let capacity =
            config::grown_capacity(self.len, self.capacity(), additional, self.max_size())?;
        self.reallocate(capacity)
    }

    /// Shrink the buffer to exactly `len` slots.
    pub fn shrink_to_fit(&mut self) -> Result<(), StowError> {
        if self.capacity() == self.len || RawAlloc::<T>::IS_ZST {
            return Ok(());
        }
        if self.len == 0 {
            self.buf = RawBuf::empty();
            return Ok(());
        }
        self.reallocate(self.len)
    }

    /// Move every element into a fresh buffer of `capacity` slots.
    fn reallocate(&mut self, capacity: usize) -> Result<(), StowError> {
        debug_assert!(capacity >= self.len);
        let fresh = RawBuf::allocate(capacity)?;
        debug!(
            "vector<{}> reallocating {} -> {} slots",
            std::any::type_name::<T>(),
            self.capacity(),
            capacity
        );
        // SAFETY: `[0, len)` is live in the old buffer and `fresh` has at
        // least `len` raw slots; the blocks are distinct.
        unsafe { uninit_move(self.buf.ptr(), self.len, fresh.ptr()) };
        // The old block now holds only raw slots; dropping it just frees it.
        self.buf = fresh;
        Ok(())
    }

    // ── Access ──────────────────────────────────────────────────

    /// The first element.
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// The first element, mutably.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// The last element.
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// The last element, mutably.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// The element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index < len()`.
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        // SAFETY: in bounds per the caller.
        unsafe { &*self.buf.ptr().add(index) }
    }

    /// The element at `index` mutably, without bounds checking.
    ///
    /// # Safety
    ///
    /// `index < len()`.
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        // SAFETY: in bounds per the caller.
        unsafe { &mut *self.buf.ptr().add(index) }
    }

    // ── Insertion ───────────────────────────────────────────────

    /// Open `n` raw slots at `index` and fill them with `build`.
    ///
    /// `build` receives a pointer to the first raw slot and must either
    /// construct all `n` elements or leave every slot raw. If the current
    /// buffer has room the tail is shifted right in place (and shifted back
    /// on failure). Otherwise the elements are built in a new buffer first
    /// and the existing elements relocated around them afterwards, so a
    /// failure leaves the vector exactly as it was.
    fn splice_in<E, F>(&mut self, index: usize, n: usize, build: F) -> Result<(), BuildError<E>>
    where
        F: FnOnce(*mut T) -> Result<(), BuildError<E>>,
    {
        assert!(
            index <= self.len,
            "insertion index {index} out of bounds (len {})",
            self.len
        );
        if n == 0 {
            return Ok(());
        }

        if self.capacity() - self.len >= n {
            let tail = self.len - index;
            let base = self.buf.ptr();
            // SAFETY: `index + n + tail <= capacity`; the tail is moved right
            // by `n` and the guard restores it if `build` fails.
            let gap = unsafe {
                let gap = base.add(index);
                ptr::copy(gap, gap.add(n), tail);
                gap
            };
            self.len = index;
            let guard = GapGuard {
                gap,
                n,
                tail,
                len: &mut self.len,
                index,
            };
            build(gap)?;
            guard.commit();
            return Ok(());
        }

        let capacity =
            config::grown_capacity(self.len, self.capacity(), n, self.max_size())?;
        let fresh = RawBuf::<T>::allocate(capacity)?;
        // SAFETY: `index + n <= capacity`.
        build(unsafe { fresh.slot(index) })?;
        debug!(
            "vector<{}> reallocating {} -> {} slots",
            std::any::type_name::<T>(),
            self.capacity(),
            capacity
        );
        // SAFETY: the prefix and suffix are live in the old buffer and land
        // around the `n` freshly built elements in the new one.
        unsafe {
            uninit_move(self.buf.ptr(), index, fresh.ptr());
            uninit_move(
                self.buf.slot(index),
                self.len - index,
                fresh.slot(index + n),
            );
        }
        self.buf = fresh;
        self.len += n;
        Ok(())
    }

    /// Append `value`.
    ///
    /// On failure `value` is dropped and the vector is unchanged.
    pub fn push_back(&mut self, value: T) -> Result<(), StowError> {
        if self.len < self.capacity() {
            // SAFETY: slot `len` is raw and within capacity.
            unsafe { RawAlloc::construct(self.buf.slot(self.len), value) };
            self.len += 1;
            return Ok(());
        }
        self.insert(self.len, value)
    }

    /// Append an element built by `f`.
    ///
    /// If `f` fails (or growth fails) the vector is unchanged, capacity
    /// included.
    pub fn try_emplace_back<E, F>(&mut self, f: F) -> Result<&mut T, BuildError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.try_emplace(self.len, f)
    }

    /// Insert an element built by `f` at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn try_emplace<E, F>(&mut self, index: usize, f: F) -> Result<&mut T, BuildError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.splice_in(index, 1, |slot| {
            let value = f().map_err(|source| BuildError::Element {
                constructed: 0,
                source,
            })?;
            // SAFETY: `slot` is the raw slot opened for this element.
            unsafe { RawAlloc::construct(slot, value) };
            Ok(())
        })?;
        Ok(&mut self.as_mut_slice()[index])
    }

    /// Insert `value` at `index`, shifting later elements right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), StowError> {
        self.splice_in(index, 1, |slot| {
            // SAFETY: `slot` is the raw slot opened for this element.
            unsafe { RawAlloc::construct(slot, value) };
            Ok(())
        })
        .map_err(storage_only)
    }

    /// Insert `n` clones of `value` at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert_n(&mut self, index: usize, n: usize, value: &T) -> Result<(), StowError>
    where
        T: Clone,
    {
        self.splice_in(index, n, |slot| {
            // SAFETY: `n` raw slots start at `slot`.
            unsafe { uninit_fill(slot, n, value) };
            Ok(())
        })
        .map_err(storage_only)
    }

    /// Insert clones of `src` at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert_slice(&mut self, index: usize, src: &[T]) -> Result<(), StowError>
    where
        T: Clone,
    {
        self.splice_in(index, src.len(), |slot| {
            // SAFETY: `src.len()` raw slots start at `slot`; `src` cannot
            // alias them because `self` is borrowed mutably.
            unsafe { uninit_copy(SliceCursor::begin(src), SliceCursor::end(src), slot) };
            Ok(())
        })
        .map_err(storage_only)
    }

    /// Insert bitwise copies of `src` at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert_copy_slice(&mut self, index: usize, src: &[T]) -> Result<(), StowError>
    where
        T: Copy,
    {
        self.splice_in(index, src.len(), |slot| {
            // SAFETY: `src.len()` raw slots start at `slot`, disjoint from
            // `src` because `self` is borrowed mutably.
            unsafe { uninit_copy_trivial(src, slot) };
            Ok(())
        })
        .map_err(storage_only)
    }

    /// Insert every item of `iter` at `index`, in order.
    ///
    /// Items are written straight into spare capacity, a batch at a time,
    /// and then rotated into place. If growth fails the appended items are
    /// dropped and the elements are unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert_iter<I>(&mut self, index: usize, iter: I) -> Result<(), StowError>
    where
        I: IntoIterator<Item = T>,
    {
        assert!(
            index <= self.len,
            "insertion index {index} out of bounds (len {})",
            self.len
        );
        let old_len = self.len;
        let mut iter = iter.into_iter();
        self.grow_for(iter.size_hint().0)?;
        loop {
            let spare = self.capacity() - self.len;
            if spare > 0 {
                // SAFETY: the `spare` slots past `len` are raw.
                let (_, written) =
                    unsafe { uninit_extend(self.buf.slot(self.len), spare, iter.by_ref()) };
                self.len += written;
                if written < spare {
                    break;
                }
            }
            let Some(value) = iter.next() else { break };
            if let Err(err) = self.push_back(value) {
                self.truncate(old_len);
                return Err(err);
            }
        }
        let added = self.len - old_len;
        self.as_mut_slice()[index..].rotate_right(added);
        Ok(())
    }

    // ── Removal ─────────────────────────────────────────────────

    /// Remove and return the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was live and is now outside the live range.
        Some(unsafe { self.buf.slot(self.len).read() })
    }

    /// Remove and return the element at `index`, shifting the tail left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn erase(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "erase index {index} out of bounds (len {})",
            self.len
        );
        // SAFETY: `index` is live; the tail is moved left over it and the
        // vacated last slot leaves the live range.
        unsafe {
            let slot = self.buf.slot(index);
            let value = slot.read();
            ptr::copy(slot.add(1), slot, self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Drop the elements in `range`, shifting the tail left.
    ///
    /// If an element destructor panics, the elements after `range` are
    /// leaked rather than double-dropped.
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or extends past `len()`.
    pub fn erase_range(&mut self, range: Range<usize>) {
        let Range { start, end } = range;
        assert!(
            start <= end && end <= self.len,
            "erase range {start}..{end} out of bounds (len {})",
            self.len
        );
        let tail = self.len - end;
        self.len = start;
        // SAFETY: `[start, end)` is live and was cut from the live range
        // above; the tail is then moved down over the dropped slots.
        unsafe {
            RawAlloc::destroy_range(self.buf.slot(start), end - start);
            ptr::copy(self.buf.slot(end), self.buf.slot(start), tail);
        }
        self.len = start + tail;
    }

    /// Drop every element. Capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drop the elements past `len`. A no-op if `len >= self.len()`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let dropped = self.len - len;
        self.len = len;
        // SAFETY: `[len, len + dropped)` was live and is now outside the
        // live range.
        unsafe { RawAlloc::destroy_range(self.buf.slot(len), dropped) };
    }

    // ── Bulk replacement ────────────────────────────────────────

    /// Grow with clones of `value`, or truncate, to exactly `n` elements.
    pub fn resize(&mut self, n: usize, value: &T) -> Result<(), StowError>
    where
        T: Clone,
    {
        if n <= self.len {
            self.truncate(n);
            return Ok(());
        }
        self.insert_n(self.len, n - self.len, value)
    }

    /// Grow with elements built by `f`, or truncate, to exactly `n`.
    pub fn resize_with<F>(&mut self, n: usize, f: F) -> Result<(), StowError>
    where
        F: FnMut() -> T,
    {
        if n <= self.len {
            self.truncate(n);
            return Ok(());
        }
        let extra = n - self.len;
        self.splice_in(self.len, extra, |slot| {
            // SAFETY: `extra` raw slots start at `slot`.
            unsafe { uninit_fill_with(slot, extra, f) };
            Ok(())
        })
        .map_err(storage_only)
    }

    /// Replace the contents with `n` clones of `value`.
    ///
    /// The current buffer is reused when it is large enough.
    pub fn assign(&mut self, n: usize, value: &T) -> Result<(), StowError>
    where
        T: Clone,
    {
        if n > self.capacity() {
            *self = Self::from_elem(n, value)?;
            return Ok(());
        }
        self.clear();
        self.insert_n(0, n, value)
    }

    /// Replace the contents with clones of `src`.
    pub fn assign_slice(&mut self, src: &[T]) -> Result<(), StowError>
    where
        T: Clone,
    {
        if src.len() > self.capacity() {
            *self = Self::from_slice(src)?;
            return Ok(());
        }
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

    /// Exchange contents (and buffers) with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Take the buffer out, leaving `self` empty.
    pub(crate) fn take_parts(&mut self) -> (RawBuf<T>, usize) {
        let len = mem::replace(&mut self.len, 0);
        (mem::take(&mut self.buf), len)
    }
}

impl<T> Drop for Vector<T> {
    fn drop(&mut self) {
        // SAFETY: `[0, len)` is live; the buffer itself is released by
        // `RawBuf::drop` afterwards.
        unsafe { RawAlloc::destroy_range(self.buf.ptr(), self.len) };
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for Vector<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for Vector<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}
