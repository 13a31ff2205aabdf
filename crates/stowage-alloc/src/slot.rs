//! Raw destination positions.

#![allow(unsafe_code)]

use stowage_core::RandomAccessCursor;

/// A random-access cursor over raw element slots.
///
/// Bulk operations write through [`slot`](Self::slot) and use the run
/// lengths to move whole contiguous stretches with one `memmove`. Storage
/// that is contiguous reports unbounded runs; segmented storage reports
/// the distance to the edge of the current segment.
///
/// # Safety
///
/// Implementors promise that, for a cursor at a valid position:
/// - `slot()` points at a properly aligned slot of `Value`;
/// - the `run_len()` slots starting at `slot()` are contiguous in memory
///   and stepping forward through them visits them in address order;
/// - the `run_len_back()` slots ending just before this position are
///   contiguous and immediately precede `slot()` in memory, except that a
///   position at the start of a segment reports the full length of the
///   previous segment (whose slots end at that segment's `last`).
pub unsafe trait SlotCursor: RandomAccessCursor {
    /// Raw pointer to the current slot.
    fn slot(&self) -> *mut Self::Value;

    /// Contiguous slots from the current position onward.
    fn run_len(&self) -> usize;

    /// Contiguous slots immediately before the current position.
    fn run_len_back(&self) -> usize;
}

// SAFETY: a raw pointer addresses one contiguous allocation; runs are
// unbounded and bulk operations never exceed the count they were given.
unsafe impl<T> SlotCursor for *mut T {
    #[inline]
    fn slot(&self) -> *mut T {
        *self
    }

    #[inline]
    fn run_len(&self) -> usize {
        usize::MAX
    }

    #[inline]
    fn run_len_back(&self) -> usize {
        usize::MAX
    }
}

#[inline]
pub(crate) fn forward<C: SlotCursor>(cursor: &mut C, n: usize) {
    cursor.jump(n as isize);
}

#[inline]
pub(crate) fn backward<C: SlotCursor>(cursor: &mut C, n: usize) {
    cursor.jump(-(n as isize));
}
