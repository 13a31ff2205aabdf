//! Bulk construction into raw slots.
//!
//! Every builder here either constructs all `n` target elements or, when an
//! element build fails, destroys exactly the elements it constructed (in
//! forward order) and leaves the target raw again. Failures reported by
//! `Err` surface as [`BuildError::Element`]; panics unwind through an
//! internal guard that performs the same rollback.
//!
//! Relocation (`relocate`, `relocate_backward`, `uninit_move`) is a bitwise
//! move in contiguous runs and cannot fail.

#![allow(unsafe_code)]

use std::mem;
use std::ptr;

use stowage_core::{BuildError, ReadCursor};

use crate::slot::{backward, forward, SlotCursor};

/// Destroys the elements constructed so far if dropped before `finish`.
struct InitGuard<D: SlotCursor> {
    start: D,
    count: usize,
}

impl<D: SlotCursor> InitGuard<D> {
    fn new(start: D) -> Self {
        Self { start, count: 0 }
    }

    fn finish(self) -> usize {
        let count = self.count;
        mem::forget(self);
        count
    }
}

impl<D: SlotCursor> Drop for InitGuard<D> {
    fn drop(&mut self) {
        // SAFETY: exactly `count` elements were constructed from `start`.
        unsafe { destroy_n(self.start.clone(), self.count) };
    }
}

/// Destroy `n` live elements starting at `first`, run by run.
///
/// # Safety
///
/// The `n` slots from `first` must hold live elements that are not used
/// afterwards.
pub unsafe fn destroy_n<D: SlotCursor>(first: D, n: usize) {
    if !mem::needs_drop::<D::Value>() {
        return;
    }
    let mut cur = first;
    let mut left = n;
    while left > 0 {
        let run = left.min(cur.run_len());
        debug_assert!(run > 0, "slot cursor reported an empty run");
        // SAFETY: `run` contiguous live slots start at `cur.slot()`.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(cur.slot(), run)) };
        left -= run;
        forward(&mut cur, run);
    }
}

/// Clone `[first, last)` into raw slots starting at `dst`.
///
/// Returns the position one past the last constructed element. If a
/// `clone` panics the elements cloned so far are destroyed.
///
/// # Safety
///
/// `dst` must address at least `distance(first, last)` raw slots that do
/// not overlap the source.
pub unsafe fn uninit_copy<'a, S, D>(first: S, last: S, dst: D) -> D
where
    S: ReadCursor<'a, Value = D::Value>,
    D: SlotCursor,
    D::Value: Clone,
{
    let mut guard = InitGuard::new(dst.clone());
    let mut src = first;
    let mut out = dst;
    while src != last {
        let value = src.get().clone();
        // SAFETY: `out` is within the raw destination range.
        unsafe { out.slot().write(value) };
        guard.count += 1;
        src.step();
        out.step();
    }
    guard.finish();
    out
}

/// Copy a slice of trivially copyable elements into raw slots.
///
/// Copies whole destination runs with `memcpy`.
///
/// # Safety
///
/// `dst` must address at least `src.len()` raw slots that do not overlap
/// `src`.
pub unsafe fn uninit_copy_trivial<D>(src: &[D::Value], dst: D) -> D
where
    D: SlotCursor,
    D::Value: Copy,
{
    let mut out = dst;
    let mut from = src.as_ptr();
    let mut left = src.len();
    while left > 0 {
        let run = left.min(out.run_len());
        debug_assert!(run > 0, "slot cursor reported an empty run");
        // SAFETY: `run` readable elements at `from`, `run` writable
        // contiguous slots at `out`, disjoint per the caller.
        unsafe {
            ptr::copy_nonoverlapping(from, out.slot(), run);
            from = from.add(run);
        }
        left -= run;
        forward(&mut out, run);
    }
    out
}

/// Move `n` elements from `src` into raw slots at `dst`.
///
/// The source slots are raw afterwards. Returns the destination end.
///
/// # Safety
///
/// `src` must address `n` live elements and `dst` `n` raw slots. The
/// ranges may overlap only if `dst` precedes `src` (see [`relocate`]).
pub unsafe fn uninit_move<S, D>(src: S, n: usize, dst: D) -> D
where
    S: SlotCursor,
    D: SlotCursor<Value = S::Value>,
{
    // SAFETY: forwarded to the caller.
    unsafe { relocate(src, n, dst) }
}

/// Move `n` elements starting at `first` to start at `dst`, front to back.
///
/// Overlap is allowed when `dst` is at or before `first` in sequence
/// order. Returns the destination end.
///
/// # Safety
///
/// `[first, first + n)` must be live and `[dst, dst + n)` writable; after
/// the call the source slots not covered by the destination are raw.
pub unsafe fn relocate<S, D>(first: S, n: usize, dst: D) -> D
where
    S: SlotCursor,
    D: SlotCursor<Value = S::Value>,
{
    let mut src = first;
    let mut out = dst;
    let mut left = n;
    while left > 0 {
        let run = left.min(src.run_len()).min(out.run_len());
        debug_assert!(run > 0, "slot cursor reported an empty run");
        // SAFETY: both runs are contiguous; `ptr::copy` tolerates overlap
        // inside a run, and earlier runs never clobber unread source slots
        // because the destination trails the source.
        unsafe { ptr::copy(src.slot(), out.slot(), run) };
        left -= run;
        forward(&mut src, run);
        forward(&mut out, run);
    }
    out
}

/// Move the `n` elements ending just before `last` so that they end just
/// before `dst_last`, back to front.
///
/// Overlap is allowed when `dst_last` is at or after `last`. Returns the
/// destination start.
///
/// # Safety
///
/// `[last - n, last)` must be live and `[dst_last - n, dst_last)`
/// writable.
pub unsafe fn relocate_backward<S, D>(last: S, n: usize, dst_last: D) -> D
where
    S: SlotCursor,
    D: SlotCursor<Value = S::Value>,
{
    let mut src = last;
    let mut out = dst_last;
    let mut left = n;
    while left > 0 {
        let run = left.min(src.run_len_back()).min(out.run_len_back());
        debug_assert!(run > 0, "slot cursor reported an empty run");
        backward(&mut src, run);
        backward(&mut out, run);
        // SAFETY: mirror image of `relocate`; the destination leads the
        // source so later (lower) runs are still intact.
        unsafe { ptr::copy(src.slot(), out.slot(), run) };
        left -= run;
    }
    out
}

/// Clone `value` into `n` raw slots starting at `dst`.
///
/// # Safety
///
/// `dst` must address at least `n` raw slots.
pub unsafe fn uninit_fill<D>(dst: D, n: usize, value: &D::Value) -> D
where
    D: SlotCursor,
    D::Value: Clone,
{
    // SAFETY: forwarded to the caller.
    unsafe { uninit_fill_with(dst, n, || value.clone()) }
}

/// Build `n` elements from `f` into raw slots starting at `dst`.
///
/// # Safety
///
/// `dst` must address at least `n` raw slots.
pub unsafe fn uninit_fill_with<D, F>(dst: D, n: usize, mut f: F) -> D
where
    D: SlotCursor,
    F: FnMut() -> D::Value,
{
    let mut guard = InitGuard::new(dst.clone());
    let mut out = dst;
    while guard.count < n {
        let value = f();
        // SAFETY: `out` is within the raw destination range.
        unsafe { out.slot().write(value) };
        guard.count += 1;
        out.step();
    }
    guard.finish();
    out
}

/// Build `n` elements from a fallible builder into raw slots.
///
/// `f` receives the index of the element being built. On the first `Err`
/// the elements built so far are destroyed and the error is returned with
/// that count.
///
/// # Safety
///
/// `dst` must address at least `n` raw slots.
pub unsafe fn try_uninit_fill_with<D, E, F>(
    dst: D,
    n: usize,
    mut f: F,
) -> Result<D, BuildError<E>>
where
    D: SlotCursor,
    F: FnMut(usize) -> Result<D::Value, E>,
{
    let mut guard = InitGuard::new(dst.clone());
    let mut out = dst;
    while guard.count < n {
        match f(guard.count) {
            Ok(value) => {
                // SAFETY: `out` is within the raw destination range.
                unsafe { out.slot().write(value) };
                guard.count += 1;
                out.step();
            }
            Err(source) => {
                let constructed = guard.count;
                drop(guard);
                return Err(BuildError::Element {
                    constructed,
                    source,
                });
            }
        }
    }
    guard.finish();
    Ok(out)
}

/// Write items from `iter` into raw slots until it is exhausted or `limit`
/// slots are filled.
///
/// Returns the destination end and the number of elements written.
///
/// # Safety
///
/// `dst` must address at least `limit` raw slots.
pub unsafe fn uninit_extend<D, I>(dst: D, limit: usize, iter: I) -> (D, usize)
where
    D: SlotCursor,
    I: IntoIterator<Item = D::Value>,
{
    let mut guard = InitGuard::new(dst.clone());
    let mut out = dst;
    let mut iter = iter.into_iter();
    while guard.count < limit {
        let Some(value) = iter.next() else { break };
        // SAFETY: `out` is within the raw destination range.
        unsafe { out.slot().write(value) };
        guard.count += 1;
        out.step();
    }
    let written = guard.finish();
    (out, written)
}
