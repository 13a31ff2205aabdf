//! Canned element sequences and range readers.

use stowage_core::{CursorIter, ReadCursor};

use crate::{DropCounter, MoveOnly, Tracked};

/// `Tracked(i)` for every `i` in `range`.
pub fn tracked_seq(counter: &DropCounter, range: std::ops::Range<usize>) -> Vec<Tracked<usize>> {
    range.map(|i| counter.track(i)).collect()
}

/// `MoveOnly(i)` for every `i` in `range`.
pub fn move_only_seq(
    counter: &DropCounter,
    range: std::ops::Range<usize>,
) -> Vec<MoveOnly<usize>> {
    range.map(|i| counter.move_only(i)).collect()
}

/// Clone the elements of `[first, last)` into a `Vec`.
pub fn collect_range<'a, C>(first: C, last: C) -> Vec<C::Value>
where
    C: ReadCursor<'a>,
    C::Value: Clone,
{
    CursorIter::new(first, last).cloned().collect()
}
