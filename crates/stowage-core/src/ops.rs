//! Generic traversal utilities.
//!
//! Each function forwards to the [`Category`] implementation of the
//! cursor's tag type, so the algorithm (walk vs. offset arithmetic) is
//! fixed at compile time.

use crate::category::{Category, CategoryKind, Tag};
use crate::cursor::{BidirectionalCursor, Cursor};

/// Number of positions from `first` to `last`.
///
/// O(1) for random-access cursors, O(n) otherwise. For non-random-access
/// cursors `last` must be reachable from `first`.
pub fn distance<C>(first: &C, last: &C) -> isize
where
    C: Cursor,
    C::Category: Category<C>,
{
    <C::Category as Category<C>>::distance(first, last)
}

/// Move `cursor` by `n` positions.
///
/// Random-access cursors jump directly; other cursors step one position
/// at a time.
///
/// # Panics
///
/// Panics if `n` is negative and the cursor is not bidirectional.
pub fn advance<C>(cursor: &mut C, n: isize)
where
    C: Cursor,
    C::Category: Category<C>,
{
    <C::Category as Category<C>>::advance(cursor, n);
}

/// `cursor` moved forward by `n` positions.
pub fn next<C>(mut cursor: C, n: usize) -> C
where
    C: Cursor,
    C::Category: Category<C>,
{
    advance(&mut cursor, n as isize);
    cursor
}

/// `cursor` moved backward by `n` positions.
pub fn prev<C>(mut cursor: C, n: usize) -> C
where
    C: BidirectionalCursor,
    C::Category: Category<C>,
{
    advance(&mut cursor, -(n as isize));
    cursor
}

/// The runtime category of cursor type `C`.
pub fn category_of<C: Cursor>() -> CategoryKind {
    <C::Category as Tag>::KIND
}
