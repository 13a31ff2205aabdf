//! Element-wise and lexicographic comparison over cursor ranges.
//!
//! Container relational traits (`PartialEq`, `PartialOrd`, `Ord`) are
//! defined through these helpers so every engine compares the same way.

use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::cursor::{BidirectionalCursor, Cursor, ReadCursor};

/// Adapts a `[first, last)` cursor range into an [`Iterator`].
#[derive(Clone, Debug)]
pub struct CursorIter<'a, C> {
    first: C,
    last: C,
    _borrow: PhantomData<fn() -> &'a ()>,
}

impl<C> CursorIter<'_, C> {
    /// Iterate from `first` up to (not including) `last`.
    pub fn new(first: C, last: C) -> Self {
        Self {
            first,
            last,
            _borrow: PhantomData,
        }
    }
}

impl<'a, C: ReadCursor<'a>> Iterator for CursorIter<'a, C> {
    type Item = &'a C::Value;

    fn next(&mut self) -> Option<Self::Item> {
        if self.first == self.last {
            return None;
        }
        let item = self.first.get();
        self.first.step();
        Some(item)
    }
}

impl<'a, C> DoubleEndedIterator for CursorIter<'a, C>
where
    C: ReadCursor<'a> + BidirectionalCursor,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.first == self.last {
            return None;
        }
        self.last.step_back();
        Some(self.last.get())
    }
}

/// `true` if `[first1, last1)` equals the range of the same length at
/// `first2`, element by element.
pub fn equal<'a, 'b, A, B, T>(first1: A, last1: A, first2: B) -> bool
where
    A: ReadCursor<'a, Value = T>,
    B: ReadCursor<'b, Value = T>,
    T: PartialEq + 'a + 'b,
{
    let mut lhs = first1;
    let mut rhs = first2;
    while lhs != last1 {
        if lhs.get() != rhs.get() {
            return false;
        }
        lhs.step();
        rhs.step();
    }
    true
}

/// Lexicographic comparison of two ranges.
pub fn lexicographic_partial_cmp<'a, 'b, A, B, T>(
    first1: A,
    last1: A,
    first2: B,
    last2: B,
) -> Option<Ordering>
where
    A: ReadCursor<'a, Value = T>,
    B: ReadCursor<'b, Value = T>,
    T: PartialOrd + 'a + 'b,
{
    CursorIter::new(first1, last1).partial_cmp(CursorIter::new(first2, last2))
}

/// Total lexicographic comparison of two ranges.
pub fn lexicographic_cmp<'a, 'b, A, B, T>(first1: A, last1: A, first2: B, last2: B) -> Ordering
where
    A: ReadCursor<'a, Value = T>,
    B: ReadCursor<'b, Value = T>,
    T: Ord + 'a + 'b,
{
    let lhs: CursorIter<'a, A> = CursorIter::new(first1, last1);
    let rhs: CursorIter<'b, B> = CursorIter::new(first2, last2);
    lhs.map(|x| x).cmp(rhs.map(|x| x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::SliceCursor;
    use crate::reverse::Reverse;

    fn range<T>(s: &[T]) -> (SliceCursor<'_, T>, SliceCursor<'_, T>) {
        (SliceCursor::begin(s), SliceCursor::end(s))
    }

    #[test]
    fn equal_ranges() {
        let a = [1, 2, 3];
        let b = [1, 2, 3, 4];
        let (f, l) = range(&a);
        assert!(equal(f, l, SliceCursor::begin(&b)));
        let c = [1, 9, 3];
        assert!(!equal(f, l, SliceCursor::begin(&c)));
    }

    #[test]
    fn lexicographic_ordering() {
        let a = [1, 2, 3];
        let b = [1, 2, 4];
        let prefix = [1, 2];
        let (af, al) = range(&a);
        let (bf, bl) = range(&b);
        let (pf, pl) = range(&prefix);
        assert_eq!(lexicographic_cmp(af, al, bf, bl), Ordering::Less);
        assert_eq!(lexicographic_cmp(pf, pl, af, al), Ordering::Less);
        assert_eq!(lexicographic_cmp(af, al, af, al), Ordering::Equal);
    }

    #[test]
    fn partial_cmp_handles_nan() {
        let a = [1.0, f64::NAN];
        let b = [1.0, 2.0];
        let (af, al) = range(&a);
        let (bf, bl) = range(&b);
        assert_eq!(lexicographic_partial_cmp(af, al, bf, bl), None);
    }

    #[test]
    fn cursor_iter_is_double_ended() {
        let a = [1, 2, 3, 4];
        let (f, l) = range(&a);
        let back: Vec<_> = CursorIter::new(f, l).rev().copied().collect();
        assert_eq!(back, vec![4, 3, 2, 1]);

        let rev: Vec<_> = CursorIter::new(Reverse::new(l), Reverse::new(f))
            .copied()
            .collect();
        assert_eq!(rev, back);
    }
}
