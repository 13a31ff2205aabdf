//! Reverse-iteration adapter.
//!
//! [`Reverse`] wraps a bidirectional-or-better cursor and walks it
//! backward. Like the classic reverse iterator it stores the position one
//! *past* the element it refers to: `Reverse::new(end)` reads the last
//! element and `Reverse::new(begin)` is the reverse end.

use crate::cursor::{BidirectionalCursor, Cursor, RandomAccessCursor, ReadCursor};

/// A cursor that moves in the opposite direction of its base.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reverse<C> {
    base: C,
}

impl<C> Reverse<C> {
    /// Wrap `base`; the adapter refers to the element before `base`.
    pub fn new(base: C) -> Self {
        Self { base }
    }

    /// The wrapped cursor.
    pub fn base(&self) -> &C {
        &self.base
    }

    /// Unwrap the base cursor.
    pub fn into_base(self) -> C {
        self.base
    }
}

impl<C: BidirectionalCursor> Cursor for Reverse<C> {
    type Category = C::Category;
    type Value = C::Value;

    fn step(&mut self) {
        self.base.step_back();
    }
}

impl<C: BidirectionalCursor> BidirectionalCursor for Reverse<C> {
    fn step_back(&mut self) {
        self.base.step();
    }
}

impl<C: RandomAccessCursor> RandomAccessCursor for Reverse<C> {
    fn jump(&mut self, n: isize) {
        self.base.jump(-n);
    }

    fn offset_from(&self, origin: &Self) -> isize {
        origin.base.offset_from(&self.base)
    }
}

impl<'a, C> ReadCursor<'a> for Reverse<C>
where
    C: BidirectionalCursor + ReadCursor<'a>,
{
    fn get(&self) -> &'a Self::Value {
        let mut before = self.base.clone();
        before.step_back();
        before.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::SliceCursor;
    use crate::ops::{advance, distance};

    #[test]
    fn walks_slice_backwards() {
        let data = [1, 2, 3, 4];
        let mut r = Reverse::new(SliceCursor::end(&data));
        let rend = Reverse::new(SliceCursor::begin(&data));
        let mut seen = Vec::new();
        while r != rend {
            seen.push(*r.get());
            r.step();
        }
        assert_eq!(seen, vec![4, 3, 2, 1]);
    }

    #[test]
    fn reverse_distance_matches_forward() {
        let data = [0u8; 9];
        let rbegin = Reverse::new(SliceCursor::end(&data));
        let rend = Reverse::new(SliceCursor::begin(&data));
        assert_eq!(distance(&rbegin, &rend), 9);

        let mut r = rbegin;
        advance(&mut r, 4);
        assert_eq!(r.base().index(), 5);
    }
}
