//! Cursors and iterators over a [`Deque`].

#![allow(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use stowage_core::{BidirectionalCursor, RandomAccessCursor, RandomAccessTag, ReadCursor};

use crate::deque::Deque;
use crate::seg::SegPtr;

// ── Cursor ──────────────────────────────────────────────────────

/// Random-access read cursor over a [`Deque`].
///
/// The cursor stores an element index, so it may be moved anywhere,
/// including before the first element; only dereferencing requires a
/// position in `[0, len)`.
pub struct Cursor<'a, T, const B: usize = 0> {
    deque: &'a Deque<T, B>,
    index: isize,
}

impl<'a, T, const B: usize> Cursor<'a, T, B> {
    pub(crate) fn new(deque: &'a Deque<T, B>, index: isize) -> Self {
        Self { deque, index }
    }

    /// Index of the element this cursor refers to.
    pub fn index(&self) -> isize {
        self.index
    }
}

impl<T, const B: usize> Clone for Cursor<'_, T, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const B: usize> Copy for Cursor<'_, T, B> {}

impl<T, const B: usize> PartialEq for Cursor<'_, T, B> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.deque, other.deque) && self.index == other.index
    }
}

impl<T, const B: usize> Eq for Cursor<'_, T, B> {}

impl<T, const B: usize> fmt::Debug for Cursor<'_, T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("index", &self.index).finish()
    }
}

impl<T, const B: usize> stowage_core::Cursor for Cursor<'_, T, B> {
    type Category = RandomAccessTag;
    type Value = T;

    fn step(&mut self) {
        self.index += 1;
    }
}

impl<T, const B: usize> BidirectionalCursor for Cursor<'_, T, B> {
    fn step_back(&mut self) {
        self.index -= 1;
    }
}

impl<T, const B: usize> RandomAccessCursor for Cursor<'_, T, B> {
    fn jump(&mut self, n: isize) {
        self.index += n;
    }

    fn offset_from(&self, origin: &Self) -> isize {
        self.index - origin.index
    }
}

impl<'a, T, const B: usize> ReadCursor<'a> for Cursor<'a, T, B> {
    /// # Panics
    ///
    /// Panics unless the cursor is on an element.
    fn get(&self) -> &'a T {
        usize::try_from(self.index)
            .ok()
            .and_then(|i| self.deque.get(i))
            .unwrap_or_else(|| panic!("deque cursor out of range: {}", self.index))
    }
}

// ── Borrowing iterators ─────────────────────────────────────────

/// Iterator over shared references to a deque's elements.
pub struct Iter<'a, T, const B: usize = 0> {
    front: SegPtr<T, B>,
    back: SegPtr<T, B>,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<T, const B: usize> Iter<'_, T, B> {
    pub(crate) fn new(front: SegPtr<T, B>, back: SegPtr<T, B>, remaining: usize) -> Self {
        Self {
            front,
            back,
            remaining,
            _marker: PhantomData,
        }
    }
}

// SAFETY: behaves like `&T`.
unsafe impl<T: Sync, const B: usize> Send for Iter<'_, T, B> {}
// SAFETY: as above.
unsafe impl<T: Sync, const B: usize> Sync for Iter<'_, T, B> {}

impl<T, const B: usize> Clone for Iter<'_, T, B> {
    fn clone(&self) -> Self {
        Self::new(self.front, self.back, self.remaining)
    }
}

impl<'a, T, const B: usize> Iterator for Iter<'a, T, B> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        // SAFETY: `front` is live for `'a` while elements remain.
        let item = unsafe { &*self.front.cur };
        self.remaining -= 1;
        if self.remaining > 0 {
            stowage_core::Cursor::step(&mut self.front);
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, const B: usize> DoubleEndedIterator for Iter<'a, T, B> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.back.step_back();
        self.remaining -= 1;
        // SAFETY: the slot before the old `back` is live for `'a`.
        Some(unsafe { &*self.back.cur })
    }
}

impl<T, const B: usize> ExactSizeIterator for Iter<'_, T, B> {}

impl<T, const B: usize> FusedIterator for Iter<'_, T, B> {}

impl<T: fmt::Debug, const B: usize> fmt::Debug for Iter<'_, T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Iterator over mutable references to a deque's elements.
pub struct IterMut<'a, T, const B: usize = 0> {
    front: SegPtr<T, B>,
    back: SegPtr<T, B>,
    remaining: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<T, const B: usize> IterMut<'_, T, B> {
    pub(crate) fn new(front: SegPtr<T, B>, back: SegPtr<T, B>, remaining: usize) -> Self {
        Self {
            front,
            back,
            remaining,
            _marker: PhantomData,
        }
    }
}

// SAFETY: behaves like `&mut T`.
unsafe impl<T: Send, const B: usize> Send for IterMut<'_, T, B> {}
// SAFETY: as above.
unsafe impl<T: Sync, const B: usize> Sync for IterMut<'_, T, B> {}

impl<'a, T, const B: usize> Iterator for IterMut<'a, T, B> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        // SAFETY: `front` is live and yielded exactly once.
        let item = unsafe { &mut *self.front.cur };
        self.remaining -= 1;
        if self.remaining > 0 {
            stowage_core::Cursor::step(&mut self.front);
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, const B: usize> DoubleEndedIterator for IterMut<'a, T, B> {
    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        self.back.step_back();
        self.remaining -= 1;
        // SAFETY: the slot before the old `back` is live and yielded once.
        Some(unsafe { &mut *self.back.cur })
    }
}

impl<T, const B: usize> ExactSizeIterator for IterMut<'_, T, B> {}

impl<T, const B: usize> FusedIterator for IterMut<'_, T, B> {}

impl<T, const B: usize> fmt::Debug for IterMut<'_, T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("remaining", &self.remaining)
            .finish()
    }
}

// ── Owning iterator ─────────────────────────────────────────────

/// Owning iterator returned by [`Deque::into_iter`](IntoIterator::into_iter).
///
/// Elements not yet yielded are dropped with the iterator.
pub struct IntoIter<T, const B: usize = 0> {
    deque: Deque<T, B>,
}

impl<T, const B: usize> IntoIter<T, B> {
    pub(crate) fn new(deque: Deque<T, B>) -> Self {
        Self { deque }
    }
}

impl<T, const B: usize> Iterator for IntoIter<T, B> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.deque.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.deque.len();
        (n, Some(n))
    }
}

impl<T, const B: usize> DoubleEndedIterator for IntoIter<T, B> {
    fn next_back(&mut self) -> Option<T> {
        self.deque.pop_back()
    }
}

impl<T, const B: usize> ExactSizeIterator for IntoIter<T, B> {}

impl<T, const B: usize> FusedIterator for IntoIter<T, B> {}

impl<T: fmt::Debug, const B: usize> fmt::Debug for IntoIter<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.deque).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::Deque;
    use stowage_core::{distance, next, prev, CursorIter, ReadCursor};
    use stowage_test_utils::DropCounter;

    #[test]
    fn cursor_reads_by_index() {
        let d: Deque<i32, 4> = (0..10).collect();
        let c = next(d.begin(), 6);
        assert_eq!(*c.get(), 6);
        assert_eq!(*prev(c, 6).get(), 0);
        assert_eq!(distance(&d.begin(), &d.end()), 10);
        assert_eq!(d.end().index(), 10);
    }

    #[test]
    #[should_panic(expected = "deque cursor out of range")]
    fn cursor_at_end_does_not_read() {
        let d: Deque<i32, 4> = (0..3).collect();
        let _ = d.end().get();
    }

    #[test]
    fn reverse_cursors_walk_backwards() {
        let d: Deque<i32, 4> = (0..6).collect();
        let back: Vec<i32> = CursorIter::new(d.rbegin(), d.rend()).copied().collect();
        assert_eq!(back, vec![5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn iter_meets_in_the_middle() {
        let d: Deque<i32, 4> = (0..9).collect();
        let mut it = d.iter();
        assert_eq!(it.len(), 9);
        assert_eq!(it.next(), Some(&0));
        assert_eq!(it.next_back(), Some(&8));
        assert_eq!(it.next_back(), Some(&7));
        let rest: Vec<i32> = it.copied().collect();
        assert_eq!(rest, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(d.iter().rev().copied().collect::<Vec<_>>(), (0..9).rev().collect::<Vec<_>>());
    }

    #[test]
    fn iter_stops_at_a_full_last_buffer() {
        // The last element fills its buffer exactly.
        let d: Deque<i32, 4> = (0..8).collect();
        assert_eq!(d.iter().count(), 8);
        assert_eq!(d.iter().last(), Some(&7));
    }

    #[test]
    fn iter_mut_updates_in_place() {
        let mut d: Deque<i32, 4> = (0..7).collect();
        for x in d.iter_mut() {
            *x *= 10;
        }
        assert_eq!(d.iter_mut().next_back().map(|x| *x), Some(60));
        assert_eq!(d.iter().copied().collect::<Vec<_>>(), vec![0, 10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn into_iter_drops_the_rest() {
        let counter = DropCounter::new();
        let d: Deque<_, 4> = (0..10).map(|i| counter.track(i)).collect();
        let mut it = d.into_iter();
        assert_eq!(it.next().map(|t| *t.value()), Some(0));
        assert_eq!(it.next_back().map(|t| *t.value()), Some(9));
        assert_eq!(it.len(), 8);
        drop(it);
        assert_eq!(counter.live(), 0);
    }
}
