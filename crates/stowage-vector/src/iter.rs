//! Owning iteration.

#![allow(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;
use std::slice;

use stowage_alloc::{RawAlloc, RawBuf};

use crate::vector::Vector;

/// Owning iterator returned by [`Vector::into_iter`](IntoIterator::into_iter).
///
/// Elements not yet yielded are dropped with the iterator.
pub struct IntoIter<T> {
    buf: RawBuf<T>,
    start: usize,
    end: usize,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(mut vector: Vector<T>) -> Self {
        let (buf, len) = vector.take_parts();
        Self {
            buf,
            start: 0,
            end: len,
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` is live.
        unsafe { slice::from_raw_parts(self.buf.slot(self.start), self.end - self.start) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `start` is live; advancing `start` removes it from the
        // live range so it is read exactly once.
        let value = unsafe { self.buf.slot(self.start).read() };
        self.start += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.start;
        (n, Some(n))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: `end` was live and is now outside the live range.
        Some(unsafe { self.buf.slot(self.end).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // SAFETY: `[start, end)` is still live.
        unsafe { RawAlloc::destroy_range(self.buf.slot(self.start), self.end - self.start) };
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::Vector;
    use stowage_test_utils::DropCounter;

    #[test]
    fn yields_both_ends() {
        let v = Vector::from_slice(&[1, 2, 3, 4]).unwrap();
        let mut it = v.into_iter();
        assert_eq!(it.next(), Some(1));
        assert_eq!(it.next_back(), Some(4));
        assert_eq!(it.as_slice(), &[2, 3]);
        assert_eq!(it.len(), 2);
    }

    #[test]
    fn drops_unyielded_elements() {
        let counter = DropCounter::new();
        let v: Vector<_> = (0..5).map(|i| counter.track(i)).collect();
        let mut it = v.into_iter();
        drop(it.next());
        drop(it);
        assert_eq!(counter.live(), 0);
        assert_eq!(counter.drops(), 5);
    }
}
