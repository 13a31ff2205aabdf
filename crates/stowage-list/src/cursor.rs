//! Read cursors and iterators over a [`List`].

#![allow(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use stowage_core::{BidirectionalCursor, BidirectionalTag, ReadCursor};

use crate::list::{List, Pos};
use crate::node::{Link, Node};

/// Bidirectional read cursor over a [`List`].
///
/// Stepping past the last element lands on the end position; stepping
/// again wraps around to the first element.
pub struct Cursor<'a, T> {
    list: &'a List<T>,
    node: Link<T>,
}

// SAFETY: a cursor only hands out `&T` from a borrowed list.
unsafe impl<T: Sync> Send for Cursor<'_, T> {}
// SAFETY: as above.
unsafe impl<T: Sync> Sync for Cursor<'_, T> {}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(list: &'a List<T>, node: Link<T>) -> Self {
        Self { list, node }
    }

    /// The position this cursor refers to.
    pub fn pos(&self) -> Pos<T> {
        Pos::new(self.node)
    }

    /// `true` at the end position.
    pub fn is_end(&self) -> bool {
        self.node == self.list.sentinel()
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.list, other.list) && self.node == other.node
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("node", &self.node).finish()
    }
}

impl<T> stowage_core::Cursor for Cursor<'_, T> {
    type Category = BidirectionalTag;
    type Value = T;

    fn step(&mut self) {
        // SAFETY: the list is borrowed, so its ring is frozen and `node`
        // is one of its nodes.
        self.node = unsafe { Node::next(self.node) };
    }
}

impl<T> BidirectionalCursor for Cursor<'_, T> {
    fn step_back(&mut self) {
        // SAFETY: as in `step`.
        self.node = unsafe { Node::prev(self.node) };
    }
}

impl<'a, T> ReadCursor<'a> for Cursor<'a, T> {
    /// # Panics
    ///
    /// Panics at the end position.
    fn get(&self) -> &'a T {
        assert!(!self.is_end(), "dereferenced the end position");
        // SAFETY: an element node of a list borrowed for `'a`.
        unsafe { Node::value(self.node) }
    }
}

/// Borrowing iterator over a [`List`], front to back.
pub struct Iter<'a, T> {
    head: Link<T>,
    tail: Link<T>,
    remaining: usize,
    _list: PhantomData<&'a T>,
}

// SAFETY: yields `&T` only.
unsafe impl<T: Sync> Send for Iter<'_, T> {}
// SAFETY: as above.
unsafe impl<T: Sync> Sync for Iter<'_, T> {}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(list: &'a List<T>) -> Self {
        Self {
            head: list.head(),
            tail: list.tail(),
            remaining: list.len(),
            _list: PhantomData,
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: `remaining` counts the element nodes between `head` and
        // `tail`, all in a ring borrowed for `'a`.
        unsafe {
            let node = self.head;
            self.head = Node::next(node);
            Some(Node::value(node))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: as in `next`.
        unsafe {
            let node = self.tail;
            self.tail = Node::prev(node);
            Some(Node::value(node))
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable iterator over a [`List`], front to back.
///
/// Walks the links from both ends; each node is yielded at most once, and
/// its neighbour link is read before its payload is handed out.
pub struct IterMut<'a, T> {
    head: Link<T>,
    tail: Link<T>,
    remaining: usize,
    _list: PhantomData<&'a mut T>,
}

// SAFETY: yields `&mut T` from an exclusively borrowed list.
unsafe impl<T: Send> Send for IterMut<'_, T> {}
// SAFETY: as above.
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new(list: &'a mut List<T>) -> Self {
        Self {
            head: list.head(),
            tail: list.tail(),
            remaining: list.len(),
            _list: PhantomData,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: the list is exclusively borrowed for `'a`, and the
        // `remaining` count keeps the two ends from yielding a node twice.
        unsafe {
            let node = self.head;
            self.head = Node::next(node);
            Some(Node::value_mut(node))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: as in `next`.
        unsafe {
            let node = self.tail;
            self.tail = Node::prev(node);
            Some(Node::value_mut(node))
        }
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator over a [`List`].
pub struct IntoIter<T> {
    list: List<T>,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(list: List<T>) -> Self {
        Self { list }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.list.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}
