//! The [`List`] container: construction, access, insertion and removal.
//!
//! Relational operations (splice, merge, sort, unique, remove, reverse)
//! live in a separate module and are documented on [`List`] as well.
//!
//! # Position validity
//!
//! A [`Pos`] is the address of a node. It stays valid while that node is
//! linked into a list: insertions, splices, merges and sorts never
//! invalidate it, even when the node moves to another list. Removing the
//! element, or dropping the list that holds it, invalidates it. The end
//! position of a list is valid for as long as the list lives.
//!
//! Operations that take a `Pos` are `unsafe`: the caller promises that it
//! is valid *for the list it is passed to*, that is, it names an element of
//! that list or is that list's end position. Nothing checks this at run
//! time.

#![allow(unsafe_code)]

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter;
use std::marker::PhantomData;
use std::mem;

use stowage_alloc::RawAlloc;
use stowage_core::{BuildError, CursorIter, ReadCursor, Reverse, StowError};

use crate::cursor::{Cursor, Iter, IterMut};
use crate::node::{link_nodes, self_link, unlink_nodes, Chain, Link, Node};

/// Position of a node in a [`List`].
///
/// See [position validity](self#position-validity) for how long a `Pos`
/// may be used.
pub struct Pos<T> {
    node: Link<T>,
}

impl<T> Pos<T> {
    pub(crate) fn new(node: Link<T>) -> Self {
        Self { node }
    }

    pub(crate) fn node(self) -> Link<T> {
        self.node
    }
}

impl<T> Clone for Pos<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Pos<T> {}

impl<T> PartialEq for Pos<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T> Eq for Pos<T> {}

impl<T> Hash for Pos<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
    }
}

impl<T> fmt::Debug for Pos<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pos").field(&self.node).finish()
    }
}

/// A doubly linked list with a sentinel node.
///
/// Every element lives in its own heap node; the nodes form a closed ring
/// through a payload-free sentinel, so insertion and removal never branch
/// on the list boundaries.
pub struct List<T> {
    sentinel: Link<T>,
    len: usize,
    _owns: PhantomData<T>,
}

// SAFETY: a list owns its nodes exclusively; sending or sharing it sends or
// shares the `T`s and nothing else.
unsafe impl<T: Send> Send for List<T> {}
// SAFETY: as above.
unsafe impl<T: Sync> Sync for List<T> {}

impl<T> List<T> {
    // ── Construction ────────────────────────────────────────────

    /// An empty list, reporting a refused sentinel allocation.
    pub fn try_new() -> Result<Self, StowError> {
        Ok(Self {
            sentinel: Node::alloc_sentinel()?,
            len: 0,
            _owns: PhantomData,
        })
    }

    /// An empty list. Allocates the sentinel node.
    ///
    /// A refused allocation is raised through
    /// [`StowError::raise`]; use [`try_new`](Self::try_new) to handle it.
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(list) => list,
            Err(err) => err.raise(),
        }
    }

    /// `n` clones of `value`.
    pub fn from_elem(n: usize, value: &T) -> Result<Self, StowError>
    where
        T: Clone,
    {
        let mut list = Self::try_new()?;
        list.append_iter(iter::repeat_n(value, n).cloned())?;
        Ok(list)
    }

    /// `n` default-constructed elements.
    pub fn with_len(n: usize) -> Result<Self, StowError>
    where
        T: Default,
    {
        let mut list = Self::try_new()?;
        list.append_iter(iter::repeat_with(T::default).take(n))?;
        Ok(list)
    }

    /// Clones of every element of `src`, in order.
    pub fn from_slice(src: &[T]) -> Result<Self, StowError>
    where
        T: Clone,
    {
        let mut list = Self::try_new()?;
        list.append_iter(src.iter().cloned())?;
        Ok(list)
    }

    /// Clones of the elements in the cursor range `[first, last)`.
    pub fn from_range<'a, C>(first: C, last: C) -> Result<Self, StowError>
    where
        C: ReadCursor<'a, Value = T>,
        T: Clone + 'a,
    {
        let mut list = Self::try_new()?;
        list.append_iter(CursorIter::new(first, last).cloned())?;
        Ok(list)
    }

    // ── Ring access ─────────────────────────────────────────────

    pub(crate) fn sentinel(&self) -> Link<T> {
        self.sentinel
    }

    pub(crate) fn head(&self) -> Link<T> {
        // SAFETY: the sentinel lives as long as the list.
        unsafe { Node::next(self.sentinel) }
    }

    pub(crate) fn tail(&self) -> Link<T> {
        // SAFETY: as above.
        unsafe { Node::prev(self.sentinel) }
    }

    /// Payload of `node`, or `None` for the sentinel.
    ///
    /// # Safety
    ///
    /// `node` must be a node of this list.
    unsafe fn payload(&self, node: Link<T>) -> Option<&T> {
        if node == self.sentinel {
            return None;
        }
        // SAFETY: a non-sentinel node of this list holds a payload, and
        // `&self` keeps it from being mutated.
        Some(unsafe { Node::value(node) })
    }

    /// # Safety
    ///
    /// As [`payload`](Self::payload).
    unsafe fn payload_mut(&mut self, node: Link<T>) -> Option<&mut T> {
        if node == self.sentinel {
            return None;
        }
        // SAFETY: as above, with `&mut self` ruling out other borrows.
        Some(unsafe { Node::value_mut(node) })
    }

    // ── Positions ───────────────────────────────────────────────

    /// Position of the first element (the end position if empty).
    pub fn begin_pos(&self) -> Pos<T> {
        Pos::new(self.head())
    }

    /// The end position: the sentinel.
    pub fn end_pos(&self) -> Pos<T> {
        Pos::new(self.sentinel)
    }

    /// Position after `pos`; the end position wraps to the first element.
    ///
    /// # Safety
    ///
    /// `pos` must be [valid](self#position-validity) for this list.
    pub unsafe fn next_pos(&self, pos: Pos<T>) -> Pos<T> {
        // SAFETY: forwarded to the caller.
        Pos::new(unsafe { Node::next(pos.node) })
    }

    /// Position before `pos`; the end position steps to the last element.
    ///
    /// # Safety
    ///
    /// `pos` must be [valid](self#position-validity) for this list.
    pub unsafe fn prev_pos(&self, pos: Pos<T>) -> Pos<T> {
        // SAFETY: forwarded to the caller.
        Pos::new(unsafe { Node::prev(pos.node) })
    }

    /// Walk `n` positions from `pos` (negative walks backward).
    ///
    /// # Safety
    ///
    /// `pos` must be [valid](self#position-validity) for this list.
    pub unsafe fn advance_pos(&self, pos: Pos<T>, n: isize) -> Pos<T> {
        // SAFETY: the walk stays inside this list's ring.
        Pos::new(unsafe { Node::walk(pos.node, n) })
    }

    /// The element at `pos`, or `None` at the end position.
    ///
    /// # Safety
    ///
    /// `pos` must be [valid](self#position-validity) for this list.
    pub unsafe fn get(&self, pos: Pos<T>) -> Option<&T> {
        // SAFETY: forwarded to the caller.
        unsafe { self.payload(pos.node) }
    }

    /// The element at `pos`, mutably.
    ///
    /// # Safety
    ///
    /// `pos` must be [valid](self#position-validity) for this list.
    pub unsafe fn get_mut(&mut self, pos: Pos<T>) -> Option<&mut T> {
        // SAFETY: forwarded to the caller.
        unsafe { self.payload_mut(pos.node) }
    }

    // ── Iteration ───────────────────────────────────────────────

    /// Cursor at the first element.
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.head())
    }

    /// Cursor at the end position.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.sentinel)
    }

    /// Reverse cursor at the last element.
    pub fn rbegin(&self) -> Reverse<Cursor<'_, T>> {
        Reverse::new(self.end())
    }

    /// Reverse cursor one before the first element.
    pub fn rend(&self) -> Reverse<Cursor<'_, T>> {
        Reverse::new(self.begin())
    }

    /// Iterator over shared references, front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Iterator over mutable references, front to back.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self)
    }

    // ── Capacity and access ─────────────────────────────────────

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if the list holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest element count a list of `T` can hold.
    pub fn max_size(&self) -> usize {
        RawAlloc::<Node<T>>::max_count()
    }

    /// The first element.
    pub fn front(&self) -> Option<&T> {
        // SAFETY: the head is a node of this list.
        unsafe { self.payload(self.head()) }
    }

    /// The first element, mutably.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        let head = self.head();
        // SAFETY: as above.
        unsafe { self.payload_mut(head) }
    }

    /// The last element.
    pub fn back(&self) -> Option<&T> {
        // SAFETY: the tail is a node of this list.
        unsafe { self.payload(self.tail()) }
    }

    /// The last element, mutably.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let tail = self.tail();
        // SAFETY: as above.
        unsafe { self.payload_mut(tail) }
    }

    // ── Chains ──────────────────────────────────────────────────

    /// Build a detached chain from `items`.
    ///
    /// If an allocation fails, or producing an item panics, the chain built
    /// so far is freed and the ring is untouched.
    fn build_chain<I>(&self, items: I) -> Result<Chain<T>, StowError>
    where
        I: IntoIterator<Item = T>,
    {
        let items = items.into_iter();
        StowError::grown_len(self.len, items.size_hint().0, self.max_size())?;
        let mut chain = Chain::new();
        for value in items {
            chain.push(value)?;
        }
        StowError::grown_len(self.len, chain.len(), self.max_size())?;
        Ok(chain)
    }

    /// Link `chain` before `at` and count it.
    ///
    /// Returns the first linked node, or `at` if the chain is empty.
    ///
    /// # Safety
    ///
    /// `at` must be a node of this list.
    pub(crate) unsafe fn link_chain(&mut self, at: Link<T>, chain: Chain<T>) -> Link<T> {
        match chain.into_links() {
            Some((first, last, n)) => {
                // SAFETY: `at` is in this ring; the chain is detached.
                unsafe { link_nodes(at, first, last) };
                self.len += n;
                first
            }
            None => at,
        }
    }

    /// Unlink the `n` nodes of `[first, last)` as an owned chain.
    ///
    /// # Safety
    ///
    /// `[first, last)` must be a range of `n` element nodes of this list.
    pub(crate) unsafe fn detach(&mut self, first: Link<T>, last: Link<T>, n: usize) -> Chain<T> {
        if n == 0 {
            return Chain::new();
        }
        // SAFETY: forwarded to the caller; the sentinel is not in the range.
        unsafe {
            let tail = Node::prev(last);
            unlink_nodes(first, tail);
            self.len -= n;
            Chain::adopt(first, tail, n)
        }
    }

    /// Unlink every element as an owned chain, closing the sentinel on
    /// itself.
    pub(crate) fn detach_all(&mut self) -> Chain<T> {
        if self.is_empty() {
            return Chain::new();
        }
        let (first, last, n) = (self.head(), self.tail(), self.len);
        self.len = 0;
        // SAFETY: `first ..= last` is every element node; once the sentinel
        // is closed on itself nothing else reaches them.
        unsafe {
            self_link(self.sentinel);
            Chain::adopt(first, last, n)
        }
    }

    /// Unlink `node` and return its payload.
    ///
    /// # Safety
    ///
    /// `node` must be a node of this list.
    ///
    /// # Panics
    ///
    /// Panics if `node` is the sentinel.
    pub(crate) unsafe fn take(&mut self, node: Link<T>) -> T {
        assert!(node != self.sentinel, "cannot remove the end position");
        // SAFETY: `node` is an element node; it is freed only after it is
        // out of the ring.
        unsafe {
            unlink_nodes(node, node);
            self.len -= 1;
            Node::release(node)
        }
    }

    /// Append every item of `items`. On failure no element is added.
    pub(crate) fn append_iter<I>(&mut self, items: I) -> Result<(), StowError>
    where
        I: IntoIterator<Item = T>,
    {
        let chain = self.build_chain(items)?;
        // SAFETY: the sentinel is a node of this list.
        unsafe { self.link_chain(self.sentinel, chain) };
        Ok(())
    }

    // ── Insertion ───────────────────────────────────────────────

    /// Insert `value` before `pos` and return its position.
    ///
    /// On failure `value` is dropped and the list is unchanged.
    ///
    /// # Safety
    ///
    /// `pos` must be [valid](self#position-validity) for this list.
    pub unsafe fn insert(&mut self, pos: Pos<T>, value: T) -> Result<Pos<T>, StowError> {
        StowError::grown_len(self.len, 1, self.max_size())?;
        let node = Node::alloc(value)?;
        // SAFETY: `pos` is in this ring; `node` is detached.
        unsafe { link_nodes(pos.node, node, node) };
        self.len += 1;
        Ok(Pos::new(node))
    }

    /// Insert an element built by `f` before `pos`.
    ///
    /// The element is built before any node is allocated, so a failure of
    /// `f` leaves the list unchanged.
    ///
    /// # Safety
    ///
    /// `pos` must be [valid](self#position-validity) for this list.
    pub unsafe fn try_emplace<E, F>(&mut self, pos: Pos<T>, f: F) -> Result<Pos<T>, BuildError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let value = f().map_err(|source| BuildError::Element {
            constructed: 0,
            source,
        })?;
        // SAFETY: forwarded to the caller.
        Ok(unsafe { self.insert(pos, value) }?)
    }

    /// Prepend an element built by `f`.
    pub fn try_emplace_front<E, F>(&mut self, f: F) -> Result<&mut T, BuildError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        // SAFETY: the begin position is valid, and so is the new element's.
        unsafe {
            let pos = self.try_emplace(self.begin_pos(), f)?;
            Ok(Node::value_mut(pos.node))
        }
    }

    /// Append an element built by `f`.
    pub fn try_emplace_back<E, F>(&mut self, f: F) -> Result<&mut T, BuildError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        // SAFETY: the end position is valid, and so is the new element's.
        unsafe {
            let pos = self.try_emplace(self.end_pos(), f)?;
            Ok(Node::value_mut(pos.node))
        }
    }

    /// Insert `n` clones of `value` before `pos`.
    ///
    /// Returns the position of the first inserted element (`pos` if
    /// `n == 0`). The clones are built as a detached chain first; if a
    /// clone panics the chain is freed and the list is unchanged.
    ///
    /// # Safety
    ///
    /// `pos` must be [valid](self#position-validity) for this list.
    pub unsafe fn insert_n(&mut self, pos: Pos<T>, n: usize, value: &T) -> Result<Pos<T>, StowError>
    where
        T: Clone,
    {
        // SAFETY: forwarded to the caller.
        unsafe { self.insert_iter(pos, iter::repeat_n(value, n).cloned()) }
    }

    /// Insert every item of `items` before `pos`, in order.
    ///
    /// Returns the position of the first inserted element (`pos` if
    /// `items` is empty). On failure no element is inserted.
    ///
    /// # Safety
    ///
    /// `pos` must be [valid](self#position-validity) for this list.
    pub unsafe fn insert_iter<I>(&mut self, pos: Pos<T>, items: I) -> Result<Pos<T>, StowError>
    where
        I: IntoIterator<Item = T>,
    {
        let chain = self.build_chain(items)?;
        // SAFETY: forwarded to the caller.
        Ok(Pos::new(unsafe { self.link_chain(pos.node, chain) }))
    }

    /// Prepend `value`.
    pub fn push_front(&mut self, value: T) -> Result<(), StowError> {
        // SAFETY: the begin position is valid.
        unsafe { self.insert(self.begin_pos(), value) }.map(|_| ())
    }

    /// Append `value`.
    pub fn push_back(&mut self, value: T) -> Result<(), StowError> {
        // SAFETY: the end position is valid.
        unsafe { self.insert(self.end_pos(), value) }.map(|_| ())
    }

    // ── Removal ─────────────────────────────────────────────────

    /// Remove and return the first element.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the head of a non-empty list is an element node.
        Some(unsafe { self.take(self.head()) })
    }

    /// Remove and return the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the tail of a non-empty list is an element node.
        Some(unsafe { self.take(self.tail()) })
    }

    /// Remove the element at `pos` and return the position after it.
    ///
    /// The node is unlinked before its payload is dropped.
    ///
    /// # Safety
    ///
    /// `pos` must be [valid](self#position-validity) for this list.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is the end position.
    pub unsafe fn erase(&mut self, pos: Pos<T>) -> Pos<T> {
        // SAFETY: forwarded to the caller.
        unsafe {
            let next = Node::next(pos.node);
            drop(self.take(pos.node));
            Pos::new(next)
        }
    }

    /// Remove the elements in `[first, last)` and return `last`.
    ///
    /// The whole range is unlinked before any payload is dropped.
    ///
    /// # Safety
    ///
    /// `first` and `last` must be [valid](self#position-validity) for this
    /// list, with `last` reachable from `first`.
    pub unsafe fn erase_range(&mut self, first: Pos<T>, last: Pos<T>) -> Pos<T> {
        // SAFETY: forwarded to the caller.
        unsafe {
            let n = count(first.node, last.node);
            drop(self.detach(first.node, last.node, n));
        }
        last
    }

    /// Drop every element.
    ///
    /// The sentinel is closed on itself first; the detached ring is then
    /// walked once, dropping each payload.
    pub fn clear(&mut self) {
        drop(self.detach_all());
    }

    /// Drop elements from the back until at most `len` remain.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let cut = self.cut_point(len);
        let n = self.len - len;
        // SAFETY: `[cut, end)` is the last `n` element nodes.
        drop(unsafe { self.detach(cut, self.sentinel, n) });
    }

    /// Node of element `index`, walking from whichever end is closer.
    fn cut_point(&self, index: usize) -> Link<T> {
        // SAFETY: both walks stay inside this list's ring.
        unsafe {
            if index <= self.len / 2 {
                Node::walk(self.head(), index as isize)
            } else {
                Node::walk(self.sentinel, -((self.len - index) as isize))
            }
        }
    }

    // ── Bulk replacement ────────────────────────────────────────

    /// Grow with clones of `value`, or shrink, to exactly `n` elements.
    ///
    /// Walks to the cut point from whichever end is closer.
    pub fn resize(&mut self, n: usize, value: &T) -> Result<(), StowError>
    where
        T: Clone,
    {
        self.resize_with(n, || value.clone())
    }

    /// Grow with elements built by `f`, or shrink, to exactly `n`.
    pub fn resize_with<F>(&mut self, n: usize, f: F) -> Result<(), StowError>
    where
        F: FnMut() -> T,
    {
        if n <= self.len {
            self.truncate(n);
            return Ok(());
        }
        let extra = n - self.len;
        self.append_iter(iter::repeat_with(f).take(extra))
    }

    /// Replace the contents with `n` clones of `value`.
    ///
    /// Existing nodes are reused: their payloads are overwritten first,
    /// then the surplus is erased or the shortfall appended.
    pub fn assign(&mut self, n: usize, value: &T) -> Result<(), StowError>
    where
        T: Clone,
    {
        self.assign_iter(iter::repeat_n(value, n).cloned())
    }

    /// Replace the contents with clones of `src`, reusing existing nodes.
    pub fn assign_slice(&mut self, src: &[T]) -> Result<(), StowError>
    where
        T: Clone,
    {
        self.assign_iter(src.iter().cloned())
    }

    /// Replace the contents with the items of `items`, reusing existing
    /// nodes.
    pub fn assign_iter<I>(&mut self, items: I) -> Result<(), StowError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut items = items.into_iter();
        let mut cur = self.head();
        let mut kept = 0;
        while cur != self.sentinel {
            let Some(value) = items.next() else {
                // SAFETY: `[cur, end)` holds the `len - kept` unused nodes.
                drop(unsafe { self.detach(cur, self.sentinel, self.len - kept) });
                return Ok(());
            };
            // SAFETY: `cur` is an element node of this list.
            unsafe {
                *Node::value_mut(cur) = value;
                cur = Node::next(cur);
            }
            kept += 1;
        }
        self.append_iter(items)
    }

    /// Exchange contents with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

/// Number of nodes in `[first, last)`.
///
/// # Safety
///
/// `last` must be reachable from `first` through live nodes.
pub(crate) unsafe fn count<T>(first: Link<T>, last: Link<T>) -> usize {
    let mut n = 0;
    let mut cur = first;
    while cur != last {
        // SAFETY: forwarded to the caller.
        cur = unsafe { Node::next(cur) };
        n += 1;
    }
    n
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        /// Frees the sentinel even if a payload destructor panics.
        struct Sentinel<T>(Link<T>);

        impl<T> Drop for Sentinel<T> {
            fn drop(&mut self) {
                // SAFETY: every element node was detached before this runs.
                unsafe { Node::release_sentinel(self.0) };
            }
        }

        let _sentinel = Sentinel(self.sentinel);
        self.clear();
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}
