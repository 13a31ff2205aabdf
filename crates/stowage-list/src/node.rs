//! Heap nodes and ring link primitives.
//!
//! Every node, the sentinel included, is a separate [`RawAlloc`] block that
//! never moves while it is linked. Links are raw pointers; a node's address
//! is its identity, so relinking a chain into another list keeps every
//! [`Pos`](crate::Pos) naming it valid.
//!
//! The sentinel's payload slot is never initialized.

#![allow(unsafe_code)]

use std::mem::{self, MaybeUninit};
use std::ptr::NonNull;

use stowage_alloc::RawAlloc;
use stowage_core::StowError;

pub(crate) type Link<T> = NonNull<Node<T>>;

pub(crate) struct Node<T> {
    prev: Link<T>,
    next: Link<T>,
    value: MaybeUninit<T>,
}

impl<T> Node<T> {
    /// Allocate a node whose links point at itself.
    fn alloc_with(value: MaybeUninit<T>) -> Result<Link<T>, StowError> {
        let node = RawAlloc::<Node<T>>::allocate(1)?;
        // SAFETY: `node` is a fresh, writable block for one `Node<T>`.
        unsafe {
            RawAlloc::construct(
                node.as_ptr(),
                Node {
                    prev: node,
                    next: node,
                    value,
                },
            )
        };
        Ok(node)
    }

    /// A detached node holding `value`. On failure `value` is dropped.
    pub fn alloc(value: T) -> Result<Link<T>, StowError> {
        Self::alloc_with(MaybeUninit::new(value))
    }

    /// A payload-free node closed on itself.
    pub fn alloc_sentinel() -> Result<Link<T>, StowError> {
        Self::alloc_with(MaybeUninit::uninit())
    }

    /// Free a detached node and return its payload.
    ///
    /// # Safety
    ///
    /// `node` must be a live payload node that is no longer reachable from
    /// any ring.
    pub unsafe fn release(node: Link<T>) -> T {
        // SAFETY: the payload is initialized for payload nodes; the block is
        // freed right after and never read again.
        unsafe {
            let value = (*node.as_ptr()).value.assume_init_read();
            RawAlloc::deallocate(node, 1);
            value
        }
    }

    /// Free the sentinel.
    ///
    /// # Safety
    ///
    /// `node` must be a sentinel whose ring holds no other node.
    pub unsafe fn release_sentinel(node: Link<T>) {
        // SAFETY: `Node<T>` has no drop glue beyond the uninitialized slot.
        unsafe { RawAlloc::deallocate(node, 1) };
    }

    /// # Safety
    ///
    /// `node` must be live.
    #[inline]
    pub unsafe fn next(node: Link<T>) -> Link<T> {
        // SAFETY: forwarded to the caller.
        unsafe { (*node.as_ptr()).next }
    }

    /// # Safety
    ///
    /// `node` must be live.
    #[inline]
    pub unsafe fn prev(node: Link<T>) -> Link<T> {
        // SAFETY: forwarded to the caller.
        unsafe { (*node.as_ptr()).prev }
    }

    /// The payload of `node`, borrowed for `'a`.
    ///
    /// # Safety
    ///
    /// `node` must be a live payload node that outlives `'a` and is not
    /// mutated during `'a`.
    #[inline]
    pub unsafe fn value<'a>(node: Link<T>) -> &'a T {
        // SAFETY: forwarded to the caller.
        unsafe { (*node.as_ptr()).value.assume_init_ref() }
    }

    /// # Safety
    ///
    /// As [`value`](Self::value), and no other reference to the payload
    /// exists during `'a`.
    #[inline]
    pub unsafe fn value_mut<'a>(node: Link<T>) -> &'a mut T {
        // SAFETY: forwarded to the caller.
        unsafe { (*node.as_ptr()).value.assume_init_mut() }
    }

    /// Walk `n` links from `node` (negative walks backward).
    ///
    /// # Safety
    ///
    /// Every node on the way must be live.
    pub unsafe fn walk(mut node: Link<T>, n: isize) -> Link<T> {
        // SAFETY: forwarded to the caller.
        unsafe {
            if n >= 0 {
                for _ in 0..n {
                    node = Self::next(node);
                }
            } else {
                for _ in 0..n.unsigned_abs() {
                    node = Self::prev(node);
                }
            }
        }
        node
    }
}

// ── Link primitives ─────────────────────────────────────────────
//
// All of these require every node they touch to be live.

/// Splice the chain `first ..= last` in immediately before `pos`.
///
/// The chain's internal links are kept; only its ends are rewired.
pub(crate) unsafe fn link_nodes<T>(pos: Link<T>, first: Link<T>, last: Link<T>) {
    // SAFETY: the caller guarantees every node touched is live; no
    // reference into them is held across the writes.
    unsafe {
        let before = Node::prev(pos);
        (*before.as_ptr()).next = first;
        (*first.as_ptr()).prev = before;
        (*last.as_ptr()).next = pos;
        (*pos.as_ptr()).prev = last;
    }
}

/// Excise the chain `first ..= last` from its ring without freeing it.
///
/// The chain keeps its internal links; its outer links are stale until it
/// is linked somewhere else.
pub(crate) unsafe fn unlink_nodes<T>(first: Link<T>, last: Link<T>) {
    // SAFETY: see `link_nodes`.
    unsafe {
        let before = Node::prev(first);
        let after = Node::next(last);
        (*before.as_ptr()).next = after;
        (*after.as_ptr()).prev = before;
    }
}

/// Close `node` on itself.
pub(crate) unsafe fn self_link<T>(node: Link<T>) {
    // SAFETY: see `link_nodes`.
    unsafe {
        (*node.as_ptr()).prev = node;
        (*node.as_ptr()).next = node;
    }
}

/// Append `node` to the detached chain ending at `tail`.
pub(crate) unsafe fn chain_after<T>(tail: Link<T>, node: Link<T>) {
    // SAFETY: see `link_nodes`.
    unsafe {
        (*tail.as_ptr()).next = node;
        (*node.as_ptr()).prev = tail;
    }
}

/// Swap `prev` and `next` of `node`.
pub(crate) unsafe fn flip<T>(node: Link<T>) {
    // SAFETY: see `link_nodes`.
    unsafe {
        let node = &mut *node.as_ptr();
        mem::swap(&mut node.prev, &mut node.next);
    }
}

/// A detached run of payload nodes, linked `first ..= last`.
///
/// Owns its nodes: whatever is still in the chain when it is dropped is
/// freed, payloads included. Builders grow a chain node by node, so a
/// failure or a panic part way through releases exactly the nodes built so
/// far.
pub(crate) struct Chain<T> {
    first: Option<Link<T>>,
    last: Option<Link<T>>,
    len: usize,
}

impl<T> Chain<T> {
    pub const fn new() -> Self {
        Self {
            first: None,
            last: None,
            len: 0,
        }
    }

    /// Take ownership of the detached run `first ..= last` of `len` nodes.
    ///
    /// # Safety
    ///
    /// The run must be unreachable from any ring and own `len` live payload
    /// nodes.
    pub unsafe fn adopt(first: Link<T>, last: Link<T>, len: usize) -> Self {
        Self {
            first: Some(first),
            last: Some(last),
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Build a node for `value` and append it.
    pub fn push(&mut self, value: T) -> Result<Link<T>, StowError> {
        let node = Node::alloc(value)?;
        match self.last {
            // SAFETY: `tail` and `node` are live nodes of this chain.
            Some(tail) => unsafe { chain_after(tail, node) },
            None => self.first = Some(node),
        }
        self.last = Some(node);
        self.len += 1;
        Ok(node)
    }

    /// Detach the first node, leaving its payload in place.
    fn pop_front(&mut self) -> Option<Link<T>> {
        let node = self.first?;
        self.len -= 1;
        if self.len == 0 {
            self.first = None;
            self.last = None;
        } else {
            // SAFETY: `node` is a live node of this chain.
            self.first = Some(unsafe { Node::next(node) });
        }
        Some(node)
    }

    /// Give up ownership: `(first, last, len)`, or `None` if empty.
    pub fn into_links(self) -> Option<(Link<T>, Link<T>, usize)> {
        let links = match (self.first, self.last) {
            (Some(first), Some(last)) => Some((first, last, self.len)),
            _ => None,
        };
        mem::forget(self);
        links
    }
}

impl<T> Drop for Chain<T> {
    fn drop(&mut self) {
        /// Keeps releasing if a payload destructor panics.
        struct Rest<'a, T>(&'a mut Chain<T>);

        impl<T> Drop for Rest<'_, T> {
            fn drop(&mut self) {
                while let Some(node) = self.0.pop_front() {
                    // SAFETY: the chain owned `node` and has let go of it.
                    drop(unsafe { Node::release(node) });
                }
            }
        }

        while let Some(node) = self.pop_front() {
            let rest = Rest(self);
            // SAFETY: as above.
            drop(unsafe { Node::release(node) });
            mem::forget(rest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use stowage_test_utils::DropCounter;

    /// Payloads of the ring closed by `sentinel`.
    fn ring(sentinel: Link<char>) -> Vec<char> {
        let mut out = Vec::new();
        // SAFETY: every node in the test rings is live.
        unsafe {
            let mut cur = Node::next(sentinel);
            while cur != sentinel {
                out.push(*Node::value(cur));
                cur = Node::next(cur);
            }
        }
        out
    }

    #[test]
    fn link_and_unlink_keep_ring_closed() {
        let sentinel = Node::alloc_sentinel().unwrap();
        let a = Node::alloc('a').unwrap();
        let b = Node::alloc('b').unwrap();
        let c = Node::alloc('c').unwrap();
        // SAFETY: all nodes are live; each is linked into one ring.
        unsafe {
            link_nodes(sentinel, a, a);
            link_nodes(sentinel, c, c);
            link_nodes(c, b, b);
            assert_eq!(ring(sentinel), vec!['a', 'b', 'c']);

            unlink_nodes(a, b);
            assert_eq!(ring(sentinel), vec!['c']);
            link_nodes(Node::next(sentinel), a, b);
            assert_eq!(ring(sentinel), vec!['a', 'b', 'c']);
            assert_eq!(Node::prev(sentinel), c);

            unlink_nodes(a, c);
            drop(Chain::adopt(a, c, 3));
            assert_eq!(Node::next(sentinel), sentinel);
            Node::release_sentinel(sentinel);
        }
    }

    #[test]
    fn walk_goes_both_ways() {
        let mut chain = Chain::new();
        let a = chain.push(1).unwrap();
        chain.push(2).unwrap();
        let c = chain.push(3).unwrap();
        // SAFETY: the chain's nodes are live until it is dropped.
        unsafe {
            assert_eq!(*Node::value(Node::walk(a, 2)), 3);
            assert_eq!(Node::walk(c, -2), a);
            assert_eq!(Node::walk(a, 0), a);
        }
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn dropped_chain_frees_every_payload() {
        let counter = DropCounter::new();
        let mut chain = Chain::new();
        for i in 0..4 {
            chain.push(counter.track(i)).unwrap();
        }
        assert_eq!(counter.live(), 4);
        drop(chain);
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn chain_keeps_releasing_after_a_panicking_drop() {
        struct Loud(bool);

        impl Drop for Loud {
            fn drop(&mut self) {
                if self.0 {
                    panic!("payload destructor failed");
                }
            }
        }

        let counter = DropCounter::new();
        let mut chain = Chain::new();
        chain.push((Loud(true), counter.track(0))).unwrap();
        chain.push((Loud(false), counter.track(1))).unwrap();
        chain.push((Loud(false), counter.track(2))).unwrap();
        assert!(catch_unwind(AssertUnwindSafe(|| drop(chain))).is_err());
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn into_links_hands_over_ownership() {
        let mut chain = Chain::new();
        assert!(Chain::<u8>::new().into_links().is_none());
        let a = chain.push(7u8).unwrap();
        let b = chain.push(8u8).unwrap();
        let (first, last, len) = chain.into_links().unwrap();
        assert_eq!((first, last, len), (a, b, 2));
        // SAFETY: the links came from a chain that no longer owns them.
        drop(unsafe { Chain::adopt(first, last, len) });
    }
}
