//! List-only relational operations: splice, merge, sort, unique, remove,
//! reverse.
//!
//! Splicing and merging move nodes between rings by relinking. No payload
//! is moved, cloned or reallocated, nothing can fail, and every position
//! naming a moved element stays valid in the receiving list.

#![allow(unsafe_code)]

use std::cmp::Ordering;

use log::trace;

use crate::list::{count, List, Pos};
use crate::node::{flip, link_nodes, unlink_nodes, Link, Node};

impl<T> List<T> {
    // ── Splicing ────────────────────────────────────────────────

    /// Move every element of `other` before `pos`, leaving `other` empty.
    ///
    /// O(1): the donor's ring is relinked wholesale.
    ///
    /// # Safety
    ///
    /// `pos` must be [valid](crate::list#position-validity) for this list.
    pub unsafe fn splice_all(&mut self, pos: Pos<T>, other: &mut List<T>) {
        let chain = other.detach_all();
        trace!("splicing {} nodes", chain.len());
        // SAFETY: forwarded to the caller.
        unsafe { self.link_chain(pos.node(), chain) };
    }

    /// Move every element of `other` to the back of this list.
    pub fn append(&mut self, other: &mut List<T>) {
        // SAFETY: the end position is valid.
        unsafe { self.splice_all(self.end_pos(), other) };
    }

    /// Move the element at `from` in `other` before `pos`. O(1).
    ///
    /// # Safety
    ///
    /// `pos` must be [valid](crate::list#position-validity) for this list
    /// and `from` for `other`.
    ///
    /// # Panics
    ///
    /// Panics if `from` is `other`'s end position.
    pub unsafe fn splice_one(&mut self, pos: Pos<T>, other: &mut List<T>, from: Pos<T>) {
        assert!(
            from.node() != other.sentinel(),
            "cannot splice the end position"
        );
        // SAFETY: `from` is an element node of `other`.
        unsafe {
            let chain = other.detach(from.node(), Node::next(from.node()), 1);
            self.link_chain(pos.node(), chain);
        }
    }

    /// Move the elements of `[first, last)` in `other` before `pos`.
    ///
    /// The range is walked once, only to count it; the nodes themselves
    /// are relinked as one chain.
    ///
    /// # Safety
    ///
    /// `pos` must be [valid](crate::list#position-validity) for this list;
    /// `first` and `last` for `other`, with `last` reachable from `first`.
    pub unsafe fn splice_range(
        &mut self,
        pos: Pos<T>,
        other: &mut List<T>,
        first: Pos<T>,
        last: Pos<T>,
    ) {
        // SAFETY: forwarded to the caller.
        unsafe {
            let n = count(first.node(), last.node());
            let chain = other.detach(first.node(), last.node(), n);
            self.link_chain(pos.node(), chain);
        }
    }

    /// Move `[first, last)` of this list before `pos` by relinking.
    ///
    /// # Safety
    ///
    /// All three positions must be [valid](crate::list#position-validity)
    /// for this list, `last` must be reachable from `first`, and `pos` must
    /// not lie inside `[first, last)`.
    pub unsafe fn splice_within(&mut self, pos: Pos<T>, first: Pos<T>, last: Pos<T>) {
        if first == last || pos == last {
            return;
        }
        // SAFETY: forwarded to the caller; the chain stays in this ring, so
        // the length is unchanged.
        unsafe {
            let tail = Node::prev(last.node());
            unlink_nodes(first.node(), tail);
            link_nodes(pos.node(), first.node(), tail);
        }
    }

    // ── Merging and sorting ─────────────────────────────────────

    /// Merge the sorted list `other` into this sorted list.
    ///
    /// See [`merge_by`](Self::merge_by).
    pub fn merge(&mut self, other: &mut List<T>)
    where
        T: Ord,
    {
        self.merge_by(other, T::cmp);
    }

    /// Merge `other` into `self`, both sorted by `compare`.
    ///
    /// One left-to-right sweep: whenever the head of `other` compares
    /// `Less` than the current element of `self`, the whole run of `other`
    /// that does so is relinked in front of it. Equal elements keep
    /// `self`'s element first. `other` is left empty.
    pub fn merge_by<F>(&mut self, other: &mut List<T>, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut cur = self.head();
        // SAFETY: `cur` walks this ring and `head`/`run_end` walk `other`'s;
        // every relink moves a whole run and leaves both rings closed.
        unsafe {
            while !other.is_empty() {
                if cur == self.sentinel() {
                    self.append(other);
                    break;
                }
                let head = other.head();
                if compare(Node::value(head), Node::value(cur)) != Ordering::Less {
                    cur = Node::next(cur);
                    continue;
                }
                let mut run_end = Node::next(head);
                let mut n = 1;
                while run_end != other.sentinel()
                    && compare(Node::value(run_end), Node::value(cur)) == Ordering::Less
                {
                    run_end = Node::next(run_end);
                    n += 1;
                }
                let run = other.detach(head, run_end, n);
                self.link_chain(cur, run);
            }
        }
    }

    /// Sort ascending. Stable.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(T::cmp);
    }

    /// Sort by `compare`. Stable.
    ///
    /// Recursive merge sort: each level finds the midpoint by walking,
    /// sorts both halves, then merges them by relinking nodes. Payloads
    /// never move.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if self.len() < 2 {
            return;
        }
        // SAFETY: the whole ring is sorted in place.
        unsafe { self.sort_run(self.head(), self.sentinel(), self.len(), &mut compare) };
    }

    /// Sort the `n` nodes of `[first, last)`; returns the new first node.
    ///
    /// # Safety
    ///
    /// `[first, last)` must be `n` element nodes of this list.
    unsafe fn sort_run<F>(&mut self, first: Link<T>, last: Link<T>, n: usize, compare: &mut F) -> Link<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if n < 2 {
            return first;
        }
        let half = n / 2;
        // SAFETY: forwarded to the caller; `mid` splits the range.
        unsafe {
            let mid = Node::walk(first, half as isize);
            let left = self.sort_run(first, mid, half, compare);
            let right = self.sort_run(mid, last, n - half, compare);
            merge_runs(left, right, last, compare)
        }
    }

    // ── Filtering ───────────────────────────────────────────────

    /// Remove every element equal to `value`; returns how many were removed.
    pub fn remove(&mut self, value: &T) -> usize
    where
        T: PartialEq,
    {
        self.remove_if(|x| x == value)
    }

    /// Remove every element for which `pred` holds; returns the count.
    ///
    /// Each node is unlinked before its payload is dropped.
    pub fn remove_if<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = 0;
        let mut cur = self.head();
        // SAFETY: `next` is read before `cur` is removed.
        unsafe {
            while cur != self.sentinel() {
                let next = Node::next(cur);
                if pred(Node::value(cur)) {
                    drop(self.take(cur));
                    removed += 1;
                }
                cur = next;
            }
        }
        removed
    }

    /// Collapse runs of equal consecutive elements to their first element.
    pub fn unique(&mut self) -> usize
    where
        T: PartialEq,
    {
        self.unique_by(|kept, candidate| kept == candidate)
    }

    /// Remove each element for which `same(kept, candidate)` holds, where
    /// `kept` is the nearest preceding element that was not removed.
    ///
    /// Returns the number of elements removed.
    pub fn unique_by<F>(&mut self, mut same: F) -> usize
    where
        F: FnMut(&T, &T) -> bool,
    {
        if self.is_empty() {
            return 0;
        }
        let mut removed = 0;
        let mut kept = self.head();
        // SAFETY: `kept` is never removed; `next` is read before `cur` is.
        unsafe {
            let mut cur = Node::next(kept);
            while cur != self.sentinel() {
                let next = Node::next(cur);
                if same(Node::value(kept), Node::value(cur)) {
                    drop(self.take(cur));
                    removed += 1;
                } else {
                    kept = cur;
                }
                cur = next;
            }
        }
        removed
    }

    /// Reverse the order of the elements by swapping every node's links.
    pub fn reverse(&mut self) {
        let sentinel = self.sentinel();
        let mut cur = sentinel;
        // SAFETY: every node of the ring, sentinel included, is flipped
        // exactly once.
        unsafe {
            loop {
                let next = Node::next(cur);
                flip(cur);
                cur = next;
                if cur == sentinel {
                    break;
                }
            }
        }
    }
}

/// Merge the adjacent sorted runs `[left, right)` and `[right, last)`.
///
/// Returns the new first node of the combined run.
///
/// # Safety
///
/// Both runs must be non-empty ranges of element nodes of one ring.
unsafe fn merge_runs<T, F>(left: Link<T>, right: Link<T>, last: Link<T>, compare: &mut F) -> Link<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut head = left;
    let mut a = left;
    let mut b = right;
    // Invariant: `b` is the first node not yet merged from the right run,
    // and the left run ends just before it.
    // SAFETY: forwarded to the caller.
    unsafe {
        while a != b && b != last {
            if compare(Node::value(b), Node::value(a)) == Ordering::Less {
                let run_first = b;
                let mut run_end = Node::next(b);
                while run_end != last && compare(Node::value(run_end), Node::value(a)) == Ordering::Less
                {
                    run_end = Node::next(run_end);
                }
                let run_last = Node::prev(run_end);
                unlink_nodes(run_first, run_last);
                link_nodes(a, run_first, run_last);
                if a == head {
                    head = run_first;
                }
                b = run_end;
            } else {
                a = Node::next(a);
            }
        }
    }
    head
}
