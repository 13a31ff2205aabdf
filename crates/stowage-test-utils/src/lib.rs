//! Tracked element types and fixtures for Stowage development.
//!
//! Container rollback tests need to know exactly how many elements were
//! created, cloned and dropped. Every type here reports into a shared
//! [`DropCounter`]:
//!
//! - [`Tracked`]: cloneable, counts clones and drops.
//! - [`MoveOnly`]: not cloneable, counts drops.
//! - [`CloneBomb`]: panics on `clone` once its [`Fuse`] burns out.
//! - [`FailAfter`]: a fallible builder that succeeds a fixed number of
//!   times, then returns [`BuildFailed`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::Cell;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Debug, Default)]
struct Counts {
    created: Cell<usize>,
    clones: Cell<usize>,
    drops: Cell<usize>,
}

fn bump(cell: &Cell<usize>) {
    cell.set(cell.get() + 1);
}

/// Shared tally of element lifecycle events.
///
/// Cloning the counter shares the tally.
#[derive(Clone, Debug, Default)]
pub struct DropCounter {
    counts: Rc<Counts>,
}

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements created through this counter (clones excluded).
    pub fn created(&self) -> usize {
        self.counts.created.get()
    }

    /// Successful clones.
    pub fn clones(&self) -> usize {
        self.counts.clones.get()
    }

    pub fn drops(&self) -> usize {
        self.counts.drops.get()
    }

    /// Elements currently alive: created + cloned - dropped.
    pub fn live(&self) -> usize {
        self.created() + self.clones() - self.drops()
    }

    pub fn track<V>(&self, value: V) -> Tracked<V> {
        bump(&self.counts.created);
        Tracked {
            value,
            counts: Rc::clone(&self.counts),
        }
    }

    pub fn move_only<V>(&self, value: V) -> MoveOnly<V> {
        MoveOnly {
            inner: self.track(value),
        }
    }

    pub fn bomb<V>(&self, value: V, fuse: &Fuse) -> CloneBomb<V> {
        CloneBomb {
            inner: self.track(value),
            fuse: FuseField(fuse.clone()),
        }
    }
}

/// A value that reports clones and drops to a [`DropCounter`].
///
/// Comparison, ordering and hashing look at the value only.
pub struct Tracked<V> {
    value: V,
    counts: Rc<Counts>,
}

impl<V> Tracked<V> {
    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }
}

impl<V: Clone> Clone for Tracked<V> {
    fn clone(&self) -> Self {
        let value = self.value.clone();
        bump(&self.counts.clones);
        Self {
            value,
            counts: Rc::clone(&self.counts),
        }
    }
}

impl<V> Drop for Tracked<V> {
    fn drop(&mut self) {
        bump(&self.counts.drops);
    }
}

impl<V: fmt::Debug> fmt::Debug for Tracked<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<V: PartialEq> PartialEq for Tracked<V> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<V: Eq> Eq for Tracked<V> {}

impl<V: PartialOrd> PartialOrd for Tracked<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl<V: Ord> Ord for Tracked<V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<V: Hash> Hash for Tracked<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

/// A tracked value without `Clone`.
///
/// Containers that only relink or relocate may hold these; any code path
/// that needs a copy fails to compile.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoveOnly<V> {
    inner: Tracked<V>,
}

impl<V> MoveOnly<V> {
    pub fn value(&self) -> &V {
        self.inner.value()
    }

    pub fn into_tracked(self) -> Tracked<V> {
        self.inner
    }
}

/// Remaining number of clones a set of [`CloneBomb`]s may perform.
#[derive(Clone, Debug)]
pub struct Fuse {
    remaining: Rc<Cell<usize>>,
}

impl Fuse {
    pub fn new(clones: usize) -> Self {
        Self {
            remaining: Rc::new(Cell::new(clones)),
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }

    /// Allow `clones` more clones.
    pub fn reset(&self, clones: usize) {
        self.remaining.set(clones);
    }

    fn burn(&self) {
        let left = self.remaining.get();
        if left == 0 {
            panic!("clone bomb detonated");
        }
        self.remaining.set(left - 1);
    }
}

/// A tracked value whose `clone` panics once its fuse is spent.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CloneBomb<V> {
    inner: Tracked<V>,
    fuse: FuseField,
}

impl<V> CloneBomb<V> {
    pub fn value(&self) -> &V {
        self.inner.value()
    }
}

impl<V: Clone> Clone for CloneBomb<V> {
    fn clone(&self) -> Self {
        self.fuse.0.burn();
        Self {
            inner: self.inner.clone(),
            fuse: self.fuse.clone(),
        }
    }
}

/// A [`Fuse`] that takes no part in comparisons.
#[derive(Clone, Debug)]
struct FuseField(Fuse);

impl PartialEq for FuseField {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for FuseField {}

impl PartialOrd for FuseField {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FuseField {
    fn cmp(&self, _: &Self) -> Ordering {
        Ordering::Equal
    }
}

/// Error returned by [`FailAfter`] once its budget is spent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildFailed {
    /// Successful builds before this failure.
    pub after: usize,
}

impl fmt::Display for BuildFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "builder failed after {} elements", self.after)
    }
}

impl Error for BuildFailed {}

/// A fallible element builder that succeeds `successes` times.
#[derive(Clone, Debug)]
pub struct FailAfter {
    remaining: usize,
    built: usize,
}

impl FailAfter {
    pub fn new(successes: usize) -> Self {
        Self {
            remaining: successes,
            built: 0,
        }
    }

    /// Build a tracked `value`, or fail if the budget is spent.
    pub fn build<V>(&mut self, counter: &DropCounter, value: V) -> Result<Tracked<V>, BuildFailed> {
        if self.remaining == 0 {
            return Err(BuildFailed { after: self.built });
        }
        self.remaining -= 1;
        self.built += 1;
        Ok(counter.track(value))
    }

    /// An indexed builder closure producing `Tracked(index)`.
    pub fn builder(
        mut self,
        counter: &DropCounter,
    ) -> impl FnMut(usize) -> Result<Tracked<usize>, BuildFailed> {
        let counter = counter.clone();
        move |index| self.build(&counter, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_tracks_lifecycle() {
        let counter = DropCounter::new();
        let a = counter.track(1);
        let b = a.clone();
        assert_eq!(counter.live(), 2);
        drop(a);
        drop(b);
        assert_eq!(counter.created(), 1);
        assert_eq!(counter.clones(), 1);
        assert_eq!(counter.drops(), 2);
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn bomb_detonates_after_fuse() {
        let counter = DropCounter::new();
        let fuse = Fuse::new(1);
        let bomb = counter.bomb(7, &fuse);
        let copy = bomb.clone();
        assert_eq!(copy.value(), &7);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| bomb.clone()));
        assert!(result.is_err());
        assert_eq!(counter.clones(), 1);
    }

    #[test]
    fn fail_after_counts_successes() {
        let counter = DropCounter::new();
        let mut build = FailAfter::new(2).builder(&counter);
        assert!(build(0).is_ok());
        assert!(build(1).is_ok());
        assert_eq!(build(2).unwrap_err(), BuildFailed { after: 2 });
        assert_eq!(counter.live(), 0);
    }
}
