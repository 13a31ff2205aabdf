//! Iterator category tags and tag-directed dispatch.
//!
//! Each cursor type names exactly one tag as its `Category`. The tag types
//! form a refinement chain:
//!
//! ```text
//! InputTag ⊂ ForwardTag ⊂ BidirectionalTag ⊂ RandomAccessTag
//! ```
//!
//! Generic traversal utilities are written once against [`Category`]; the
//! implementation for the cursor's tag type is selected at compile time, so
//! the complexity of `distance`/`advance` is guaranteed by the type.

use std::fmt;

use crate::cursor::{BidirectionalCursor, Cursor, RandomAccessCursor};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::InputTag {}
    impl Sealed for super::ForwardTag {}
    impl Sealed for super::BidirectionalTag {}
    impl Sealed for super::RandomAccessTag {}
}

/// Runtime mirror of a category tag, ordered by capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryKind {
    /// Single-pass, forward only.
    Input,
    /// Multi-pass, forward only.
    Forward,
    /// Multi-pass, steps in both directions.
    Bidirectional,
    /// Constant-time offset and difference.
    RandomAccess,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "input",
            Self::Forward => "forward",
            Self::Bidirectional => "bidirectional",
            Self::RandomAccess => "random-access",
        };
        f.write_str(name)
    }
}

/// A zero-size category marker.
pub trait Tag: sealed::Sealed + Copy + Default + fmt::Debug + 'static {
    /// The capability this tag stands for.
    const KIND: CategoryKind;
}

/// Single-pass input traversal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct InputTag;

/// Multi-pass forward traversal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ForwardTag;

/// Forward and backward traversal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BidirectionalTag;

/// Constant-time jumps and differences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RandomAccessTag;

impl Tag for InputTag {
    const KIND: CategoryKind = CategoryKind::Input;
}

impl Tag for ForwardTag {
    const KIND: CategoryKind = CategoryKind::Forward;
}

impl Tag for BidirectionalTag {
    const KIND: CategoryKind = CategoryKind::Bidirectional;
}

impl Tag for RandomAccessTag {
    const KIND: CategoryKind = CategoryKind::RandomAccess;
}

/// `Self` offers at least the capabilities of `Weaker`.
///
/// Implemented along the chain (every tag refines itself and all tags
/// before it). Use it to demand a minimum category in a bound:
/// `C::Category: Refines<BidirectionalTag>`.
pub trait Refines<Weaker: Tag>: Tag {}

impl Refines<InputTag> for InputTag {}
impl Refines<InputTag> for ForwardTag {}
impl Refines<InputTag> for BidirectionalTag {}
impl Refines<InputTag> for RandomAccessTag {}
impl Refines<ForwardTag> for ForwardTag {}
impl Refines<ForwardTag> for BidirectionalTag {}
impl Refines<ForwardTag> for RandomAccessTag {}
impl Refines<BidirectionalTag> for BidirectionalTag {}
impl Refines<BidirectionalTag> for RandomAccessTag {}
impl Refines<RandomAccessTag> for RandomAccessTag {}

/// Traversal algorithms specialised per tag for cursor type `C`.
///
/// `<C::Category as Category<C>>` is the single entry point used by
/// [`distance`](crate::distance) and [`advance`](crate::advance).
pub trait Category<C>: Tag {
    /// Number of steps from `first` to `last`.
    fn distance(first: &C, last: &C) -> isize;

    /// Move `cursor` by `n` positions.
    fn advance(cursor: &mut C, n: isize);
}

fn walk<C: Cursor>(first: &C, last: &C) -> isize {
    let mut cur = first.clone();
    let mut n = 0isize;
    while cur != *last {
        cur.step();
        n += 1;
    }
    n
}

fn step_forward<C: Cursor>(cursor: &mut C, n: isize) {
    assert!(
        n >= 0,
        "cannot advance a forward-only cursor by a negative offset ({n})"
    );
    for _ in 0..n {
        cursor.step();
    }
}

impl<C: Cursor> Category<C> for InputTag {
    fn distance(first: &C, last: &C) -> isize {
        walk(first, last)
    }

    fn advance(cursor: &mut C, n: isize) {
        step_forward(cursor, n);
    }
}

impl<C: Cursor> Category<C> for ForwardTag {
    fn distance(first: &C, last: &C) -> isize {
        walk(first, last)
    }

    fn advance(cursor: &mut C, n: isize) {
        step_forward(cursor, n);
    }
}

impl<C: BidirectionalCursor> Category<C> for BidirectionalTag {
    fn distance(first: &C, last: &C) -> isize {
        walk(first, last)
    }

    fn advance(cursor: &mut C, n: isize) {
        if n >= 0 {
            for _ in 0..n {
                cursor.step();
            }
        } else {
            for _ in 0..n.unsigned_abs() {
                cursor.step_back();
            }
        }
    }
}

impl<C: RandomAccessCursor> Category<C> for RandomAccessTag {
    fn distance(first: &C, last: &C) -> isize {
        last.offset_from(first)
    }

    fn advance(cursor: &mut C, n: isize) {
        cursor.jump(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_refines<Strong: Refines<Weak>, Weak: Tag>() {}

    #[test]
    fn kinds_are_ordered_by_capability() {
        assert!(InputTag::KIND < ForwardTag::KIND);
        assert!(ForwardTag::KIND < BidirectionalTag::KIND);
        assert!(BidirectionalTag::KIND < RandomAccessTag::KIND);
    }

    #[test]
    fn chain_refines_every_predecessor() {
        assert_refines::<RandomAccessTag, InputTag>();
        assert_refines::<RandomAccessTag, BidirectionalTag>();
        assert_refines::<BidirectionalTag, ForwardTag>();
        assert_refines::<ForwardTag, ForwardTag>();
    }

    #[test]
    fn kind_display() {
        assert_eq!(RandomAccessTag::KIND.to_string(), "random-access");
        assert_eq!(InputTag::KIND.to_string(), "input");
    }
}
