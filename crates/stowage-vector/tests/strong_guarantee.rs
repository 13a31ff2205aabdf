//! Integration test: single-element growth either succeeds or leaves the
//! vector exactly as it was.
//!
//! A vector at capacity 2 holding `[A, B]` is asked to append `C`, and
//! building `C` in the new buffer fails. Afterwards the vector must still
//! hold `[A, B]` at capacity 2 with no element cloned, leaked or dropped.

use std::panic::{catch_unwind, AssertUnwindSafe};

use stowage_test_utils::{BuildFailed, DropCounter, FailAfter, Tracked};
use stowage_vector::{BuildError, Vector};

fn full_pair(counter: &DropCounter) -> Vector<Tracked<char>> {
    let mut v = Vector::with_capacity(2).unwrap();
    v.push_back(counter.track('A')).unwrap();
    v.push_back(counter.track('B')).unwrap();
    assert_eq!(v.capacity(), 2);
    v
}

fn contents(v: &Vector<Tracked<char>>) -> Vec<char> {
    v.iter().map(|t| *t.value()).collect()
}

#[test]
fn failed_build_in_new_buffer_is_invisible() {
    let counter = DropCounter::new();
    let mut v = full_pair(&counter);

    let mut fail = FailAfter::new(0);
    let err = v
        .try_emplace_back(|| fail.build(&counter, 'C'))
        .unwrap_err();

    assert_eq!(
        err,
        BuildError::Element {
            constructed: 0,
            source: BuildFailed { after: 0 },
        }
    );
    assert_eq!(v.len(), 2);
    assert_eq!(v.capacity(), 2);
    assert_eq!(contents(&v), vec!['A', 'B']);
    assert_eq!(counter.clones(), 0);
    assert_eq!(counter.drops(), 0);
}

#[test]
fn panicking_build_in_new_buffer_is_invisible() {
    let counter = DropCounter::new();
    let mut v = full_pair(&counter);

    let result = catch_unwind(AssertUnwindSafe(|| {
        let _ = v.try_emplace_back(|| -> Result<Tracked<char>, BuildFailed> {
            panic!("constructor of C failed")
        });
    }));

    assert!(result.is_err());
    assert_eq!(v.len(), 2);
    assert_eq!(v.capacity(), 2);
    assert_eq!(contents(&v), vec!['A', 'B']);
    assert_eq!(counter.live(), 2);
}

#[test]
fn successful_build_after_failure_grows_normally() {
    let counter = DropCounter::new();
    let mut v = full_pair(&counter);
    let _ = v.try_emplace_back(|| Err::<Tracked<char>, _>(BuildFailed { after: 0 }));

    let c = v
        .try_emplace_back(|| Ok::<_, BuildFailed>(counter.track('C')))
        .unwrap();
    assert_eq!(*c.value(), 'C');
    assert_eq!(v.capacity(), 4);
    assert_eq!(contents(&v), vec!['A', 'B', 'C']);
}

#[test]
fn failed_mid_insert_keeps_order() {
    let counter = DropCounter::new();
    let mut v = full_pair(&counter);
    let mut fail = FailAfter::new(0);
    assert!(v.try_emplace(1, || fail.build(&counter, 'X')).is_err());
    assert_eq!(contents(&v), vec!['A', 'B']);
    assert_eq!(v.capacity(), 2);
}
