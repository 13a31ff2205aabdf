//! Integration test: indexing, cursors and failed construction across
//! buffer boundaries.

use stowage_core::{distance, next, prev, RandomAccessCursor, ReadCursor};
use stowage_deque::{BuildError, Deque};
use stowage_test_utils::{BuildFailed, DropCounter, FailAfter};

#[test]
fn alternating_pushes_agree_with_cursor_reads() {
    let mut d: Deque<u32, 4> = Deque::new();
    for i in 0..9 {
        if i % 2 == 0 {
            d.push_back(i).unwrap();
        } else {
            d.push_front(i).unwrap();
        }
    }
    assert_eq!(d.iter().copied().collect::<Vec<_>>(), vec![7, 5, 3, 1, 0, 2, 4, 6, 8]);
    for i in 0..d.len() {
        assert_eq!(d[i], *next(d.begin(), i).get());
        assert_eq!(d[i], *prev(d.end(), d.len() - i).get());
    }
    assert_eq!(d[7], 6);
}

#[test]
fn back_pushes_index_and_jump_agree() {
    let mut d: Deque<u32, 4> = Deque::new();
    for i in 0..10 {
        d.push_back(i).unwrap();
    }
    assert_eq!(d[7], 7);
    let mut c = d.begin();
    c.jump(7);
    assert_eq!(*c.get(), d[7]);
    c.jump(-7);
    assert_eq!(c, d.begin());
}

#[test]
fn distance_spans_buffers() {
    let d: Deque<u32, 4> = (0..30).collect();
    for n in 0..30 {
        let it = next(d.begin(), 3.min(30 - n));
        let target = next(it, n.min(27));
        assert_eq!(distance(&it, &target), n.min(27) as isize);
    }
}

#[test]
fn failed_construction_releases_everything() {
    let counter = DropCounter::new();
    let err = Deque::<_, 4>::try_from_fn(5, FailAfter::new(2).builder(&counter)).unwrap_err();
    match err {
        BuildError::Element { constructed, source } => {
            assert_eq!(constructed, 2);
            assert_eq!(source, BuildFailed { after: 2 });
        }
        BuildError::Storage(err) => panic!("unexpected storage failure: {err}"),
    }
    assert_eq!(counter.created(), 2);
    assert_eq!(counter.drops(), 2);
    assert_eq!(counter.live(), 0);
}

#[test]
fn too_many_elements_is_a_length_error() {
    let d: Result<Deque<u64>, _> = Deque::from_elem(usize::MAX, &0);
    assert!(d.is_err());
    let mut d: Deque<u64> = Deque::new();
    assert!(d.insert_n(0, usize::MAX, &0).is_err());
    assert!(d.is_empty());
}

#[test]
fn positions_are_stable_under_end_pushes() {
    let mut d: Deque<u32, 4> = (0..6).collect();
    let third: *const u32 = &d[2];
    for i in 0..50 {
        d.push_front(i).unwrap();
        d.push_back(i).unwrap();
    }
    assert_eq!(&d[52] as *const u32, third);
}
