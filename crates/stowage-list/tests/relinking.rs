//! Integration test: splice, merge, sort and reverse move payloads without
//! cloning or dropping them.

use stowage_list::List;
use stowage_test_utils::fixtures::move_only_seq;
use stowage_test_utils::{DropCounter, MoveOnly};

fn values(list: &List<MoveOnly<usize>>) -> Vec<usize> {
    list.iter().map(|m| *m.value()).collect()
}

#[test]
fn sort_and_reverse_relink_only() {
    let counter = DropCounter::new();
    let mut list: List<_> = [4usize, 1, 3, 0, 2]
        .into_iter()
        .map(|i| counter.move_only(i))
        .collect();
    let created = counter.created();

    list.sort();
    assert_eq!(values(&list), vec![0, 1, 2, 3, 4]);
    list.reverse();
    assert_eq!(values(&list), vec![4, 3, 2, 1, 0]);

    assert_eq!(counter.created(), created);
    assert_eq!(counter.clones(), 0);
    assert_eq!(counter.drops(), 0);
}

#[test]
fn cross_list_moves_never_clone() {
    let counter = DropCounter::new();
    let mut a: List<_> = move_only_seq(&counter, 0..4).into_iter().collect();
    let mut b: List<_> = move_only_seq(&counter, 10..14).into_iter().collect();

    // SAFETY: every position is taken from the list it is used with.
    unsafe {
        // Move 11 and 12 into the middle of `a`.
        let first = b.next_pos(b.begin_pos());
        let last = b.advance_pos(first, 2);
        let at = a.advance_pos(a.begin_pos(), 2);
        a.splice_range(at, &mut b, first, last);
        assert_eq!(values(&a), vec![0, 1, 11, 12, 2, 3]);
        assert_eq!(values(&b), vec![10, 13]);

        let from = b.begin_pos();
        a.splice_one(a.end_pos(), &mut b, from);
        a.splice_all(a.begin_pos(), &mut b);
    }
    assert_eq!(values(&a), vec![13, 0, 1, 11, 12, 2, 3, 10]);
    assert!(b.is_empty());

    assert_eq!(counter.clones(), 0);
    assert_eq!(counter.drops(), 0);
    drop(a);
    assert_eq!(counter.live(), 0);
}

#[test]
fn merge_moves_and_keeps_left_first() {
    let counter = DropCounter::new();
    let mut a: List<_> = [1usize, 3, 5].into_iter().map(|i| counter.move_only(i)).collect();
    let mut b: List<_> = [1usize, 2, 6].into_iter().map(|i| counter.move_only(i)).collect();
    let a_head = a.begin_pos();

    a.merge(&mut b);
    assert_eq!(values(&a), vec![1, 1, 2, 3, 5, 6]);
    // Equal keys keep the receiving list's element first.
    assert_eq!(a.begin_pos(), a_head);
    assert!(b.is_empty());
    assert_eq!(counter.clones(), 0);
    assert_eq!(counter.drops(), 0);
}

#[test]
fn moved_elements_keep_their_positions() {
    let counter = DropCounter::new();
    let mut donor: List<_> = move_only_seq(&counter, 0..3).into_iter().collect();
    let mut receiver: List<_> = move_only_seq(&counter, 10..12).into_iter().collect();
    let mut empty = List::new();

    // SAFETY: `middle` names a donor element; it stays valid as its node
    // moves from list to list.
    unsafe {
        let middle = donor.next_pos(donor.begin_pos());
        empty.splice_all(empty.end_pos(), &mut donor);
        assert_eq!(values(&empty), vec![0, 1, 2]);
        assert_eq!(empty.get(middle).map(|m| *m.value()), Some(1));

        receiver.splice_one(receiver.begin_pos(), &mut empty, middle);
        assert_eq!(values(&receiver), vec![1, 10, 11]);
        assert_eq!(receiver.begin_pos(), middle);
        receiver.erase(middle);
    }
    assert!(donor.is_empty());
    assert_eq!(values(&empty), vec![0, 2]);
    assert_eq!(counter.drops(), 1);
    assert_eq!(counter.clones(), 0);
}

#[test]
fn moved_lists_are_independent_afterwards() {
    let mut a: List<i32> = [1, 2].into_iter().collect();
    let mut b: List<i32> = [3, 4].into_iter().collect();
    a.append(&mut b);
    b.push_back(5).unwrap();
    drop(a);
    assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec![5]);
}
