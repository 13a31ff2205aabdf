//! Property tests: `Vector` against `std::vec::Vec` as a reference model.

use proptest::prelude::*;
use stowage_test_utils::fixtures::collect_range;
use stowage_test_utils::DropCounter;
use stowage_vector::Vector;

#[derive(Clone, Debug)]
enum Op {
    Push(i32),
    Pop,
    Insert(usize, i32),
    InsertN(usize, usize, i32),
    Erase(usize),
    EraseRange(usize, usize),
    Truncate(usize),
    Resize(usize, i32),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Push),
        1 => Just(Op::Pop),
        2 => (any::<usize>(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
        1 => (any::<usize>(), 0usize..8, any::<i32>()).prop_map(|(i, n, v)| Op::InsertN(i, n, v)),
        2 => any::<usize>().prop_map(Op::Erase),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::EraseRange(a, b)),
        1 => (0usize..40).prop_map(Op::Truncate),
        1 => (0usize..40, any::<i32>()).prop_map(|(n, v)| Op::Resize(n, v)),
        1 => Just(Op::Clear),
    ]
}

fn apply(v: &mut Vector<i32>, model: &mut Vec<i32>, op: Op) {
    match op {
        Op::Push(x) => {
            v.push_back(x).unwrap();
            model.push(x);
        }
        Op::Pop => assert_eq!(v.pop_back(), model.pop()),
        Op::Insert(i, x) => {
            let i = i % (model.len() + 1);
            v.insert(i, x).unwrap();
            model.insert(i, x);
        }
        Op::InsertN(i, n, x) => {
            let i = i % (model.len() + 1);
            v.insert_n(i, n, &x).unwrap();
            model.splice(i..i, std::iter::repeat(x).take(n));
        }
        Op::Erase(i) => {
            if !model.is_empty() {
                let i = i % model.len();
                assert_eq!(v.erase(i), model.remove(i));
            }
        }
        Op::EraseRange(a, b) => {
            let a = a % (model.len() + 1);
            let b = a + b % (model.len() - a + 1);
            v.erase_range(a..b);
            model.drain(a..b);
        }
        Op::Truncate(n) => {
            v.truncate(n);
            model.truncate(n);
        }
        Op::Resize(n, x) => {
            v.resize(n, &x).unwrap();
            model.resize(n, x);
        }
        Op::Clear => {
            v.clear();
            model.clear();
        }
    }
}

proptest! {
    #[test]
    fn matches_reference_model(ops in prop::collection::vec(op(), 0..64)) {
        let mut v = Vector::new();
        let mut model = Vec::new();
        for op in ops {
            apply(&mut v, &mut model, op);
            prop_assert_eq!(v.as_slice(), model.as_slice());
            prop_assert!(v.len() <= v.capacity());
        }
    }

    #[test]
    fn push_back_grows_by_one_and_preserves_prefix(values in prop::collection::vec(any::<u16>(), 0..200)) {
        let mut v = Vector::new();
        let mut last_cap = 0;
        for (i, x) in values.iter().enumerate() {
            let cap_before = v.capacity();
            v.push_back(*x).unwrap();
            prop_assert_eq!(v.len(), i + 1);
            prop_assert_eq!(&v[..], &values[..=i]);
            prop_assert!(v.capacity() >= last_cap);
            if cap_before <= i {
                prop_assert_eq!(v.capacity(), (2 * cap_before).max(1));
            }
            last_cap = v.capacity();
        }
    }

    #[test]
    fn round_trip_through_cursors(values in prop::collection::vec(any::<i64>(), 0..100)) {
        let v = Vector::from_slice(&values).unwrap();
        prop_assert_eq!(collect_range(v.begin(), v.end()), values.clone());
        let owned: Vec<i64> = v.into_iter().collect();
        prop_assert_eq!(owned, values);
    }

    #[test]
    fn no_leaks_under_churn(n in 0usize..50, cut in 0usize..50) {
        let counter = DropCounter::new();
        {
            let mut v: Vector<_> = (0..n).map(|i| counter.track(i)).collect();
            let cut = cut.min(v.len());
            v.erase_range(0..cut);
            let extra = v.clone();
            v.insert_slice(0, &extra).unwrap();
        }
        prop_assert_eq!(counter.live(), 0);
    }
}
