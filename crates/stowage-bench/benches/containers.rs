//! Criterion micro-benchmarks for growth, insertion and sorting across the
//! three container engines.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use stowage_bench::{insert_positions, shuffled_keys};
use stowage_core::distance;
use stowage_deque::Deque;
use stowage_list::List;
use stowage_vector::Vector;

const N: usize = 10_000;

/// Benchmark: push 10K elements onto an empty container.
fn bench_push_back_10k(c: &mut Criterion) {
    c.bench_function("vector_push_back_10k", |b| {
        b.iter(|| {
            let mut v = Vector::new();
            for i in 0..N as u64 {
                v.push_back(i).unwrap();
            }
            black_box(v.len());
        });
    });

    c.bench_function("deque_push_back_10k", |b| {
        b.iter(|| {
            let mut d: Deque<u64> = Deque::new();
            for i in 0..N as u64 {
                d.push_back(i).unwrap();
            }
            black_box(d.len());
        });
    });

    c.bench_function("list_push_back_10k", |b| {
        b.iter(|| {
            let mut l = List::new();
            for i in 0..N as u64 {
                l.push_back(i).unwrap();
            }
            black_box(l.len());
        });
    });
}

/// Benchmark: alternate front and back pushes, then drain from the front.
fn bench_deque_two_ended_10k(c: &mut Criterion) {
    c.bench_function("deque_two_ended_10k", |b| {
        b.iter(|| {
            let mut d: Deque<u64> = Deque::new();
            for i in 0..N as u64 {
                if i % 2 == 0 {
                    d.push_front(i).unwrap();
                } else {
                    d.push_back(i).unwrap();
                }
            }
            let mut sum = 0u64;
            while let Some(x) = d.pop_front() {
                sum = sum.wrapping_add(x);
            }
            black_box(sum);
        });
    });
}

/// Benchmark: 2K inserts at seeded positions.
fn bench_random_insert_2k(c: &mut Criterion) {
    let positions = insert_positions(2_000, 42);

    c.bench_function("vector_random_insert_2k", |b| {
        b.iter(|| {
            let mut v = Vector::new();
            for (i, &at) in positions.iter().enumerate() {
                v.insert(at, i).unwrap();
            }
            black_box(v.len());
        });
    });

    c.bench_function("deque_random_insert_2k", |b| {
        b.iter(|| {
            let mut d: Deque<usize> = Deque::new();
            for (i, &at) in positions.iter().enumerate() {
                d.insert(at, i).unwrap();
            }
            black_box(d.len());
        });
    });
}

/// Benchmark: list merge sort over 10K shuffled keys.
fn bench_list_sort_10k(c: &mut Criterion) {
    let keys = shuffled_keys(N, 7);

    c.bench_function("list_sort_10k", |b| {
        b.iter_batched(
            || keys.iter().copied().collect::<List<u64>>(),
            |mut l| {
                l.sort();
                black_box(l.front().copied());
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark: O(1) random-access distance versus O(n) bidirectional walk.
fn bench_distance_10k(c: &mut Criterion) {
    let d: Deque<u64> = (0..N as u64).collect();
    let l: List<u64> = (0..N as u64).collect();

    c.bench_function("distance_deque_10k", |b| {
        b.iter(|| black_box(distance(&d.begin(), &d.end())));
    });

    c.bench_function("distance_list_10k", |b| {
        b.iter(|| black_box(distance(&l.begin(), &l.end())));
    });
}

criterion_group!(
    benches,
    bench_push_back_10k,
    bench_deque_two_ended_10k,
    bench_random_insert_2k,
    bench_list_sort_10k,
    bench_distance_10k
);
criterion_main!(benches);
