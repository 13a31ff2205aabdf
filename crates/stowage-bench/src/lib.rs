//! Deterministic workloads for the Stowage container benchmarks.
//!
//! - [`shuffled_keys`]: a seeded permutation of `0..n`
//! - [`insert_positions`]: seeded insertion indices for a growing container

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// A permutation of `0..n`, identical for identical seeds.
pub fn shuffled_keys(n: usize, seed: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut keys: Vec<u64> = (0..n as u64).collect();
    keys.shuffle(&mut rng);
    keys
}

/// `n` insertion indices; the `i`-th is valid for a container of length
/// `i`.
pub fn insert_positions(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|len| rng.random_range(0..=len)).collect()
}
