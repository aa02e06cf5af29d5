//! Stratified train/test split.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Split row indices so both parts keep the class ratio of `y`.
///
/// Each class with at least two rows contributes at least one row to each
/// side. Returns `(train, test)`, each sorted.
pub fn stratified_split(y: &[u8], test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = y.len();
    let n_test = (test_fraction.clamp(0.0, 1.0) * n as f64).ceil() as usize;

    let mut train = Vec::with_capacity(n);
    let mut test = Vec::with_capacity(n_test);

    for class in [0u8, 1u8] {
        let mut rows: Vec<usize> = (0..n).filter(|&i| y[i] == class).collect();
        if rows.is_empty() {
            continue;
        }
        let n_k = rows.len();
        let mut take = ((n_k * n_test) as f64 / n.max(1) as f64).round() as usize;
        if n_k >= 2 {
            take = take.clamp(1, n_k - 1);
        } else {
            take = 0;
        }
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..take]);
        train.extend_from_slice(&rows[take..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}
