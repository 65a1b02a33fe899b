use std::collections::HashMap;

use log::debug;
use rand::Rng;
use serde::Serialize;

use crate::error::PrepError;

/// Repetition-disjoint train/test partitions, one row per fold.
///
/// Within each fold, train and test rows are disjoint and together cover the
/// full repetition id set. Train rows are sorted ascending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SplitTables {
    pub train_reps: Vec<Vec<i8>>,
    pub test_reps: Vec<Vec<i8>>,
}

/// How many consecutive rejected draws trigger a full restart of the
/// balanced search.
const MAX_RETRIES: usize = 10;

/// All C(n, k) combinations of `ids`, in lexicographic order.
fn combinations(ids: &[i8], k: usize) -> Vec<Vec<i8>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(k);
    fn recurse(ids: &[i8], k: usize, start: usize, current: &mut Vec<i8>, out: &mut Vec<Vec<i8>>) {
        if current.len() == k {
            out.push(current.clone());
            return;
        }
        for i in start..ids.len() {
            current.push(ids[i]);
            recurse(ids, k, i + 1, current, out);
            current.pop();
        }
    }
    recurse(ids, k, 0, &mut current, &mut out);
    out
}

fn complement(rep_ids: &[i8], test: &[i8]) -> Vec<i8> {
    let mut train: Vec<i8> = rep_ids.iter().copied().filter(|r| !test.contains(r)).collect();
    train.sort_unstable();
    train
}

fn enumerate_pool(
    rep_ids: &[i8],
    nb_test: usize,
    base: Option<&[i8]>,
) -> Result<(Vec<Vec<i8>>, Option<Vec<i8>>), PrepError> {
    if nb_test == 0 || nb_test >= rep_ids.len() {
        return Err(PrepError::NotEnoughReps {
            nb_test,
            nb_reps: rep_ids.len(),
        });
    }
    let mut pool = combinations(rep_ids, nb_test);
    let pinned = match base {
        Some(base) => {
            // Exact match against the enumeration, so `base` must be listed
            // in the same order the ids appear in `rep_ids`.
            let pos = pool
                .iter()
                .position(|combo| combo.as_slice() == base)
                .ok_or_else(|| PrepError::BaseNotFound(base.to_vec()))?;
            Some(pool.remove(pos))
        }
        None => None,
    };
    Ok((pool, pinned))
}

/// Balanced k-fold split: one fold per repetition id, each testing `nb_test`
/// ids, such that every id appears as a test member exactly `nb_test` times
/// across the folds.
///
/// Folds are found by randomized search: draw an unused combination, reject it
/// when some id would exceed `nb_test` test appearances so far, and restart
/// from fold 0 after ten consecutive rejections or an exhausted pool. A
/// rejected draw is *not* returned to the pool, so the candidate pool shrinks
/// until the next full reset restores it; this mirrors the behaviour the
/// downstream experiments were run with. An optional `base` test set is
/// pinned as fold 0.
pub fn gen_split_balanced_with<R: Rng + ?Sized>(
    rep_ids: &[i8],
    nb_test: usize,
    base: Option<&[i8]>,
    rng: &mut R,
) -> Result<SplitTables, PrepError> {
    let nb_splits = rep_ids.len();
    let (master, pinned) = enumerate_pool(rep_ids, nb_test, base)?;

    let mut test_reps: Vec<Vec<i8>> = vec![Vec::new(); nb_splits];
    let first_free = match &pinned {
        Some(combo) => {
            test_reps[0] = combo.clone();
            1
        }
        None => 0,
    };

    let mut pool = master.clone();
    let mut cur_split = first_free;
    let mut reset_counter = 0;
    while cur_split < nb_splits {
        if reset_counter >= MAX_RETRIES || pool.is_empty() {
            debug!(
                "balanced split search stuck at fold {cur_split}; restarting with a fresh pool"
            );
            pool = master.clone();
            for row in test_reps.iter_mut().skip(first_free) {
                row.clear();
            }
            cur_split = first_free;
            reset_counter = 0;
        }

        let drawn = pool.swap_remove(rng.gen_range(0..pool.len()));
        test_reps[cur_split] = drawn;

        let mut counts: HashMap<i8, usize> = HashMap::new();
        for row in &test_reps[..=cur_split] {
            for &id in row {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        if counts.values().any(|&c| c > nb_test) {
            // Over-tested id: discard the draw (without refunding the pool).
            test_reps[cur_split].clear();
            reset_counter += 1;
        } else {
            cur_split += 1;
            reset_counter = 0;
        }
    }

    let train_reps = test_reps.iter().map(|t| complement(rep_ids, t)).collect();
    Ok(SplitTables {
        train_reps,
        test_reps,
    })
}

/// [`gen_split_balanced_with`] seeded from the thread-local RNG.
pub fn gen_split_balanced(
    rep_ids: &[i8],
    nb_test: usize,
    base: Option<&[i8]>,
) -> Result<SplitTables, PrepError> {
    gen_split_balanced_with(rep_ids, nb_test, base, &mut rand::thread_rng())
}

/// `nb_splits` random folds of `nb_test` test ids each; a combination used by
/// an earlier fold is never reused within the call, but no cross-fold balance
/// is enforced.
pub fn gen_split_rand_with<R: Rng + ?Sized>(
    rep_ids: &[i8],
    nb_test: usize,
    nb_splits: usize,
    base: Option<&[i8]>,
    rng: &mut R,
) -> Result<SplitTables, PrepError> {
    let (mut pool, pinned) = enumerate_pool(rep_ids, nb_test, base)?;

    let mut test_reps: Vec<Vec<i8>> = Vec::with_capacity(nb_splits);
    if let Some(combo) = pinned {
        test_reps.push(combo);
    }
    if nb_splits.saturating_sub(test_reps.len()) > pool.len() {
        return Err(PrepError::NotEnoughCombinations {
            requested: nb_splits,
            available: pool.len() + test_reps.len(),
        });
    }
    while test_reps.len() < nb_splits {
        let drawn = pool.swap_remove(rng.gen_range(0..pool.len()));
        test_reps.push(drawn);
    }

    let train_reps = test_reps.iter().map(|t| complement(rep_ids, t)).collect();
    Ok(SplitTables {
        train_reps,
        test_reps,
    })
}

/// [`gen_split_rand_with`] seeded from the thread-local RNG.
pub fn gen_split_rand(
    rep_ids: &[i8],
    nb_test: usize,
    nb_splits: usize,
    base: Option<&[i8]>,
) -> Result<SplitTables, PrepError> {
    gen_split_rand_with(rep_ids, nb_test, nb_splits, base, &mut rand::thread_rng())
}
