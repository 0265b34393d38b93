//! Mode sorting and tracking across the frequency sweep.
//!
//! Each frequency column arrives as sorted complex wavenumbers. They are
//! converted to cyclic wavenumbers, spurious values above a hard ceiling are
//! dropped, and the duplicate root pairs produced by the companion
//! linearization are decimated. Tracking then follows a fixed number of
//! branches from one frequency to the next by continuity.
//!
//! ## Tracking
//!
//! At each step every active branch predicts its next value (see
//! [`TrackingRule`]). All (branch, candidate) pairs are ranked by distance
//! to the prediction and assigned greedily, smallest first. Equal distances
//! go to the lower branch index, then the lower candidate index. Candidates
//! left over seed inactive branches in ascending order.

use std::cmp::Ordering;
use std::f64::consts::TAU;

use log::debug;
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::types::{TrackingRule, PAIR_MISMATCH_TOL, WAVENUMBER_CEILING};

/// `|Re k| / 2π`, NaN above [`WAVENUMBER_CEILING`].
pub fn to_cyclic_wavenumbers(column: &[Complex64]) -> Vec<f64> {
    column
        .iter()
        .map(|k| {
            let value = k.re.abs() / TAU;
            if value > WAVENUMBER_CEILING {
                f64::NAN
            } else {
                value
            }
        })
        .collect()
}

/// Largest relative mismatch between the members of each sorted pair.
///
/// Pairs with a NaN member are skipped; an unpaired trailing entry is
/// ignored.
pub fn pair_mismatch(sorted: &[f64]) -> f64 {
    sorted
        .chunks_exact(2)
        .filter(|pair| pair[0].is_finite() && pair[1].is_finite())
        .map(|pair| {
            let scale = pair[0].abs().max(pair[1].abs()).max(f64::MIN_POSITIVE);
            (pair[0] - pair[1]).abs() / scale
        })
        .fold(0.0, f64::max)
}

/// Keep the first entry of every sorted duplicate pair.
///
/// The linearized pencil returns `k` and `-conj(k)` for every propagating
/// mode; after taking `|Re k|` both members carry the same value and sit
/// next to each other in the sorted column.
pub fn decimate_duplicate_pairs(sorted: &[f64]) -> Vec<f64> {
    let mismatch = pair_mismatch(sorted);
    if mismatch > PAIR_MISMATCH_TOL {
        debug!("duplicate root pairs differ by up to {:.3e} (relative)", mismatch);
    }
    sorted.iter().step_by(2).copied().collect()
}

/// Rows produced by [`decimate_duplicate_pairs`] for a column of `len`.
#[inline]
pub fn decimated_len(len: usize) -> usize {
    len.div_ceil(2)
}

/// Full per-column post-processing: cyclic conversion, ceiling, decimation.
pub fn process_column(sorted: &[Complex64]) -> Vec<f64> {
    decimate_duplicate_pairs(&to_cyclic_wavenumbers(sorted))
}

/// Greedy nearest-value assignment.
///
/// `predictions[b]` is the expected value of branch `b` (NaN for inactive
/// branches, which take no part). Returns `assignment[b] = Some(c)` when
/// candidate `c` continues branch `b`.
pub fn assign_nearest(predictions: &[f64], candidates: &[f64]) -> Vec<Option<usize>> {
    let mut assignment = vec![None; predictions.len()];
    let mut used = vec![false; candidates.len()];

    let mut pairs: Vec<(f64, usize, usize)> =
        Vec::with_capacity(predictions.len() * candidates.len());
    for (b, &pred) in predictions.iter().enumerate() {
        if pred.is_nan() {
            continue;
        }
        for (c, &value) in candidates.iter().enumerate() {
            pairs.push(((value - pred).abs(), b, c));
        }
    }

    pairs.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });

    for (_, b, c) in pairs {
        if assignment[b].is_none() && !used[c] {
            assignment[b] = Some(c);
            used[c] = true;
        }
    }

    assignment
}

fn predict(rule: TrackingRule, prev: f64, before: f64) -> f64 {
    match rule {
        TrackingRule::NearestValue => prev,
        TrackingRule::LinearExtrapolation => {
            if prev.is_nan() || before.is_nan() {
                prev
            } else {
                2.0 * prev - before
            }
        }
    }
}

/// Follow `n_modes` branches through the raw (rows × frequencies) matrix.
///
/// Every raw column is read as a set of candidates; only finite values
/// take part, visited in ascending order.
pub fn track_modes(raw: &DMatrix<f64>, n_modes: usize, rule: TrackingRule) -> DMatrix<f64> {
    let n_freqs = raw.ncols();
    let mut tracked = DMatrix::from_element(n_modes, n_freqs, f64::NAN);

    for j in 0..n_freqs {
        let mut candidates: Vec<f64> = raw
            .column(j)
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        candidates.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let predictions: Vec<f64> = (0..n_modes)
            .map(|b| {
                if j == 0 {
                    return f64::NAN;
                }
                let prev = tracked[(b, j - 1)];
                let before = if j >= 2 { tracked[(b, j - 2)] } else { f64::NAN };
                predict(rule, prev, before)
            })
            .collect();

        let assignment = assign_nearest(&predictions, &candidates);
        let mut used = vec![false; candidates.len()];
        for (b, slot) in assignment.iter().enumerate() {
            if let Some(c) = *slot {
                tracked[(b, j)] = candidates[c];
                used[c] = true;
            }
        }

        // seed inactive branches with the smallest leftover candidates
        let mut leftovers = candidates
            .iter()
            .zip(&used)
            .filter(|(_, u)| !**u)
            .map(|(v, _)| *v);
        for (b, pred) in predictions.iter().enumerate() {
            if pred.is_nan() {
                match leftovers.next() {
                    Some(v) => tracked[(b, j)] = v,
                    None => break,
                }
            }
        }
    }

    tracked
}

/// Element-wise `freq / wavenumber`; NaN where the wavenumber is NaN or 0.
pub fn phase_velocities(frequencies: &[f64], wavenumbers: &DMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(wavenumbers.nrows(), wavenumbers.ncols(), |m, i| {
        let k = wavenumbers[(m, i)];
        if k.is_nan() || k == 0.0 {
            f64::NAN
        } else {
            frequencies[i] / k
        }
    })
}
