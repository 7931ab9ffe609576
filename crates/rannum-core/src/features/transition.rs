//! Multi-lag transition probability matrices
//!
//! For step `s`, cell `(i, j)` counts positions `p` with `seq[p] = i` and
//! `seq[p + s] = j`. Steps are independent of each other, so with the
//! `parallel` feature they are computed concurrently.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::TransitionNormalization;
use crate::schema::TRANSITIONS_PER_STEP;
use crate::sequence::DIGITS;

/// Raw transition counts for one step
pub type TransitionCounts = [[u64; DIGITS]; DIGITS];

/// Normalized transition matrix for one step
pub type TransitionMatrix = [[f64; DIGITS]; DIGITS];

/// Count `(seq[p], seq[p + step])` pairs
///
/// All zero when the sequence has no pair at distance `step` (N <= step).
pub fn transition_counts(digits: &[u8], step: usize) -> TransitionCounts {
    let mut counts = [[0u64; DIGITS]; DIGITS];
    if step == 0 || digits.len() <= step {
        return counts;
    }
    for (&from, &to) in digits.iter().zip(&digits[step..]) {
        counts[usize::from(from)][usize::from(to)] += 1;
    }
    counts
}

/// Normalize transition counts
pub fn normalize_counts(
    counts: &TransitionCounts,
    normalization: TransitionNormalization,
) -> TransitionMatrix {
    let mut matrix = [[0.0; DIGITS]; DIGITS];
    match normalization {
        TransitionNormalization::PerRow => {
            for (row, out) in counts.iter().zip(matrix.iter_mut()) {
                let total: u64 = row.iter().sum();
                if total == 0 {
                    continue;
                }
                for (&c, cell) in row.iter().zip(out.iter_mut()) {
                    *cell = c as f64 / total as f64;
                }
            }
        }
        TransitionNormalization::Total => {
            let total: u64 = counts.iter().flatten().sum();
            if total == 0 {
                return matrix;
            }
            for (row, out) in counts.iter().zip(matrix.iter_mut()) {
                for (&c, cell) in row.iter().zip(out.iter_mut()) {
                    *cell = c as f64 / total as f64;
                }
            }
        }
    }
    matrix
}

/// Transition matrix for a single step
pub fn transition_matrix(
    digits: &[u8],
    step: usize,
    normalization: TransitionNormalization,
) -> TransitionMatrix {
    normalize_counts(&transition_counts(digits, step), normalization)
}

fn flatten(matrix: &TransitionMatrix) -> impl Iterator<Item = f64> + '_ {
    matrix.iter().flat_map(|row| row.iter().copied())
}

/// Transition features for steps `1..=max_step`, row-major per step
pub fn transition_features(
    digits: &[u8],
    max_step: usize,
    normalization: TransitionNormalization,
) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    let matrices: Vec<TransitionMatrix> = (1..=max_step)
        .into_par_iter()
        .map(|step| transition_matrix(digits, step, normalization))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let matrices: Vec<TransitionMatrix> = (1..=max_step)
        .map(|step| transition_matrix(digits, step, normalization))
        .collect();

    let mut values = Vec::with_capacity(max_step * TRANSITIONS_PER_STEP);
    for matrix in &matrices {
        values.extend(flatten(matrix));
    }
    values
}
