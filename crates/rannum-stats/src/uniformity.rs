//! Chi-square goodness of fit against a uniform expectation
//!
//! Used for pattern-length (poker) tests: count overlapping substrings of
//! length L over a 10-symbol alphabet and compare against `total / 10^L`.
//!
//! Only observed cells need to be visited. With `E = total / cells`,
//!
//! ```text
//! sum((O - E)^2 / E) = sum(O^2) / E - total
//! ```
//!
//! because `sum(O) = sum(E) = total`, so unobserved cells are accounted for
//! without materializing all `10^L` of them.

use std::collections::HashMap;

/// Chi-square statistic of observed counts against a uniform distribution
/// over `cells` categories
///
/// `observed` only needs to contain nonzero counts; absent categories are
/// treated as zero. Returns 0 when nothing was observed or `cells` is 0.
pub fn chi_square_uniform<I>(observed: I, cells: u64) -> f64
where
    I: IntoIterator<Item = u64>,
{
    let mut total: u64 = 0;
    let mut sum_sq: u128 = 0;
    for count in observed {
        total += count;
        sum_sq += u128::from(count) * u128::from(count);
    }

    if total == 0 || cells == 0 {
        return 0.0;
    }

    let expected = total as f64 / cells as f64;
    (sum_sq as f64 / expected - total as f64).max(0.0)
}

/// Chi-square statistic of overlapping `length`-grams of a digit sequence
///
/// Each window is encoded as a base-`alphabet` integer. Returns 0 when the
/// sequence is shorter than `length` or `length` is 0.
pub fn ngram_chi_square(symbols: &[u8], length: usize, alphabet: u64) -> f64 {
    if length == 0 || symbols.len() < length {
        return 0.0;
    }

    let mut counts: HashMap<u64, u64> = HashMap::new();
    for window in symbols.windows(length) {
        let code = window
            .iter()
            .fold(0u64, |acc, &s| acc * alphabet + u64::from(s));
        *counts.entry(code).or_insert(0) += 1;
    }

    let cells = alphabet.saturating_pow(length as u32);
    chi_square_uniform(counts.into_values(), cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_fit_is_zero() {
        let chi = chi_square_uniform(vec![5; 10], 10);
        assert!(chi.abs() < 1e-12);
    }

    #[test]
    fn test_matches_direct_formula() {
        // O = [8, 2, 0, 0], E = 2.5
        // (5.5^2 + 0.5^2 + 2.5^2 + 2.5^2) / 2.5 = 43.0 / 2.5 = 17.2
        let chi = chi_square_uniform(vec![8, 2], 4);
        assert!((chi - 17.2).abs() < 1e-9);
    }

    #[test]
    fn test_empty_observations() {
        assert_eq!(chi_square_uniform(Vec::<u64>::new(), 10), 0.0);
        assert_eq!(chi_square_uniform(vec![3], 0), 0.0);
    }

    #[test]
    fn test_ngram_single_digits() {
        let symbols: Vec<u8> = (0..10).collect();
        assert!(ngram_chi_square(&symbols, 1, 10).abs() < 1e-12);
    }

    #[test]
    fn test_ngram_constant_sequence_is_structured() {
        let symbols = vec![3u8; 20];
        // All 20 singles in one cell: 20^2 / 2 - 20 = 180
        assert!((ngram_chi_square(&symbols, 1, 10) - 180.0).abs() < 1e-9);
        assert!(ngram_chi_square(&symbols, 2, 10) > ngram_chi_square(&symbols, 1, 10));
    }

    #[test]
    fn test_ngram_too_short() {
        assert_eq!(ngram_chi_square(&[1, 2], 3, 10), 0.0);
        assert_eq!(ngram_chi_square(&[1, 2], 0, 10), 0.0);
    }
}
