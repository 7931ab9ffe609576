//! Shannon entropy and redundancy of discrete distributions

/// Shannon entropy (bits) of a distribution given as symbol counts
///
/// Zero counts contribute nothing (`p * log2(p) = 0` at `p = 0`).
/// Returns 0 when all counts are zero.
pub fn shannon_entropy(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }

    let n = total as f64;
    -counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Redundancy of a distribution over `alphabet_size` symbols
///
/// `1 - H / log2(alphabet_size)`, clamped to [0, 1]. 0 means the observed
/// distribution is perfectly uniform, 1 means a single symbol.
///
/// Returns 0 for an empty sample or an alphabet of fewer than two symbols.
pub fn redundancy(counts: &[usize], alphabet_size: usize) -> f64 {
    if alphabet_size < 2 || counts.iter().all(|&c| c == 0) {
        return 0.0;
    }

    let max_entropy = (alphabet_size as f64).log2();
    (1.0 - shannon_entropy(counts) / max_entropy).clamp(0.0, 1.0)
}
