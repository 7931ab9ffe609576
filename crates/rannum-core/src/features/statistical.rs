//! The 27 statistical features
//!
//! Each function here is total: short or constant sequences map to a
//! documented fallback instead of NaN.

use rannum_stats::{lag1_autocorrelation, ngram_chi_square, redundancy, SampleSummary};

use super::AdjacencyPolicy;
use crate::schema::{StatFeature, MAX_PATTERN_LENGTH, STAT_FEATURE_COUNT};
use crate::sequence::{DigitSequence, DIGITS};

/// Bitmask with one bit per digit, all ten set
const ALL_DIGITS_SEEN: u16 = (1 << DIGITS) - 1;

/// Relative frequency of every digit; all zero for an empty sequence
pub fn digit_frequencies(seq: &DigitSequence) -> [f64; DIGITS] {
    let n = seq.len();
    let counts = seq.digit_counts();
    if n == 0 {
        return [0.0; DIGITS];
    }
    counts.map(|c| c as f64 / n as f64)
}

/// Absolute differences between consecutive digits
pub fn adjacent_differences(digits: &[u8]) -> Vec<f64> {
    digits
        .windows(2)
        .map(|pair| f64::from(pair[0].abs_diff(pair[1])))
        .collect()
}

/// Fraction of consecutive pairs counted as adjacent under `policy`; 0 if N < 2
pub fn adjacent_fraction(digits: &[u8], policy: AdjacencyPolicy) -> f64 {
    if digits.len() < 2 {
        return 0.0;
    }
    let hits = digits
        .windows(2)
        .filter(|pair| policy.is_adjacent(pair[0].abs_diff(pair[1])))
        .count();
    hits as f64 / (digits.len() - 1) as f64
}

/// Largest digit frequency over the smallest nonzero one
///
/// With a single distinct digit the ratio falls back to the maximum
/// frequency itself. 0 for an empty sequence.
pub fn max_min_ratio(frequencies: &[f64; DIGITS]) -> f64 {
    let observed: Vec<f64> = frequencies.iter().copied().filter(|&f| f > 0.0).collect();
    let max = observed.iter().copied().fold(0.0_f64, f64::max);
    match observed.len() {
        0 => 0.0,
        1 => max,
        _ => {
            let min = observed.iter().copied().fold(f64::INFINITY, f64::min);
            max / min
        }
    }
}

/// Fraction of interior positions that are strict local maxima or minima
///
/// Divides by `max(1, N - 2)`; 0 if N < 3.
pub fn turning_point_index(digits: &[u8]) -> f64 {
    if digits.len() < 3 {
        return 0.0;
    }
    let turning = digits
        .windows(3)
        .filter(|w| (w[1] > w[0] && w[1] > w[2]) || (w[1] < w[0] && w[1] < w[2]))
        .count();
    turning as f64 / (digits.len() - 2).max(1) as f64
}

/// Index distance from every occurrence to the previous occurrence of the
/// same digit, flattened across digits in order of appearance
///
/// Returns `[0]` when no digit repeats, so mean and std are both 0.
pub fn repetition_gaps(digits: &[u8]) -> Vec<usize> {
    let mut last_seen: [Option<usize>; DIGITS] = [None; DIGITS];
    let mut gaps = Vec::new();

    for (idx, &d) in digits.iter().enumerate() {
        let slot = &mut last_seen[usize::from(d)];
        if let Some(prev) = *slot {
            gaps.push(idx - prev);
        }
        *slot = Some(idx);
    }

    if gaps.is_empty() {
        gaps.push(0);
    }
    gaps
}

/// Lengths of completed coupon-collector episodes
///
/// Scanning left to right, an episode ends as soon as all ten digits have
/// been seen since the previous episode ended. A trailing partial episode
/// is not recorded.
pub fn coupon_episodes(digits: &[u8]) -> Vec<usize> {
    let mut episodes = Vec::new();
    let mut seen: u16 = 0;
    let mut length = 0usize;

    for &d in digits {
        length += 1;
        seen |= 1 << d;
        if seen == ALL_DIGITS_SEEN {
            episodes.push(length);
            seen = 0;
            length = 0;
        }
    }
    episodes
}

/// Mean and sample std of coupon episodes; `(N, 0)` when none completes
pub fn coupon_statistics(digits: &[u8]) -> (f64, f64) {
    let episodes = coupon_episodes(digits);
    if episodes.is_empty() {
        return (digits.len() as f64, 0.0);
    }
    let summary = SampleSummary::from_counts(&episodes);
    (summary.mean, summary.std_dev)
}

/// Pattern-length (poker) test: chi-square of overlapping substrings of
/// `length` digits against the uniform expectation `total / 10^length`
pub fn pattern_length_statistic(digits: &[u8], length: usize) -> f64 {
    ngram_chi_square(digits, length, DIGITS as u64)
}

/// Number of maximal runs of equal digits longer than one, over N
pub fn runs_ratio(digits: &[u8]) -> f64 {
    if digits.is_empty() {
        return 0.0;
    }

    let mut runs = 0usize;
    let mut run_length = 1usize;
    for pair in digits.windows(2) {
        if pair[0] == pair[1] {
            run_length += 1;
        } else {
            if run_length > 1 {
                runs += 1;
            }
            run_length = 1;
        }
    }
    if run_length > 1 {
        runs += 1;
    }

    runs as f64 / digits.len() as f64
}

/// Intermediate results shared between features of the same family
struct StatContext {
    frequencies: [f64; DIGITS],
    redundancy: f64,
    differences: SampleSummary,
    adjacent: f64,
    max_min_ratio: f64,
    autocorr: f64,
    tpi: f64,
    gaps: SampleSummary,
    coupon: (f64, f64),
    patterns: [f64; MAX_PATTERN_LENGTH],
    rp: f64,
}

impl StatContext {
    fn new(seq: &DigitSequence, policy: AdjacencyPolicy) -> Self {
        let digits = seq.digits();
        let frequencies = digit_frequencies(seq);

        let mut patterns = [0.0; MAX_PATTERN_LENGTH];
        for (i, slot) in patterns.iter_mut().enumerate() {
            *slot = pattern_length_statistic(digits, i + 1);
        }

        Self {
            frequencies,
            redundancy: redundancy(&seq.digit_counts(), DIGITS),
            differences: SampleSummary::from_data(&adjacent_differences(digits)),
            adjacent: adjacent_fraction(digits, policy),
            max_min_ratio: max_min_ratio(&frequencies),
            autocorr: lag1_autocorrelation(&seq.as_f64()),
            tpi: turning_point_index(digits),
            gaps: SampleSummary::from_counts(&repetition_gaps(digits)),
            coupon: coupon_statistics(digits),
            patterns,
            rp: runs_ratio(digits),
        }
    }

    fn value(&self, feature: StatFeature) -> f64 {
        match feature {
            StatFeature::Freq0
            | StatFeature::Freq1
            | StatFeature::Freq2
            | StatFeature::Freq3
            | StatFeature::Freq4
            | StatFeature::Freq5
            | StatFeature::Freq6
            | StatFeature::Freq7
            | StatFeature::Freq8
            | StatFeature::Freq9 => self.frequencies[feature.index()],
            StatFeature::Redundancy => self.redundancy,
            StatFeature::AdjacentDiffMean => self.differences.mean,
            StatFeature::AdjacentDiffStd => self.differences.std_dev,
            StatFeature::Adjacent => self.adjacent,
            StatFeature::MaxMinRatio => self.max_min_ratio,
            StatFeature::AutocorrLag1 => self.autocorr,
            StatFeature::Tpi => self.tpi,
            StatFeature::RepetitionGapMean => self.gaps.mean,
            StatFeature::RepetitionGapStd => self.gaps.std_dev,
            StatFeature::CouponMean => self.coupon.0,
            StatFeature::CouponStd => self.coupon.1,
            StatFeature::Pl1 => self.patterns[0],
            StatFeature::Pl2 => self.patterns[1],
            StatFeature::Pl3 => self.patterns[2],
            StatFeature::Pl4 => self.patterns[3],
            StatFeature::Pl5 => self.patterns[4],
            StatFeature::Rp => self.rp,
        }
    }
}

/// All statistical features in schema order
pub fn statistical_features(
    seq: &DigitSequence,
    policy: AdjacencyPolicy,
) -> [f64; STAT_FEATURE_COUNT] {
    let ctx = StatContext::new(seq, policy);
    StatFeature::ALL.map(|feature| ctx.value(feature))
}
