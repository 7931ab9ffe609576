//! Static feature schema
//!
//! Every feature the engine can produce is enumerated here, so a feature
//! name is either a valid [`FeatureKey`] or a typo that can be reported
//! when parameters are loaded. Names are stable: they are the keys of the
//! model parameter artifact.
//!
//! Layout of a schema with `max_step = S`:
//!
//! ```text
//! [0, 27)                 statistical features, in StatFeature::ALL order
//! [27 + 100*(s-1) + 10*i + j]  step{s}_trans_{i}_to_{j}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sequence::DIGITS;

/// Number of statistical features
pub const STAT_FEATURE_COUNT: usize = 27;

/// Number of transition features per step (10 x 10 matrix)
pub const TRANSITIONS_PER_STEP: usize = DIGITS * DIGITS;

/// Longest substring length used by the pattern-length tests
pub const MAX_PATTERN_LENGTH: usize = 5;

/// Statistical (non-transition) features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatFeature {
    #[serde(rename = "freq_0")]
    Freq0,
    #[serde(rename = "freq_1")]
    Freq1,
    #[serde(rename = "freq_2")]
    Freq2,
    #[serde(rename = "freq_3")]
    Freq3,
    #[serde(rename = "freq_4")]
    Freq4,
    #[serde(rename = "freq_5")]
    Freq5,
    #[serde(rename = "freq_6")]
    Freq6,
    #[serde(rename = "freq_7")]
    Freq7,
    #[serde(rename = "freq_8")]
    Freq8,
    #[serde(rename = "freq_9")]
    Freq9,
    Redundancy,
    AdjacentDiffMean,
    AdjacentDiffStd,
    Adjacent,
    MaxMinRatio,
    AutocorrLag1,
    Tpi,
    RepetitionGapMean,
    RepetitionGapStd,
    CouponMean,
    CouponStd,
    Pl1,
    Pl2,
    Pl3,
    Pl4,
    Pl5,
    Rp,
}

impl StatFeature {
    /// All statistical features in schema order
    pub const ALL: [StatFeature; STAT_FEATURE_COUNT] = [
        StatFeature::Freq0,
        StatFeature::Freq1,
        StatFeature::Freq2,
        StatFeature::Freq3,
        StatFeature::Freq4,
        StatFeature::Freq5,
        StatFeature::Freq6,
        StatFeature::Freq7,
        StatFeature::Freq8,
        StatFeature::Freq9,
        StatFeature::Redundancy,
        StatFeature::AdjacentDiffMean,
        StatFeature::AdjacentDiffStd,
        StatFeature::Adjacent,
        StatFeature::MaxMinRatio,
        StatFeature::AutocorrLag1,
        StatFeature::Tpi,
        StatFeature::RepetitionGapMean,
        StatFeature::RepetitionGapStd,
        StatFeature::CouponMean,
        StatFeature::CouponStd,
        StatFeature::Pl1,
        StatFeature::Pl2,
        StatFeature::Pl3,
        StatFeature::Pl4,
        StatFeature::Pl5,
        StatFeature::Rp,
    ];

    /// Artifact name of the feature
    pub fn name(self) -> &'static str {
        match self {
            StatFeature::Freq0 => "freq_0",
            StatFeature::Freq1 => "freq_1",
            StatFeature::Freq2 => "freq_2",
            StatFeature::Freq3 => "freq_3",
            StatFeature::Freq4 => "freq_4",
            StatFeature::Freq5 => "freq_5",
            StatFeature::Freq6 => "freq_6",
            StatFeature::Freq7 => "freq_7",
            StatFeature::Freq8 => "freq_8",
            StatFeature::Freq9 => "freq_9",
            StatFeature::Redundancy => "redundancy",
            StatFeature::AdjacentDiffMean => "adjacent_diff_mean",
            StatFeature::AdjacentDiffStd => "adjacent_diff_std",
            StatFeature::Adjacent => "adjacent",
            StatFeature::MaxMinRatio => "max_min_ratio",
            StatFeature::AutocorrLag1 => "autocorr_lag1",
            StatFeature::Tpi => "tpi",
            StatFeature::RepetitionGapMean => "repetition_gap_mean",
            StatFeature::RepetitionGapStd => "repetition_gap_std",
            StatFeature::CouponMean => "coupon_mean",
            StatFeature::CouponStd => "coupon_std",
            StatFeature::Pl1 => "pl1",
            StatFeature::Pl2 => "pl2",
            StatFeature::Pl3 => "pl3",
            StatFeature::Pl4 => "pl4",
            StatFeature::Pl5 => "pl5",
            StatFeature::Rp => "rp",
        }
    }

    /// Look up a feature by artifact name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Position in the schema
    pub fn index(self) -> usize {
        self as usize
    }

    /// Frequency feature for a digit
    pub fn freq(digit: usize) -> Option<Self> {
        if digit < DIGITS {
            Some(Self::ALL[digit])
        } else {
            None
        }
    }

    /// Pattern-length feature for a substring length in 1..=5
    pub fn pattern_length(length: usize) -> Option<Self> {
        match length {
            1 => Some(StatFeature::Pl1),
            2 => Some(StatFeature::Pl2),
            3 => Some(StatFeature::Pl3),
            4 => Some(StatFeature::Pl4),
            5 => Some(StatFeature::Pl5),
            _ => None,
        }
    }
}

impl fmt::Display for StatFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any feature the engine can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureKey {
    /// One of the 27 statistical features
    Stat(StatFeature),
    /// `step{step}_trans_{from}_to_{to}`, `step >= 1`
    Transition { step: usize, from: u8, to: u8 },
}

impl FeatureKey {
    /// Parse an artifact feature name
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(stat) = StatFeature::from_name(name) {
            return Some(FeatureKey::Stat(stat));
        }

        let rest = name.strip_prefix("step")?;
        let (step, rest) = rest.split_once("_trans_")?;
        let (from, to) = rest.split_once("_to_")?;

        let step = parse_plain_number(step)?;
        let from = parse_digit(from)?;
        let to = parse_digit(to)?;
        if step == 0 {
            return None;
        }
        Some(FeatureKey::Transition { step, from, to })
    }

    /// Position of this key in a schema with `max_step` transition steps
    pub fn index(&self, max_step: usize) -> Option<usize> {
        match *self {
            FeatureKey::Stat(stat) => Some(stat.index()),
            FeatureKey::Transition { step, from, to } => {
                if step == 0 || step > max_step {
                    return None;
                }
                Some(
                    STAT_FEATURE_COUNT
                        + (step - 1) * TRANSITIONS_PER_STEP
                        + usize::from(from) * DIGITS
                        + usize::from(to),
                )
            }
        }
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKey::Stat(stat) => f.write_str(stat.name()),
            FeatureKey::Transition { step, from, to } => {
                write!(f, "step{}_trans_{}_to_{}", step, from, to)
            }
        }
    }
}

fn parse_plain_number(s: &str) -> Option<usize> {
    // Reject signs, whitespace and leading zeros so names round-trip exactly
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || (s.len() > 1 && s.starts_with('0')) {
        return None;
    }
    s.parse().ok()
}

fn parse_digit(s: &str) -> Option<u8> {
    match s.as_bytes() {
        [b @ b'0'..=b'9'] => Some(b - b'0'),
        _ => None,
    }
}

/// The ordered, total set of features for a given number of transition steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureSchema {
    max_step: usize,
}

impl FeatureSchema {
    /// Schema with transition steps `1..=max_step`
    pub fn new(max_step: usize) -> Self {
        Self { max_step }
    }

    /// Largest transition step
    pub fn max_step(&self) -> usize {
        self.max_step
    }

    /// Total number of features
    pub fn len(&self) -> usize {
        STAT_FEATURE_COUNT + self.max_step * TRANSITIONS_PER_STEP
    }

    /// A schema always contains the statistical features
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All keys in schema order
    pub fn keys(&self) -> impl Iterator<Item = FeatureKey> + '_ {
        let stats = StatFeature::ALL.iter().copied().map(FeatureKey::Stat);
        let transitions = (1..=self.max_step).flat_map(|step| {
            (0..DIGITS as u8).flat_map(move |from| {
                (0..DIGITS as u8).map(move |to| FeatureKey::Transition { step, from, to })
            })
        });
        stats.chain(transitions)
    }

    /// Position of a named feature, `None` if the schema cannot produce it
    pub fn index_of(&self, name: &str) -> Option<usize> {
        FeatureKey::parse(name)?.index(self.max_step)
    }

    /// Check whether the schema produces a named feature
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Key at a schema position
    pub fn key_at(&self, index: usize) -> Option<FeatureKey> {
        if index < STAT_FEATURE_COUNT {
            return Some(FeatureKey::Stat(StatFeature::ALL[index]));
        }
        if index >= self.len() {
            return None;
        }
        let offset = index - STAT_FEATURE_COUNT;
        let step = offset / TRANSITIONS_PER_STEP + 1;
        let cell = offset % TRANSITIONS_PER_STEP;
        Some(FeatureKey::Transition {
            step,
            from: (cell / DIGITS) as u8,
            to: (cell % DIGITS) as u8,
        })
    }
}
