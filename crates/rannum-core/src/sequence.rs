//! Validated digit sequences

use serde::{Deserialize, Serialize};

use crate::error::InvalidInputError;

/// Number of distinct symbols in a base-10 digit sequence
pub const DIGITS: usize = 10;

/// An immutable sequence of decimal digits (each in 0..=9)
///
/// Parsing free text into digits is the caller's job; this type only
/// guarantees the range invariant. An empty sequence is valid here and is
/// rejected later by [`crate::classify`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct DigitSequence {
    digits: Vec<u8>,
}

impl DigitSequence {
    /// Build a sequence from digit bytes, rejecting any value above 9
    pub fn new(digits: Vec<u8>) -> Result<Self, InvalidInputError> {
        if let Some((index, &value)) = digits
            .iter()
            .enumerate()
            .find(|&(_, &d)| usize::from(d) >= DIGITS)
        {
            return Err(InvalidInputError::DigitOutOfRange {
                index,
                value: i64::from(value),
            });
        }
        Ok(Self { digits })
    }

    /// Build a sequence from arbitrary integers (e.g. values decoded from JSON)
    pub fn from_values<T>(values: &[T]) -> Result<Self, InvalidInputError>
    where
        T: Copy + Into<i64>,
    {
        let mut digits = Vec::with_capacity(values.len());
        for (index, &value) in values.iter().enumerate() {
            let value: i64 = value.into();
            if !(0..DIGITS as i64).contains(&value) {
                return Err(InvalidInputError::DigitOutOfRange { index, value });
            }
            digits.push(value as u8);
        }
        Ok(Self { digits })
    }

    /// The digits as a slice
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// Number of digits
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// The digits as floating point values, for correlation statistics
    pub fn as_f64(&self) -> Vec<f64> {
        self.digits.iter().map(|&d| f64::from(d)).collect()
    }

    /// Occurrence count of every digit, indexed by digit
    pub fn digit_counts(&self) -> [usize; DIGITS] {
        let mut counts = [0usize; DIGITS];
        for &d in &self.digits {
            counts[usize::from(d)] += 1;
        }
        counts
    }
}

impl TryFrom<Vec<u8>> for DigitSequence {
    type Error = InvalidInputError;

    fn try_from(digits: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(digits)
    }
}

impl From<DigitSequence> for Vec<u8> {
    fn from(seq: DigitSequence) -> Self {
        seq.digits
    }
}

impl AsRef<[u8]> for DigitSequence {
    fn as_ref(&self) -> &[u8] {
        &self.digits
    }
}
