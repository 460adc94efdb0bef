use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive interval `[min, max]` of positional indices.
///
/// Constructors never assume argument order; the bounds are always
/// normalized from the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    min: usize,
    max: usize,
}

impl Range {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Single-point range of length 1
    pub fn point(value: usize) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Smallest range covering every value, or `None` for an empty input.
    pub fn covering(values: impl IntoIterator<Item = usize>) -> Option<Self> {
        values.into_iter().fold(None, |acc, value| {
            Some(match acc {
                None => Self::point(value),
                Some(range) => range.extend(value),
            })
        })
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn length(&self) -> usize {
        self.max - self.min + 1
    }

    pub fn contains(&self, value: usize) -> bool {
        self.min <= value && value <= self.max
    }

    /// Grow the range so it also covers `value`.
    pub fn extend(self, value: usize) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.min..=self.max
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

impl IntoIterator for Range {
    type Item = usize;
    type IntoIter = std::ops::RangeInclusive<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
