//! Fiscal periods.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// A fiscal year.
///
/// Periods are derived from an offset into the statements: offset 0 is the
/// most recent year, offset 1 the year before, and so on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Period(i32);

impl Period {
    /// Create a period for a fiscal year.
    pub const fn new(year: i32) -> Self {
        Self(year)
    }

    /// The fiscal year.
    pub const fn year(self) -> i32 {
        self.0
    }

    /// The period `offset` years before `current_year`.
    pub const fn from_offset(current_year: i32, offset: usize) -> Self {
        Self(current_year - offset as i32)
    }

    /// `count` consecutive periods ending at `current_year`, most recent first.
    pub fn sequence(current_year: i32, count: usize) -> Vec<Self> {
        (0..count)
            .map(|offset| Self::from_offset(current_year, offset))
            .collect()
    }
}
