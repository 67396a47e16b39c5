//! Credit rating scale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A rating on the fixed scale, ordered from safest to riskiest.
///
/// The derived ordering follows declaration order, so `Rating::AAA` is the
/// minimum and `Rating::E` the maximum.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    AAA,
    AA,
    A,
    BBB,
    BB,
    B,
    C,
    D,
    E,
}

impl Rating {
    /// All ratings, safest first.
    pub const SCALE: [Rating; 9] = [
        Rating::AAA,
        Rating::AA,
        Rating::A,
        Rating::BBB,
        Rating::BB,
        Rating::B,
        Rating::C,
        Rating::D,
        Rating::E,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::AAA => "AAA",
            Rating::AA => "AA",
            Rating::A => "A",
            Rating::BBB => "BBB",
            Rating::BB => "BB",
            Rating::B => "B",
            Rating::C => "C",
            Rating::D => "D",
            Rating::E => "E",
        }
    }

    /// Position on the scale; higher is riskier.
    pub fn risk_rank(self) -> usize {
        self as usize
    }
}

impl FromStr for Rating {
    type Err = ();

    /// Exact, case-sensitive match against the scale codes.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Rating::SCALE
            .iter()
            .copied()
            .find(|rating| rating.as_str() == code)
            .ok_or(())
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved label of a rating cell: a rating or the empty label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RatingValue(Option<Rating>);

impl RatingValue {
    pub const EMPTY: RatingValue = RatingValue(None);

    pub fn new(rating: Option<Rating>) -> Self {
        Self(rating)
    }

    pub fn rating(self) -> Option<Rating> {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0.is_none()
    }

    /// The canonical label, or `""` when nothing matched.
    pub fn as_str(self) -> &'static str {
        self.0.map_or("", Rating::as_str)
    }
}

impl From<Rating> for RatingValue {
    fn from(rating: Rating) -> Self {
        Self(Some(rating))
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
