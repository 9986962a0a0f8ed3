use crate::prelude::{RenderError, RenderResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Security score in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MAX: Score = Score(100);

    pub fn new(value: i64) -> RenderResult<Self> {
        if (0..=100).contains(&value) {
            Ok(Score(value as u8))
        } else {
            Err(RenderError::ScoreOutOfRange(value))
        }
    }

    pub fn saturating(value: i64) -> Self {
        Score(value.clamp(0, 100) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn ratio(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl TryFrom<i64> for Score {
    type Error = RenderError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Four-band classification of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTier {
    Green,
    Yellow,
    Orange,
    Red,
}

pub fn score_to_color_tier(score: Score) -> ColorTier {
    match score.value() {
        80..=u8::MAX => ColorTier::Green,
        60..=79 => ColorTier::Yellow,
        40..=59 => ColorTier::Orange,
        _ => ColorTier::Red,
    }
}
