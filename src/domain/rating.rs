//! Analyst-style rating derived from recent news sentiment.
//!
//! Not a stateful machine: the rating is re-derived from scratch over the
//! most recent window after every successful ingestion batch and
//! overwrites the previous value unconditionally.

use crate::domain::news::SentimentLabel;
use std::fmt;

/// How many of the most recently ingested items feed the aggregation.
pub const AGGREGATION_WINDOW: usize = 10;

/// Positive-count threshold for a BUY.
const BUY_POSITIVE_MIN: usize = 5;

/// Negative-count threshold for the cautionary HOLD.
const HOLD_NEGATIVE_MIN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingLabel {
    Buy,
    Hold,
}

impl RatingLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Some(Self::Buy),
            "HOLD" => Some(Self::Hold),
            _ => None,
        }
    }
}

impl fmt::Display for RatingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rating plus its human-readable justification. Lives as mutable
/// fields on the instrument; it has no existence independent of the news
/// it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    pub label: RatingLabel,
    pub reason: String,
}

/// Derive a rating from recent sentiment labels, most recent first.
///
/// Returns `None` for an empty window (the rating is left untouched).
/// The BUY rule is checked before the negative HOLD rule; a window
/// satisfying both resolves to BUY.
pub fn aggregate(labels: &[SentimentLabel]) -> Option<Rating> {
    if labels.is_empty() {
        return None;
    }

    let total = labels.len();
    let positives = labels
        .iter()
        .filter(|l| **l == SentimentLabel::Positive)
        .count();
    let negatives = labels
        .iter()
        .filter(|l| **l == SentimentLabel::Negative)
        .count();

    let rating = if positives >= BUY_POSITIVE_MIN {
        Rating {
            label: RatingLabel::Buy,
            reason: format!(
                "Positive coverage dominates recent news: {positives} of {total} articles."
            ),
        }
    } else if negatives >= HOLD_NEGATIVE_MIN {
        Rating {
            label: RatingLabel::Hold,
            reason: format!(
                "Negative coverage is elevated in recent news: {negatives} of {total} articles."
            ),
        }
    } else {
        Rating {
            label: RatingLabel::Hold,
            reason: format!(
                "Mixed or insufficient signal: {positives} positive, {negatives} negative of {total} recent articles."
            ),
        }
    };

    Some(rating)
}
