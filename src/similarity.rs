//! Field-level similarity scores.
//!
//! Each function reduces two candidate value lists to a weighted score. When
//! a field carries no signal (absent on either side) the result is
//! [`FieldScore::Unmatched`] and the caller drops that field's weight from the
//! aggregate entirely, so missing data is never penalized like a mismatch.

use crate::distance::{char_len, normalized_distance};
use crate::normalize::normalize;
use serde::Serialize;

/// Outcome of scoring one field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FieldScore {
    /// No signal; the field's weight is zeroed
    Unmatched,
    /// Weighted score together with the weight it was scored against
    Matched { score: f64, weight: f64 },
}

impl FieldScore {
    pub fn score(&self) -> f64 {
        match self {
            Self::Unmatched => 0.0,
            Self::Matched { score, .. } => *score,
        }
    }

    /// Weight contributed to the aggregate denominator
    pub fn weight(&self) -> f64 {
        match self {
            Self::Unmatched => 0.0,
            Self::Matched { weight, .. } => *weight,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// Weighted fuzzy similarity of two text fields.
///
/// `second[0]` is the reference. Every candidate in `first` is measured
/// against it (both sides normalized) and the *largest* distance is kept, so
/// a single divergent variant lowers the score. The result is
/// `weight * (len(ref) - max_distance) / len(ref)`, where `len(ref)` counts
/// the reference as given. It goes negative when the distance exceeds the
/// reference length and is never clamped. A reference that normalizes to
/// nothing is unmatched.
pub fn similarity(weight: f64, first: &[String], second: &[String]) -> FieldScore {
    let (Some(lead_a), Some(lead_b)) = (first.first(), second.first()) else {
        return FieldScore::Unmatched;
    };
    if lead_a.trim().is_empty() && lead_b.trim().is_empty() {
        return FieldScore::Unmatched;
    }

    if normalize(lead_b).is_empty() {
        return FieldScore::Unmatched;
    }
    let len = char_len(lead_b);

    let max_distance = first
        .iter()
        .map(|candidate| normalized_distance(candidate, lead_b))
        .max()
        .unwrap_or(0);

    let score = weight * (len as f64 - max_distance as f64) / len as f64;
    FieldScore::Matched { score, weight }
}

/// True if any pair of years is at most one apart.
pub fn years_close(a: &[i32], b: &[i32]) -> bool {
    a.iter()
        .any(|ya| b.iter().any(|yb| (i64::from(*ya) - i64::from(*yb)).abs() <= 1))
}

/// `+weight` when the years are close, `-weight` when they are not,
/// unmatched when either side has no year.
pub fn year_score(weight: f64, a: &[i32], b: &[i32]) -> FieldScore {
    if a.is_empty() || b.is_empty() {
        return FieldScore::Unmatched;
    }
    let score = if years_close(a, b) { weight } else { -weight };
    FieldScore::Matched { score, weight }
}
