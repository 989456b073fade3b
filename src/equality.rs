//! Decides whether two paper records describe the same work.
//!
//! DOIs are authoritative when both sides carry one. Without a DOI on both
//! sides, the decision is a weighted average of title, abstract, author and
//! year scores; fields without signal drop out of both numerator and
//! denominator.

use crate::author::author_set_similarity;
use crate::config::ComparisonWeights;
use crate::model::Paper;
use crate::similarity::{similarity, year_score, FieldScore};
use serde::Serialize;

/// How a comparison reached its verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    /// Both sides share a DOI
    DoiMatch,
    /// Both sides carry DOIs but none agree
    DoiMismatch,
    /// Neither title nor abstract carried any signal
    NoContent,
    /// Aggregate strictly above the threshold
    ScoreAbove,
    /// Aggregate at or below the threshold
    ScoreBelow,
}

/// Full breakdown of one pairwise comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub verdict: Verdict,
    pub title: FieldScore,
    pub abstract_text: FieldScore,
    pub author: FieldScore,
    pub year: FieldScore,
    /// Weighted average; `None` when the verdict came from DOIs or no content
    pub aggregate: Option<f64>,
}

impl Comparison {
    fn short_circuit(verdict: Verdict) -> Self {
        Self {
            verdict,
            title: FieldScore::Unmatched,
            abstract_text: FieldScore::Unmatched,
            author: FieldScore::Unmatched,
            year: FieldScore::Unmatched,
            aggregate: None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self.verdict, Verdict::DoiMatch | Verdict::ScoreAbove)
    }
}

/// Score two papers field by field and reach a verdict.
///
/// `weights` is taken as already validated; [`crate::reconcile::reconcile`]
/// and the weight loaders run [`ComparisonWeights::validate`].
pub fn compare(a: &Paper, b: &Paper, weights: &ComparisonWeights) -> Comparison {
    let dois_a = a.dois();
    let dois_b = b.dois();
    if !dois_a.is_empty() && !dois_b.is_empty() {
        let shared = dois_a.iter().any(|doi| dois_b.contains(doi));
        return Comparison::short_circuit(if shared {
            Verdict::DoiMatch
        } else {
            Verdict::DoiMismatch
        });
    }

    let title = similarity(weights.title_weight, &a.title, &b.title);
    let abstract_text = similarity(weights.abstract_weight, &a.abstract_text, &b.abstract_text);
    let year = year_score(weights.year_weight, &a.year, &b.year);
    let author = if a.author.is_empty() || b.author.is_empty() {
        FieldScore::Unmatched
    } else {
        FieldScore::Matched {
            score: author_set_similarity(&a.author, &b.author) * weights.author_weight,
            weight: weights.author_weight,
        }
    };

    if title.weight() + abstract_text.weight() == 0.0 {
        return Comparison {
            verdict: Verdict::NoContent,
            title,
            abstract_text,
            author,
            year,
            aggregate: None,
        };
    }

    let fields = [title, abstract_text, author, year];
    let score: f64 = fields.iter().map(FieldScore::score).sum();
    let weight: f64 = fields.iter().map(FieldScore::weight).sum();
    let aggregate = score / weight;

    Comparison {
        verdict: if aggregate > weights.overall_weight {
            Verdict::ScoreAbove
        } else {
            Verdict::ScoreBelow
        },
        title,
        abstract_text,
        author,
        year,
        aggregate: Some(aggregate),
    }
}

/// Whether `a` and `b` describe the same work. The threshold is exclusive.
pub fn records_equal(a: &Paper, b: &Paper, weights: &ComparisonWeights) -> bool {
    compare(a, b, weights).is_match()
}
