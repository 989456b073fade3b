//! Unification of two records judged to describe the same work.
//!
//! Merge is an explicit per-field decision. Readings that agree after
//! normalization collapse into the most original spelling; readings that
//! disagree are all kept, side by side, for a human to review.

use crate::author::merge_author_lists;
use crate::config::ComparisonWeights;
use crate::distance::pick_less_normalized;
use crate::model::{Paper, SourceResponse, UniqueId};
use crate::normalize::normalize;
use tracing::debug;

/// Merge two lists of free-text readings.
///
/// Each value of `a` consumes the first value of `b` that is equal after
/// normalization, keeping the less normalized spelling of the two. Values
/// without a counterpart are kept from both sides.
pub fn merge_string_lists(a: Vec<String>, b: Vec<String>) -> Vec<String> {
    if a.is_empty() {
        return b;
    }

    let mut unconsumed = b;
    let mut merged = Vec::with_capacity(a.len() + unconsumed.len());
    for value in a {
        let key = normalize(&value);
        match unconsumed.iter().position(|other| normalize(other) == key) {
            Some(pos) => {
                let other = unconsumed.remove(pos);
                merged.push(pick_less_normalized(&value, &other).to_string());
            }
            None => merged.push(value),
        }
    }
    merged.extend(unconsumed);
    merged
}

/// Merge identifier lists: same type and same normalized value is one
/// identifier (the `a` spelling is kept), everything else is kept.
pub fn merge_unique_ids(a: Vec<UniqueId>, b: Vec<UniqueId>) -> Vec<UniqueId> {
    let mut unconsumed = b;
    let mut merged = Vec::with_capacity(a.len() + unconsumed.len());
    for id in a {
        let key = id.normalized_value();
        if let Some(pos) = unconsumed
            .iter()
            .position(|other| other.id_type == id.id_type && other.normalized_value() == key)
        {
            unconsumed.remove(pos);
        }
        merged.push(id);
    }
    merged.extend(unconsumed);
    merged
}

fn concat<T>(mut a: Vec<T>, b: Vec<T>) -> Vec<T> {
    a.extend(b);
    a
}

/// Merge two papers judged equal into one record.
///
/// - `pdf` and the numeric lists (`year`, citation and reference counts) are
///   concatenated.
/// - `author` goes through [`merge_author_lists`] with the run's threshold.
/// - `uniqueId` goes through [`merge_unique_ids`].
/// - every other text list goes through [`merge_string_lists`].
pub fn merge_records(a: Paper, b: Paper, weights: &ComparisonWeights) -> Paper {
    Paper {
        title: merge_string_lists(a.title, b.title),
        abstract_text: merge_string_lists(a.abstract_text, b.abstract_text),
        author: merge_author_lists(a.author, b.author, weights.overall_weight),
        year: concat(a.year, b.year),
        publisher: merge_string_lists(a.publisher, b.publisher),
        paper_type: merge_string_lists(a.paper_type, b.paper_type),
        scope: merge_string_lists(a.scope, b.scope),
        scope_name: merge_string_lists(a.scope_name, b.scope_name),
        pdf: concat(a.pdf, b.pdf),
        unique_id: merge_unique_ids(a.unique_id, b.unique_id),
        number_of_citations: concat(a.number_of_citations, b.number_of_citations),
        number_of_references: concat(a.number_of_references, b.number_of_references),
        provenance: merge_string_lists(a.provenance, b.provenance),
        raw: merge_string_lists(a.raw, b.raw),
    }
}

/// Merge two source responses about the same paper.
///
/// The citation and reference lists are concatenated; duplicates inside them
/// are collapsed later by the reconciler's child-list pass.
pub fn merge_responses(
    a: SourceResponse,
    b: SourceResponse,
    weights: &ComparisonWeights,
) -> SourceResponse {
    debug!(
        left = a.paper.lead_title().unwrap_or_default(),
        right = b.paper.lead_title().unwrap_or_default(),
        "Merging source responses"
    );

    SourceResponse {
        paper: merge_records(a.paper, b.paper, weights),
        citations: concat(a.citations, b.citations),
        references: concat(a.references, b.references),
    }
}
