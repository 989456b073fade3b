//! Author identity resolution.
//!
//! One physical author shows up as several [`Author`] records across
//! sources: one source has split first/last names, another only a display
//! string, a third the initials form "M. Muster". This module scores how
//! likely two such records denote the same person and folds matching pairs
//! into one record.

use crate::distance::{char_len, distance};
use crate::merge::merge_string_lists;
use crate::model::Author;
use crate::normalize::normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::trace;

/// A single letter followed by `.` or whitespace, then more text ("M. Muster")
static ABBREVIATED_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\p{L}[.\s]\s*\S").expect("valid regex"));

/// Whether a display name starts with an initial instead of a full first name.
///
/// This is the single abbreviation policy used both when scoring two names
/// and when choosing which display names survive a merge.
pub fn is_abbreviated_name(raw: &str) -> bool {
    ABBREVIATED_NAME_RE.is_match(raw)
}

fn tokens(raw: &str) -> Vec<String> {
    normalize(raw).split(' ').filter(|t| !t.is_empty()).map(str::to_string).collect()
}

/// Similarity of two display names in `[0, 1]`.
///
/// If either name is abbreviated, only the surnames (last tokens) are
/// compared: when they start with the same letter the score is
/// `1 - distance / len(second surname)`, otherwise 0. Full names score the
/// share of tokens they have in common, relative to the longer name.
pub fn raw_string_similarity(s1: &str, s2: &str) -> f64 {
    let t1 = tokens(s1);
    let t2 = tokens(s2);
    let (Some(last1), Some(last2)) = (t1.last(), t2.last()) else {
        return 0.0;
    };

    if is_abbreviated_name(s1) || is_abbreviated_name(s2) {
        if last1.chars().next() != last2.chars().next() {
            return 0.0;
        }
        let len = char_len(last2) as f64;
        return (1.0 - distance(last1, last2) as f64 / len).clamp(0.0, 1.0);
    }

    let set1: HashSet<&str> = t1.iter().map(String::as_str).collect();
    let set2: HashSet<&str> = t2.iter().map(String::as_str).collect();
    let shared = set1.intersection(&set2).count();
    shared as f64 / set1.len().max(set2.len()) as f64
}

fn normalized_set(values: &[String]) -> HashSet<String> {
    values
        .iter()
        .map(|v| normalize(v))
        .filter(|v| !v.is_empty())
        .collect()
}

/// Display names for comparison: the raw strings, or "{first} {last}" when
/// only split names are known.
fn display_strings(author: &Author) -> Vec<String> {
    let raw: Vec<String> = author
        .raw_string
        .iter()
        .filter(|r| !r.trim().is_empty())
        .cloned()
        .collect();
    if !raw.is_empty() {
        return raw;
    }

    match (author.first_name.first(), author.last_name.first()) {
        (Some(first), Some(last)) => vec![format!("{first} {last}")],
        _ => Vec::new(),
    }
}

/// Likelihood in `[0, 1]` that two author records denote the same person.
///
/// Overlapping first *and* last names are an exact match. Otherwise every
/// pair of display names is scored and the scores are summed, so an author
/// with several matching spellings accumulates credit; the sum is capped at 1.
pub fn author_similarity(a: &Author, b: &Author) -> f64 {
    let first_a = normalized_set(&a.first_name);
    let first_b = normalized_set(&b.first_name);
    let last_a = normalized_set(&a.last_name);
    let last_b = normalized_set(&b.last_name);
    if !first_a.is_disjoint(&first_b) && !last_a.is_disjoint(&last_b) {
        return 1.0;
    }

    let names_a = display_strings(a);
    let names_b = display_strings(b);
    let total: f64 = names_a
        .iter()
        .flat_map(|na| names_b.iter().map(move |nb| raw_string_similarity(na, nb)))
        .sum();
    total.min(1.0)
}

/// Similarity of two author lists in `[0, 1]`.
///
/// Sums [`author_similarity`] over the full cross product and divides by the
/// longer list. This is not a best-match assignment: one author can earn
/// credit against several others.
pub fn author_set_similarity(a: &[Author], b: &[Author]) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }

    let total: f64 = a
        .iter()
        .flat_map(|x| b.iter().map(move |y| author_similarity(x, y)))
        .sum();
    total / longest as f64
}

/// Fold two records of the same person into one.
///
/// `id` is kept from `a`. Overlapping values keep the more original spelling.
pub fn merge_authors(a: Author, b: Author) -> Author {
    let mut merged = Author {
        id: a.id,
        orcid: merge_string_lists(a.orcid, b.orcid),
        raw_string: merge_string_lists(a.raw_string, b.raw_string),
        first_name: merge_string_lists(a.first_name, b.first_name),
        last_name: merge_string_lists(a.last_name, b.last_name),
    };

    if let ([first], [last]) = (merged.first_name.as_slice(), merged.last_name.as_slice()) {
        merged.raw_string = vec![format!("{first} {last}")];
    } else if merged.raw_string.len() > 1 {
        let full: Vec<String> = merged
            .raw_string
            .iter()
            .filter(|r| !is_abbreviated_name(r))
            .cloned()
            .collect();
        if !full.is_empty() {
            merged.raw_string = full;
        }
    }

    merged
}

/// Merge two author lists.
///
/// Each author of `a` is paired with the first still-unpaired author of `b`
/// whose similarity is strictly above `threshold`. Pairs are merged in place
/// of the `a` entry; unpaired authors of `b` are appended.
pub fn merge_author_lists(a: Vec<Author>, b: Vec<Author>, threshold: f64) -> Vec<Author> {
    let mut unpaired = b;
    let mut merged = Vec::with_capacity(a.len() + unpaired.len());

    for author in a {
        match unpaired
            .iter()
            .position(|candidate| author_similarity(&author, candidate) > threshold)
        {
            Some(pos) => {
                let other = unpaired.remove(pos);
                trace!(left = ?author.raw_string, right = ?other.raw_string, "Merging authors");
                merged.push(merge_authors(author, other));
            }
            None => merged.push(author),
        }
    }

    merged.extend(unpaired);
    merged
}
