//! Levenshtein edit distance and the "most original spelling" tie-breaker.

use crate::normalize::normalize;

/// Unit-cost Levenshtein distance, counted in Unicode scalar values.
pub fn distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Distance between the normalized forms of `a` and `b`.
pub fn normalized_distance(a: &str, b: &str) -> usize {
    distance(&normalize(a), &normalize(b))
}

/// Length in characters, matching the unit `distance` counts in.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Pick whichever spelling is further from its own normalized form.
///
/// Mixed case and punctuation are taken as signs of the authoritative
/// original ("I am a Great-Paper" beats "i am a great paper"). Ties keep `s1`.
pub fn pick_less_normalized<'a>(s1: &'a str, s2: &'a str) -> &'a str {
    let d1 = distance(s1, &normalize(s1));
    let d2 = distance(s2, &normalize(s2));
    if d2 > d1 {
        s2
    } else {
        s1
    }
}
