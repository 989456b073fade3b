//! Free-text canonicalization used before any string comparison.

/// Characters replaced by a space before comparison
const PUNCTUATION: &[char] = &[',', '\\', '-', ':', '/', '.'];

/// Canonicalize a string for comparison.
///
/// Lower-cases, folds `ä ü ö` to their base letters, turns the punctuation
/// set `, \ - : / .` into spaces, collapses whitespace runs and trims.
/// `normalize(&normalize(s)) == normalize(s)` for every input.
pub fn normalize(s: &str) -> String {
    let folded: String = s
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'ä' => 'a',
            'ü' => 'u',
            'ö' => 'o',
            c if PUNCTUATION.contains(&c) => ' ',
            c => c,
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
