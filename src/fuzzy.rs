//! Tiered fuzzy scoring for interactive ingredient search.
//!
//! This is the only place in the crate that performs inexact string
//! matching. Match computation uses exact/canonical index lookups; the
//! scorer here ranks autocomplete candidates as the user types.

use serde::Serialize;

/// A scored autocomplete candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCandidate {
    /// Canonical ingredient name.
    pub name: String,
    /// Tier score from [`score`].
    pub score: u32,
    /// Number of recipes associated with the ingredient.
    pub recipe_count: usize,
}

/// Scores `candidate` against `query`.
///
/// Deterministic, case-insensitive, pure. Tiers are evaluated in order and
/// the first hit wins:
///
/// | tier | condition |
/// |-----:|-----------|
/// | 100  | exact equality |
/// |  90  | candidate starts with query |
/// |  80  | query occurs at a word boundary inside candidate |
/// |  70  | query occurs anywhere |
/// |  60  | a whitespace-delimited word of candidate starts with query |
/// |  30  | query characters occur in candidate in order |
/// |   0  | none of the above |
#[must_use]
pub fn score(candidate: &str, query: &str) -> u32 {
    let candidate = candidate.to_lowercase();
    let query = query.to_lowercase();

    if candidate.is_empty() || query.is_empty() {
        return 0;
    }
    if candidate == query {
        return 100;
    }
    if candidate.starts_with(&query) {
        return 90;
    }
    if occurs_at_word_boundary(&candidate, &query) {
        return 80;
    }
    if candidate.contains(&query) {
        return 70;
    }
    if candidate
        .split_whitespace()
        .any(|word| word.starts_with(&query))
    {
        return 60;
    }
    if is_subsequence(&candidate, &query) {
        return 30;
    }
    0
}

/// True when `query` occurs in `candidate` immediately after a
/// non-alphanumeric character. Occurrence at the very start is the prefix
/// tier's business, not this one's.
fn occurs_at_word_boundary(candidate: &str, query: &str) -> bool {
    candidate.match_indices(query).any(|(pos, _)| {
        pos > 0
            && candidate[..pos]
                .chars()
                .next_back()
                .is_some_and(|ch| !ch.is_alphanumeric())
    })
}

/// True when all characters of `query` appear in `candidate` in order.
fn is_subsequence(candidate: &str, query: &str) -> bool {
    let mut wanted = query.chars();
    let mut next = wanted.next();
    for ch in candidate.chars() {
        match next {
            Some(w) if w == ch => next = wanted.next(),
            Some(_) => {}
            None => break,
        }
    }
    next.is_none()
}

/// Ranks `(name, recipe_count)` candidates against `query`.
///
/// Zero-scoring candidates are dropped; the rest sort by score descending,
/// then recipe count descending, then name ascending for determinism, and
/// the list is truncated to `limit`.
#[must_use]
pub fn rank<'a>(
    candidates: impl Iterator<Item = (&'a str, usize)>,
    query: &str,
    limit: usize,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .filter_map(|(name, recipe_count)| {
            let score = score(name, query);
            (score > 0).then(|| RankedCandidate {
                name: name.to_string(),
                score,
                recipe_count,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.recipe_count.cmp(&a.recipe_count))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}
