//! Add/remove ingredient suggestions.
//!
//! Both operations are computed against the current match set and run
//! synchronously on every filter change. They are O(ingredients × recipes)
//! over an in-memory corpus, which is cheap at family-corpus scale.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::index::normalize;
use crate::matching::{MatchEngine, MatchQuery};

/// Default number of entries a suggestion list keeps.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Minimum distinct recipes an add suggestion must unlock.
pub const DEFAULT_MIN_UNLOCK_COUNT: usize = 2;

/// An ingredient worth adding to the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddSuggestion {
    /// Ingredient to add, normalized.
    pub ingredient: String,
    /// Distinct currently-unmatched recipes it would unlock.
    pub unlocked_recipes: usize,
}

/// A selected ingredient worth removing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoveSuggestion {
    /// Selected ingredient to remove, as it appears in the selection.
    pub ingredient: String,
    /// Additional recipes the match set gains without it.
    pub gained_recipes: usize,
}

/// Computes add suggestions for the current query.
///
/// For every eligible recipe outside the current match set, every required
/// ingredient the user does not already hold (selection plus expanded
/// staples, compared normalized) is credited with that recipe. Ingredients
/// unlocking at least `min_unlock_count` distinct recipes survive, sorted
/// by unlock count descending (name ascending on ties), truncated to
/// `limit`.
#[must_use]
pub fn add_suggestions(
    engine: &MatchEngine<'_>,
    query: &MatchQuery,
    held: &[String],
    min_unlock_count: usize,
    limit: usize,
) -> Vec<AddSuggestion> {
    let matched = engine.matched_ids(query);

    let held_keys: HashSet<String> = held
        .iter()
        .chain(query.selected.iter())
        .map(|name| normalize(name))
        .collect();

    let mut unlocks: HashMap<String, HashSet<&str>> = HashMap::new();
    for recipe in engine.corpus().iter() {
        if matched.contains(&recipe.id) || !engine.is_eligible(recipe, query) {
            continue;
        }
        for line in &recipe.ingredients {
            let key = normalize(&line.item);
            if key.is_empty() || held_keys.contains(&key) {
                continue;
            }
            unlocks.entry(key).or_default().insert(recipe.id.as_str());
        }
    }

    let mut suggestions: Vec<AddSuggestion> = unlocks
        .into_iter()
        .map(|(ingredient, recipes)| AddSuggestion {
            ingredient,
            unlocked_recipes: recipes.len(),
        })
        .filter(|s| s.unlocked_recipes >= min_unlock_count)
        .collect();

    suggestions.sort_by(|a, b| {
        b.unlocked_recipes
            .cmp(&a.unlocked_recipes)
            .then_with(|| a.ingredient.cmp(&b.ingredient))
    });
    suggestions.truncate(limit);
    suggestions
}

/// Computes remove suggestions for the current query.
///
/// Each selected non-staple ingredient is dropped in turn and the match
/// set recomputed; a strict increase in matched recipes records the gain.
/// Sorted by gain descending (name ascending on ties), truncated to
/// `limit`.
#[must_use]
pub fn remove_suggestions(
    engine: &MatchEngine<'_>,
    query: &MatchQuery,
    staples: &[String],
    limit: usize,
) -> Vec<RemoveSuggestion> {
    let staple_keys: HashSet<String> = staples.iter().map(|name| normalize(name)).collect();
    let baseline = engine.match_recipes(query).len();

    let mut suggestions = Vec::new();
    for ingredient in &query.selected {
        if staple_keys.contains(&normalize(ingredient)) {
            continue;
        }
        let without = query.without_ingredient(ingredient);
        let count = engine.match_recipes(&without).len();
        if count > baseline {
            suggestions.push(RemoveSuggestion {
                ingredient: ingredient.clone(),
                gained_recipes: count - baseline,
            });
        }
    }

    suggestions.sort_by(|a, b| {
        b.gained_recipes
            .cmp(&a.gained_recipes)
            .then_with(|| a.ingredient.cmp(&b.ingredient))
    });
    suggestions.truncate(limit);
    suggestions
}
