//! The recipe match engine.
//!
//! Computes per-recipe match results for a set of selected ingredients
//! against the loaded ingredient index. Pure and synchronous: the engine
//! borrows the immutable corpus and index, and every call stands alone.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::index::{normalize, IngredientIndex};
use crate::recipe::{RecipeCorpus, RecipeId};

/// Default cap on recipe ids accumulated by one substring-fallback scan.
///
/// The cap is a performance safety valve inherited from the original
/// system; it bounds worst-case cost on a large corpus and has no product
/// rationale beyond that.
pub const DEFAULT_FALLBACK_SCAN_CAP: usize = 5_000;

/// Default minimum normalized term length for the fallback scan.
pub const DEFAULT_FALLBACK_MIN_LEN: usize = 3;

/// Highest accepted missing-ingredient threshold.
pub const MAX_MISSING_THRESHOLD: u8 = 3;

/// How selected ingredients combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Include recipes matching any selected ingredient.
    #[default]
    Any,
    /// Include recipes matching all selected ingredients, up to the
    /// missing threshold.
    All,
}

/// Per-recipe match outcome, ephemeral to one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Matched recipe.
    pub recipe_id: RecipeId,
    /// Number of selected ingredients the recipe matched.
    pub match_count: usize,
    /// Selected ingredients the recipe matched, in selection order.
    pub matched_ingredients: Vec<String>,
    /// Selected ingredients the recipe did not match, in selection order.
    pub missing_ingredients: Vec<String>,
    /// True when every selected ingredient matched.
    pub is_perfect_match: bool,
}

/// A validated match query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchQuery {
    /// Selected ingredient names as the user entered them.
    pub selected: Vec<String>,
    /// Combination mode.
    pub mode: MatchMode,
    /// In `All` mode, how many selected ingredients a recipe may miss.
    pub missing_threshold: u8,
    /// Restricts matching to one collection when set.
    pub collection: Option<String>,
}

impl MatchQuery {
    /// A copy of this query without one selected ingredient.
    #[must_use]
    pub fn without_ingredient(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.selected.retain(|s| s != name);
        copy
    }
}

/// Builder for match queries.
///
/// # Example
/// ```rust,ignore
/// let query = MatchQueryBuilder::new()
///     .ingredient("tomato")
///     .ingredient("ground beef")
///     .mode(MatchMode::All)
///     .missing_threshold(1)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct MatchQueryBuilder {
    selected: Vec<String>,
    mode: MatchMode,
    missing_threshold: u8,
    collection: Option<String>,
}

impl MatchQueryBuilder {
    /// Creates a builder with defaults (`Any` mode, threshold 0).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one selected ingredient.
    #[must_use]
    pub fn ingredient(mut self, name: impl Into<String>) -> Self {
        self.selected.push(name.into());
        self
    }

    /// Replaces the selection.
    #[must_use]
    pub fn ingredients(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.selected = names.into_iter().collect();
        self
    }

    /// Sets the combination mode.
    #[must_use]
    pub const fn mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the missing threshold; values above the maximum clamp to it.
    #[must_use]
    pub fn missing_threshold(mut self, threshold: u8) -> Self {
        self.missing_threshold = threshold.min(MAX_MISSING_THRESHOLD);
        self
    }

    /// Restricts the query to one collection.
    #[must_use]
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Builds the query.
    #[must_use]
    pub fn build(self) -> MatchQuery {
        MatchQuery {
            selected: self.selected,
            mode: self.mode,
            missing_threshold: self.missing_threshold.min(MAX_MISSING_THRESHOLD),
            collection: self.collection,
        }
    }
}

/// The match engine. Borrows the corpus and the loaded index; holds no
/// state of its own.
pub struct MatchEngine<'a> {
    corpus: &'a RecipeCorpus,
    index: &'a IngredientIndex,
    fallback_scan_cap: usize,
    fallback_min_len: usize,
}

impl<'a> MatchEngine<'a> {
    /// Creates an engine with the default fallback bounds.
    #[must_use]
    pub fn new(corpus: &'a RecipeCorpus, index: &'a IngredientIndex) -> Self {
        Self {
            corpus,
            index,
            fallback_scan_cap: DEFAULT_FALLBACK_SCAN_CAP,
            fallback_min_len: DEFAULT_FALLBACK_MIN_LEN,
        }
    }

    /// Overrides the substring-fallback bounds.
    #[must_use]
    pub const fn with_fallback_bounds(mut self, scan_cap: usize, min_len: usize) -> Self {
        self.fallback_scan_cap = scan_cap;
        self.fallback_min_len = min_len;
        self
    }

    /// Computes match results for a query.
    ///
    /// Candidate recipes for each selected term come from the direct index
    /// key, then the canonical key, then — only when both miss and the
    /// normalized term is long enough — a bounded substring scan over all
    /// index keys. Variant recipes and recipes outside the collection
    /// filter are excluded before counting. Results sort by match count
    /// descending, then title ascending.
    #[must_use]
    pub fn match_recipes(&self, query: &MatchQuery) -> Vec<MatchResult> {
        if query.selected.is_empty() {
            return Vec::new();
        }

        let total = query.selected.len();
        let mut hits: HashMap<&str, (usize, Vec<String>)> = HashMap::new();

        for term in &query.selected {
            for id in self.candidates_for(term) {
                let Some(recipe) = self.corpus.get(id) else {
                    continue;
                };
                if !self.is_eligible(recipe, query) {
                    continue;
                }
                let entry = hits.entry(id.as_str()).or_insert_with(|| (0, Vec::new()));
                entry.0 += 1;
                entry.1.push(term.clone());
            }
        }

        let required = match query.mode {
            MatchMode::Any => 1,
            MatchMode::All => total.saturating_sub(usize::from(query.missing_threshold)).max(1),
        };

        let mut results: Vec<MatchResult> = hits
            .into_iter()
            .filter(|(_, (count, _))| *count >= required)
            .map(|(id, (count, matched))| {
                let missing = query
                    .selected
                    .iter()
                    .filter(|term| !matched.contains(*term))
                    .cloned()
                    .collect();
                MatchResult {
                    recipe_id: id.to_string(),
                    match_count: count,
                    matched_ingredients: matched,
                    missing_ingredients: missing,
                    is_perfect_match: count == total,
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.match_count.cmp(&a.match_count).then_with(|| {
                let title_a = self.corpus.get(&a.recipe_id).map_or("", |r| r.title.as_str());
                let title_b = self.corpus.get(&b.recipe_id).map_or("", |r| r.title.as_str());
                title_a.cmp(title_b)
            })
        });
        results
    }

    /// The corpus this engine matches against.
    #[must_use]
    pub const fn corpus(&self) -> &'a RecipeCorpus {
        self.corpus
    }

    /// Recipe ids of recipes matched by the query (order unspecified).
    #[must_use]
    pub fn matched_ids(&self, query: &MatchQuery) -> HashSet<RecipeId> {
        self.match_recipes(query)
            .into_iter()
            .map(|result| result.recipe_id)
            .collect()
    }

    /// True when the recipe participates in matching for this query.
    pub(crate) fn is_eligible(&self, recipe: &crate::recipe::Recipe, query: &MatchQuery) -> bool {
        if !recipe.is_canonical() {
            return false;
        }
        match &query.collection {
            Some(collection) => recipe.collection == *collection,
            None => true,
        }
    }

    /// Gathers candidate recipe ids for one selected term.
    fn candidates_for(&self, term: &str) -> HashSet<&'a RecipeId> {
        let direct = normalize(term);
        let canonical = self.index.canonicalize(term);

        let mut candidates: HashSet<&RecipeId> = HashSet::new();
        if let Some(ids) = self.index.recipes_for(&direct) {
            candidates.extend(ids);
        }
        if canonical != direct {
            if let Some(ids) = self.index.recipes_for(&canonical) {
                candidates.extend(ids);
            }
        }

        if candidates.is_empty() && direct.len() >= self.fallback_min_len {
            self.fallback_scan(&direct, &mut candidates);
        }
        candidates
    }

    /// Bounded linear scan over all index keys, substring containment in
    /// either direction, stopping at the accumulated-id cap.
    fn fallback_scan(&self, term: &str, candidates: &mut HashSet<&'a RecipeId>) {
        for (key, ids) in self.index.entries() {
            if key.contains(term) || term.contains(key) {
                for id in ids {
                    candidates.insert(id);
                    if candidates.len() >= self.fallback_scan_cap {
                        tracing::debug!(term, cap = self.fallback_scan_cap, "fallback scan capped");
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Recipe;
    use serde_json::json;

    fn corpus() -> RecipeCorpus {
        let mk = |id: &str, title: &str, collection: &str, variant_of: Option<&str>| {
            serde_json::from_value::<Recipe>(json!({
                "id": id,
                "title": title,
                "collection": collection,
                "ingredients": [],
                "variant_of": variant_of,
            }))
            .expect("valid recipe")
        };
        RecipeCorpus::new(vec![
            mk("r1", "Meatloaf", "family", None),
            mk("r2", "Tomato Soup", "family", None),
            mk("r3", "Bruschetta", "holiday", None),
            mk("r4", "Tacos", "family", None),
            mk("r5", "Meatloaf (low sodium)", "family", Some("r1")),
        ])
    }

    fn index() -> IngredientIndex {
        IngredientIndex::from_tables(
            [
                (
                    "tomato".to_string(),
                    vec!["r1".to_string(), "r2".to_string(), "r3".to_string()],
                ),
                (
                    "ground beef".to_string(),
                    vec!["r1".to_string(), "r4".to_string()],
                ),
                ("sweet onion".to_string(), vec!["r2".to_string()]),
            ],
            [("tomatoes".to_string(), "tomato".to_string())],
        )
    }

    fn query(selected: &[&str], mode: MatchMode, threshold: u8) -> MatchQuery {
        MatchQueryBuilder::new()
            .ingredients(selected.iter().map(|s| (*s).to_string()))
            .mode(mode)
            .missing_threshold(threshold)
            .build()
    }

    #[test]
    fn empty_selection_yields_empty_results() {
        let corpus = corpus();
        let index = index();
        let engine = MatchEngine::new(&corpus, &index);
        assert!(engine.match_recipes(&query(&[], MatchMode::Any, 0)).is_empty());
    }

    #[test]
    fn all_mode_intersects_selected_ingredients() {
        let corpus = corpus();
        let index = index();
        let engine = MatchEngine::new(&corpus, &index);

        let results = engine.match_recipes(&query(&["tomato", "ground beef"], MatchMode::All, 0));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].recipe_id, "r1");
        assert_eq!(results[0].match_count, 2);
        assert!(results[0].is_perfect_match);
        assert!(results[0].missing_ingredients.is_empty());
    }

    #[test]
    fn any_mode_includes_every_partial_match() {
        let corpus = corpus();
        let index = index();
        let engine = MatchEngine::new(&corpus, &index);

        let results = engine.match_recipes(&query(&["tomato", "ground beef"], MatchMode::Any, 0));
        let ids: Vec<&str> = results.iter().map(|r| r.recipe_id.as_str()).collect();
        // r1 matches both; the rest sort by title ascending.
        assert_eq!(ids, vec!["r1", "r3", "r4", "r2"]);

        let r4 = results.iter().find(|r| r.recipe_id == "r4").unwrap();
        assert_eq!(r4.match_count, 1);
        assert_eq!(r4.missing_ingredients, vec!["tomato".to_string()]);
        assert!(!r4.is_perfect_match);
    }

    #[test]
    fn threshold_relaxes_all_mode() {
        let corpus = corpus();
        let index = index();
        let engine = MatchEngine::new(&corpus, &index);

        let strict = engine.match_recipes(&query(
            &["tomato", "ground beef", "sweet onion"],
            MatchMode::All,
            0,
        ));
        assert!(strict.is_empty());

        let relaxed = engine.match_recipes(&query(
            &["tomato", "ground beef", "sweet onion"],
            MatchMode::All,
            1,
        ));
        let ids: Vec<&str> = relaxed.iter().map(|r| r.recipe_id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
    }

    #[test]
    fn synonyms_resolve_through_the_canonical_key() {
        let corpus = corpus();
        let index = index();
        let engine = MatchEngine::new(&corpus, &index);

        let results = engine.match_recipes(&query(&["Tomatoes"], MatchMode::Any, 0));
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn variants_are_excluded_before_counting() {
        let corpus = corpus();
        let index = IngredientIndex::from_tables(
            [("tomato".to_string(), vec!["r1".to_string(), "r5".to_string()])],
            [],
        );
        let engine = MatchEngine::new(&corpus, &index);

        let results = engine.match_recipes(&query(&["tomato"], MatchMode::Any, 0));
        let ids: Vec<&str> = results.iter().map(|r| r.recipe_id.as_str()).collect();
        assert_eq!(ids, vec!["r1"]);
    }

    #[test]
    fn collection_filter_excludes_other_collections() {
        let corpus = corpus();
        let index = index();
        let engine = MatchEngine::new(&corpus, &index);

        let q = MatchQueryBuilder::new()
            .ingredient("tomato")
            .collection("family")
            .build();
        let results = engine.match_recipes(&q);
        let ids: Vec<&str> = results.iter().map(|r| r.recipe_id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
    }

    #[test]
    fn unknown_ingredient_is_missing_everywhere() {
        let corpus = corpus();
        let index = index();
        let engine = MatchEngine::new(&corpus, &index);

        let results = engine.match_recipes(&query(&["tomato", "zz"], MatchMode::Any, 0));
        for result in &results {
            assert!(result
                .missing_ingredients
                .contains(&"zz".to_string()));
        }
    }

    #[test]
    fn fallback_scan_matches_substrings_both_ways() {
        let corpus = corpus();
        let index = index();
        let engine = MatchEngine::new(&corpus, &index);

        // "onion" is a substring of the "sweet onion" key.
        let results = engine.match_recipes(&query(&["onion"], MatchMode::Any, 0));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].recipe_id, "r2");

        // "sweet onion rings" contains the "sweet onion" key.
        let results = engine.match_recipes(&query(&["sweet onion rings"], MatchMode::Any, 0));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn fallback_scan_requires_minimum_length() {
        let corpus = corpus();
        let index = index();
        let engine = MatchEngine::new(&corpus, &index);

        // "on" is a substring of "sweet onion" but too short for fallback.
        let results = engine.match_recipes(&query(&["on"], MatchMode::Any, 0));
        assert!(results.is_empty());
    }

    #[test]
    fn fallback_scan_honors_the_cap() {
        let mut ingredients = Vec::new();
        let mut recipes = Vec::new();
        for i in 0..50 {
            let id = format!("r{i}");
            recipes.push(
                serde_json::from_value::<Recipe>(json!({
                    "id": id,
                    "title": format!("Recipe {i}"),
                    "ingredients": [],
                }))
                .expect("valid recipe"),
            );
            ingredients.push((format!("pepper blend {i}"), vec![id]));
        }
        let corpus = RecipeCorpus::new(recipes);
        let index = IngredientIndex::from_tables(ingredients, []);
        let engine = MatchEngine::new(&corpus, &index).with_fallback_bounds(10, 3);

        let results = engine.match_recipes(&query(&["pepper"], MatchMode::Any, 0));
        assert_eq!(results.len(), 10);
    }

    #[test]
    fn builder_clamps_the_threshold() {
        let q = MatchQueryBuilder::new().missing_threshold(9).build();
        assert_eq!(q.missing_threshold, MAX_MISSING_THRESHOLD);
    }
}
