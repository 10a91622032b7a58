//! The Larder engine facade.
//!
//! Wires the loaded artifacts, the corpus, and the injected preference
//! store behind the public operations. Every operation is synchronous and
//! pure over in-memory data; if an artifact has not loaded (or failed to),
//! the operations depending on it degrade to empty/`None` answers while
//! everything else keeps working.

use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::error::StorageError;
use crate::fuzzy::{self, RankedCandidate};
use crate::index::{normalize, IngredientIndex};
use crate::loader::{ArtifactCell, ArtifactSource, LoadOutcome, LoadState};
use crate::matching::{
    MatchEngine, MatchQuery, MatchResult, DEFAULT_FALLBACK_MIN_LEN, DEFAULT_FALLBACK_SCAN_CAP,
};
use crate::nutrition::{self, Macros, NutritionEstimate};
use crate::quantity::{self, ScaledQuantity};
use crate::recipe::RecipeCorpus;
use crate::session::{SearchPreferences, Session};
use crate::staples;
use crate::storage::PreferenceStore;
use crate::substitution::{SubstitutionOption, SubstitutionRuleSet};
use crate::suggestions::{
    self, AddSuggestion, RemoveSuggestion, DEFAULT_MIN_UNLOCK_COUNT, DEFAULT_SUGGESTION_LIMIT,
};

/// Artifact name of the ingredient index.
pub const INGREDIENT_INDEX_ARTIFACT: &str = "ingredient-index.json";

/// Artifact name of the substitution rules.
pub const SUBSTITUTION_RULES_ARTIFACT: &str = "substitution-rules.json";

/// Preference-store key for the staple list.
pub const STAPLES_KEY: &str = "larder.staples";

/// Preference-store key for search preferences.
pub const SEARCH_PREFERENCES_KEY: &str = "larder.search-preferences";

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cap on recipe ids accumulated by one substring-fallback scan.
    pub fallback_scan_cap: usize,
    /// Minimum normalized term length for the fallback scan.
    pub fallback_min_len: usize,
    /// Minimum distinct recipes an add suggestion must unlock.
    pub min_unlock_count: usize,
    /// Default suggestion list length.
    pub suggestion_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_scan_cap: DEFAULT_FALLBACK_SCAN_CAP,
            fallback_min_len: DEFAULT_FALLBACK_MIN_LEN,
            min_unlock_count: DEFAULT_MIN_UNLOCK_COUNT,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

/// The engine. Immutable after construction apart from the one-shot
/// artifact cells.
pub struct LarderEngine {
    corpus: RecipeCorpus,
    source: Arc<dyn ArtifactSource>,
    prefs: Arc<dyn PreferenceStore>,
    index: Arc<ArtifactCell<IngredientIndex>>,
    rules: Arc<ArtifactCell<SubstitutionRuleSet>>,
    config: EngineConfig,
}

impl LarderEngine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new(
        corpus: RecipeCorpus,
        source: Arc<dyn ArtifactSource>,
        prefs: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self::with_config(corpus, source, prefs, EngineConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    #[must_use]
    pub fn with_config(
        corpus: RecipeCorpus,
        source: Arc<dyn ArtifactSource>,
        prefs: Arc<dyn PreferenceStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            corpus,
            source,
            prefs,
            index: Arc::new(ArtifactCell::new(INGREDIENT_INDEX_ARTIFACT)),
            rules: Arc::new(ArtifactCell::new(SUBSTITUTION_RULES_ARTIFACT)),
            config,
        }
    }

    /// The recipe corpus.
    #[must_use]
    pub const fn corpus(&self) -> &RecipeCorpus {
        &self.corpus
    }

    // ----- artifact lifecycle -------------------------------------------

    /// Requests the ingredient index artifact (coalesced, once per
    /// session).
    pub fn request_index(&self) -> Receiver<LoadOutcome<IngredientIndex>> {
        self.index.request(&self.source)
    }

    /// Requests the substitution rules artifact.
    pub fn request_rules(&self) -> Receiver<LoadOutcome<SubstitutionRuleSet>> {
        self.rules.request(&self.source)
    }

    /// Load state of the ingredient index.
    #[must_use]
    pub fn index_state(&self) -> LoadState {
        self.index.state()
    }

    /// Load state of the substitution rules.
    #[must_use]
    pub fn rules_state(&self) -> LoadState {
        self.rules.state()
    }

    // ----- matching and search ------------------------------------------

    /// Computes match results for a query. Empty until the index loads.
    #[must_use]
    pub fn match_recipes(&self, query: &MatchQuery) -> Vec<MatchResult> {
        let Some(index) = self.index.get() else {
            tracing::debug!("match_recipes before index load; returning empty");
            return Vec::new();
        };
        self.match_engine(&index).match_recipes(query)
    }

    /// Ranks ingredient names for autocomplete. Empty until the index
    /// loads.
    #[must_use]
    pub fn search_ingredient_names(&self, query: &str, limit: usize) -> Vec<RankedCandidate> {
        let Some(index) = self.index.get() else {
            return Vec::new();
        };
        fuzzy::rank(
            index.entries().map(|(name, ids)| (name, ids.len())),
            query,
            limit,
        )
    }

    // ----- substitutions ------------------------------------------------

    /// Finds substitutes for an ingredient, both directions. `None` until
    /// the rules load, and for unknown ingredients.
    #[must_use]
    pub fn find_substitutes_for(&self, name: &str) -> Option<Vec<SubstitutionOption>> {
        self.rules.get()?.find_substitutes_for(name)
    }

    /// Expands a staple list one hop through the expansion table. Without
    /// loaded rules the staples pass through normalized, unexpanded.
    #[must_use]
    pub fn expand_staples(&self, staple_list: &[String]) -> Vec<String> {
        let index = self.index.get();
        match self.rules.get() {
            Some(rules) => staples::expand(staple_list, &rules.staple_expansions, index.as_deref()),
            None => staples::expand(staple_list, &[], index.as_deref()),
        }
    }

    // ----- suggestions --------------------------------------------------

    /// Ingredients whose addition would unlock the most recipes.
    #[must_use]
    pub fn calculate_add_suggestions(
        &self,
        query: &MatchQuery,
        staple_list: &[String],
        limit: Option<usize>,
    ) -> Vec<AddSuggestion> {
        let Some(index) = self.index.get() else {
            return Vec::new();
        };
        let held = self.expand_staples(staple_list);
        suggestions::add_suggestions(
            &self.match_engine(&index),
            query,
            &held,
            self.config.min_unlock_count,
            limit.unwrap_or(self.config.suggestion_limit),
        )
    }

    /// Selected ingredients whose removal would grow the match set.
    #[must_use]
    pub fn calculate_remove_suggestions(
        &self,
        query: &MatchQuery,
        staple_list: &[String],
        limit: Option<usize>,
    ) -> Vec<RemoveSuggestion> {
        let Some(index) = self.index.get() else {
            return Vec::new();
        };
        suggestions::remove_suggestions(
            &self.match_engine(&index),
            query,
            staple_list,
            limit.unwrap_or(self.config.suggestion_limit),
        )
    }

    // ----- quantities and nutrition -------------------------------------

    /// Parses, scales, and formats a quantity string. Pure passthrough;
    /// needs no artifacts.
    #[must_use]
    pub fn scale_quantity(
        &self,
        input: &str,
        factor: f64,
        unit: Option<&str>,
    ) -> Option<ScaledQuantity> {
        quantity::scale_quantity(input, factor, unit)
    }

    /// Estimates the nutrition shift of one swap. The stored rule impact
    /// note serves as a fallback hint when the macro table misses.
    #[must_use]
    pub fn estimate_nutrition_delta(&self, original: &str, substitute: &str) -> Option<Macros> {
        let impact = self
            .rules
            .get()
            .and_then(|rules| rules.impact_for(original, substitute));
        nutrition::estimate_delta(original, substitute, impact.as_deref())
    }

    /// Estimates a recipe's per-serving nutrition under the session's
    /// active substitutions. `None` when the recipe is unknown or carries
    /// no declared nutrition.
    #[must_use]
    pub fn estimate_recipe_nutrition(
        &self,
        recipe_id: &str,
        session: &Session,
    ) -> Option<NutritionEstimate> {
        let declared = self.corpus.get(recipe_id)?.nutrition?;
        Some(nutrition::apply_deltas(&declared, &session.active_deltas()))
    }

    // ----- persisted user state -----------------------------------------

    /// Loads the persisted staple list. Missing or undecodable state
    /// degrades to an empty list.
    pub fn load_staples(&self) -> Result<Vec<String>, StorageError> {
        let Some(raw) = self.prefs.get(STAPLES_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(staple_list) => Ok(staple_list),
            Err(err) => {
                tracing::warn!(error = %err, "stored staples undecodable; treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Persists the staple list, normalized.
    pub fn save_staples(&self, staple_list: &[String]) -> Result<(), StorageError> {
        let normalized: Vec<String> = staple_list
            .iter()
            .map(|s| normalize(s))
            .filter(|s| !s.is_empty())
            .collect();
        let raw = serde_json::to_string(&normalized)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.prefs.set(STAPLES_KEY, &raw)
    }

    /// Clears the persisted staple list.
    pub fn clear_staples(&self) -> Result<(), StorageError> {
        self.prefs.clear(STAPLES_KEY)
    }

    /// Loads persisted search preferences, defaulting when absent or
    /// undecodable.
    pub fn load_search_preferences(&self) -> Result<SearchPreferences, StorageError> {
        let Some(raw) = self.prefs.get(SEARCH_PREFERENCES_KEY)? else {
            return Ok(SearchPreferences::default());
        };
        match serde_json::from_str(&raw) {
            Ok(preferences) => Ok(preferences),
            Err(err) => {
                tracing::warn!(error = %err, "stored preferences undecodable; using defaults");
                Ok(SearchPreferences::default())
            }
        }
    }

    /// Persists search preferences.
    pub fn save_search_preferences(
        &self,
        preferences: &SearchPreferences,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(preferences)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.prefs.set(SEARCH_PREFERENCES_KEY, &raw)
    }

    fn match_engine<'a>(&'a self, index: &'a IngredientIndex) -> MatchEngine<'a> {
        MatchEngine::new(&self.corpus, index)
            .with_fallback_bounds(self.config.fallback_scan_cap, self.config.fallback_min_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryPreferenceStore;

    fn empty_engine() -> LarderEngine {
        LarderEngine::new(
            RecipeCorpus::default(),
            Arc::new(crate::loader::StaticArtifactSource::new()),
            Arc::new(InMemoryPreferenceStore::new()),
        )
    }

    #[test]
    fn operations_degrade_before_artifacts_load() {
        let engine = empty_engine();
        let query = crate::matching::MatchQueryBuilder::new()
            .ingredient("tomato")
            .build();

        assert!(engine.match_recipes(&query).is_empty());
        assert!(engine.search_ingredient_names("tom", 5).is_empty());
        assert!(engine.find_substitutes_for("butter").is_none());
        assert!(engine
            .calculate_add_suggestions(&query, &[], None)
            .is_empty());
        // Quantity scaling is independent of every artifact.
        assert!(engine.scale_quantity("1/2", 2.0, None).is_some());
    }

    #[test]
    fn unexpanded_staples_pass_through_without_rules() {
        let engine = empty_engine();
        let out = engine.expand_staples(&["Milk".to_string()]);
        assert_eq!(out, vec!["milk"]);
    }

    #[test]
    fn staple_round_trip_through_the_store() {
        let engine = empty_engine();
        engine
            .save_staples(&["Olive Oil".to_string(), " ".to_string()])
            .unwrap();
        assert_eq!(engine.load_staples().unwrap(), vec!["olive oil"]);

        engine.clear_staples().unwrap();
        assert!(engine.load_staples().unwrap().is_empty());
    }

    #[test]
    fn preference_round_trip_through_the_store() {
        let engine = empty_engine();
        let prefs = SearchPreferences {
            mode: crate::matching::MatchMode::All,
            missing_threshold: 2,
        };
        engine.save_search_preferences(&prefs).unwrap();
        assert_eq!(engine.load_search_preferences().unwrap(), prefs);
    }

    #[test]
    fn undecodable_staples_degrade_to_empty() {
        let engine = empty_engine();
        engine.prefs.set(STAPLES_KEY, "not json").unwrap();
        assert!(engine.load_staples().unwrap().is_empty());
    }
}
