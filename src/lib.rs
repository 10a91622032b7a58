//! # Larder - Recipe discovery over a family recipe corpus
//!
//! Larder is the ingredient matching and substitution engine behind a
//! recipe-discovery surface: given the ingredients a user has on hand
//! (plus pantry staples), it ranks and filters recipes, reports what is
//! missing, suggests ingredients to add or drop, resolves bidirectional
//! ingredient substitutions with estimated nutrition impact, and scales
//! quantities with culinary-aware rounding.
//!
//! ## Core Concepts
//!
//! - **Ingredient index**: canonical-name ↔ synonym mapping plus a
//!   canonical-name → recipe index, loaded once as a build-time artifact
//! - **Match engine**: pure, deterministic per-recipe match computation
//! - **Substitution rules**: one-directional stored rules answered in both
//!   directions at query time
//! - **Session**: caller-owned mutable state; the engine holds none
//!
//! ## Usage
//!
//! ```rust,ignore
//! use larder::{LarderEngine, MatchMode, MatchQueryBuilder, RecipeCorpus};
//!
//! let engine = LarderEngine::new(corpus, artifact_source, preference_store);
//! engine.request_index().recv()??;
//!
//! let query = MatchQueryBuilder::new()
//!     .ingredient("tomato")
//!     .ingredient("ground beef")
//!     .mode(MatchMode::All)
//!     .build();
//! let results = engine.match_recipes(&query);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod error;
pub mod fuzzy;
pub mod index;
pub mod loader;
pub mod matching;
pub mod nutrition;
pub mod quantity;
pub mod recipe;
pub mod session;
pub mod staples;
pub mod storage;
pub mod substitution;
pub mod suggestions;

// Re-export primary types at crate root for convenience
pub use engine::{
    EngineConfig, LarderEngine, INGREDIENT_INDEX_ARTIFACT, SEARCH_PREFERENCES_KEY, STAPLES_KEY,
    SUBSTITUTION_RULES_ARTIFACT,
};
pub use error::{ArtifactError, LarderError, LarderResult, StorageError};
pub use fuzzy::RankedCandidate;
pub use index::{normalize, IngredientIndex};
pub use loader::{
    ArtifactCell, ArtifactEnvelope, ArtifactSource, FileArtifactSource, LoadOutcome, LoadState,
    StaticArtifactSource,
};
pub use matching::{MatchEngine, MatchMode, MatchQuery, MatchQueryBuilder, MatchResult};
pub use nutrition::{Macros, NutritionEstimate};
pub use quantity::ScaledQuantity;
pub use recipe::{Recipe, RecipeCorpus, RecipeId, RecipeIngredient};
pub use session::{SearchPreferences, Session, SubstitutionSelection};
pub use staples::StapleExpansionRule;
pub use storage::{InMemoryPreferenceStore, PreferenceStore};
pub use substitution::{
    Direction, SubstituteSpec, SubstitutionOption, SubstitutionRule, SubstitutionRuleSet,
};
pub use suggestions::{AddSuggestion, RemoveSuggestion};
