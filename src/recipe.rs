//! Recipe corpus types.
//!
//! The corpus is produced by an external data-loading collaborator and
//! consumed read-only here. Decoding is defensive: a malformed entry is
//! skipped with a log line rather than aborting the whole corpus, and an
//! entirely unavailable corpus is indistinguishable from an empty one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::nutrition::Macros;

/// Corpus-assigned recipe identifier.
pub type RecipeId = String;

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Ingredient name as written in the recipe.
    pub item: String,

    /// Quantity string, fraction-capable (`"1 1/2"`, `"½"`, `"2"`).
    #[serde(default)]
    pub quantity: String,

    /// Measurement unit, when the line has one.
    #[serde(default)]
    pub unit: Option<String>,

    /// Preparation note (`"diced"`, `"room temperature"`).
    #[serde(default)]
    pub prep_note: Option<String>,
}

/// One recipe of the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Stable identifier.
    pub id: RecipeId,

    /// Display title.
    pub title: String,

    /// Category label (mains, sides, desserts, ...).
    #[serde(default)]
    pub category: String,

    /// Collection the recipe belongs to.
    #[serde(default)]
    pub collection: String,

    /// Ingredient lines.
    pub ingredients: Vec<RecipeIngredient>,

    /// Declared per-serving nutrition, when the card carries it.
    #[serde(default)]
    pub nutrition: Option<Macros>,

    /// Set when this entry is a variant of another recipe. Variants are
    /// excluded from match computation.
    #[serde(default)]
    pub variant_of: Option<RecipeId>,
}

impl Recipe {
    /// True when this is a canonical (non-variant) entry.
    #[must_use]
    pub const fn is_canonical(&self) -> bool {
        self.variant_of.is_none()
    }
}

/// The loaded, ordered recipe corpus.
#[derive(Debug, Clone, Default)]
pub struct RecipeCorpus {
    recipes: Vec<Recipe>,
    by_id: HashMap<RecipeId, usize>,
}

impl RecipeCorpus {
    /// Builds a corpus from already-decoded recipes.
    ///
    /// A duplicate id keeps the first occurrence and logs the rest.
    #[must_use]
    pub fn new(recipes: Vec<Recipe>) -> Self {
        let mut by_id = HashMap::with_capacity(recipes.len());
        let mut kept = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            if by_id.contains_key(&recipe.id) {
                tracing::warn!(id = recipe.id.as_str(), "duplicate recipe id skipped");
                continue;
            }
            by_id.insert(recipe.id.clone(), kept.len());
            kept.push(recipe);
        }
        Self {
            recipes: kept,
            by_id,
        }
    }

    /// Decodes a corpus from raw JSON values.
    ///
    /// Entries that fail to decode (missing `id` or `ingredients`, wrong
    /// shapes) are skipped with a warning; the rest of the corpus loads.
    #[must_use]
    pub fn from_values(values: Vec<serde_json::Value>) -> Self {
        let mut recipes = Vec::with_capacity(values.len());
        for (position, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<Recipe>(value) {
                Ok(recipe) => recipes.push(recipe),
                Err(err) => {
                    tracing::warn!(position, error = %err, "malformed corpus entry skipped");
                }
            }
        }
        Self::new(recipes)
    }

    /// Looks up a recipe by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.by_id.get(id).map(|&idx| &self.recipes[idx])
    }

    /// Iterates recipes in corpus order.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    /// Number of recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Returns true when the corpus holds no recipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
