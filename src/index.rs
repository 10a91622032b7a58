//! Ingredient name normalization and the loaded ingredient index.
//!
//! The index is a build-time artifact mapping canonical ingredient names to
//! the recipes that use them, plus a synonym table resolving variant
//! spellings to their canonical name. It is immutable after load and is
//! consulted by exact key only; interactive fuzzy ranking lives in
//! [`crate::fuzzy`] so that match computation stays deterministic and cheap.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::recipe::RecipeId;

/// Normalizes an ingredient name for use as an index or rule key.
///
/// Lower-cases, strips commas and parentheses, collapses runs of whitespace,
/// and trims. `"Tomatoes, diced (fresh)"` becomes `"tomatoes diced fresh"`.
#[must_use]
pub fn normalize(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            ',' | '(' | ')' => cleaned.push(' '),
            other => cleaned.extend(other.to_lowercase()),
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The loaded ingredient index artifact.
///
/// Invariant: every synonym resolves to exactly one canonical name. The
/// artifact is loaded exactly once per session and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientIndex {
    /// Canonical ingredient name to the ordered set of recipes using it.
    ingredients: BTreeMap<String, Vec<RecipeId>>,

    /// Variant spelling to canonical name.
    #[serde(default)]
    synonyms: HashMap<String, String>,
}

impl IngredientIndex {
    /// Builds an index from explicit tables. Keys are normalized on entry.
    #[must_use]
    pub fn from_tables(
        ingredients: impl IntoIterator<Item = (String, Vec<RecipeId>)>,
        synonyms: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let ingredients = ingredients
            .into_iter()
            .map(|(name, ids)| (normalize(&name), ids))
            .collect();
        let synonyms = synonyms
            .into_iter()
            .map(|(variant, canonical)| (normalize(&variant), normalize(&canonical)))
            .collect();
        Self {
            ingredients,
            synonyms,
        }
    }

    /// Resolves a name to its canonical form.
    ///
    /// The input is normalized first; a synonym hit replaces it with the
    /// canonical name, otherwise the normalized input is already canonical.
    #[must_use]
    pub fn canonicalize(&self, name: &str) -> String {
        let key = normalize(name);
        match self.synonyms.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }

    /// Recipe ids for an already-normalized key. Exact lookup only.
    #[must_use]
    pub fn recipes_for(&self, key: &str) -> Option<&[RecipeId]> {
        self.ingredients.get(key).map(Vec::as_slice)
    }

    /// Iterates `(canonical name, recipe ids)` entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[RecipeId])> {
        self.ingredients
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    /// Number of canonical ingredient entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    /// Returns true if the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    /// Logs structural oddities in the loaded artifact.
    ///
    /// A synonym pointing at a canonical name with no recipe entry is not
    /// fatal (the lookup simply yields nothing), but it usually means the
    /// index generator and the rule author disagree, so it is worth a line
    /// in the log.
    pub fn log_validation(&self) {
        for (variant, canonical) in &self.synonyms {
            if !self.ingredients.contains_key(canonical) {
                tracing::warn!(
                    variant = variant.as_str(),
                    canonical = canonical.as_str(),
                    "synonym resolves to a canonical name absent from the index"
                );
            }
        }
    }
}
