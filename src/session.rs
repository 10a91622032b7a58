//! Caller-owned session state.
//!
//! The engine holds no mutable state beyond the immutable loaded
//! artifacts; everything the user is doing right now — selection, mode,
//! staples, active substitutions — lives in a [`Session`] the caller owns
//! and passes into otherwise-pure engine functions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::index::normalize;
use crate::matching::{MatchMode, MatchQuery, MAX_MISSING_THRESHOLD};
use crate::nutrition::Macros;

/// A substitution the user has applied on a recipe view.
///
/// Created when a swap is applied, destroyed on revert or when the user
/// navigates to another recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionSelection {
    /// Position of the swapped line in the recipe's ingredient list.
    pub ingredient_index: usize,
    /// Original ingredient name.
    pub original: String,
    /// Substitute swapped in.
    pub substitute: String,
    /// Estimated per-serving shift, when one could be computed.
    pub nutrition_delta: Option<Macros>,
}

/// Persisted search preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPreferences {
    /// Preferred combination mode.
    #[serde(default)]
    pub mode: MatchMode,
    /// Preferred missing-ingredient threshold.
    #[serde(default)]
    pub missing_threshold: u8,
}

/// One user's in-progress discovery session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    selection: Vec<String>,
    mode: MatchMode,
    missing_threshold: u8,
    collection: Option<String>,
    staples: Vec<String>,
    substitutions: Vec<SubstitutionSelection>,
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            selection: Vec::new(),
            mode: MatchMode::Any,
            missing_threshold: 0,
            collection: None,
            staples: Vec::new(),
            substitutions: Vec::new(),
        }
    }

    /// Session identity, for diagnostics.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Currently selected ingredients, in selection order.
    #[must_use]
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Adds an ingredient to the selection. Blank names and duplicates
    /// (by normalized comparison) are ignored.
    pub fn select(&mut self, name: impl Into<String>) {
        let name = name.into();
        let key = normalize(&name);
        if key.is_empty() {
            return;
        }
        if !self.selection.iter().any(|s| normalize(s) == key) {
            self.selection.push(name);
        }
    }

    /// Removes an ingredient from the selection by normalized comparison.
    pub fn deselect(&mut self, name: &str) {
        let key = normalize(name);
        self.selection.retain(|s| normalize(s) != key);
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Current combination mode.
    #[must_use]
    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Sets the combination mode.
    pub fn set_mode(&mut self, mode: MatchMode) {
        self.mode = mode;
    }

    /// Sets the missing threshold; out-of-range values clamp.
    pub fn set_missing_threshold(&mut self, threshold: u8) {
        self.missing_threshold = threshold.min(MAX_MISSING_THRESHOLD);
    }

    /// Restricts matching to one collection, or lifts the restriction.
    pub fn set_collection(&mut self, collection: Option<String>) {
        self.collection = collection;
    }

    /// Current staples, normalized.
    #[must_use]
    pub fn staples(&self) -> &[String] {
        &self.staples
    }

    /// Replaces the staple list (normalized, deduplicated).
    pub fn set_staples(&mut self, staples: impl IntoIterator<Item = String>) {
        self.staples.clear();
        for staple in staples {
            self.add_staple(&staple);
        }
    }

    /// Adds one staple.
    pub fn add_staple(&mut self, name: &str) {
        let key = normalize(name);
        if !key.is_empty() && !self.staples.contains(&key) {
            self.staples.push(key);
        }
    }

    /// Removes one staple.
    pub fn remove_staple(&mut self, name: &str) {
        let key = normalize(name);
        self.staples.retain(|s| *s != key);
    }

    /// Active substitutions on the current recipe view.
    #[must_use]
    pub fn substitutions(&self) -> &[SubstitutionSelection] {
        &self.substitutions
    }

    /// Applies a substitution. A second swap on the same ingredient line
    /// replaces the first.
    pub fn apply_substitution(&mut self, selection: SubstitutionSelection) {
        self.substitutions
            .retain(|s| s.ingredient_index != selection.ingredient_index);
        self.substitutions.push(selection);
    }

    /// Reverts the substitution on one ingredient line.
    pub fn revert_substitution(&mut self, ingredient_index: usize) -> Option<SubstitutionSelection> {
        let position = self
            .substitutions
            .iter()
            .position(|s| s.ingredient_index == ingredient_index)?;
        Some(self.substitutions.remove(position))
    }

    /// Drops all substitutions. Called on recipe navigation.
    pub fn clear_substitutions(&mut self) {
        self.substitutions.clear();
    }

    /// Active nutrition deltas, in application order.
    #[must_use]
    pub fn active_deltas(&self) -> Vec<Macros> {
        self.substitutions
            .iter()
            .filter_map(|s| s.nutrition_delta)
            .collect()
    }

    /// The match query this session currently describes.
    #[must_use]
    pub fn match_query(&self) -> MatchQuery {
        MatchQuery {
            selected: self.selection.clone(),
            mode: self.mode,
            missing_threshold: self.missing_threshold,
            collection: self.collection.clone(),
        }
    }

    /// Snapshot of the persistable preferences.
    #[must_use]
    pub const fn preferences(&self) -> SearchPreferences {
        SearchPreferences {
            mode: self.mode,
            missing_threshold: self.missing_threshold,
        }
    }

    /// Applies loaded preferences.
    pub fn apply_preferences(&mut self, preferences: SearchPreferences) {
        self.mode = preferences.mode;
        self.missing_threshold = preferences.missing_threshold.min(MAX_MISSING_THRESHOLD);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
