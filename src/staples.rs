//! Single-hop staple expansion.
//!
//! A staple is a pantry ingredient the user always considers available.
//! The expansion table widens a staple to the ingredients it can stand in
//! for (`milk` also matches `buttermilk`). Expansion is deliberately one
//! hop: the output is never re-expanded, which bounds the blast radius and
//! keeps the operation O(|staples| × |rules|).

use serde::{Deserialize, Serialize};

use crate::index::{normalize, IngredientIndex};

/// One row of the dedicated staple-expansion table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StapleExpansionRule {
    /// Canonical staple name.
    pub staple: String,

    /// Ingredients the staple also counts as.
    #[serde(default)]
    pub also_matches: Vec<String>,
}

/// Expands a staple list by one hop through the expansion table.
///
/// Each staple is canonicalized (through the index when one is loaded,
/// plain normalization otherwise) and kept; a table hit unions its
/// `also_matches` into the result. Order is preserved, duplicates are
/// dropped, and added names are not themselves expanded.
#[must_use]
pub fn expand(
    staples: &[String],
    rules: &[StapleExpansionRule],
    index: Option<&IngredientIndex>,
) -> Vec<String> {
    let canonicalize = |name: &str| match index {
        Some(index) => index.canonicalize(name),
        None => normalize(name),
    };

    let mut expanded: Vec<String> = Vec::with_capacity(staples.len());
    let mut push_unique = |list: &mut Vec<String>, name: String| {
        if !name.is_empty() && !list.contains(&name) {
            list.push(name);
        }
    };

    for staple in staples {
        let canonical = canonicalize(staple);
        push_unique(&mut expanded, canonical.clone());

        for rule in rules {
            if normalize(&rule.staple) == canonical {
                for extra in &rule.also_matches {
                    push_unique(&mut expanded, canonicalize(extra));
                }
            }
        }
    }

    expanded
}
