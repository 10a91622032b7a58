//! Bidirectional ingredient substitution lookup.
//!
//! Rules are stored one-directionally in the substitution artifact; reverse
//! relations are synthesized at query time. When several rules fire for one
//! name the union of their options is returned — multiple overlapping
//! substitution paths are intentional, not a deduplication bug.

use serde::{Deserialize, Serialize};

use crate::index::normalize;
use crate::staples::StapleExpansionRule;

/// Goal a substitution moves toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward a health goal (lower fat, fewer calories).
    Health,
    /// Toward a convenience goal (shelf-stable, already-on-hand).
    Convenience,
}

impl Direction {
    /// The opposite direction, used for synthesized reverse options.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Health => Self::Convenience,
            Self::Convenience => Self::Health,
        }
    }
}

/// One stored substitute under a rule's primary ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstituteSpec {
    /// Substitute ingredient name.
    pub ingredient: String,

    /// Two-part exchange ratio, `"a:b"` (a of the primary per b of the
    /// substitute).
    pub ratio: String,

    /// Goal direction of the stored (forward) relation.
    pub direction: Direction,

    /// Subjective quality note (`"excellent"`, `"in a pinch"`).
    #[serde(default)]
    pub quality: Option<String>,

    /// Free-form usage notes.
    #[serde(default)]
    pub notes: Option<String>,

    /// Textual nutrition impact (`"Save 850 calories per batch"`).
    #[serde(default)]
    pub impact: Option<String>,
}

/// One substitution rule: a primary ingredient, its alternate names, and
/// its stored substitutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionRule {
    /// Canonical primary ingredient.
    pub primary: String,

    /// Alternate names the rule also answers for.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Stored forward substitutes.
    pub substitutes: Vec<SubstituteSpec>,
}

/// The loaded substitution artifact: the rule list plus the dedicated
/// staple-expansion table (§ staples).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubstitutionRuleSet {
    /// Substitution rules.
    pub rules: Vec<SubstitutionRule>,

    /// Staple-expansion table consumed by [`crate::staples`].
    #[serde(default)]
    pub staple_expansions: Vec<StapleExpansionRule>,
}

/// A substitution option answered to the caller, forward or synthesized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstitutionOption {
    /// Ingredient to swap in.
    pub ingredient: String,
    /// Exchange ratio. Reverse options reuse the stored forward ratio
    /// unmodified.
    pub ratio: String,
    /// Goal direction; flipped on reverse options.
    pub direction: Direction,
    /// Quality note (forward options only).
    pub quality: Option<String>,
    /// Usage notes; reverse options get a `"reverse of: …"` marker.
    pub notes: Option<String>,
    /// Textual nutrition impact (forward options only).
    pub impact: Option<String>,
}

impl SubstitutionRuleSet {
    /// Finds substitutes for an ingredient name, both directions.
    ///
    /// The input is normalized, then every rule is consulted twice: a
    /// forward hit on the primary or an alias yields the rule's stored
    /// substitutes; a reverse hit on a stored substitute synthesizes an
    /// option pointing back at the primary. Returns `None` when nothing
    /// fires.
    #[must_use]
    pub fn find_substitutes_for(&self, name: &str) -> Option<Vec<SubstitutionOption>> {
        let needle = normalize(name);
        if needle.is_empty() {
            return None;
        }

        let mut options = Vec::new();
        for rule in &self.rules {
            if normalize(&rule.primary) == needle
                || rule.aliases.iter().any(|alias| normalize(alias) == needle)
            {
                options.extend(rule.substitutes.iter().map(|spec| SubstitutionOption {
                    ingredient: spec.ingredient.clone(),
                    ratio: spec.ratio.clone(),
                    direction: spec.direction,
                    quality: spec.quality.clone(),
                    notes: spec.notes.clone(),
                    impact: spec.impact.clone(),
                }));
            }

            for spec in &rule.substitutes {
                if normalize(&spec.ingredient) == needle {
                    options.push(SubstitutionOption {
                        ingredient: rule.primary.clone(),
                        ratio: spec.ratio.clone(),
                        direction: spec.direction.flipped(),
                        quality: None,
                        notes: Some(format!(
                            "reverse of: {}",
                            spec.notes.as_deref().unwrap_or(&rule.primary)
                        )),
                        impact: None,
                    });
                }
            }
        }

        if options.is_empty() {
            None
        } else {
            Some(options)
        }
    }

    /// Looks up the stored impact note for a specific forward swap, used
    /// as the hint for nutrition estimation.
    #[must_use]
    pub fn impact_for(&self, original: &str, substitute: &str) -> Option<String> {
        let from = normalize(original);
        let to = normalize(substitute);
        self.rules
            .iter()
            .filter(|rule| {
                normalize(&rule.primary) == from
                    || rule.aliases.iter().any(|alias| normalize(alias) == from)
            })
            .flat_map(|rule| &rule.substitutes)
            .find(|spec| normalize(&spec.ingredient) == to)
            .and_then(|spec| spec.impact.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn butter_rule_set() -> SubstitutionRuleSet {
        SubstitutionRuleSet {
            rules: vec![SubstitutionRule {
                primary: "butter".to_string(),
                aliases: vec!["unsalted butter".to_string()],
                substitutes: vec![
                    SubstituteSpec {
                        ingredient: "applesauce".to_string(),
                        ratio: "1:2".to_string(),
                        direction: Direction::Health,
                        quality: Some("good in quick breads".to_string()),
                        notes: Some("best in moist bakes".to_string()),
                        impact: Some("Save 850 calories per batch".to_string()),
                    },
                    SubstituteSpec {
                        ingredient: "margarine".to_string(),
                        ratio: "1:1".to_string(),
                        direction: Direction::Convenience,
                        quality: None,
                        notes: None,
                        impact: None,
                    },
                ],
            }],
            staple_expansions: Vec::new(),
        }
    }

    #[test]
    fn forward_lookup_returns_stored_substitutes() {
        let rules = butter_rule_set();
        let options = rules.find_substitutes_for("Butter").expect("rule fires");
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].ingredient, "applesauce");
        assert_eq!(options[0].direction, Direction::Health);
        assert_eq!(options[1].ingredient, "margarine");
    }

    #[test]
    fn alias_fires_the_forward_rule() {
        let rules = butter_rule_set();
        let options = rules
            .find_substitutes_for("unsalted butter")
            .expect("alias fires");
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn reverse_lookup_synthesizes_an_option() {
        let rules = butter_rule_set();
        let options = rules
            .find_substitutes_for("applesauce")
            .expect("reverse fires");
        assert_eq!(options.len(), 1);

        let option = &options[0];
        assert_eq!(option.ingredient, "butter");
        // The forward ratio is reused as-is on reverse lookup.
        assert_eq!(option.ratio, "1:2");
        assert_eq!(option.direction, Direction::Convenience);
        assert!(option.notes.as_deref().unwrap().starts_with("reverse of:"));
        assert!(option.impact.is_none());
    }

    #[test]
    fn forward_and_reverse_union_without_dedup() {
        let mut rules = butter_rule_set();
        // A second rule whose primary is applesauce.
        rules.rules.push(SubstitutionRule {
            primary: "applesauce".to_string(),
            aliases: Vec::new(),
            substitutes: vec![SubstituteSpec {
                ingredient: "mashed banana".to_string(),
                ratio: "1:1".to_string(),
                direction: Direction::Convenience,
                quality: None,
                notes: None,
                impact: None,
            }],
        });

        let options = rules.find_substitutes_for("applesauce").expect("both fire");
        // Forward hit from its own rule plus the synthesized reverse from
        // the butter rule.
        assert_eq!(options.len(), 2);
        let ingredients: Vec<&str> = options.iter().map(|o| o.ingredient.as_str()).collect();
        assert!(ingredients.contains(&"mashed banana"));
        assert!(ingredients.contains(&"butter"));
    }

    #[test]
    fn unknown_ingredient_yields_none() {
        let rules = butter_rule_set();
        assert!(rules.find_substitutes_for("saffron").is_none());
        assert!(rules.find_substitutes_for("").is_none());
    }

    #[test]
    fn impact_for_finds_the_forward_note() {
        let rules = butter_rule_set();
        assert!(rules
            .impact_for("butter", "applesauce")
            .unwrap()
            .contains("850"));
        assert!(rules.impact_for("butter", "margarine").is_none());
        assert!(rules.impact_for("applesauce", "butter").is_none());
    }
}
