//! Heuristic nutrition deltas for ingredient substitutions.
//!
//! Estimates only. The macro table below holds rough per-common-measure
//! values for the ingredients that show up in substitution rules; a delta
//! computed from it is a hint for the cook, never an authoritative claim.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::index::normalize;

/// Macro-nutrient quadruple. Used both for declared per-serving values and
/// for signed substitution deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    /// Kilocalories.
    #[serde(default)]
    pub calories: f32,
    /// Fat grams.
    #[serde(default)]
    pub fat: f32,
    /// Carbohydrate grams.
    #[serde(default)]
    pub carbs: f32,
    /// Protein grams.
    #[serde(default)]
    pub protein: f32,
}

impl Macros {
    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn delta_from(&self, other: &Self) -> Self {
        Self {
            calories: self.calories - other.calories,
            fat: self.fat - other.fat,
            carbs: self.carbs - other.carbs,
            protein: self.protein - other.protein,
        }
    }

    /// Component-wise sum.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        Self {
            calories: self.calories + other.calories,
            fat: self.fat + other.fat,
            carbs: self.carbs + other.carbs,
            protein: self.protein + other.protein,
        }
    }
}

/// Per-serving nutrition after applying substitution deltas.
///
/// The type exists so callers cannot confuse adjusted values with the
/// declared ones: anything of this type is an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutritionEstimate {
    /// Estimated per-serving macros, floored at zero per component.
    pub per_serving: Macros,
}

struct MacroEntry {
    name: &'static str,
    // Common household measure the values are quoted per.
    #[allow(dead_code)]
    unit: &'static str,
    macros: Macros,
}

const fn entry(name: &'static str, unit: &'static str, calories: f32, fat: f32, carbs: f32, protein: f32) -> MacroEntry {
    MacroEntry {
        name,
        unit,
        macros: Macros {
            calories,
            fat,
            carbs,
            protein,
        },
    }
}

/// Rough per-common-measure macros for substitution-relevant ingredients.
static MACRO_TABLE: &[MacroEntry] = &[
    // Fats
    entry("butter", "tbsp", 102.0, 11.5, 0.0, 0.1),
    entry("margarine", "tbsp", 75.0, 8.5, 0.1, 0.1),
    entry("vegetable oil", "tbsp", 120.0, 13.6, 0.0, 0.0),
    entry("olive oil", "tbsp", 119.0, 13.5, 0.0, 0.0),
    entry("coconut oil", "tbsp", 117.0, 13.6, 0.0, 0.0),
    entry("shortening", "tbsp", 113.0, 12.8, 0.0, 0.0),
    entry("applesauce", "tbsp", 6.0, 0.0, 1.7, 0.0),
    // Dairy
    entry("greek yogurt", "tbsp", 8.0, 0.1, 0.5, 1.4),
    entry("sour cream", "tbsp", 23.0, 2.4, 0.5, 0.3),
    entry("heavy cream", "tbsp", 51.0, 5.4, 0.4, 0.4),
    entry("half and half", "tbsp", 20.0, 1.7, 0.6, 0.4),
    entry("whole milk", "cup", 149.0, 8.0, 12.0, 8.0),
    entry("skim milk", "cup", 83.0, 0.2, 12.0, 8.0),
    entry("buttermilk", "cup", 110.0, 2.7, 13.0, 9.0),
    entry("evaporated milk", "cup", 338.0, 19.0, 25.0, 17.0),
    entry("cream cheese", "tbsp", 51.0, 5.0, 0.8, 0.9),
    // Cheeses
    entry("cheddar cheese", "cup", 455.0, 37.0, 1.5, 28.0),
    entry("mozzarella", "cup", 336.0, 25.0, 2.5, 25.0),
    entry("parmesan", "cup", 431.0, 29.0, 4.0, 38.0),
    // Eggs
    entry("egg", "large", 72.0, 4.8, 0.4, 6.3),
    entry("egg white", "large", 17.0, 0.1, 0.2, 3.6),
    // Sweeteners
    entry("sugar", "cup", 774.0, 0.0, 200.0, 0.0),
    entry("brown sugar", "cup", 836.0, 0.0, 216.0, 0.0),
    entry("honey", "cup", 1031.0, 0.0, 279.0, 1.0),
    entry("maple syrup", "cup", 819.0, 0.6, 211.0, 0.0),
    entry("molasses", "cup", 977.0, 0.3, 252.0, 0.0),
    // Flours
    entry("all purpose flour", "cup", 455.0, 1.2, 95.0, 13.0),
    entry("whole wheat flour", "cup", 408.0, 3.0, 86.0, 16.0),
    entry("almond flour", "cup", 640.0, 56.0, 24.0, 24.0),
    entry("cornstarch", "tbsp", 30.0, 0.0, 7.0, 0.0),
];

/// Looks up an ingredient's table macros by normalized name.
#[must_use]
pub fn table_macros(name: &str) -> Option<Macros> {
    let key = normalize(name);
    MACRO_TABLE
        .iter()
        .find(|entry| entry.name == key)
        .map(|entry| entry.macros)
}

fn calories_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\d[\d,]*)\s*calories").expect("calories pattern is valid")
    })
}

/// Derives a signed calorie-only delta from a rule's textual impact note.
///
/// `"Save 850 calories per batch"` yields −850; an impact quoting calories
/// without a saving cue reads as an addition. No number, no claim.
#[must_use]
pub fn impact_delta(impact: &str) -> Option<Macros> {
    let captures = calories_pattern().captures(impact)?;
    let digits: String = captures[1].chars().filter(char::is_ascii_digit).collect();
    let amount: f32 = digits.parse().ok()?;

    let lowered = impact.to_lowercase();
    let saving = lowered.contains("save") || lowered.contains("fewer") || lowered.contains("less");
    let calories = if saving { -amount } else { amount };

    Some(Macros {
        calories,
        ..Macros::default()
    })
}

/// Estimates the per-serving nutrition shift of swapping `original` for
/// `substitute`.
///
/// Both names in the macro table: component-wise difference. Otherwise the
/// rule's `impact` note may still yield a calorie-only delta. Otherwise
/// `None` — no claim is made.
#[must_use]
pub fn estimate_delta(original: &str, substitute: &str, impact: Option<&str>) -> Option<Macros> {
    match (table_macros(original), table_macros(substitute)) {
        (Some(from), Some(to)) => Some(to.delta_from(&from)),
        _ => impact.and_then(impact_delta),
    }
}

/// Applies substitution deltas to declared per-serving macros.
///
/// Deltas sum component-wise and the result is floored at zero per
/// component; a swap cannot make a serving report negative fat.
#[must_use]
pub fn apply_deltas(declared: &Macros, deltas: &[Macros]) -> NutritionEstimate {
    let mut total = *declared;
    for delta in deltas {
        total = total.plus(delta);
    }
    NutritionEstimate {
        per_serving: Macros {
            calories: total.calories.max(0.0),
            fat: total.fat.max(0.0),
            carbs: total.carbs.max(0.0),
            protein: total.protein.max(0.0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_between_table_entries() {
        let delta = estimate_delta("butter", "applesauce", None).expect("both in table");
        assert!(delta.calories < -90.0);
        assert!(delta.fat < -11.0);
        assert!(delta.carbs > 1.0);
    }

    #[test]
    fn table_lookup_normalizes() {
        assert!(table_macros("Butter").is_some());
        assert!(table_macros("All-Purpose Flour").is_none());
        assert!(table_macros("all purpose flour").is_some());
        assert!(table_macros("dragon fruit").is_none());
    }

    #[test]
    fn impact_string_fallback() {
        let delta = estimate_delta("butter", "mashed banana", Some("Save 850 calories per batch"))
            .expect("impact parsed");
        assert_eq!(delta.calories, -850.0);
        assert_eq!(delta.fat, 0.0);

        let delta = estimate_delta("water", "heavy syrup", Some("adds about 200 calories"))
            .expect("impact parsed");
        assert_eq!(delta.calories, 200.0);
    }

    #[test]
    fn no_data_no_claim() {
        assert!(estimate_delta("water", "broth", None).is_none());
        assert!(estimate_delta("water", "broth", Some("richer flavor")).is_none());
    }

    #[test]
    fn impact_with_thousands_separator() {
        let delta = impact_delta("save 1,200 calories").expect("parsed");
        assert_eq!(delta.calories, -1200.0);
    }

    #[test]
    fn apply_deltas_floors_at_zero() {
        let declared = Macros {
            calories: 300.0,
            fat: 10.0,
            carbs: 40.0,
            protein: 8.0,
        };
        let big_cut = Macros {
            calories: -500.0,
            fat: -20.0,
            carbs: 5.0,
            protein: 0.0,
        };
        let estimate = apply_deltas(&declared, &[big_cut]);
        assert_eq!(estimate.per_serving.calories, 0.0);
        assert_eq!(estimate.per_serving.fat, 0.0);
        assert_eq!(estimate.per_serving.carbs, 45.0);
        assert_eq!(estimate.per_serving.protein, 8.0);
    }

    #[test]
    fn apply_deltas_sums_component_wise() {
        let declared = Macros {
            calories: 400.0,
            ..Macros::default()
        };
        let a = Macros {
            calories: -100.0,
            ..Macros::default()
        };
        let b = Macros {
            calories: -50.0,
            ..Macros::default()
        };
        let estimate = apply_deltas(&declared, &[a, b]);
        assert_eq!(estimate.per_serving.calories, 250.0);
    }
}
