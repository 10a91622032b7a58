use std::sync::Arc;

use larder::{
    Direction, InMemoryPreferenceStore, LarderEngine, MatchMode, RecipeCorpus, Session,
    StaticArtifactSource, SubstitutionSelection, INGREDIENT_INDEX_ARTIFACT,
    SUBSTITUTION_RULES_ARTIFACT,
};
use serde_json::json;

fn envelope(payload: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "version": 3,
        "generated_at": "2024-05-01T12:00:00Z",
        "payload": payload,
    }))
    .unwrap()
}

fn rules_payload() -> serde_json::Value {
    json!({
        "rules": [
            {
                "primary": "butter",
                "aliases": ["unsalted butter"],
                "substitutes": [
                    {
                        "ingredient": "applesauce",
                        "ratio": "1:2",
                        "direction": "health",
                        "notes": "best in moist bakes",
                        "impact": "Save 850 calories per batch",
                    },
                ],
            },
        ],
        "staple_expansions": [
            {"staple": "milk", "also_matches": ["buttermilk"]},
        ],
    })
}

fn engine() -> LarderEngine {
    let corpus = RecipeCorpus::from_values(vec![json!({
        "id": "r1",
        "title": "Banana Bread",
        "ingredients": [
            {"item": "flour", "quantity": "2", "unit": "cups"},
            {"item": "butter", "quantity": "1/2", "unit": "cup"},
        ],
        "nutrition": {"calories": 320.0, "fat": 12.0, "carbs": 48.0, "protein": 5.0},
    })]);

    let mut source = StaticArtifactSource::new();
    source.insert(SUBSTITUTION_RULES_ARTIFACT, envelope(rules_payload()));
    source.insert(
        INGREDIENT_INDEX_ARTIFACT,
        envelope(json!({
            "ingredients": {"butter": ["r1"], "flour": ["r1"]},
            "synonyms": {},
        })),
    );

    let engine = LarderEngine::new(
        corpus,
        Arc::new(source),
        Arc::new(InMemoryPreferenceStore::new()),
    );
    engine.request_rules().recv().unwrap().expect("rules load");
    engine.request_index().recv().unwrap().expect("index loads");
    engine
}

#[test]
fn forward_and_reverse_substitution() {
    let engine = engine();

    let forward = engine.find_substitutes_for("butter").expect("rule fires");
    assert_eq!(forward.len(), 1);
    assert_eq!(forward[0].ingredient, "applesauce");
    assert_eq!(forward[0].direction, Direction::Health);

    let reverse = engine
        .find_substitutes_for("applesauce")
        .expect("reverse fires");
    assert_eq!(reverse.len(), 1);
    assert_eq!(reverse[0].ingredient, "butter");
    assert_eq!(reverse[0].direction, Direction::Convenience);
    // The stored forward ratio comes back unmodified.
    assert_eq!(reverse[0].ratio, "1:2");
    assert!(reverse[0]
        .notes
        .as_deref()
        .unwrap()
        .starts_with("reverse of:"));
}

#[test]
fn unknown_ingredient_has_no_substitutes() {
    let engine = engine();
    assert!(engine.find_substitutes_for("saffron").is_none());
}

#[test]
fn staple_expansion_is_single_hop() {
    let engine = engine();

    let expanded = engine.expand_staples(&["milk".to_string()]);
    assert_eq!(expanded, vec!["milk", "buttermilk"]);

    // Feeding the expanded list back does not grow it further.
    let again = engine.expand_staples(&expanded);
    assert_eq!(again, expanded);
}

#[test]
fn nutrition_delta_from_macro_table() {
    let engine = engine();

    let delta = engine
        .estimate_nutrition_delta("butter", "applesauce")
        .expect("both in the macro table");
    assert!(delta.calories < 0.0);
    assert!(delta.fat < 0.0);
}

#[test]
fn nutrition_delta_falls_back_to_impact_note() {
    let engine = engine();

    // "mashed banana" is not in the macro table; the rule's impact note
    // would drive the estimate if a rule stored one for this pair. There
    // is none, so no claim is made.
    assert!(engine
        .estimate_nutrition_delta("butter", "mashed banana")
        .is_none());
}

#[test]
fn recipe_estimate_applies_session_deltas() {
    let engine = engine();

    let mut session = Session::new();
    session.set_mode(MatchMode::All);
    let delta = engine
        .estimate_nutrition_delta("butter", "applesauce")
        .unwrap();
    session.apply_substitution(SubstitutionSelection {
        ingredient_index: 1,
        original: "butter".to_string(),
        substitute: "applesauce".to_string(),
        nutrition_delta: Some(delta),
    });

    let estimate = engine
        .estimate_recipe_nutrition("r1", &session)
        .expect("declared nutrition present");
    assert!(estimate.per_serving.calories < 320.0);
    assert!(estimate.per_serving.calories >= 0.0);

    // Reverting the swap restores the declared values.
    session.revert_substitution(1);
    let estimate = engine.estimate_recipe_nutrition("r1", &session).unwrap();
    assert_eq!(estimate.per_serving.calories, 320.0);
}

#[test]
fn quantity_scaling_against_recipe_lines() {
    let engine = engine();
    let recipe = engine.corpus().get("r1").unwrap();
    let butter = &recipe.ingredients[1];

    let scaled = engine
        .scale_quantity(&butter.quantity, 0.25, butter.unit.as_deref())
        .expect("parseable");
    assert_eq!(scaled.display, "⅛");
    assert!(scaled.warning.is_none());

    // Scaling to a sixteenth of a cup falls below the practical minimum.
    let tiny = engine
        .scale_quantity(&butter.quantity, 0.125, butter.unit.as_deref())
        .expect("parseable");
    assert!(tiny.warning.is_some());
}
