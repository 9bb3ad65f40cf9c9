//! Tests for the schema similarity matcher.
use apisync::matcher::{Lexicon, Ontology, best_matches, edit_distance};
use apisync::prelude::*;
use serde_json::json;

fn person() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "email": {"type": "string"},
            "address": {
                "type": "object",
                "properties": {"city": {"type": "string"}}
            }
        }
    })
}

#[test]
fn test_identical_schemas_have_zero_distance() {
    let report = compare(&person(), &person());
    assert!(report.edit_average.abs() < 1e-9, "{:?}", report);
    assert!(report.lexical_average.abs() < 1e-9, "{:?}", report);
}

#[test]
fn test_empty_schemas_are_unrelated() {
    let empty = json!({"type": "object", "properties": {}});
    let expected = SimilarityReport {
        edit_average: 1.0,
        lexical_average: 1.0,
    };
    assert_eq!(compare(&empty, &person()), expected);
    assert_eq!(compare(&person(), &empty), expected);
    assert_eq!(compare(&serde_json::Value::Null, &serde_json::Value::Null), expected);
}

#[test]
fn test_synonyms_are_lexically_close() {
    let a = json!({"type": "object", "properties": {"email": {"type": "string"}}});
    let b = json!({"type": "object", "properties": {"mail": {"type": "string"}}});
    let report = compare(&a, &b);
    assert!(report.lexical_average.abs() < 1e-9);
    assert!(report.edit_average > 0.0);
}

#[test]
fn test_objects_are_not_candidates() {
    let matches = best_matches(&person(), &person());
    let names: Vec<&str> = matches.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names.len(), 3);
    assert!(!names.contains(&"address"));

    let city = matches.iter().find(|m| m.name == "city").unwrap();
    assert_eq!(city.edit_partner.as_deref(), Some("city"));
    assert_eq!(city.lexical_partner.as_deref(), Some("city"));
}

#[test]
fn test_arrays_are_candidates() {
    let a = json!({
        "type": "object",
        "properties": {"tags": {"type": "array", "items": {"type": "string"}}}
    });
    let matches = best_matches(&a, &a);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "tags");
    assert!(matches[0].edit_distance.abs() < 1e-9);
}

#[test]
fn test_related_words_rank_between_synonyms_and_strangers() {
    let lexicon = Lexicon;
    let same = lexicon.similarity("city", "town").unwrap();
    let related = lexicon.similarity("city", "email").unwrap();
    let unrelated = lexicon.similarity("city", "price").unwrap();
    assert!(same > related && related > unrelated);
    assert_eq!(lexicon.similarity("city", "zzz"), None);
}

#[test]
fn test_edit_distance_bounds() {
    assert_eq!(edit_distance("name", "name"), 0.0);
    assert_eq!(edit_distance("abc", "xyz"), 1.0);
    assert!(edit_distance("fullName", "full_name") < 0.2);
}

#[test]
fn test_custom_ontology() {
    struct Flat;
    impl Ontology for Flat {
        fn similarity(&self, _a: &str, _b: &str) -> Option<f64> {
            Some(0.5)
        }
    }
    let report = Matcher::with_ontology(Flat).compare(&person(), &person());
    assert!((report.lexical_average - 0.5).abs() < 1e-9);
}

fn fields(names: &[&str]) -> serde_json::Value {
    let properties: serde_json::Map<String, serde_json::Value> = names
        .iter()
        .map(|name| (name.to_string(), json!({"type": "string"})))
        .collect();
    json!({"type": "object", "properties": properties})
}

#[test]
fn test_single_words_borrow_their_ancestor() {
    let nested = json!({
        "type": "object",
        "properties": {
            "address": {"type": "object", "properties": {"city": {"type": "string"}}}
        }
    });
    let other = fields(&["location_city"]);

    // "city" under "address" reads as "address city".
    let city = &best_matches(&nested, &other)[0];
    assert_eq!(city.name, "city");
    assert!(city.lexical_distance.abs() < 1e-9, "{:?}", city);
    let reverse = &best_matches(&other, &nested)[0];
    assert!(reverse.lexical_distance.abs() < 1e-9, "{:?}", reverse);

    // At the top level the word stands in for its own ancestor: "city city".
    let top = &best_matches(&fields(&["city"]), &other)[0];
    assert!((top.lexical_distance - 1.0 / 6.0).abs() < 1e-9, "{:?}", top);
}

#[test]
fn test_two_word_names_compare_word_by_word() {
    let a = fields(&["first_name"]);
    let same = &best_matches(&a, &fields(&["given_name"]))[0];
    assert!(same.lexical_distance.abs() < 1e-9);

    let related = &best_matches(&a, &fields(&["last_name"]))[0];
    assert!((related.lexical_distance - 1.0 / 6.0).abs() < 1e-9);

    // Stop words do not count: "date_of_birth" is "date birth".
    let birth = &best_matches(&fields(&["date_of_birth"]), &fields(&["birth_day"]))[0];
    assert!(birth.lexical_distance.abs() < 1e-9);
}

#[test]
fn test_longer_names_are_lexically_unrelated() {
    let a = fields(&["date_last_login"]);
    let matches = best_matches(&a, &a);
    assert_eq!(matches[0].edit_distance, 0.0);
    assert_eq!(matches[0].lexical_distance, 1.0);
}
