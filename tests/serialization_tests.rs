//! JSON serialization round-trips for the term algebra: sorts, terms,
//! propositions, rules, and databases.

use latlog::ast::builders::{app, boolean, nat, prop, tuple, unit, var, RuleBuilder};
use latlog::ast::{Rule, Sort};
use latlog::Database;

#[test]
fn test_sort_json_roundtrip() {
    let sorts = vec![
        Sort::Unit,
        Sort::Bool,
        Sort::Nat,
        Sort::lex(vec![Sort::Nat, Sort::Bool]),
        Sort::lex(vec![Sort::lex(vec![Sort::Nat]), Sort::Unit]),
        Sort::Predicate("edge".to_string()),
    ];

    for original in sorts {
        let json = serde_json::to_string(&original).expect("Serialization failed");
        let deserialized: Sort = serde_json::from_str(&json).expect("Deserialization failed");
        assert_eq!(
            original, deserialized,
            "Sort roundtrip failed for {:?}",
            original
        );
    }
}

#[test]
fn test_term_json_roundtrip() {
    let terms = vec![
        unit(),
        boolean(true),
        boolean(false),
        nat(0),
        nat(17),
        tuple(vec![nat(1), boolean(false)]),
        var("x", Sort::Nat),
        app("plus", vec![nat(1), var("y", Sort::Nat)], Sort::Nat),
    ];

    for original in terms {
        let json = serde_json::to_string(&original).expect("Serialization failed");
        let deserialized: latlog::Term =
            serde_json::from_str(&json).expect("Deserialization failed");
        assert_eq!(
            original, deserialized,
            "Term roundtrip failed for {:?}",
            original
        );
    }
}

#[test]
fn test_proposition_json_roundtrip() {
    let original = prop("add", tuple(vec![nat(0), nat(2), nat(2)]));
    let json = serde_json::to_string(&original).expect("Serialization failed");
    let deserialized: latlog::Proposition =
        serde_json::from_str(&json).expect("Deserialization failed");
    assert_eq!(original, deserialized);
}

#[test]
fn test_rule_json_roundtrip() {
    let original = RuleBuilder::new()
        .forall("n", Sort::Nat)
        .premise("q", var("n", Sort::Nat))
        .filter(app("is_zero", vec![var("n", Sort::Nat)], Sort::Bool))
        .let_bind("m", app("plus", vec![var("n", Sort::Nat), nat(1)], Sort::Nat))
        .conclude("q", var("m", Sort::Nat));

    let json = serde_json::to_string(&original).expect("Serialization failed");
    let deserialized: Rule = serde_json::from_str(&json).expect("Deserialization failed");
    assert_eq!(original, deserialized);
}

#[test]
fn test_database_json_roundtrip() {
    let mut db = Database::new();
    db.insert(prop("q", nat(3))).expect("insert");
    db.insert(prop("r", boolean(true))).expect("insert");

    let json = serde_json::to_string(&db).expect("Serialization failed");
    let deserialized: Database = serde_json::from_str(&json).expect("Deserialization failed");
    assert_eq!(deserialized.len(), 2);
    assert!(deserialized.contains(&prop("q", nat(3))));
    assert!(deserialized.contains(&prop("r", boolean(true))));
}
