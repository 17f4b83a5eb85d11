//! End-to-end saturation scenarios: arithmetic chains, transitive closure,
//! boolean subsumption, filter gating, let bindings, and gas exhaustion.
//!
//! Under the lattice semantics a stronger fact evicts every weaker fact of
//! the same relation, so chain-shaped programs keep exactly one maximal
//! fact per relation; the scenarios assert both the surviving facts and the
//! exact amount of work the loop performed.

use latlog::ast::builders::{app, boolean, nat, prop, suc, tuple, var, RuleBuilder};
use latlog::ast::Sort;
use latlog::engine::{generate, saturate};
use latlog::lattice::dominates;
use latlog::module::{Module, ModuleBuilder};
use latlog::Database;

fn triple_sort() -> Sort {
    Sort::lex(vec![Sort::Nat, Sort::Nat, Sort::Nat])
}

fn pair_sort() -> Sort {
    Sort::lex(vec![Sort::Nat, Sort::Nat])
}

/// add((0,0,0)) plus the rule add((x,y,z)) |- add((x, suc y, suc z)).
fn addition_module() -> Module {
    ModuleBuilder::new()
        .relation("add", triple_sort())
        .rule(
            "step",
            RuleBuilder::new()
                .forall("x", Sort::Nat)
                .forall("y", Sort::Nat)
                .forall("z", Sort::Nat)
                .premise(
                    "add",
                    tuple(vec![
                        var("x", Sort::Nat),
                        var("y", Sort::Nat),
                        var("z", Sort::Nat),
                    ]),
                )
                .conclude(
                    "add",
                    tuple(vec![
                        var("x", Sort::Nat),
                        suc(var("y", Sort::Nat)),
                        suc(var("z", Sort::Nat)),
                    ]),
                ),
        )
        .axiom("base", prop("add", tuple(vec![nat(0), nat(0), nat(0)])))
        .fixpoint_spec("main", ["base"], ["step"])
        .build()
}

#[test]
fn natural_number_addition_climbs_the_chain() {
    let outcome = generate(&addition_module(), "main", Database::new(), 100).expect("generate");

    // The chain is unbounded, so 100 gas learns add((0, k, k)) for
    // k = 0..=99, each step evicting the last.
    assert!(!outcome.saturated);
    assert_eq!(outcome.gas_remaining, 0);
    assert_eq!(outcome.iterations, 100);
    assert_eq!(outcome.database.len(), 1);

    let fact = &outcome.database.propositions()[0];
    assert_eq!(fact, &prop("add", tuple(vec![nat(0), nat(99), nat(99)])));
}

#[test]
fn addition_invariant_second_and_third_components_stay_equal() {
    let outcome = generate(&addition_module(), "main", Database::new(), 37).expect("generate");
    let fact = &outcome.database.propositions()[0];

    let latlog::Term::Ctor { args, .. } = &fact.arg else {
        panic!("expected a tuple argument");
    };
    assert_eq!(args[0].as_nat(), Some(0));
    assert_eq!(args[1].as_nat(), args[2].as_nat());
}

#[test]
fn transitive_closure_saturates_to_the_maximal_pair() {
    let module = ModuleBuilder::new()
        .relation("path", pair_sort())
        .rule(
            "trans",
            RuleBuilder::new()
                .forall("a", Sort::Nat)
                .forall("b", Sort::Nat)
                .forall("c", Sort::Nat)
                .premise("path", tuple(vec![var("a", Sort::Nat), var("b", Sort::Nat)]))
                .premise("path", tuple(vec![var("b", Sort::Nat), var("c", Sort::Nat)]))
                .conclude("path", tuple(vec![var("a", Sort::Nat), var("c", Sort::Nat)])),
        )
        .axiom("e01", prop("path", tuple(vec![nat(0), nat(1)])))
        .axiom("e12", prop("path", tuple(vec![nat(1), nat(2)])))
        .axiom("e23", prop("path", tuple(vec![nat(2), nat(3)])))
        .fixpoint_spec("main", ["e01", "e12", "e23"], ["trans"])
        .build();

    let outcome = generate(&module, "main", Database::new(), 100).expect("generate");

    // Every pair is comparable under the lexicographic order, so saturation
    // keeps only the maximal reachable pair; derived pairs such as (1, 3)
    // are produced and then subsumed. The queue drains well within budget.
    assert!(outcome.saturated);
    assert_eq!(outcome.iterations, 6);
    assert_eq!(outcome.database.len(), 1);
    assert!(outcome
        .database
        .contains(&prop("path", tuple(vec![nat(2), nat(3)]))));
}

#[test]
fn boolean_subsumption_keeps_only_the_stronger_fact() {
    let module = ModuleBuilder::new()
        .relation("r", Sort::Bool)
        .axiom("weaker", prop("r", boolean(false)))
        .axiom("stronger", prop("r", boolean(true)))
        .fixpoint_spec("main", ["weaker", "stronger"], Vec::<String>::new())
        .build();

    let outcome = generate(&module, "main", Database::new(), 10).expect("generate");

    assert!(outcome.saturated);
    assert_eq!(outcome.database.len(), 1);
    assert!(outcome.database.contains(&prop("r", boolean(true))));
    assert!(!outcome.database.contains(&prop("r", boolean(false))));
}

#[test]
fn filter_gates_rule_firing_and_equal_facts_are_subsumed() {
    let module = ModuleBuilder::new()
        .relation("q", Sort::Nat)
        .function("is_zero", vec![Sort::Nat], Sort::Bool, |args| {
            boolean(args[0].as_nat() == Some(0))
        })
        .rule(
            "step",
            RuleBuilder::new()
                .forall("n", Sort::Nat)
                .premise("q", var("n", Sort::Nat))
                .filter(app("is_zero", vec![var("n", Sort::Nat)], Sort::Bool))
                .conclude("q", suc(var("n", Sort::Nat))),
        )
        .axiom("a0", prop("q", nat(0)))
        .axiom("a1", prop("q", nat(1)))
        .fixpoint_spec("main", ["a0", "a1"], ["step"])
        .build();

    let outcome = generate(&module, "main", Database::new(), 50).expect("generate");

    // q(0) fires the rule (its filter passes) and derives q(suc 0) = q(1),
    // which ties with the axiom and is subsumed. q(1) fails the filter.
    // q(1) dominates q(0), so one fact remains.
    assert!(outcome.saturated);
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.database.len(), 1);
    assert!(outcome.database.contains(&prop("q", nat(1))));
}

#[test]
fn let_binding_doubles_through_a_builtin() {
    let module = ModuleBuilder::new()
        .relation("double", pair_sort())
        .function("plus", vec![Sort::Nat, Sort::Nat], Sort::Nat, |args| {
            let a = args[0].as_nat().unwrap_or(0);
            let b = args[1].as_nat().unwrap_or(0);
            nat(a + b)
        })
        .rule(
            "step",
            RuleBuilder::new()
                .forall("x", Sort::Nat)
                .forall("y", Sort::Nat)
                .premise(
                    "double",
                    tuple(vec![var("x", Sort::Nat), var("y", Sort::Nat)]),
                )
                .let_bind(
                    "z",
                    app("plus", vec![var("y", Sort::Nat), nat(2)], Sort::Nat),
                )
                .conclude(
                    "double",
                    tuple(vec![suc(var("x", Sort::Nat)), var("z", Sort::Nat)]),
                ),
        )
        .axiom("base", prop("double", tuple(vec![nat(0), nat(0)])))
        .fixpoint_spec("main", ["base"], ["step"])
        .build();

    let outcome = generate(&module, "main", Database::new(), 10).expect("generate");

    // Ten learn steps reach double((9, 18)); the relation y = 2x holds at
    // every step of the chain.
    assert!(!outcome.saturated);
    assert_eq!(outcome.database.len(), 1);
    assert!(outcome
        .database
        .contains(&prop("double", tuple(vec![nat(9), nat(18)]))));
}

#[test]
fn gas_exhaustion_is_not_an_error_and_yields_a_dominated_prefix() {
    let module = addition_module();

    let short = generate(&module, "main", Database::new(), 3).expect("generate");
    assert!(!short.saturated);
    assert_eq!(short.database.len(), 1);
    assert!(short
        .database
        .contains(&prop("add", tuple(vec![nat(0), nat(2), nat(2)]))));

    // A longer run strictly dominates the short run's surviving fact.
    let long = generate(&module, "main", Database::new(), 100).expect("generate");
    let short_fact = &short.database.propositions()[0];
    let long_fact = &long.database.propositions()[0];
    assert!(dominates(long_fact, short_fact).expect("compare"));
    assert_ne!(long_fact, short_fact);
}

#[test]
fn facts_flow_across_relations_without_interfering() {
    // a(n) |- b(n): the two relations subsume independently.
    let module = ModuleBuilder::new()
        .relation("a", Sort::Nat)
        .relation("b", Sort::Nat)
        .rule(
            "copy",
            RuleBuilder::new()
                .forall("n", Sort::Nat)
                .premise("a", var("n", Sort::Nat))
                .conclude("b", var("n", Sort::Nat)),
        )
        .axiom("seed", prop("a", nat(5)))
        .fixpoint_spec("main", ["seed"], ["copy"])
        .build();

    let db = saturate(&module, "main", 10).expect("saturate");
    assert_eq!(db.len(), 2);
    assert!(db.contains(&prop("a", nat(5))));
    assert!(db.contains(&prop("b", nat(5))));
}

#[test]
fn multi_premise_rule_joins_across_relations() {
    // edge(p) and weight(w) join into labeled((p, w)) via two premises.
    let module = ModuleBuilder::new()
        .relation("edge", Sort::Nat)
        .relation("weight", Sort::Nat)
        .relation("labeled", pair_sort())
        .rule(
            "join",
            RuleBuilder::new()
                .forall("p", Sort::Nat)
                .forall("w", Sort::Nat)
                .premise("edge", var("p", Sort::Nat))
                .premise("weight", var("w", Sort::Nat))
                .conclude(
                    "labeled",
                    tuple(vec![var("p", Sort::Nat), var("w", Sort::Nat)]),
                ),
        )
        .axiom("e", prop("edge", nat(4)))
        .axiom("w", prop("weight", nat(7)))
        .fixpoint_spec("main", ["e", "w"], ["join"])
        .build();

    let outcome = generate(&module, "main", Database::new(), 50).expect("generate");
    assert!(outcome.saturated);
    assert!(outcome
        .database
        .contains(&prop("labeled", tuple(vec![nat(4), nat(7)]))));
}
