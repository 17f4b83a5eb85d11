//! # Rule Normalization
//!
//! Rewrites rules into the canonical shape the saturation loop expects:
//!
//! - [`alpha_rename_rule`] deterministically freshens every binder so names
//!   are globally unique within the rule. This removes any need for
//!   capture-avoiding machinery downstream: substitution can treat binder
//!   shadowing as a non-event.
//! - [`normalize_rule`] hoists all quantifications to the top of the clause
//!   tree (safe once binders are fresh), keeping premises, lets, and filters
//!   in their relative source order with the conclusion at the tail.
//!
//! Both are pure rewrites; no term is evaluated, and the set of ground
//! conclusions derivable by instantiation is unchanged.

use crate::ast::{Proposition, Quantifier, Rule, Term};
use std::collections::HashMap;

/// Freshen every binder in a rule with a `name#k` suffix, `k` counting up
/// from 1 in source order. Renaming is stable: an already-suffixed name is
/// re-stemmed, so renaming twice produces the same result as renaming once.
pub fn alpha_rename_rule(rule: &Rule) -> Rule {
    let mut counter = 0usize;
    rename_clause(rule, &HashMap::new(), &mut counter)
}

/// Hoist all quantifications to the top of the clause tree.
pub fn normalize_rule(rule: &Rule) -> Rule {
    let binders: Vec<Quantifier> = rule.binders().into_iter().cloned().collect();
    let stripped = strip_quantifiers(rule);
    binders
        .into_iter()
        .rev()
        .fold(stripped, |acc, q| Rule::Quantify(q, Box::new(acc)))
}

/// α-rename then hoist: the canonical form rules take on module load.
pub fn canonicalize_rule(rule: &Rule) -> Rule {
    normalize_rule(&alpha_rename_rule(rule))
}

fn rename_clause(
    rule: &Rule,
    scope: &HashMap<String, String>,
    counter: &mut usize,
) -> Rule {
    match rule {
        Rule::Quantify(q, rest) => {
            let fresh = fresh_name(&q.name, counter);
            let mut inner = scope.clone();
            inner.insert(q.name.clone(), fresh.clone());
            Rule::Quantify(
                Quantifier::new(fresh, q.sort.clone()),
                Box::new(rename_clause(rest, &inner, counter)),
            )
        }
        Rule::Premise(prop, rest) => Rule::Premise(
            rename_proposition(prop, scope),
            Box::new(rename_clause(rest, scope, counter)),
        ),
        Rule::Let(name, term, rest) => {
            let term = rename_term(term, scope);
            let fresh = fresh_name(name, counter);
            let mut inner = scope.clone();
            inner.insert(name.clone(), fresh.clone());
            Rule::Let(fresh, term, Box::new(rename_clause(rest, &inner, counter)))
        }
        Rule::Filter(cond, rest) => Rule::Filter(
            rename_term(cond, scope),
            Box::new(rename_clause(rest, scope, counter)),
        ),
        Rule::Conclusion(prop) => Rule::Conclusion(rename_proposition(prop, scope)),
    }
}

fn fresh_name(base: &str, counter: &mut usize) -> String {
    let stem = base.split('#').next().unwrap_or(base);
    *counter += 1;
    format!("{stem}#{counter}")
}

fn rename_term(term: &Term, scope: &HashMap<String, String>) -> Term {
    match term {
        Term::Var { name, sort } => Term::Var {
            name: scope.get(name).cloned().unwrap_or_else(|| name.clone()),
            sort: sort.clone(),
        },
        Term::Ctor { ctor, args, sort } => Term::Ctor {
            ctor: *ctor,
            args: args.iter().map(|a| rename_term(a, scope)).collect(),
            sort: sort.clone(),
        },
        Term::App {
            function,
            args,
            sort,
        } => Term::App {
            function: function.clone(),
            args: args.iter().map(|a| rename_term(a, scope)).collect(),
            sort: sort.clone(),
        },
    }
}

fn rename_proposition(prop: &Proposition, scope: &HashMap<String, String>) -> Proposition {
    Proposition {
        relation: prop.relation.clone(),
        arg: rename_term(&prop.arg, scope),
    }
}

fn strip_quantifiers(rule: &Rule) -> Rule {
    match rule {
        Rule::Quantify(_, rest) => strip_quantifiers(rest),
        Rule::Premise(prop, rest) => {
            Rule::Premise(prop.clone(), Box::new(strip_quantifiers(rest)))
        }
        Rule::Let(name, term, rest) => Rule::Let(
            name.clone(),
            term.clone(),
            Box::new(strip_quantifiers(rest)),
        ),
        Rule::Filter(cond, rest) => {
            Rule::Filter(cond.clone(), Box::new(strip_quantifiers(rest)))
        }
        Rule::Conclusion(prop) => Rule::Conclusion(prop.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::{var, RuleBuilder};
    use crate::ast::Sort;

    #[test]
    fn test_alpha_rename_freshens_binders() {
        let rule = RuleBuilder::new()
            .forall("x", Sort::Nat)
            .premise("p", var("x", Sort::Nat))
            .conclude("q", var("x", Sort::Nat));

        let renamed = alpha_rename_rule(&rule);
        let binders = renamed.binders();
        assert_eq!(binders.len(), 1);
        assert_eq!(binders[0].name, "x#1");
        assert_eq!(renamed.premises()[0].arg, var("x#1", Sort::Nat));
        assert_eq!(renamed.conclusion().arg, var("x#1", Sort::Nat));
    }

    #[test]
    fn test_alpha_rename_is_stable_under_repetition() {
        let rule = RuleBuilder::new()
            .forall("x", Sort::Nat)
            .forall("y", Sort::Nat)
            .premise("p", var("x", Sort::Nat))
            .conclude("q", var("y", Sort::Nat));

        let once = alpha_rename_rule(&rule);
        let twice = alpha_rename_rule(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_alpha_rename_keeps_shadowing_scopes_apart() {
        // Inner quantifier shadows the outer x; each scope gets its own name.
        let inner = RuleBuilder::new()
            .forall("x", Sort::Nat)
            .premise("p", var("x", Sort::Nat))
            .conclude("q", var("x", Sort::Nat));
        let rule = Rule::Quantify(
            crate::ast::Quantifier::new("x", Sort::Nat),
            Box::new(inner),
        );

        let renamed = alpha_rename_rule(&rule);
        let binders = renamed.binders();
        assert_eq!(binders.len(), 2);
        assert_ne!(binders[0].name, binders[1].name);
        // Occurrences refer to the inner binder.
        assert_eq!(
            renamed.premises()[0].arg,
            var(binders[1].name.clone(), Sort::Nat)
        );
    }

    #[test]
    fn test_normalize_hoists_interleaved_quantifiers() {
        // forall a. p(a), forall b. q(b) |- r(b)
        let rule = Rule::Quantify(
            crate::ast::Quantifier::new("a", Sort::Nat),
            Box::new(Rule::Premise(
                crate::ast::Proposition::new("p", var("a", Sort::Nat)),
                Box::new(Rule::Quantify(
                    crate::ast::Quantifier::new("b", Sort::Nat),
                    Box::new(Rule::Premise(
                        crate::ast::Proposition::new("q", var("b", Sort::Nat)),
                        Box::new(Rule::Conclusion(crate::ast::Proposition::new(
                            "r",
                            var("b", Sort::Nat),
                        ))),
                    )),
                )),
            )),
        );

        let normalized = normalize_rule(&rule);

        // Both quantifiers now sit at the head, in source order.
        match &normalized {
            Rule::Quantify(q1, rest) => {
                assert_eq!(q1.name, "a");
                match &**rest {
                    Rule::Quantify(q2, rest) => {
                        assert_eq!(q2.name, "b");
                        assert!(matches!(**rest, Rule::Premise(_, _)));
                    }
                    other => panic!("expected second quantifier, got {other}"),
                }
            }
            other => panic!("expected quantifier at head, got {other}"),
        }

        // Premise order and the conclusion are untouched.
        let premises = normalized.premises();
        assert_eq!(premises.len(), 2);
        assert_eq!(premises[0].relation, "p");
        assert_eq!(premises[1].relation, "q");
        assert_eq!(normalized.conclusion().relation, "r");
    }

    #[test]
    fn test_normalize_leaves_lets_and_filters_in_place() {
        let rule = RuleBuilder::new()
            .forall("n", Sort::Nat)
            .premise("q", var("n", Sort::Nat))
            .let_bind("m", var("n", Sort::Nat))
            .premise("r", var("m", Sort::Nat))
            .conclude("s", var("m", Sort::Nat));

        let normalized = normalize_rule(&rule);
        // Skip the hoisted quantifier, then expect premise / let / premise.
        let Rule::Quantify(_, rest) = normalized else {
            panic!("expected quantifier at head");
        };
        let Rule::Premise(_, rest) = *rest else {
            panic!("expected first premise");
        };
        let Rule::Let(name, _, rest) = *rest else {
            panic!("expected let after first premise");
        };
        assert_eq!(name, "m");
        assert!(matches!(*rest, Rule::Premise(_, _)));
    }

    #[test]
    fn test_canonicalize_keeps_closed_rules_closed() {
        let rule = RuleBuilder::new()
            .forall("x", Sort::Nat)
            .premise("p", var("x", Sort::Nat))
            .conclude("q", var("x", Sort::Nat));
        assert!(canonicalize_rule(&rule).free_variables().is_empty());
    }
}
