//! # Substitution & Unification
//!
//! Builds a name-to-term mapping that makes two terms (or two propositions)
//! equal under a common sort, with an occurs check.
//!
//! Unifying terms of different sorts is a bug in rule or axiom construction,
//! not an ordinary match failure; [`UnifyError::is_fatal`] separates the two
//! so the engine can absorb ordinary failures ("the rule does not fire") and
//! propagate real ones.
//!
//! When one side is an unreduced function application, both sides are put
//! through best-effort reduction ([`crate::eval::reduce_term`]) and retried
//! once; a side that stays non-normal fails structurally.

use crate::ast::{Proposition, Rule, Term};
use crate::eval::{reduce_term, EvalError};
use crate::module::Module;
use std::collections::HashMap;

// ============================================================================
// Substitution
// ============================================================================

/// A finite mapping from variable names to terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    bindings: HashMap<String, Term>,
}

impl Substitution {
    /// The empty substitution.
    pub fn new() -> Self {
        Substitution::default()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Look up a binding.
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.bindings.get(name)
    }

    /// Add a binding. Later lookups resolve chains, so the bound term may
    /// itself mention variables bound elsewhere in this substitution.
    pub fn bind(&mut self, name: impl Into<String>, term: Term) {
        self.bindings.insert(name.into(), term);
    }

    /// A copy of this substitution with one name removed, for binder scopes.
    fn without(&self, name: &str) -> Substitution {
        let mut bindings = self.bindings.clone();
        bindings.remove(name);
        Substitution { bindings }
    }

    /// Apply to a term, resolving binding chains fully.
    pub fn apply_term(&self, term: &Term) -> Term {
        match term {
            Term::Var { name, .. } => match self.bindings.get(name) {
                Some(replacement) => self.apply_term(replacement),
                None => term.clone(),
            },
            Term::Ctor { ctor, args, sort } => Term::Ctor {
                ctor: *ctor,
                args: args.iter().map(|a| self.apply_term(a)).collect(),
                sort: sort.clone(),
            },
            Term::App {
                function,
                args,
                sort,
            } => Term::App {
                function: function.clone(),
                args: args.iter().map(|a| self.apply_term(a)).collect(),
                sort: sort.clone(),
            },
        }
    }

    /// Apply to a proposition's argument.
    pub fn apply_proposition(&self, prop: &Proposition) -> Proposition {
        Proposition {
            relation: prop.relation.clone(),
            arg: self.apply_term(&prop.arg),
        }
    }

    /// Push through all clauses of a rule. Binders introduced by
    /// `Quantify`/`Let` shadow the substitution for their scope.
    pub fn apply_rule(&self, rule: &Rule) -> Rule {
        match rule {
            Rule::Quantify(q, rest) => {
                let inner = self.without(&q.name);
                Rule::Quantify(q.clone(), Box::new(inner.apply_rule(rest)))
            }
            Rule::Premise(prop, rest) => Rule::Premise(
                self.apply_proposition(prop),
                Box::new(self.apply_rule(rest)),
            ),
            Rule::Let(name, term, rest) => {
                let term = self.apply_term(term);
                let inner = self.without(name);
                Rule::Let(name.clone(), term, Box::new(inner.apply_rule(rest)))
            }
            Rule::Filter(cond, rest) => {
                Rule::Filter(self.apply_term(cond), Box::new(self.apply_rule(rest)))
            }
            Rule::Conclusion(prop) => Rule::Conclusion(self.apply_proposition(prop)),
        }
    }
}

// ============================================================================
// Unification
// ============================================================================

/// Unification failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnifyError {
    /// The two sides carry different sorts. A bug in rule or axiom
    /// construction; the engine does not attempt recovery.
    #[error("sort mismatch: `{left}` : {left_sort} against `{right}` : {right_sort}")]
    SortMismatch {
        left: String,
        right: String,
        left_sort: String,
        right_sort: String,
    },

    /// Binding would create an infinite term. The rule simply does not fire.
    #[error("occurs check: variable `{variable}` occurs in `{term}`")]
    OccursCheck { variable: String, term: String },

    /// The two sides have incompatible shapes. The rule simply does not fire.
    #[error("structural mismatch: `{left}` does not unify with `{right}`")]
    StructuralMismatch { left: String, right: String },

    /// Reduction failed while trying to normalize a side.
    #[error("evaluation failed during unification: {0}")]
    Eval(#[from] EvalError),
}

impl UnifyError {
    /// Fatal errors indicate engine or module bugs and must propagate;
    /// non-fatal ones just mean the candidate does not match.
    pub fn is_fatal(&self) -> bool {
        matches!(self, UnifyError::SortMismatch { .. } | UnifyError::Eval(_))
    }
}

/// Unify two terms under a common sort.
pub fn unify_terms(module: &Module, a: &Term, b: &Term) -> Result<Substitution, UnifyError> {
    let mut subst = Substitution::new();
    unify_into(Some(module), &mut subst, a, b)?;
    Ok(subst)
}

/// Unify two terms without an evaluation context. Used by the lattice order,
/// which only needs structural unification.
pub(crate) fn unify_terms_pure(a: &Term, b: &Term) -> Result<Substitution, UnifyError> {
    let mut subst = Substitution::new();
    unify_into(None, &mut subst, a, b)?;
    Ok(subst)
}

/// Unify two propositions: relation names must be equal and the argument
/// terms must unify; the yielded substitution is the argument substitution.
pub fn unify_propositions(
    module: &Module,
    a: &Proposition,
    b: &Proposition,
) -> Result<Substitution, UnifyError> {
    if a.relation != b.relation {
        return Err(UnifyError::StructuralMismatch {
            left: a.to_string(),
            right: b.to_string(),
        });
    }
    unify_terms(module, &a.arg, &b.arg)
}

fn unify_into(
    module: Option<&Module>,
    subst: &mut Substitution,
    a: &Term,
    b: &Term,
) -> Result<(), UnifyError> {
    let a = subst.apply_term(a);
    let b = subst.apply_term(b);

    if a.sort() != b.sort() {
        return Err(UnifyError::SortMismatch {
            left: a.to_string(),
            right: b.to_string(),
            left_sort: a.sort().to_string(),
            right_sort: b.sort().to_string(),
        });
    }

    match (&a, &b) {
        (Term::Var { name: n1, .. }, Term::Var { name: n2, .. }) if n1 == n2 => Ok(()),
        (Term::Var { name, .. }, other) | (other, Term::Var { name, .. }) => {
            if other.contains_var(name) {
                return Err(UnifyError::OccursCheck {
                    variable: name.clone(),
                    term: other.to_string(),
                });
            }
            subst.bind(name.clone(), other.clone());
            Ok(())
        }
        (
            Term::Ctor {
                ctor: c1, args: a1, ..
            },
            Term::Ctor {
                ctor: c2, args: a2, ..
            },
        ) => {
            if c1 == c2 && a1.len() == a2.len() {
                for (x, y) in a1.iter().zip(a2) {
                    unify_into(module, subst, x, y)?;
                }
                Ok(())
            } else {
                Err(UnifyError::StructuralMismatch {
                    left: a.to_string(),
                    right: b.to_string(),
                })
            }
        }
        (
            Term::App {
                function: f1,
                args: a1,
                ..
            },
            Term::App {
                function: f2,
                args: a2,
                ..
            },
        ) if f1 == f2 && a1.len() == a2.len() => {
            for (x, y) in a1.iter().zip(a2) {
                unify_into(module, subst, x, y)?;
            }
            Ok(())
        }
        // One side is an unreduced application: normalize both and retry.
        _ => {
            let Some(module) = module else {
                return Err(UnifyError::StructuralMismatch {
                    left: a.to_string(),
                    right: b.to_string(),
                });
            };
            let ra = reduce_term(module, &a)?;
            let rb = reduce_term(module, &b)?;
            if ra == a && rb == b {
                return Err(UnifyError::StructuralMismatch {
                    left: a.to_string(),
                    right: b.to_string(),
                });
            }
            unify_into(Some(module), subst, &ra, &rb)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::{app, nat, prop, suc, tuple, var, RuleBuilder};
    use crate::ast::Sort;
    use crate::module::ModuleBuilder;

    fn test_module() -> Module {
        ModuleBuilder::new()
            .relation("q", Sort::Nat)
            .function("plus", vec![Sort::Nat, Sort::Nat], Sort::Nat, |args| {
                let a = args[0].as_nat().unwrap_or(0);
                let b = args[1].as_nat().unwrap_or(0);
                nat(a + b)
            })
            .build()
    }

    #[test]
    fn test_unify_variable_with_term() {
        let module = test_module();
        let subst = unify_terms(&module, &var("x", Sort::Nat), &nat(3)).expect("unify");
        assert_eq!(subst.get("x"), Some(&nat(3)));
    }

    #[test]
    fn test_unify_constructors_pairwise() {
        let module = test_module();
        let pattern = tuple(vec![var("x", Sort::Nat), suc(var("y", Sort::Nat))]);
        let value = tuple(vec![nat(1), nat(4)]);
        let subst = unify_terms(&module, &pattern, &value).expect("unify");
        assert_eq!(subst.get("x"), Some(&nat(1)));
        assert_eq!(subst.get("y"), Some(&nat(3)));
        assert_eq!(subst.apply_term(&pattern), value);
    }

    #[test]
    fn test_unify_respects_prior_binding() {
        let module = test_module();
        // (x, x) against (1, 2) must fail: x cannot be both.
        let pattern = tuple(vec![var("x", Sort::Nat), var("x", Sort::Nat)]);
        let value = tuple(vec![nat(1), nat(2)]);
        let err = unify_terms(&module, &pattern, &value).expect_err("mismatch");
        assert!(matches!(err, UnifyError::StructuralMismatch { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_unify_sort_mismatch_is_fatal() {
        let module = test_module();
        let err =
            unify_terms(&module, &var("x", Sort::Nat), &var("y", Sort::Bool)).expect_err("sorts");
        assert!(matches!(err, UnifyError::SortMismatch { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_occurs_check() {
        let module = test_module();
        let err = unify_terms(&module, &var("x", Sort::Nat), &suc(var("x", Sort::Nat)))
            .expect_err("occurs");
        assert!(matches!(err, UnifyError::OccursCheck { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_unify_reduces_blocked_application() {
        let module = test_module();
        // plus(1, 1) does not look like suc(suc(zero)) until reduced.
        let lhs = app("plus", vec![nat(1), nat(1)], Sort::Nat);
        let subst = unify_terms(&module, &lhs, &nat(2)).expect("unify after reduction");
        assert!(subst.is_empty());
    }

    #[test]
    fn test_unify_propositions_by_relation() {
        let module = test_module();
        let pattern = prop("q", var("n", Sort::Nat));
        let fact = prop("q", nat(5));
        let subst = unify_propositions(&module, &pattern, &fact).expect("unify");
        assert_eq!(subst.get("n"), Some(&nat(5)));

        let other = prop("r", nat(5));
        assert!(unify_propositions(&module, &pattern, &other).is_err());
    }

    #[test]
    fn test_substitution_resolves_chains() {
        let mut subst = Substitution::new();
        subst.bind("x", var("y", Sort::Nat));
        subst.bind("y", nat(3));
        assert_eq!(subst.apply_term(&var("x", Sort::Nat)), nat(3));
    }

    #[test]
    fn test_apply_rule_respects_binder_shadowing() {
        let mut subst = Substitution::new();
        subst.bind("n", nat(1));

        // The quantifier re-binds `n`, so the premise must keep its variable.
        let rule = RuleBuilder::new()
            .forall("n", Sort::Nat)
            .premise("q", var("n", Sort::Nat))
            .conclude("q", var("n", Sort::Nat));
        assert_eq!(subst.apply_rule(&rule), rule);

        // Without the binder the same substitution grounds the premise.
        let open_rule = RuleBuilder::new()
            .premise("q", var("n", Sort::Nat))
            .conclude("q", var("n", Sort::Nat));
        let expected = RuleBuilder::new()
            .premise("q", nat(1))
            .conclude("q", nat(1));
        assert_eq!(subst.apply_rule(&open_rule), expected);
    }
}
