//! Builder Patterns for AST Construction
//!
//! Free functions for constructing terms and a fluent [`RuleBuilder`] for
//! constructing rule clause trees, particularly useful for tests.
//!
//! ## Example
//!
//! ```rust
//! use latlog::ast::builders::{suc, tuple, var, RuleBuilder};
//! use latlog::ast::Sort;
//!
//! // Build a rule: forall x y z. add((x, y, z)) |- add((x, suc y, suc z))
//! let rule = RuleBuilder::new()
//!     .forall("x", Sort::Nat)
//!     .forall("y", Sort::Nat)
//!     .forall("z", Sort::Nat)
//!     .premise(
//!         "add",
//!         tuple(vec![
//!             var("x", Sort::Nat),
//!             var("y", Sort::Nat),
//!             var("z", Sort::Nat),
//!         ]),
//!     )
//!     .conclude(
//!         "add",
//!         tuple(vec![
//!             var("x", Sort::Nat),
//!             suc(var("y", Sort::Nat)),
//!             suc(var("z", Sort::Nat)),
//!         ]),
//!     );
//! assert_eq!(rule.premise_count(), 1);
//! ```

use super::{Ctor, Proposition, Quantifier, Rule, Sort, Term};

// ============================================================================
// Term constructors
// ============================================================================

/// A variable of the given sort.
pub fn var(name: impl Into<String>, sort: Sort) -> Term {
    Term::Var {
        name: name.into(),
        sort,
    }
}

/// The unit value.
pub fn unit() -> Term {
    Term::Ctor {
        ctor: Ctor::Unit,
        args: vec![],
        sort: Sort::Unit,
    }
}

/// A boolean constructor term.
pub fn boolean(value: bool) -> Term {
    Term::Ctor {
        ctor: if value { Ctor::True } else { Ctor::False },
        args: vec![],
        sort: Sort::Bool,
    }
}

/// Natural zero.
pub fn zero() -> Term {
    Term::Ctor {
        ctor: Ctor::Zero,
        args: vec![],
        sort: Sort::Nat,
    }
}

/// The successor of a natural-sorted term.
pub fn suc(inner: Term) -> Term {
    Term::Ctor {
        ctor: Ctor::Suc,
        args: vec![inner],
        sort: Sort::Nat,
    }
}

/// Encode a machine natural as a `zero`/`suc` chain.
pub fn nat(n: u64) -> Term {
    let mut term = zero();
    for _ in 0..n {
        term = suc(term);
    }
    term
}

/// A lexicographic tuple of the given components; the tuple's sort is
/// derived from the component sorts.
pub fn tuple(components: Vec<Term>) -> Term {
    let sort = Sort::lex(components.iter().map(|c| c.sort().clone()).collect());
    Term::Ctor {
        ctor: Ctor::Tuple,
        args: components,
        sort,
    }
}

/// A built-in function application with the given return sort.
pub fn app(function: impl Into<String>, args: Vec<Term>, return_sort: Sort) -> Term {
    Term::App {
        function: function.into(),
        args,
        sort: return_sort,
    }
}

/// A proposition `relation(arg)`.
pub fn prop(relation: impl Into<String>, arg: Term) -> Proposition {
    Proposition::new(relation, arg)
}

// ============================================================================
// RuleBuilder
// ============================================================================

/// Fluent builder for rule clause trees.
///
/// Clauses are appended in source order; [`RuleBuilder::conclude`] closes the
/// rule and returns it.
#[derive(Debug, Clone, Default)]
pub struct RuleBuilder {
    clauses: Vec<Clause>,
}

#[derive(Debug, Clone)]
enum Clause {
    Quantify(Quantifier),
    Premise(Proposition),
    Let(String, Term),
    Filter(Term),
}

impl RuleBuilder {
    /// Start an empty rule.
    pub fn new() -> Self {
        RuleBuilder::default()
    }

    /// Introduce a universally quantified variable.
    pub fn forall(mut self, name: impl Into<String>, sort: Sort) -> Self {
        self.clauses.push(Clause::Quantify(Quantifier::new(name, sort)));
        self
    }

    /// Add a premise `relation(arg)`.
    pub fn premise(mut self, relation: impl Into<String>, arg: Term) -> Self {
        self.clauses
            .push(Clause::Premise(Proposition::new(relation, arg)));
        self
    }

    /// Bind `name` to the evaluated value of `term`.
    pub fn let_bind(mut self, name: impl Into<String>, term: Term) -> Self {
        self.clauses.push(Clause::Let(name.into(), term));
        self
    }

    /// Gate the rest of the rule on a boolean condition.
    pub fn filter(mut self, condition: Term) -> Self {
        self.clauses.push(Clause::Filter(condition));
        self
    }

    /// Close the rule with its head atom and return the clause tree.
    pub fn conclude(self, relation: impl Into<String>, arg: Term) -> Rule {
        let mut rule = Rule::Conclusion(Proposition::new(relation, arg));
        for clause in self.clauses.into_iter().rev() {
            rule = match clause {
                Clause::Quantify(q) => Rule::Quantify(q, Box::new(rule)),
                Clause::Premise(p) => Rule::Premise(p, Box::new(rule)),
                Clause::Let(name, term) => Rule::Let(name, term, Box::new(rule)),
                Clause::Filter(cond) => Rule::Filter(cond, Box::new(rule)),
            };
        }
        rule
    }
}
