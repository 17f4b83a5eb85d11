//! # Lattice / Partial Order
//!
//! The partial order on well-sorted terms that drives subsumption: a fact
//! `p` subsumes a fact `q` when `p >= q`. The engine only ever consults the
//! order; join and meet are not part of this crate.
//!
//! Comparing terms of different sorts is a bug (an [`LatticeError`], not
//! [`PartialOrdering::Incomparable`]); the database and queue only hold
//! well-sorted concrete propositions, so an error here indicates an engine
//! defect upstream.

use crate::ast::{Ctor, Proposition, Sort, Term, TupleOrdering};
use crate::unify::unify_terms_pure;

/// Outcome of a partial-order comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialOrdering {
    Less,
    Equal,
    Greater,
    Incomparable,
}

impl PartialOrdering {
    /// Reverse the direction of the comparison.
    pub fn flip(self) -> Self {
        match self {
            PartialOrdering::Less => PartialOrdering::Greater,
            PartialOrdering::Greater => PartialOrdering::Less,
            other => other,
        }
    }

    /// `true` for `Equal` and `Greater`: the left side dominates the right.
    pub fn dominates(self) -> bool {
        matches!(self, PartialOrdering::Equal | PartialOrdering::Greater)
    }
}

/// Comparison failure: the inputs were not well-sorted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LatticeError {
    /// The two terms carry different sorts.
    #[error("cannot order `{left}` : {left_sort} against `{right}` : {right_sort}")]
    SortMismatch {
        left: String,
        right: String,
        left_sort: String,
        right_sort: String,
    },

    /// A term carries an unresolved predicate sort.
    #[error("cannot order `{term}`: sort {sort} is not structural")]
    UnresolvedSort { term: String, sort: String },
}

/// Compare two well-sorted terms of the same sort.
pub fn compare_terms(a: &Term, b: &Term) -> Result<PartialOrdering, LatticeError> {
    if a.sort() != b.sort() {
        return Err(LatticeError::SortMismatch {
            left: a.to_string(),
            right: b.to_string(),
            left_sort: a.sort().to_string(),
            right_sort: b.sort().to_string(),
        });
    }

    match (a, b) {
        (Term::Var { name: n1, .. }, Term::Var { name: n2, .. }) => Ok(if n1 == n2 {
            PartialOrdering::Equal
        } else {
            PartialOrdering::Incomparable
        }),
        (
            Term::Ctor {
                ctor: c1, args: a1, ..
            },
            Term::Ctor {
                ctor: c2, args: a2, ..
            },
        ) => compare_ctors(a, b, *c1, a1, *c2, a2),
        // At least one side is an application or a lone variable against
        // structure: unifiable terms are equal up to substitution, anything
        // else is incomparable.
        _ => Ok(match unify_terms_pure(a, b) {
            Ok(_) => PartialOrdering::Equal,
            Err(_) => PartialOrdering::Incomparable,
        }),
    }
}

fn compare_ctors(
    a: &Term,
    b: &Term,
    c1: Ctor,
    args1: &[Term],
    c2: Ctor,
    args2: &[Term],
) -> Result<PartialOrdering, LatticeError> {
    match a.sort() {
        Sort::Unit => Ok(PartialOrdering::Equal),
        Sort::Bool => Ok(match (c1, c2) {
            (Ctor::False, Ctor::False) | (Ctor::True, Ctor::True) => PartialOrdering::Equal,
            (Ctor::False, Ctor::True) => PartialOrdering::Less,
            (Ctor::True, Ctor::False) => PartialOrdering::Greater,
            // Symbolic leftovers; fall back to unification.
            _ => unifiable_ordering(a, b),
        }),
        Sort::Nat => match (c1, c2) {
            (Ctor::Zero, Ctor::Zero) => Ok(PartialOrdering::Equal),
            (Ctor::Zero, Ctor::Suc) => Ok(PartialOrdering::Less),
            (Ctor::Suc, Ctor::Zero) => Ok(PartialOrdering::Greater),
            (Ctor::Suc, Ctor::Suc) => compare_terms(&args1[0], &args2[0]),
            _ => Ok(unifiable_ordering(a, b)),
        },
        Sort::Tuple(TupleOrdering::Lexicographic, _) => {
            for (x, y) in args1.iter().zip(args2) {
                match compare_terms(x, y)? {
                    PartialOrdering::Equal => {}
                    decisive => return Ok(decisive),
                }
            }
            Ok(PartialOrdering::Equal)
        }
        Sort::Predicate(_) => Err(LatticeError::UnresolvedSort {
            term: a.to_string(),
            sort: a.sort().to_string(),
        }),
    }
}

fn unifiable_ordering(a: &Term, b: &Term) -> PartialOrdering {
    match unify_terms_pure(a, b) {
        Ok(_) => PartialOrdering::Equal,
        Err(_) => PartialOrdering::Incomparable,
    }
}

/// Compare two propositions: comparable only within one relation.
pub fn compare_propositions(
    p: &Proposition,
    q: &Proposition,
) -> Result<PartialOrdering, LatticeError> {
    if p.relation != q.relation {
        return Ok(PartialOrdering::Incomparable);
    }
    compare_terms(&p.arg, &q.arg)
}

/// `p >= q`: the subsumption test used by the database and queue.
pub fn dominates(p: &Proposition, q: &Proposition) -> Result<bool, LatticeError> {
    Ok(compare_propositions(p, q)?.dominates())
}
