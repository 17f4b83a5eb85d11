//! # Term & Proposition Algebra
//!
//! Immutable tree values for the deductive core: sorts, terms, propositions,
//! quantifications, rules, and axioms. Everything downstream (unification,
//! the lattice order, evaluation, the saturation loop) operates on these
//! types.
//!
//! ## Builders
//!
//! For programmatic construction of terms and rules, see the [`builders`]
//! module which provides helpers like [`builders::nat`] and
//! [`builders::RuleBuilder`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub mod builders;

// ============================================================================
// Sorts
// ============================================================================

/// Ordering discipline for a tuple sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TupleOrdering {
    /// Compare components left to right; the first strict comparison decides.
    Lexicographic,
}

/// The type of a term.
///
/// Every term carries its sort; well-sortedness is checked up front by
/// module validation, so the engine itself never re-derives sorts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sort {
    /// The one-point sort.
    Unit,
    /// Booleans, ordered `false < true`.
    Bool,
    /// Naturals built from `zero`/`suc`, with the standard order.
    Nat,
    /// A tuple of component sorts under the given ordering discipline.
    Tuple(TupleOrdering, Vec<Sort>),
    /// The argument sort of a user-declared relation, by name. Resolved
    /// against the relation catalog during module validation.
    Predicate(String),
}

impl Sort {
    /// Convenience constructor for a lexicographic tuple sort.
    pub fn lex(components: Vec<Sort>) -> Self {
        Sort::Tuple(TupleOrdering::Lexicographic, components)
    }

    /// Check if this sort is a tuple sort.
    pub fn is_tuple(&self) -> bool {
        matches!(self, Sort::Tuple(_, _))
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Unit => write!(f, "unit"),
            Sort::Bool => write!(f, "bool"),
            Sort::Nat => write!(f, "nat"),
            Sort::Tuple(TupleOrdering::Lexicographic, components) => {
                write!(f, "(")?;
                for (i, c) in components.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
            Sort::Predicate(name) => write!(f, "pred({name})"),
        }
    }
}

// ============================================================================
// Terms
// ============================================================================

/// Head constructor of a constructor term. The argument arity is determined
/// by the constructor together with the term's sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ctor {
    /// The unit value; sort `Unit`, no arguments.
    Unit,
    /// Boolean true; sort `Bool`, no arguments.
    True,
    /// Boolean false; sort `Bool`, no arguments.
    False,
    /// Natural zero; sort `Nat`, no arguments.
    Zero,
    /// Natural successor; sort `Nat`, one `Nat` argument.
    Suc,
    /// Tuple; sort `Tuple(ord, sorts)`, one argument per component sort.
    Tuple,
}

impl Ctor {
    /// The string representation used by `Display`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Ctor::Unit => "unit",
            Ctor::True => "true",
            Ctor::False => "false",
            Ctor::Zero => "zero",
            Ctor::Suc => "suc",
            Ctor::Tuple => "tuple",
        }
    }
}

/// A term: a variable, a constructor application, or a built-in function
/// application.
///
/// A term is *ground* when it contains no variables, and *concrete* when it
/// is ground and contains no unreduced function applications. The database
/// and the lattice order only ever see concrete terms; rule bodies are
/// symbolic until unification and evaluation resolve them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A variable. Only valid in symbolic positions (rule bodies).
    Var { name: String, sort: Sort },
    /// A constructor term.
    Ctor {
        ctor: Ctor,
        args: Vec<Term>,
        sort: Sort,
    },
    /// A built-in function application; disappears under evaluation.
    App {
        function: String,
        args: Vec<Term>,
        sort: Sort,
    },
}

impl Term {
    /// The sort this term carries.
    pub fn sort(&self) -> &Sort {
        match self {
            Term::Var { sort, .. } | Term::Ctor { sort, .. } | Term::App { sort, .. } => sort,
        }
    }

    /// Check if this term is a variable.
    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var { .. })
    }

    /// Check if this term is a function application.
    pub fn is_app(&self) -> bool {
        matches!(self, Term::App { .. })
    }

    /// A term is ground when it contains no variables.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Var { .. } => false,
            Term::Ctor { args, .. } | Term::App { args, .. } => args.iter().all(Term::is_ground),
        }
    }

    /// A term is concrete when it is ground and contains no unreduced
    /// function applications.
    pub fn is_concrete(&self) -> bool {
        match self {
            Term::Var { .. } | Term::App { .. } => false,
            Term::Ctor { args, .. } => args.iter().all(Term::is_concrete),
        }
    }

    /// All variable names occurring in this term.
    pub fn variables(&self) -> HashSet<String> {
        let mut vars = HashSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut HashSet<String>) {
        match self {
            Term::Var { name, .. } => {
                vars.insert(name.clone());
            }
            Term::Ctor { args, .. } | Term::App { args, .. } => {
                for arg in args {
                    arg.collect_variables(vars);
                }
            }
        }
    }

    /// Check if the named variable occurs in this term.
    pub fn contains_var(&self, name: &str) -> bool {
        match self {
            Term::Var { name: n, .. } => n == name,
            Term::Ctor { args, .. } | Term::App { args, .. } => {
                args.iter().any(|a| a.contains_var(name))
            }
        }
    }

    /// Decode a concrete `zero`/`suc` chain as a machine natural.
    pub fn as_nat(&self) -> Option<u64> {
        let mut n = 0u64;
        let mut cursor = self;
        loop {
            match cursor {
                Term::Ctor {
                    ctor: Ctor::Zero, ..
                } => return Some(n),
                Term::Ctor {
                    ctor: Ctor::Suc,
                    args,
                    ..
                } => {
                    n += 1;
                    cursor = args.first()?;
                }
                _ => return None,
            }
        }
    }

    /// Decode a boolean constructor term.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Term::Ctor {
                ctor: Ctor::True, ..
            } => Some(true),
            Term::Ctor {
                ctor: Ctor::False, ..
            } => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var { name, .. } => write!(f, "{name}"),
            Term::Ctor { ctor, args, .. } => match ctor {
                Ctor::Unit => write!(f, "()"),
                Ctor::True => write!(f, "true"),
                Ctor::False => write!(f, "false"),
                Ctor::Zero => write!(f, "0"),
                Ctor::Suc => match self.as_nat() {
                    Some(n) => write!(f, "{n}"),
                    None => write!(f, "suc({})", args[0]),
                },
                Ctor::Tuple => {
                    write!(f, "(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ")")
                }
            },
            Term::App { function, args, .. } => {
                write!(f, "{function}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

// ============================================================================
// Propositions
// ============================================================================

/// A relation name applied to a single argument term.
///
/// Relations take one argument; multi-column relations are expressed with a
/// tuple-sorted argument. The argument's sort must equal the relation's
/// declared argument sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proposition {
    pub relation: String,
    pub arg: Term,
}

impl Proposition {
    /// Create a new proposition.
    pub fn new(relation: impl Into<String>, arg: Term) -> Self {
        Proposition {
            relation: relation.into(),
            arg,
        }
    }

    /// Check if the argument is ground (no variables).
    pub fn is_ground(&self) -> bool {
        self.arg.is_ground()
    }

    /// Check if the argument is concrete (ground and fully reduced).
    pub fn is_concrete(&self) -> bool {
        self.arg.is_concrete()
    }

    /// All variable names occurring in the argument.
    pub fn variables(&self) -> HashSet<String> {
        self.arg.variables()
    }
}

impl fmt::Display for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.relation, self.arg)
    }
}

// ============================================================================
// Quantifiers, rules, axioms
// ============================================================================

/// A universally quantified variable introduced by a rule.
///
/// Universal quantification is the only binder kind the core supports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quantifier {
    pub name: String,
    pub sort: Sort,
}

impl Quantifier {
    /// Create a new universal quantifier.
    pub fn new(name: impl Into<String>, sort: Sort) -> Self {
        Quantifier {
            name: name.into(),
            sort,
        }
    }
}

/// An inference rule, read top to bottom as a tree of clauses.
///
/// A well-formed rule introduces its variables with [`Rule::Quantify`],
/// matches body atoms with [`Rule::Premise`], may interleave [`Rule::Let`]
/// bindings and [`Rule::Filter`] conditions after the first premise, and
/// terminates in a single [`Rule::Conclusion`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    /// Introduce a universally bound variable, then continue.
    Quantify(Quantifier, Box<Rule>),
    /// A body atom to be matched by unification against the database.
    Premise(Proposition, Box<Rule>),
    /// Bind a name to the evaluated value of a term, then continue.
    Let(String, Term, Box<Rule>),
    /// Proceed only if the condition evaluates to `true`.
    Filter(Term, Box<Rule>),
    /// Terminal clause: the head atom.
    Conclusion(Proposition),
}

impl Rule {
    /// The head atom at the tail of the clause tree.
    pub fn conclusion(&self) -> &Proposition {
        match self {
            Rule::Quantify(_, rest)
            | Rule::Premise(_, rest)
            | Rule::Let(_, _, rest)
            | Rule::Filter(_, rest) => rest.conclusion(),
            Rule::Conclusion(prop) => prop,
        }
    }

    /// All premises, in source order.
    pub fn premises(&self) -> Vec<&Proposition> {
        let mut out = Vec::new();
        let mut cursor = self;
        loop {
            match cursor {
                Rule::Premise(prop, rest) => {
                    out.push(prop);
                    cursor = rest;
                }
                Rule::Quantify(_, rest) | Rule::Let(_, _, rest) | Rule::Filter(_, rest) => {
                    cursor = rest;
                }
                Rule::Conclusion(_) => return out,
            }
        }
    }

    /// Number of premises remaining in this rule.
    pub fn premise_count(&self) -> usize {
        self.premises().len()
    }

    /// Quantifiers introduced anywhere in the clause tree, in source order.
    pub fn binders(&self) -> Vec<&Quantifier> {
        let mut out = Vec::new();
        let mut cursor = self;
        loop {
            match cursor {
                Rule::Quantify(q, rest) => {
                    out.push(q);
                    cursor = rest;
                }
                Rule::Premise(_, rest) | Rule::Let(_, _, rest) | Rule::Filter(_, rest) => {
                    cursor = rest;
                }
                Rule::Conclusion(_) => return out,
            }
        }
    }

    /// Variable names occurring free in this rule, i.e. not bound by an
    /// enclosing quantifier or let.
    pub fn free_variables(&self) -> HashSet<String> {
        match self {
            Rule::Quantify(q, rest) => {
                let mut vars = rest.free_variables();
                vars.remove(&q.name);
                vars
            }
            Rule::Premise(prop, rest) => {
                let mut vars = rest.free_variables();
                vars.extend(prop.variables());
                vars
            }
            Rule::Let(name, term, rest) => {
                let mut vars = rest.free_variables();
                vars.remove(name);
                vars.extend(term.variables());
                vars
            }
            Rule::Filter(cond, rest) => {
                let mut vars = rest.free_variables();
                vars.extend(cond.variables());
                vars
            }
            Rule::Conclusion(prop) => prop.variables(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Quantify(q, rest) => write!(f, "forall {}: {}. {}", q.name, q.sort, rest),
            Rule::Premise(prop, rest) => write!(f, "{prop}, {rest}"),
            Rule::Let(name, term, rest) => write!(f, "let {name} = {term}, {rest}"),
            Rule::Filter(cond, rest) => write!(f, "if {cond}, {rest}"),
            Rule::Conclusion(prop) => write!(f, "|- {prop}"),
        }
    }
}

/// A named ground proposition asserted unconditionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axiom {
    pub prop: Proposition,
}

impl Axiom {
    /// Create a new axiom from a concrete proposition.
    pub fn new(prop: Proposition) -> Self {
        Axiom { prop }
    }
}

impl fmt::Display for Axiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prop)
    }
}
