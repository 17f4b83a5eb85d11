//! # Module Catalog
//!
//! The fully elaborated input to the engine: relation declarations, built-in
//! function definitions, rules, axioms, and fixpoint specs. A [`Module`] is
//! read-only once built; [`Module::validate`] checks it for configuration
//! errors before any fixpoint runs (see [`validator`]).
//!
//! ## Sorts in declarations
//!
//! A relation declaration may use [`Sort::Predicate`] as an alias for
//! another relation's argument sort; [`Module::resolve_sort`] chases the
//! alias chain. Terms themselves always carry structural sorts - the
//! validator rejects a term annotated with a predicate sort.
//!
//! ## Example
//!
//! ```rust
//! use latlog::ast::builders::{nat, prop, var, RuleBuilder};
//! use latlog::ast::Sort;
//! use latlog::module::ModuleBuilder;
//!
//! let module = ModuleBuilder::new()
//!     .relation("q", Sort::Nat)
//!     .rule(
//!         "step",
//!         RuleBuilder::new()
//!             .forall("n", Sort::Nat)
//!             .premise("q", var("n", Sort::Nat))
//!             .conclude("q", var("n", Sort::Nat)),
//!     )
//!     .axiom("base", prop("q", nat(0)))
//!     .fixpoint_spec("main", ["base"], ["step"])
//!     .build();
//! assert!(module.validate().is_ok());
//! ```

pub mod validator;

use crate::ast::{Axiom, Proposition, Rule, Sort, Term};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

pub use validator::{ValidationError, Violation, ViolationKind};

/// Implementation of a built-in function: a pure, terminating closure from
/// evaluated argument terms to a result term. Must not re-enter the engine.
pub type FunctionImpl = Arc<dyn Fn(&[Term]) -> Term + Send + Sync>;

/// A built-in function: declared argument sorts, return sort, and the
/// implementation invoked by the evaluator.
#[derive(Clone)]
pub struct FunctionDef {
    pub arg_sorts: Vec<Sort>,
    pub return_sort: Sort,
    pub implementation: FunctionImpl,
}

impl FunctionDef {
    /// Create a new function definition.
    pub fn new(
        arg_sorts: Vec<Sort>,
        return_sort: Sort,
        implementation: impl Fn(&[Term]) -> Term + Send + Sync + 'static,
    ) -> Self {
        FunctionDef {
            arg_sorts,
            return_sort,
            implementation: Arc::new(implementation),
        }
    }

    /// Number of arguments the function expects.
    pub fn arity(&self) -> usize {
        self.arg_sorts.len()
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("arg_sorts", &self.arg_sorts)
            .field("return_sort", &self.return_sort)
            .field("implementation", &"<fn>")
            .finish()
    }
}

/// A named selection of axioms and rules identifying which subset of the
/// module participates in a given `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixpointSpec {
    pub axiom_names: Vec<String>,
    pub rule_names: Vec<String>,
}

/// The read-only context handed to the engine.
#[derive(Debug, Clone, Default)]
pub struct Module {
    relations: HashMap<String, Sort>,
    functions: HashMap<String, FunctionDef>,
    rules: HashMap<String, Rule>,
    axioms: HashMap<String, Axiom>,
    fixpoint_specs: HashMap<String, FixpointSpec>,
}

impl Module {
    /// The declared argument sort of a relation.
    pub fn relation_sort(&self, name: &str) -> Option<&Sort> {
        self.relations.get(name)
    }

    /// Look up a built-in function definition.
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    /// Look up a rule by name.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Look up an axiom by name.
    pub fn axiom(&self, name: &str) -> Option<&Axiom> {
        self.axioms.get(name)
    }

    /// Look up a fixpoint spec by name.
    pub fn fixpoint_spec(&self, name: &str) -> Option<&FixpointSpec> {
        self.fixpoint_specs.get(name)
    }

    /// Iterate all relation declarations.
    pub fn relations(&self) -> impl Iterator<Item = (&String, &Sort)> {
        self.relations.iter()
    }

    /// Iterate all function definitions.
    pub fn functions(&self) -> impl Iterator<Item = (&String, &FunctionDef)> {
        self.functions.iter()
    }

    /// Iterate all rules.
    pub fn rules(&self) -> impl Iterator<Item = (&String, &Rule)> {
        self.rules.iter()
    }

    /// Iterate all axioms.
    pub fn axioms(&self) -> impl Iterator<Item = (&String, &Axiom)> {
        self.axioms.iter()
    }

    /// Iterate all fixpoint specs.
    pub fn fixpoint_specs(&self) -> impl Iterator<Item = (&String, &FixpointSpec)> {
        self.fixpoint_specs.iter()
    }

    /// Chase [`Sort::Predicate`] aliases down to a structural sort.
    ///
    /// Returns `None` on an unknown relation name or an alias cycle.
    pub fn resolve_sort(&self, sort: &Sort) -> Option<Sort> {
        self.resolve_sort_inner(sort, &mut HashSet::new())
    }

    fn resolve_sort_inner(&self, sort: &Sort, seen: &mut HashSet<String>) -> Option<Sort> {
        match sort {
            Sort::Predicate(name) => {
                // `seen` tracks the current alias path only.
                if !seen.insert(name.clone()) {
                    return None;
                }
                let declared = self.relations.get(name)?;
                let resolved = self.resolve_sort_inner(declared, seen);
                seen.remove(name);
                resolved
            }
            Sort::Tuple(ord, components) => {
                let resolved = components
                    .iter()
                    .map(|c| self.resolve_sort_inner(c, seen))
                    .collect::<Option<Vec<_>>>()?;
                Some(Sort::Tuple(*ord, resolved))
            }
            other => Some(other.clone()),
        }
    }

    /// Run the full up-front configuration check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validator::validate_module(self)
    }
}

/// Fluent builder for [`Module`] values.
#[derive(Debug, Clone, Default)]
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    /// Start an empty module.
    pub fn new() -> Self {
        ModuleBuilder::default()
    }

    /// Declare a relation and its argument sort.
    pub fn relation(mut self, name: impl Into<String>, arg_sort: Sort) -> Self {
        self.module.relations.insert(name.into(), arg_sort);
        self
    }

    /// Register a built-in function.
    pub fn function(
        mut self,
        name: impl Into<String>,
        arg_sorts: Vec<Sort>,
        return_sort: Sort,
        implementation: impl Fn(&[Term]) -> Term + Send + Sync + 'static,
    ) -> Self {
        self.module.functions.insert(
            name.into(),
            FunctionDef::new(arg_sorts, return_sort, implementation),
        );
        self
    }

    /// Register a rule.
    pub fn rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.module.rules.insert(name.into(), rule);
        self
    }

    /// Register an axiom.
    pub fn axiom(mut self, name: impl Into<String>, prop: Proposition) -> Self {
        self.module.axioms.insert(name.into(), Axiom::new(prop));
        self
    }

    /// Register a fixpoint spec selecting axioms and rules by name.
    pub fn fixpoint_spec<A, R>(mut self, name: impl Into<String>, axioms: A, rules: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        self.module.fixpoint_specs.insert(
            name.into(),
            FixpointSpec {
                axiom_names: axioms.into_iter().map(Into::into).collect(),
                rule_names: rules.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Finish building. Validation is separate: call [`Module::validate`],
    /// or let the engine run it at the start of `generate`.
    pub fn build(self) -> Module {
        self.module
    }
}
