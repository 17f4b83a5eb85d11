//! # Module Validation
//!
//! Up-front configuration checking for [`Module`](super::Module) values:
//! - every relation referenced by a rule, axiom, or alias is declared
//! - every term is well-sorted (constructor/sort agreement, declared
//!   function signatures, tuple arities)
//! - axioms are concrete
//! - rule variables are range-restricted: lets, filters, and the conclusion
//!   only use variables bound by an earlier premise (or an earlier let)
//! - rules contain at least one premise and no filter before the first one
//! - fixpoint specs reference existing axioms and rules
//!
//! All violations are collected into one report; `generate` refuses to start
//! on a module that fails validation.

use super::Module;
use crate::ast::{Ctor, Proposition, Rule, Sort, Term};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Types of validation violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A relation name with no declaration (or an unresolvable alias).
    UnknownRelation,
    /// A function application naming an unregistered function.
    UnknownFunction,
    /// A term whose sort disagrees with its context.
    SortMismatch,
    /// A constructor or function applied to the wrong number of arguments.
    ArityMismatch,
    /// An axiom whose argument contains variables or unreduced applications.
    NonConcreteAxiom,
    /// A variable used where no binding is in force.
    UnboundVariable,
    /// A fixpoint spec naming a missing axiom or rule.
    DanglingReference,
    /// A rule shape the engine cannot apply.
    MalformedRule,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ViolationKind::UnknownRelation => "unknown relation",
            ViolationKind::UnknownFunction => "unknown function",
            ViolationKind::SortMismatch => "sort mismatch",
            ViolationKind::ArityMismatch => "arity mismatch",
            ViolationKind::NonConcreteAxiom => "non-concrete axiom",
            ViolationKind::UnboundVariable => "unbound variable",
            ViolationKind::DanglingReference => "dangling reference",
            ViolationKind::MalformedRule => "malformed rule",
        };
        write!(f, "{label}")
    }
}

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Where the violation was found, e.g. `rule \`step\``.
    pub context: String,
    /// Type of violation.
    pub kind: ViolationKind,
    /// Human-readable message.
    pub message: String,
}

impl Violation {
    fn new(context: &str, kind: ViolationKind, message: impl Into<String>) -> Self {
        Violation {
            context: context.to_string(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.context, self.kind, self.message)
    }
}

/// The module is inconsistent; the engine refuses to start.
#[derive(Debug, Clone, thiserror::Error)]
#[error("module validation failed with {} violation(s)", .violations.len())]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

/// Validate an entire module, collecting every violation.
pub fn validate_module(module: &Module) -> Result<(), ValidationError> {
    let mut out = Vec::new();

    let mut functions: Vec<_> = module.functions().collect();
    functions.sort_by(|a, b| a.0.cmp(b.0));
    for (name, def) in functions {
        let context = format!("function `{name}`");
        for sort in def.arg_sorts.iter().chain([&def.return_sort]) {
            check_declared_sort(module, sort, &context, &mut out);
        }
    }

    let mut axioms: Vec<_> = module.axioms().collect();
    axioms.sort_by(|a, b| a.0.cmp(b.0));
    for (name, axiom) in axioms {
        let context = format!("axiom `{name}`");
        check_axiom(module, &axiom.prop, &context, &mut out);
    }

    let mut rules: Vec<_> = module.rules().collect();
    rules.sort_by(|a, b| a.0.cmp(b.0));
    for (name, rule) in rules {
        let context = format!("rule `{name}`");
        check_rule(module, rule, &context, &mut out);
    }

    let mut specs: Vec<_> = module.fixpoint_specs().collect();
    specs.sort_by(|a, b| a.0.cmp(b.0));
    for (name, spec) in specs {
        let context = format!("fixpoint spec `{name}`");
        for axiom_name in &spec.axiom_names {
            if module.axiom(axiom_name).is_none() {
                out.push(Violation::new(
                    &context,
                    ViolationKind::DanglingReference,
                    format!("axiom `{axiom_name}` is not registered"),
                ));
            }
        }
        for rule_name in &spec.rule_names {
            if module.rule(rule_name).is_none() {
                out.push(Violation::new(
                    &context,
                    ViolationKind::DanglingReference,
                    format!("rule `{rule_name}` is not registered"),
                ));
            }
        }
    }

    if out.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations: out })
    }
}

/// A declared sort may use predicate aliases, but they must resolve.
fn check_declared_sort(module: &Module, sort: &Sort, context: &str, out: &mut Vec<Violation>) {
    if module.resolve_sort(sort).is_none() {
        out.push(Violation::new(
            context,
            ViolationKind::UnknownRelation,
            format!("sort {sort} does not resolve to a structural sort"),
        ));
    }
}

fn check_axiom(module: &Module, prop: &Proposition, context: &str, out: &mut Vec<Violation>) {
    if !prop.is_concrete() {
        out.push(Violation::new(
            context,
            ViolationKind::NonConcreteAxiom,
            format!("`{prop}` contains variables or unreduced applications"),
        ));
    }
    check_proposition(module, prop, &HashMap::new(), context, out);
}

fn check_rule(module: &Module, rule: &Rule, context: &str, out: &mut Vec<Violation>) {
    let mut scope: HashMap<String, Sort> = HashMap::new();
    let mut bound: HashSet<String> = HashSet::new();
    let mut seen_premise = false;
    let mut cursor = rule;

    loop {
        match cursor {
            Rule::Quantify(q, rest) => {
                if contains_predicate_sort(&q.sort) {
                    // Quantifier sorts follow the same rule as term sorts.
                    out.push(Violation::new(
                        context,
                        ViolationKind::SortMismatch,
                        format!("quantifier `{}` carries unresolved sort {}", q.name, q.sort),
                    ));
                }
                scope.insert(q.name.clone(), q.sort.clone());
                cursor = rest;
            }
            Rule::Premise(prop, rest) => {
                check_proposition(module, prop, &scope, context, out);
                seen_premise = true;
                for v in prop.variables() {
                    if scope.contains_key(&v) {
                        bound.insert(v);
                    }
                }
                cursor = rest;
            }
            Rule::Let(name, term, rest) => {
                check_term(module, term, &scope, context, out);
                for v in term.variables() {
                    if !bound.contains(&v) {
                        out.push(Violation::new(
                            context,
                            ViolationKind::UnboundVariable,
                            format!("let `{name}` uses `{v}` before any premise binds it"),
                        ));
                    }
                }
                scope.insert(name.clone(), term.sort().clone());
                bound.insert(name.clone());
                cursor = rest;
            }
            Rule::Filter(cond, rest) => {
                if !seen_premise {
                    out.push(Violation::new(
                        context,
                        ViolationKind::MalformedRule,
                        "filter appears before the first premise",
                    ));
                }
                check_term(module, cond, &scope, context, out);
                if module.resolve_sort(cond.sort()) != Some(Sort::Bool) {
                    out.push(Violation::new(
                        context,
                        ViolationKind::SortMismatch,
                        format!("filter condition `{cond}` is not boolean"),
                    ));
                }
                for v in cond.variables() {
                    if !bound.contains(&v) {
                        out.push(Violation::new(
                            context,
                            ViolationKind::UnboundVariable,
                            format!("filter uses `{v}` before any premise binds it"),
                        ));
                    }
                }
                cursor = rest;
            }
            Rule::Conclusion(prop) => {
                check_proposition(module, prop, &scope, context, out);
                for v in prop.variables() {
                    if !bound.contains(&v) {
                        out.push(Violation::new(
                            context,
                            ViolationKind::UnboundVariable,
                            format!("conclusion uses `{v}` before any premise binds it"),
                        ));
                    }
                }
                if !seen_premise {
                    out.push(Violation::new(
                        context,
                        ViolationKind::MalformedRule,
                        "rule has no premise to consume",
                    ));
                }
                return;
            }
        }
    }
}

fn check_proposition(
    module: &Module,
    prop: &Proposition,
    scope: &HashMap<String, Sort>,
    context: &str,
    out: &mut Vec<Violation>,
) {
    let Some(declared) = module.relation_sort(&prop.relation) else {
        out.push(Violation::new(
            context,
            ViolationKind::UnknownRelation,
            format!("relation `{}` is not declared", prop.relation),
        ));
        return;
    };
    let Some(expected) = module.resolve_sort(declared) else {
        out.push(Violation::new(
            context,
            ViolationKind::UnknownRelation,
            format!("argument sort of `{}` does not resolve", prop.relation),
        ));
        return;
    };
    if prop.arg.sort() != &expected {
        out.push(Violation::new(
            context,
            ViolationKind::SortMismatch,
            format!(
                "`{}` expects an argument of sort {expected}, found {}",
                prop.relation,
                prop.arg.sort()
            ),
        ));
    }
    check_term(module, &prop.arg, scope, context, out);
}

fn check_term(
    module: &Module,
    term: &Term,
    scope: &HashMap<String, Sort>,
    context: &str,
    out: &mut Vec<Violation>,
) {
    if contains_predicate_sort(term.sort()) {
        out.push(Violation::new(
            context,
            ViolationKind::SortMismatch,
            format!("term `{term}` carries unresolved sort {}", term.sort()),
        ));
        return;
    }
    match term {
        Term::Var { name, sort } => match scope.get(name) {
            None => out.push(Violation::new(
                context,
                ViolationKind::UnboundVariable,
                format!("variable `{name}` is not introduced by any binder"),
            )),
            Some(declared) if declared != sort => out.push(Violation::new(
                context,
                ViolationKind::SortMismatch,
                format!("variable `{name}` declared as {declared}, used as {sort}"),
            )),
            Some(_) => {}
        },
        Term::Ctor { ctor, args, sort } => {
            check_ctor(ctor, args, sort, context, out);
            for arg in args {
                check_term(module, arg, scope, context, out);
            }
        }
        Term::App {
            function,
            args,
            sort,
        } => {
            let Some(def) = module.function(function) else {
                out.push(Violation::new(
                    context,
                    ViolationKind::UnknownFunction,
                    format!("function `{function}` has no registered definition"),
                ));
                return;
            };
            if args.len() != def.arity() {
                out.push(Violation::new(
                    context,
                    ViolationKind::ArityMismatch,
                    format!(
                        "`{function}` expects {} argument(s), found {}",
                        def.arity(),
                        args.len()
                    ),
                ));
            }
            for (arg, expected) in args.iter().zip(&def.arg_sorts) {
                if Some(arg.sort()) != module.resolve_sort(expected).as_ref() {
                    out.push(Violation::new(
                        context,
                        ViolationKind::SortMismatch,
                        format!(
                            "argument `{arg}` of `{function}` has sort {}, expected {expected}",
                            arg.sort()
                        ),
                    ));
                }
            }
            if Some(sort) != module.resolve_sort(&def.return_sort).as_ref() {
                out.push(Violation::new(
                    context,
                    ViolationKind::SortMismatch,
                    format!(
                        "`{function}` returns {}, but the application is annotated {sort}",
                        def.return_sort
                    ),
                ));
            }
            for arg in args {
                check_term(module, arg, scope, context, out);
            }
        }
    }
}

fn check_ctor(ctor: &Ctor, args: &[Term], sort: &Sort, context: &str, out: &mut Vec<Violation>) {
    let push_sort = |out: &mut Vec<Violation>, expected: &str| {
        out.push(Violation::new(
            context,
            ViolationKind::SortMismatch,
            format!("constructor `{}` cannot have sort {sort}, expected {expected}", ctor.as_str()),
        ));
    };
    let push_arity = |out: &mut Vec<Violation>, expected: usize| {
        out.push(Violation::new(
            context,
            ViolationKind::ArityMismatch,
            format!(
                "constructor `{}` expects {expected} argument(s), found {}",
                ctor.as_str(),
                args.len()
            ),
        ));
    };

    match ctor {
        Ctor::Unit => {
            if sort != &Sort::Unit {
                push_sort(out, "unit");
            }
            if !args.is_empty() {
                push_arity(out, 0);
            }
        }
        Ctor::True | Ctor::False => {
            if sort != &Sort::Bool {
                push_sort(out, "bool");
            }
            if !args.is_empty() {
                push_arity(out, 0);
            }
        }
        Ctor::Zero => {
            if sort != &Sort::Nat {
                push_sort(out, "nat");
            }
            if !args.is_empty() {
                push_arity(out, 0);
            }
        }
        Ctor::Suc => {
            if sort != &Sort::Nat {
                push_sort(out, "nat");
            }
            if args.len() != 1 {
                push_arity(out, 1);
            } else if args[0].sort() != &Sort::Nat {
                out.push(Violation::new(
                    context,
                    ViolationKind::SortMismatch,
                    format!("`suc` applied to {} of sort {}", args[0], args[0].sort()),
                ));
            }
        }
        Ctor::Tuple => match sort {
            Sort::Tuple(_, components) => {
                if args.len() != components.len() {
                    push_arity(out, components.len());
                } else {
                    for (arg, component) in args.iter().zip(components) {
                        if arg.sort() != component {
                            out.push(Violation::new(
                                context,
                                ViolationKind::SortMismatch,
                                format!(
                                    "tuple component `{arg}` has sort {}, expected {component}",
                                    arg.sort()
                                ),
                            ));
                        }
                    }
                }
            }
            _ => push_sort(out, "a tuple sort"),
        },
    }
}

fn contains_predicate_sort(sort: &Sort) -> bool {
    match sort {
        Sort::Predicate(_) => true,
        Sort::Tuple(_, components) => components.iter().any(contains_predicate_sort),
        _ => false,
    }
}
