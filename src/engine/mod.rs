//! # Fixpoint Engine
//!
//! The worklist-driven saturation loop. Axioms and initial facts are seeded
//! as conclusion patches; each loop iteration pops a patch (skipping
//! conclusions the database already subsumes), *learns* it, and enqueues the
//! resulting child patches:
//!
//! - learning a conclusion evaluates the proposition, inserts it into the
//!   database under the anti-chain discipline, and - if it was news - tries
//!   every registered rule against it;
//! - learning an apply patch registers the partial rule, then tries it
//!   against every current candidate fact.
//!
//! Applying a rule to a fact unifies the rule's first premise against the
//! fact and walks the residual body: lets evaluate and substitute, filters
//! gate, a further premise defers as a new apply patch, and the conclusion
//! emits a conclusion patch.
//!
//! The loop ends when the queue drains (a true least fixpoint) or the gas
//! budget is exhausted (a bounded-effort approximation, not an error).

use crate::ast::{Proposition, Quantifier, Rule};
use crate::database::Database;
use crate::eval::{evaluate_proposition, evaluate_term, EvalError};
use crate::lattice::LatticeError;
use crate::module::{Module, ValidationError};
use crate::normalize::canonicalize_rule;
use crate::queue::{patch_order, PartialRule, Patch, PatchOrder, Queue};
use crate::unify::{unify_propositions, Substitution, UnifyError};
use tracing::{debug, trace};

/// Fatal engine failure. Unification and evaluation failures on a single
/// (rule, candidate) pair are absorbed locally - they just mean "no patches";
/// everything here surfaces to the caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// The module failed the up-front configuration check.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No fixpoint spec with the requested name.
    #[error("unknown fixpoint spec `{0}`")]
    UnknownSpec(String),

    /// A subsumption comparison saw ill-sorted facts.
    #[error(transparent)]
    Lattice(#[from] LatticeError),

    /// Evaluation hit an unbound variable or a missing implementation.
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Unification itself was ill-sorted (a bug in rule construction).
    #[error("unification defect in rule `{origin}`: {source}")]
    Unify {
        origin: String,
        #[source]
        source: UnifyError,
    },

    /// A rule shape the loop cannot apply.
    #[error("malformed rule `{origin}`: {reason}")]
    MalformedRule { origin: String, reason: String },

    /// An invariant the engine relies on was violated.
    #[error("engine invariant violated: {0}")]
    Internal(String),
}

/// Result of one `generate` call.
#[derive(Debug, Clone)]
pub struct FixpointOutcome {
    /// The final fact store.
    pub database: Database,
    /// Gas left over; zero when the budget ran out first.
    pub gas_remaining: u64,
    /// Loop iterations performed (patches learned).
    pub iterations: u64,
    /// `true` when the queue drained: a least fixpoint relative to the
    /// supplied rules and axioms. `false` means the budget expired and the
    /// database is a best-effort approximation.
    pub saturated: bool,
}

/// The loop-owned mutable state.
struct FixpointEnv<'m> {
    module: &'m Module,
    gas: u64,
    database: Database,
    rules: Vec<PartialRule>,
    queue: Queue,
}

/// Run one fixpoint to completion under the default patch order.
pub fn generate(
    module: &Module,
    spec_name: &str,
    initial: Database,
    initial_gas: u64,
) -> Result<FixpointOutcome, EngineError> {
    generate_with_order(
        module,
        spec_name,
        initial,
        initial_gas,
        patch_order::conclusions_first,
    )
}

/// Run one fixpoint to completion from an empty initial database, returning
/// just the facts.
pub fn saturate(
    module: &Module,
    spec_name: &str,
    initial_gas: u64,
) -> Result<Database, EngineError> {
    generate(module, spec_name, Database::new(), initial_gas).map(|outcome| outcome.database)
}

/// Run one fixpoint to completion under a caller-supplied patch order.
///
/// The engine is correct for any total preorder; the order only affects
/// performance and intermediate queue size.
pub fn generate_with_order(
    module: &Module,
    spec_name: &str,
    initial: Database,
    initial_gas: u64,
    order: PatchOrder,
) -> Result<FixpointOutcome, EngineError> {
    module.validate()?;
    let spec = module
        .fixpoint_spec(spec_name)
        .ok_or_else(|| EngineError::UnknownSpec(spec_name.to_string()))?;

    let mut env = FixpointEnv {
        module,
        gas: initial_gas,
        database: initial,
        rules: Vec::new(),
        queue: Queue::new(order),
    };

    for rule_name in &spec.rule_names {
        let rule = module.rule(rule_name).ok_or_else(|| {
            EngineError::Internal(format!("rule `{rule_name}` vanished after validation"))
        })?;
        env.rules
            .push(PartialRule::new(rule_name.clone(), canonicalize_rule(rule)));
        trace!(rule = %rule_name, "rule_registered");
    }

    let mut seeds: Vec<Proposition> = env.database.propositions().to_vec();
    for axiom_name in &spec.axiom_names {
        let axiom = module.axiom(axiom_name).ok_or_else(|| {
            EngineError::Internal(format!("axiom `{axiom_name}` vanished after validation"))
        })?;
        seeds.push(axiom.prop.clone());
    }
    debug!(
        spec = spec_name,
        rules = env.rules.len(),
        seeds = seeds.len(),
        gas = initial_gas,
        "fixpoint_start"
    );
    for prop in seeds {
        env.queue.insert(Patch::Conclusion(prop));
    }

    let mut iterations = 0u64;
    let saturated = loop {
        if env.gas == 0 {
            break env.queue.is_empty();
        }
        let Some(patch) = env.queue.pop(&env.database)? else {
            break true;
        };
        env.gas -= 1;
        iterations += 1;
        trace!(%patch, gas = env.gas, "learn");
        let children = env.learn(patch)?;
        for child in children {
            env.queue.insert(child);
        }
    };

    debug!(
        facts = env.database.len(),
        iterations,
        gas_remaining = env.gas,
        saturated,
        "fixpoint_done"
    );
    Ok(FixpointOutcome {
        database: env.database,
        gas_remaining: env.gas,
        iterations,
        saturated,
    })
}

impl FixpointEnv<'_> {
    /// Dispatch one popped patch, returning its child patches.
    fn learn(&mut self, patch: Patch) -> Result<Vec<Patch>, EngineError> {
        match patch {
            Patch::Conclusion(prop) => {
                let fact = evaluate_proposition(self.module, &prop)?;
                if !self.database.insert(fact.clone())? {
                    trace!(%fact, "fact_subsumed");
                    return Ok(Vec::new());
                }
                debug!(%fact, "fact_learned");
                let mut children = Vec::new();
                for partial in &self.rules {
                    children.extend(apply_rule(self.module, partial, &fact)?);
                }
                Ok(children)
            }
            Patch::Apply(partial) => {
                trace!(%partial, "residual_registered");
                let mut children = Vec::new();
                for fact in self.database.candidates() {
                    children.extend(apply_rule(self.module, &partial, fact)?);
                }
                self.rules.push(partial);
                Ok(children)
            }
        }
    }
}

/// Try a (partial) rule against one fact: walk the leading clauses, unify
/// the first premise, and hand the substituted remainder to the residual
/// walk. A premise that does not match yields no patches.
fn apply_rule(
    module: &Module,
    partial: &PartialRule,
    fact: &Proposition,
) -> Result<Vec<Patch>, EngineError> {
    let origin = &partial.origin;
    let mut binders: Vec<Quantifier> = Vec::new();
    let mut clause = partial.rule.clone();
    loop {
        match clause {
            Rule::Quantify(q, rest) => {
                binders.push(q);
                clause = *rest;
            }
            Rule::Let(name, term, rest) => {
                // A let ahead of every premise must already be closed.
                let value = evaluate_term(module, &term)?;
                let mut subst = Substitution::new();
                subst.bind(name, value);
                clause = subst.apply_rule(&rest);
            }
            Rule::Filter(_, _) => {
                return Err(EngineError::MalformedRule {
                    origin: origin.clone(),
                    reason: "filter before the first premise".to_string(),
                });
            }
            Rule::Premise(premise, rest) => {
                return match unify_propositions(module, &premise, fact) {
                    Ok(subst) => {
                        trace!(rule = %origin, %premise, %fact, "premise_matched");
                        residual_walk(module, origin, binders, subst.apply_rule(&rest))
                    }
                    Err(err) if err.is_fatal() => Err(EngineError::Unify {
                        origin: origin.clone(),
                        source: err,
                    }),
                    Err(_) => Ok(Vec::new()),
                };
            }
            Rule::Conclusion(_) => {
                return Err(EngineError::MalformedRule {
                    origin: origin.clone(),
                    reason: "no premise to consume".to_string(),
                });
            }
        }
    }
}

/// Process the body after the first premise has been consumed.
fn residual_walk(
    module: &Module,
    origin: &str,
    mut binders: Vec<Quantifier>,
    rule: Rule,
) -> Result<Vec<Patch>, EngineError> {
    let mut clause = rule;
    loop {
        match clause {
            Rule::Quantify(q, rest) => {
                binders.push(q);
                clause = *rest;
            }
            Rule::Let(name, term, rest) => {
                let value = evaluate_term(module, &term)?;
                let mut subst = Substitution::new();
                subst.bind(name, value);
                clause = subst.apply_rule(&rest);
            }
            Rule::Filter(cond, rest) => {
                let value = evaluate_term(module, &cond)?;
                match value.as_bool() {
                    Some(true) => clause = *rest,
                    Some(false) => {
                        trace!(rule = %origin, condition = %cond, "filter_rejected");
                        return Ok(Vec::new());
                    }
                    None => {
                        return Err(EngineError::MalformedRule {
                            origin: origin.to_string(),
                            reason: format!(
                                "filter condition `{cond}` did not evaluate to a boolean"
                            ),
                        });
                    }
                }
            }
            Rule::Premise(premise, rest) => {
                // Defer matching the next premise to a later loop iteration,
                // carrying only the binders that still occur free.
                let residual = Rule::Premise(premise, rest);
                let free = residual.free_variables();
                let rebuilt = binders
                    .into_iter()
                    .rev()
                    .filter(|q| free.contains(&q.name))
                    .fold(residual, |acc, q| Rule::Quantify(q, Box::new(acc)));
                trace!(rule = %origin, residual = %rebuilt, "residual_deferred");
                return Ok(vec![Patch::Apply(PartialRule::new(origin, rebuilt))]);
            }
            Rule::Conclusion(prop) => {
                if !prop.is_ground() {
                    return Err(EngineError::MalformedRule {
                        origin: origin.to_string(),
                        reason: format!("conclusion `{prop}` is not ground after substitution"),
                    });
                }
                trace!(rule = %origin, conclusion = %prop, "conclusion_emitted");
                return Ok(vec![Patch::Conclusion(prop)]);
            }
        }
    }
}
