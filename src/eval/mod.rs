//! # Term Evaluation
//!
//! Reduces terms to normal form by expanding built-in function applications
//! against the module's function table. Two entry points:
//!
//! - [`evaluate_term`] is strict: the input must be ground, and every
//!   application must reduce. Used on conclusions, lets, and filters.
//! - [`reduce_term`] is best-effort: applications blocked on variables are
//!   left in place. Used by unification when one side is not yet concrete.
//!
//! Implementations may return further applications (compound definitions);
//! both entry points re-reduce the result until a constructor term remains.

use crate::ast::{Proposition, Term};
use crate::module::Module;

/// Evaluation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// A variable reached a context that requires a concrete term.
    #[error("unbound variable `{0}` in a term required to be concrete")]
    UnboundVariable(String),

    /// A built-in referenced by the program has no registered implementation.
    #[error("no implementation registered for function `{0}`")]
    MissingFunction(String),
}

/// Reduce a ground term to normal form.
pub fn evaluate_term(module: &Module, term: &Term) -> Result<Term, EvalError> {
    match term {
        Term::Var { name, .. } => Err(EvalError::UnboundVariable(name.clone())),
        Term::Ctor { ctor, args, sort } => {
            let args = args
                .iter()
                .map(|a| evaluate_term(module, a))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Term::Ctor {
                ctor: *ctor,
                args,
                sort: sort.clone(),
            })
        }
        Term::App { function, args, .. } => {
            let args = args
                .iter()
                .map(|a| evaluate_term(module, a))
                .collect::<Result<Vec<_>, _>>()?;
            let def = module
                .function(function)
                .ok_or_else(|| EvalError::MissingFunction(function.clone()))?;
            let result = (def.implementation)(&args);
            evaluate_term(module, &result)
        }
    }
}

/// Reduce a proposition's argument to normal form.
pub fn evaluate_proposition(module: &Module, prop: &Proposition) -> Result<Proposition, EvalError> {
    Ok(Proposition {
        relation: prop.relation.clone(),
        arg: evaluate_term(module, &prop.arg)?,
    })
}

/// Best-effort reduction: expand every application whose arguments reduce to
/// concrete terms, leave variable-blocked applications in place.
///
/// Errors only when a fully concrete application names a function with no
/// implementation, which is a bug in the module rather than a matter of
/// pending bindings.
pub fn reduce_term(module: &Module, term: &Term) -> Result<Term, EvalError> {
    match term {
        Term::Var { .. } => Ok(term.clone()),
        Term::Ctor { ctor, args, sort } => {
            let args = args
                .iter()
                .map(|a| reduce_term(module, a))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Term::Ctor {
                ctor: *ctor,
                args,
                sort: sort.clone(),
            })
        }
        Term::App {
            function,
            args,
            sort,
        } => {
            let args = args
                .iter()
                .map(|a| reduce_term(module, a))
                .collect::<Result<Vec<_>, _>>()?;
            if args.iter().all(Term::is_concrete) {
                let def = module
                    .function(function)
                    .ok_or_else(|| EvalError::MissingFunction(function.clone()))?;
                let result = (def.implementation)(&args);
                reduce_term(module, &result)
            } else {
                Ok(Term::App {
                    function: function.clone(),
                    args,
                    sort: sort.clone(),
                })
            }
        }
    }
}
