//! # Latlog Deductive Engine
//!
//! A Datalog-style deductive engine over a lattice-ordered term algebra.
//! Given axioms (ground propositions) and inference rules (Horn clauses with
//! universally quantified variables, premises, let-bindings, and filter
//! conditions), the engine computes the least fixpoint of the rules applied
//! to the axioms: a database of derived propositions closed under
//! subsumption with respect to a partial order on terms.
//!
//! ## Pipeline Architecture
//!
//! ```text
//! Module (relations, functions, rules, axioms, fixpoint specs)
//!     ↓
//! [Validation]          → configuration errors reported up front
//!     ↓
//! [Normalization]       → α-renamed, quantifier-hoisted rules
//!     ↓
//! [Seeding]             → one conclusion patch per initial fact / axiom
//!     ↓
//! [Saturation loop]     → pop patch → learn → enqueue children
//!     ↓                    (unification, evaluation, anti-chain insert)
//! Database
//! ```
//!
//! A stronger fact *subsumes* a weaker one: the database keeps only the
//! maximal facts of each relation under the lattice order, and a derived
//! fact that is already dominated produces no further work. Saturation ends
//! when the worklist drains (a true least fixpoint) or when the gas budget
//! runs out (a bounded-effort approximation, never an error).
//!
//! ## Usage
//!
//! ```rust
//! use latlog::ast::builders::{nat, prop, suc, var, RuleBuilder};
//! use latlog::ast::Sort;
//! use latlog::engine::generate;
//! use latlog::module::ModuleBuilder;
//! use latlog::Database;
//!
//! // q(0) and the successor rule: q(n) |- q(suc n).
//! let module = ModuleBuilder::new()
//!     .relation("q", Sort::Nat)
//!     .rule(
//!         "step",
//!         RuleBuilder::new()
//!             .forall("n", Sort::Nat)
//!             .premise("q", var("n", Sort::Nat))
//!             .conclude("q", suc(var("n", Sort::Nat))),
//!     )
//!     .axiom("base", prop("q", nat(0)))
//!     .fixpoint_spec("main", ["base"], ["step"])
//!     .build();
//!
//! let outcome = generate(&module, "main", Database::new(), 5).unwrap();
//! // Each new fact dominates its predecessor, so one maximal fact remains.
//! assert_eq!(outcome.database.len(), 1);
//! assert!(!outcome.saturated);
//! ```
//!
//! ## Module Organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `ast` | Sorts, terms, propositions, rules, builders |
//! | `module` | Elaborated input catalog + up-front validation |
//! | `eval` | Strict evaluation and best-effort reduction |
//! | `unify` | Substitution and unification with occurs check |
//! | `lattice` | Partial order driving subsumption |
//! | `normalize` | α-renaming and quantifier hoisting |
//! | `database` | Anti-chain fact store |
//! | `queue` | Patch worklist with subsumption-skipping pop |
//! | `engine` | The semi-naive saturation loop |
//! | `config` | Hierarchical engine/logging configuration |
//! | `logging` | Tracing subscriber setup |

// Term algebra and rule syntax
pub mod ast;

// Module catalog and validation
pub mod module;

// Core machinery, leaves first
pub mod eval;
pub mod lattice;
pub mod normalize;
pub mod unify;

// Fact store and worklist
pub mod database;
pub mod queue;

// The saturation loop
pub mod engine;

// Configuration and logging
pub mod config;
pub mod logging;

// Re-export the types most callers touch
pub use crate::ast::{Axiom, Ctor, Proposition, Quantifier, Rule, Sort, Term, TupleOrdering};
pub use crate::config::{EngineConfig, EngineSettings, LoggingConfig, QueueStrategy};
pub use crate::database::Database;
pub use crate::engine::{generate, generate_with_order, saturate, EngineError, FixpointOutcome};
pub use crate::module::{
    FixpointSpec, FunctionDef, Module, ModuleBuilder, ValidationError, Violation, ViolationKind,
};
pub use crate::queue::{Patch, PartialRule, PatchOrder, Queue};
