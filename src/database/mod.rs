//! # Proposition Database
//!
//! An unordered collection of concrete propositions maintaining the
//! anti-chain invariant: no stored fact dominates another under the lattice
//! order. [`Database::insert`] enforces the invariant inductively - a new
//! fact is dropped if anything already stored subsumes it, and otherwise
//! evicts everything it subsumes.
//!
//! Insertion order is not observable; callers extract facts as an unordered
//! sequence.

use crate::ast::Proposition;
use crate::lattice::{dominates, LatticeError};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// The fact store produced by saturation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Database {
    props: Vec<Proposition>,
}

impl Database {
    /// An empty database.
    pub fn new() -> Self {
        Database::default()
    }

    /// All stored propositions, in unspecified order.
    pub fn propositions(&self) -> &[Proposition] {
        &self.props
    }

    /// Number of stored propositions.
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Check if the database is empty.
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Structural membership test.
    pub fn contains(&self, prop: &Proposition) -> bool {
        self.props.contains(prop)
    }

    /// Check if some stored fact dominates `prop` (including equality).
    pub fn subsumes(&self, prop: &Proposition) -> Result<bool, LatticeError> {
        for stored in &self.props {
            if dominates(stored, prop)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Insert a concrete proposition, maintaining the anti-chain.
    ///
    /// Returns `false` (database unchanged) when an existing fact dominates
    /// `prop`; ties count as domination. Otherwise every fact dominated by
    /// `prop` is evicted, `prop` is added, and `true` is returned.
    pub fn insert(&mut self, prop: Proposition) -> Result<bool, LatticeError> {
        if self.subsumes(&prop)? {
            trace!(%prop, "insert_subsumed");
            return Ok(false);
        }

        let mut kept = Vec::with_capacity(self.props.len() + 1);
        for stored in self.props.drain(..) {
            if dominates(&prop, &stored)? {
                trace!(evicted = %stored, by = %prop, "insert_evicts");
            } else {
                kept.push(stored);
            }
        }
        kept.push(prop);
        self.props = kept;
        Ok(true)
    }

    /// The facts currently eligible for premise matching.
    ///
    /// Returns everything; exists as a hook for a relation-indexed or
    /// recency filter, neither of which changes observable behavior.
    pub fn candidates(&self) -> &[Proposition] {
        &self.props
    }
}
