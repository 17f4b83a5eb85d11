//! # Patch Worklist
//!
//! Units of deferred work for the saturation loop, and the priority queue
//! that holds them. A [`Patch`] is either a freshly derived fact to learn or
//! a partial rule whose next premise should be matched against the database.
//!
//! The queue keeps patches ordered by a caller-supplied [`PatchOrder`]
//! (any total preorder is correct; the choice only affects performance and
//! intermediate queue size). Insertion is stable by priority. Popping skips
//! conclusion patches that the database already subsumes; apply patches are
//! never subsumed by facts alone.

use crate::ast::{Proposition, Rule};
use crate::database::Database;
use crate::lattice::LatticeError;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use tracing::trace;

/// A rule whose leading quantifications and premises have already been
/// discharged against the database, with the accumulated substitution baked
/// into the remaining body. `origin` names the module rule it descends from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialRule {
    pub origin: String,
    pub rule: Rule,
}

impl PartialRule {
    /// Create a partial rule descending from the named module rule.
    pub fn new(origin: impl Into<String>, rule: Rule) -> Self {
        PartialRule {
            origin: origin.into(),
            rule,
        }
    }
}

impl fmt::Display for PartialRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.origin, self.rule)
    }
}

/// A unit of deferred work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// A new fact has been derived; learn it.
    Conclusion(Proposition),
    /// A rule residual is live; try its next premise against current facts.
    Apply(PartialRule),
}

impl Patch {
    /// Check if this is a conclusion patch.
    pub fn is_conclusion(&self) -> bool {
        matches!(self, Patch::Conclusion(_))
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Patch::Conclusion(prop) => write!(f, "conclude {prop}"),
            Patch::Apply(partial) => write!(f, "apply {partial}"),
        }
    }
}

/// A total preorder on patches supplied by the caller.
pub type PatchOrder = fn(&Patch, &Patch) -> Ordering;

/// Stock patch orders.
pub mod patch_order {
    use super::Patch;
    use std::cmp::Ordering;

    /// The default: conclusion patches outrank apply patches, FIFO within a
    /// kind. Facts spread breadth-first before rule residuals re-scan.
    pub fn conclusions_first(a: &Patch, b: &Patch) -> Ordering {
        match (a, b) {
            (Patch::Conclusion(_), Patch::Apply(_)) => Ordering::Greater,
            (Patch::Apply(_), Patch::Conclusion(_)) => Ordering::Less,
            _ => Ordering::Equal,
        }
    }

    /// The trivial preorder: plain FIFO across all patches.
    pub fn fifo(_: &Patch, _: &Patch) -> Ordering {
        Ordering::Equal
    }
}

/// Priority-ordered worklist of patches.
#[derive(Debug, Clone)]
pub struct Queue {
    items: VecDeque<Patch>,
    order: PatchOrder,
}

impl Queue {
    /// An empty queue under the given patch order.
    pub fn new(order: PatchOrder) -> Self {
        Queue {
            items: VecDeque::new(),
            order,
        }
    }

    /// An empty queue under [`patch_order::conclusions_first`].
    pub fn with_default_order() -> Self {
        Queue::new(patch_order::conclusions_first)
    }

    /// Number of pending patches.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no patches are pending.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Splice a patch into priority order. Stable: the new patch lands after
    /// every pending patch of greater-or-equal priority.
    pub fn insert(&mut self, patch: Patch) {
        let position = self
            .items
            .iter()
            .position(|existing| (self.order)(&patch, existing) == Ordering::Greater);
        match position {
            Some(i) => self.items.insert(i, patch),
            None => self.items.push_back(patch),
        }
    }

    /// Remove the highest-priority patch, discarding conclusion patches the
    /// database already subsumes. `None` iff the queue drains.
    pub fn pop(&mut self, db: &Database) -> Result<Option<Patch>, LatticeError> {
        while let Some(patch) = self.items.pop_front() {
            if let Patch::Conclusion(prop) = &patch {
                if db.subsumes(prop)? {
                    trace!(%prop, "pop_skips_subsumed");
                    continue;
                }
            }
            return Ok(Some(patch));
        }
        Ok(None)
    }
}

impl Default for Queue {
    fn default() -> Self {
        Queue::with_default_order()
    }
}
