//! Search goals and their admissible heuristics.

use std::fmt;
use std::sync::Arc;

use trek_core::{Cell, Cost, DomainId};

/// What a search is trying to reach.
#[derive(Clone)]
pub enum Goal {
    /// An exact destination cell.
    Cell(Cell),
    /// Any cell of the named domain — satisfied the moment a link deposits
    /// the requester there.
    Domain(DomainId),
    /// An arbitrary predicate over cells.  No heuristic guidance: the
    /// search degrades to uniform-cost expansion.
    Predicate(Arc<dyn Fn(Cell) -> bool + Send + Sync>),
}

impl Goal {
    pub fn predicate<F>(f: F) -> Goal
    where
        F: Fn(Cell) -> bool + Send + Sync + 'static,
    {
        Goal::Predicate(Arc::new(f))
    }

    pub fn satisfied_by(&self, cell: Cell) -> bool {
        match self {
            Goal::Cell(target) => *target == cell,
            Goal::Domain(domain) => cell.domain == *domain,
            Goal::Predicate(f) => f(cell),
        }
    }

    /// Admissible estimate of the remaining cost from `from`.
    ///
    /// Straight-line distance for a cell goal (no step is cheaper than unit
    /// distance); zero for the others.
    pub fn heuristic(&self, from: Cell) -> Cost {
        match self {
            Goal::Cell(target) if target.domain == from.domain => {
                Cost::new(from.distance_to(*target))
            }
            _ => Cost::ZERO,
        }
    }

    /// The domain this goal pins down, if any.  A predicate goal may be
    /// satisfiable anywhere.
    pub fn domain(&self) -> Option<DomainId> {
        match self {
            Goal::Cell(target) => Some(target.domain),
            Goal::Domain(domain) => Some(*domain),
            Goal::Predicate(_) => None,
        }
    }

    /// `true` if a leg searched inside `domain` could possibly terminate
    /// this goal.
    pub fn reachable_within(&self, domain: DomainId) -> bool {
        match self.domain() {
            Some(d) => d == domain,
            None => true,
        }
    }
}

impl fmt::Debug for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Cell(target) => write!(f, "Goal::Cell({target})"),
            Goal::Domain(domain) => write!(f, "Goal::Domain({domain})"),
            Goal::Predicate(_) => f.write_str("Goal::Predicate(..)"),
        }
    }
}
