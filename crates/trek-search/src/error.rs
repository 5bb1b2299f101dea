//! Search-subsystem error type.
//!
//! These are *usage* errors — a caller asked for something impossible by
//! construction.  Search outcomes (no route, timeout, cancellation) are
//! never errors; they travel as terminal trial states.

use thiserror::Error;

use trek_core::{Cell, DomainId, TrekError};

#[derive(Debug, Error)]
pub enum SearchError {
    /// A domain-reachability goal naming the domain the origin already
    /// stands in.  The caller meant something else; failing the search
    /// would hide the bug.
    #[error("domain goal {goal} is already satisfied at origin {origin}")]
    GoalAlreadySatisfied { origin: Cell, goal: DomainId },

    /// A session was built with no movement capabilities at all.
    #[error("no movement capabilities registered")]
    NoModes,

    #[error(transparent)]
    Core(#[from] TrekError),
}

pub type SearchResult<T> = Result<T, SearchError>;
