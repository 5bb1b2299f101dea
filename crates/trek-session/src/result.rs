//! Terminal session results.

use std::time::Duration;

use trek_search::Itinerary;

use crate::state::SessionState;

/// Why a session ended [`SessionState::Failed`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Failure {
    /// Every branch dead-ended: no route exists within bounds.
    Exhausted,
    /// The deadline expired before any complete route was found.
    TimedOut,
}

/// The value a session's result slot resolves to at its terminal state.
#[derive(Clone, Debug)]
pub struct SessionResult {
    /// The terminal state: `Succeeded`, `Failed`, `Errored`, or `Canceled`.
    pub state: SessionState,

    /// Present exactly when `state` is `Failed`.
    pub failure: Option<Failure>,

    /// The best route found.  Present exactly when `state` is `Succeeded`.
    pub itinerary: Option<Itinerary>,

    /// Wall clock from search start to the terminal state.  Includes time
    /// spent parked between increments, not just time on a worker.
    pub elapsed: Duration,

    /// Total node expansions across every leg this session searched.
    pub expanded: u64,
}

impl SessionResult {
    #[inline]
    pub fn is_success(&self) -> bool {
        self.state == SessionState::Succeeded
    }
}
