//! The session state machine.

use std::fmt;

/// Lifecycle state of one search session.
///
/// ```text
/// Idle ──▶ Running ──▶ Succeeded | Failed | Errored
///             │   ▲
///             ▼   │ (observed at the next yield point)
///          Canceling ──▶ Canceled
/// ```
///
/// Terminal states are sticky: once entered, nothing moves a session out of
/// them and the result slot holds its final [`SessionResult`][crate::SessionResult].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SessionState {
    /// Built and initialized, not yet handed to the dispatcher.
    Idle,
    /// Owned by the dispatcher, advancing between yields.
    Running,
    /// A stop was requested; the session will observe it at its next yield
    /// point, within one increment's latency.
    Canceling,
    /// Terminal: a route was found; the result carries the itinerary.
    Succeeded,
    /// Terminal: no route within bounds, or the deadline expired first.
    /// Never an error — exhaustion is an expected outcome.
    Failed,
    /// Terminal: caller misuse or an internal invariant break.  Logged,
    /// never retried.
    Errored,
    /// Terminal: the caller's stop request was observed.  Always
    /// distinguishable from [`SessionState::Failed`].
    Canceled,
}

impl SessionState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Succeeded
                | SessionState::Failed
                | SessionState::Errored
                | SessionState::Canceled
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle      => "idle",
            SessionState::Running   => "running",
            SessionState::Canceling => "canceling",
            SessionState::Succeeded => "succeeded",
            SessionState::Failed    => "failed",
            SessionState::Errored   => "errored",
            SessionState::Canceled  => "canceled",
        }
    }

    /// Atomic-cell encoding.  Round-trips through [`SessionState::decode`].
    pub(crate) const fn encode(self) -> u8 {
        match self {
            SessionState::Idle      => 0,
            SessionState::Running   => 1,
            SessionState::Canceling => 2,
            SessionState::Succeeded => 3,
            SessionState::Failed    => 4,
            SessionState::Errored   => 5,
            SessionState::Canceled  => 6,
        }
    }

    pub(crate) const fn decode(raw: u8) -> SessionState {
        match raw {
            0 => SessionState::Idle,
            1 => SessionState::Running,
            2 => SessionState::Canceling,
            3 => SessionState::Succeeded,
            4 => SessionState::Failed,
            5 => SessionState::Errored,
            _ => SessionState::Canceled,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
