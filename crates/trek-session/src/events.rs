//! The diagnostic event stream.
//!
//! Everything a session does that tooling might want to see — capability
//! accepts and rejects, leg starts and ends, routes found — flows through an
//! [`EventSink`] as fire-and-forget values.  A sink must never block and
//! never fail the search: an unconsumed stream is simply discarded.
//! Animation pacing, particle rendering, and any other presentation concern
//! belong entirely to the consumer.

use std::sync::mpsc;

use trek_core::{Cell, Cost, ModeType, SessionId};
use trek_search::{Itinerary, TrialEnd};

use crate::state::SessionState;

/// One observable moment in a session's life.
///
/// Events carry enough payload to drive tooling without a follow-up query;
/// the step-level variants are hot (one per evaluated candidate), so sinks
/// on the receiving end of a busy engine should expect volume.
#[derive(Clone, Debug)]
pub enum SearchEvent {
    /// The session moved Idle → Running.
    SessionStarted { session: SessionId, origin: Cell },
    /// The session reached a terminal state.
    SessionEnded { session: SessionId, state: SessionState },

    /// A path leg ran its first increment.
    LegStarted { session: SessionId, origin: Cell },
    /// A path leg reached a terminal state.
    LegEnded {
        session: SessionId,
        origin: Cell,
        end: TrialEnd,
    },

    /// A capability proposed this transition during node expansion.
    StepAccepted {
        session: SessionId,
        origin: Cell,
        destination: Cell,
        mode: ModeType,
        cost: Cost,
    },
    /// A capability evaluated and rejected this candidate.
    StepRejected {
        session: SessionId,
        origin: Cell,
        candidate: Cell,
        mode: ModeType,
    },

    /// The first complete itinerary.  The session keeps refining; the
    /// terminal result carries whatever the best route ends up being.
    RouteFound { session: SessionId, route: Itinerary },
    /// A strictly cheaper itinerary superseding the previously reported
    /// one.  Surfaced as its own event because the consumer may already be
    /// acting on the first route.
    BetterRouteFound { session: SessionId, route: Itinerary },
}

/// Receiver of [`SearchEvent`]s.
///
/// Implementations must return promptly and must not panic — the engine
/// calls them from inside search increments.  `&self` because one sink is
/// shared across every session of an engine.
pub trait EventSink: Send + Sync {
    fn accept(&self, event: SearchEvent);
}

/// An [`EventSink`] that discards everything.  The default.
pub struct NoopSink;

impl EventSink for NoopSink {
    fn accept(&self, _event: SearchEvent) {}
}

// ── ChannelSink ───────────────────────────────────────────────────────────────

/// An [`EventSink`] that forwards onto an unbounded channel.
///
/// `send` on an unbounded channel never blocks, and a hung-up receiver is
/// silently tolerated — a consumer that stops listening must not take the
/// engine down with it.
pub struct ChannelSink {
    tx: mpsc::Sender<SearchEvent>,
}

impl ChannelSink {
    /// The sink and the receiving end for the consumer to drain.
    pub fn new() -> (Self, mpsc::Receiver<SearchEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn accept(&self, event: SearchEvent) {
        let _ = self.tx.send(event);
    }
}
