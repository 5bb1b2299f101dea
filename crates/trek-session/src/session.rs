//! `SearchSession` — one requester's search, from request to terminal state.
//!
//! # Lifecycle
//!
//! [`SessionBuilder::build`] performs initialization: it snapshots the
//! requester's capabilities, registers movement capabilities, and queries
//! every link source, leaving the session `Idle` and ready.  The dispatcher
//! then calls [`SearchSession::begin`] (`Idle → Running`) and drives
//! [`SearchSession::advance`] until a terminal state, which resolves the
//! result slot every [`SessionHandle`] clone shares.
//!
//! # Ownership
//!
//! Once submitted, the session itself belongs exclusively to the dispatcher;
//! callers hold only the handle.  Everything the handle touches — state,
//! stop flag, result slot — is the small thread-safe core shared between the
//! two, so neither side ever locks the other's working state.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use trek_core::{Capabilities, Cell, ModeSet, ModeType, SessionId, TrekError};
use trek_link::{LinkRegistry, LinkSource};
use trek_mode::{
    ClimbMode, DigMode, DoorMode, FlyMode, JumpMode, Mode, ModeProbe, MoveOption, SwimMode,
    WalkMode,
};
use trek_search::{
    Goal, Itinerary, ItineraryEnd, ItineraryNotice, ItineraryStep, ItineraryTrial,
    PathRecordManager, SearchError, SearchResult, TrialConfig,
};
use trek_terrain::TerrainScope;

use crate::context::EngineContext;
use crate::events::{EventSink, SearchEvent};
use crate::result::{Failure, SessionResult};
use crate::state::SessionState;

// ── Shared core ───────────────────────────────────────────────────────────────

/// The thread-safe core shared between a session and its handles.
struct Shared {
    state: AtomicU8,
    /// Cooperative cancellation flag, observed at increment boundaries.
    stop: AtomicBool,
    /// Resolved exactly once, at the terminal state.
    slot: Mutex<Option<SessionResult>>,
    ready: Condvar,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(SessionState::Idle.encode()),
            stop: AtomicBool::new(false),
            slot: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    fn state(&self) -> SessionState {
        SessionState::decode(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: SessionState) {
        self.state.store(state.encode(), Ordering::Release);
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn finish(&self, result: SessionResult) {
        let state = result.state;
        let mut slot = self.slot.lock().unwrap();
        debug_assert!(slot.is_none(), "session result resolved twice");
        *slot = Some(result);
        // State flips terminal only after the result is in place, so any
        // observer of a terminal state can immediately take the result.
        self.set_state(state);
        self.ready.notify_all();
    }

    fn wait(&self) -> SessionResult {
        let mut slot = self.slot.lock().unwrap();
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            slot = self.ready.wait(slot).unwrap();
        }
    }

    fn wait_timeout(&self, timeout: Duration) -> Option<SessionResult> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock().unwrap();
        loop {
            if let Some(result) = slot.as_ref() {
                return Some(result.clone());
            }
            let remaining = deadline.checked_duration_since(Instant::now())?;
            (slot, _) = self.ready.wait_timeout(slot, remaining).unwrap();
        }
    }

    fn try_result(&self) -> Option<SessionResult> {
        self.slot.lock().unwrap().clone()
    }
}

// ── SessionHandle ─────────────────────────────────────────────────────────────

/// The caller's view of a submitted session.
///
/// Cheap to clone and safe to share across threads; all clones observe the
/// same state and resolve to the same result.
#[derive(Clone)]
pub struct SessionHandle {
    id: SessionId,
    shared: Arc<Shared>,
}

impl SessionHandle {
    #[inline]
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Request cancellation.
    ///
    /// Moves a running session to `Canceling`; the session observes the
    /// request at its next yield point, within one increment's latency.
    /// Idempotent.  Returns `false` from a terminal state, where the
    /// request has no effect.
    pub fn stop(&self) -> bool {
        if self.shared.state().is_terminal() {
            return false;
        }
        self.shared.stop.store(true, Ordering::Release);
        let _ = self.shared.state.compare_exchange(
            SessionState::Running.encode(),
            SessionState::Canceling.encode(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        true
    }

    /// Block until the session reaches a terminal state.
    pub fn result(&self) -> SessionResult {
        self.shared.wait()
    }

    /// Block up to `timeout` for the terminal result.
    pub fn result_timeout(&self, timeout: Duration) -> Option<SessionResult> {
        self.shared.wait_timeout(timeout)
    }

    /// The terminal result, if already resolved.  Never blocks.
    pub fn try_result(&self) -> Option<SessionResult> {
        self.shared.try_result()
    }
}

// ── Event probe ───────────────────────────────────────────────────────────────

/// Adapts capability accept/reject callbacks onto the event stream.
struct EventProbe<'a> {
    session: SessionId,
    sink: &'a dyn EventSink,
}

impl ModeProbe for EventProbe<'_> {
    fn accepted(&mut self, origin: Cell, option: &MoveOption) {
        self.sink.accept(SearchEvent::StepAccepted {
            session: self.session,
            origin,
            destination: option.destination,
            mode: option.mode,
            cost: option.cost,
        });
    }

    fn rejected(&mut self, origin: Cell, candidate: Cell, mode: ModeType) {
        self.sink.accept(SearchEvent::StepRejected {
            session: self.session,
            origin,
            candidate,
            mode,
        });
    }
}

// ── SessionTick ───────────────────────────────────────────────────────────────

/// Outcome of one dispatcher-driven increment.
#[derive(Copy, Clone, Debug)]
pub enum SessionTick {
    /// Ran an increment; more work remains.
    Advanced { expanded: u64 },
    /// Blocked on terrain the privileged thread has not produced yet.
    Waiting,
    /// The session is in (or just reached) a terminal state.
    Finished(SessionState),
}

// ── SearchSession ─────────────────────────────────────────────────────────────

/// One requester's search.  Built by [`SessionBuilder`], driven by the
/// dispatcher.
pub struct SearchSession {
    id: SessionId,
    caps: Capabilities,
    goal: Goal,
    modes: Vec<Arc<dyn Mode>>,
    /// Consumed at `begin`, when the itinerary trial takes ownership.
    registry: Option<LinkRegistry>,
    allowed: ModeSet,
    records: Option<Arc<dyn PathRecordManager>>,
    trial_config: TrialConfig,
    max_links: usize,

    scope: TerrainScope,
    trial: Option<ItineraryTrial>,
    sink: Arc<dyn EventSink>,
    shared: Arc<Shared>,

    started: Option<Instant>,
    deadline: Option<Instant>,
    last_expanded: u64,
}

impl SearchSession {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    #[inline]
    pub fn origin(&self) -> Cell {
        self.caps.origin
    }

    #[inline]
    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    // ── Dispatcher interface ──────────────────────────────────────────────

    /// Move `Idle → Running` under dispatcher ownership.
    ///
    /// Assigns the session its identity, arms the deadline, and constructs
    /// the itinerary trial.  A goal that is unsatisfiable by construction —
    /// a domain-reachability goal naming the origin's own domain — ends the
    /// session `Errored` right here: that is caller misuse, logged and
    /// never retried, and must not masquerade as a failed search.
    pub fn begin(&mut self, id: SessionId, timeout: Option<Duration>) -> SessionHandle {
        debug_assert_eq!(
            self.shared.state(),
            SessionState::Idle,
            "begin on a non-idle session"
        );

        self.id = id;
        let now = Instant::now();
        self.started = Some(now);
        self.deadline = timeout.map(|t| now + t);
        self.shared.set_state(SessionState::Running);
        self.sink.accept(SearchEvent::SessionStarted {
            session: id,
            origin: self.caps.origin,
        });

        let registry = self.registry.take().unwrap_or_else(LinkRegistry::empty);
        match ItineraryTrial::new(
            self.caps.origin,
            self.goal.clone(),
            registry,
            self.allowed,
            self.records.clone(),
            self.trial_config.clone(),
            self.max_links,
        ) {
            Ok(trial) => self.trial = Some(trial),
            Err(err) => {
                log::error!("session {id}: rejected as a usage error: {err}");
                self.finish(SessionState::Errored, None, None);
            }
        }

        SessionHandle {
            id,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Run one increment of at most `budget` node expansions.
    ///
    /// Cancellation and the deadline are observed here, at the increment
    /// boundary, before any work; the trial itself never checks either.
    pub fn advance(&mut self, budget: usize) -> SessionTick {
        let state = self.shared.state();
        if state.is_terminal() {
            return SessionTick::Finished(state);
        }

        if self.shared.stop_requested() {
            if let Some(trial) = &mut self.trial {
                trial.cancel();
            }
            return self.finish(SessionState::Canceled, None, None);
        }

        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                // Expiry is soft: a route already in hand is still a
                // success — the deadline only cut refinement short.
                let best = self.trial.as_mut().and_then(ItineraryTrial::take_result);
                return match best {
                    Some(route) => self.finish(SessionState::Succeeded, None, Some(route)),
                    None => self.finish(SessionState::Failed, Some(Failure::TimedOut), None),
                };
            }
        }

        if self.trial.is_none() {
            debug_assert!(false, "running session without a trial");
            log::error!("session {}: lost its trial mid-run", self.id);
            return self.finish(SessionState::Errored, None, None);
        }

        // Bank any chunks the privileged thread produced since last time.
        self.scope.poll_waits();

        let step = {
            let trial = self.trial.as_mut().unwrap();
            let mut probe = EventProbe {
                session: self.id,
                sink: self.sink.as_ref(),
            };
            trial.advance(&self.modes, &mut self.scope, &mut probe, budget)
        };
        self.drain_notices();
        let expanded = self.take_expansion_delta();

        match step {
            ItineraryStep::Continue => SessionTick::Advanced { expanded },
            ItineraryStep::AwaitingTerrain => SessionTick::Waiting,
            ItineraryStep::Done(ItineraryEnd::Found) => {
                match self.trial.as_mut().and_then(ItineraryTrial::take_result) {
                    Some(route) => self.finish(SessionState::Succeeded, None, Some(route)),
                    None => {
                        debug_assert!(false, "found assembly without a result");
                        log::error!("session {}: assembly reported Found with no route", self.id);
                        self.finish(SessionState::Errored, None, None)
                    }
                }
            }
            ItineraryStep::Done(ItineraryEnd::Exhausted) => {
                self.finish(SessionState::Failed, Some(Failure::Exhausted), None)
            }
            ItineraryStep::Done(ItineraryEnd::Canceled) => {
                self.finish(SessionState::Canceled, None, None)
            }
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Rewind the deadline so expiry paths can be exercised directly.
    #[cfg(test)]
    pub(crate) fn set_deadline(&mut self, at: Instant) {
        self.deadline = Some(at);
    }

    fn drain_notices(&mut self) {
        let Some(trial) = &mut self.trial else { return };
        for notice in trial.take_notices() {
            let session = self.id;
            self.sink.accept(match notice {
                ItineraryNotice::LegStarted { origin } => {
                    SearchEvent::LegStarted { session, origin }
                }
                ItineraryNotice::LegEnded { origin, end } => {
                    SearchEvent::LegEnded { session, origin, end }
                }
                ItineraryNotice::Found(route) => SearchEvent::RouteFound { session, route },
                ItineraryNotice::Improved(route) => {
                    SearchEvent::BetterRouteFound { session, route }
                }
            });
        }
    }

    fn take_expansion_delta(&mut self) -> u64 {
        let total = self.trial.as_ref().map_or(self.last_expanded, ItineraryTrial::expanded);
        let delta = total - self.last_expanded;
        self.last_expanded = total;
        delta
    }

    /// Enter a terminal state: release per-search memory, resolve the
    /// result slot, and report the end on the event stream.
    fn finish(
        &mut self,
        state: SessionState,
        failure: Option<Failure>,
        itinerary: Option<Itinerary>,
    ) -> SessionTick {
        debug_assert!(state.is_terminal());
        let expanded = self.trial.as_ref().map_or(self.last_expanded, ItineraryTrial::expanded);
        let elapsed = self.started.map(|t| t.elapsed()).unwrap_or_default();

        self.scope.clear();
        self.trial = None;

        self.shared.finish(SessionResult {
            state,
            failure,
            itinerary,
            elapsed,
            expanded,
        });
        self.sink.accept(SearchEvent::SessionEnded {
            session: self.id,
            state,
        });
        SessionTick::Finished(state)
    }
}

// ── SessionBuilder ────────────────────────────────────────────────────────────

/// Fluent construction and initialization of a [`SearchSession`].
///
/// # Required inputs
///
/// - [`Capabilities`] — the requester snapshot, taken once here.
/// - [`Goal`] — what to reach.
/// - At least one movement capability ([`SessionBuilder::mode`] or
///   [`SessionBuilder::standard_modes`]).
///
/// # Example
///
/// ```rust,ignore
/// let ctx = EngineContext::new(store);
/// let session = SessionBuilder::new(caps, Goal::Cell(target))
///     .standard_modes()
///     .link_source(portals)
///     .build(&ctx)?;
/// let handle = dispatcher.search(session, Some(Duration::from_secs(30)));
/// ```
pub struct SessionBuilder {
    caps: Capabilities,
    goal: Goal,
    modes: Vec<Arc<dyn Mode>>,
    sources: Vec<Arc<dyn LinkSource>>,
    trial_config: TrialConfig,
    max_links: usize,
    max_local_chunks: usize,
}

impl SessionBuilder {
    pub fn new(caps: Capabilities, goal: Goal) -> Self {
        Self {
            caps,
            goal,
            modes: Vec::new(),
            sources: Vec::new(),
            trial_config: TrialConfig::default(),
            max_links: 8,
            max_local_chunks: 64,
        }
    }

    /// Register one movement capability.  Order is preserved; overlapping
    /// proposals are resolved by cost in the trial, not by order.
    pub fn mode(mut self, mode: Arc<dyn Mode>) -> Self {
        self.modes.push(mode);
        self
    }

    /// Register every built-in capability the requester is entitled to:
    /// common movement unconditionally, gated capabilities only where the
    /// snapshot grants them.
    pub fn standard_modes(mut self) -> Self {
        self.modes.push(Arc::new(WalkMode));
        self.modes.push(Arc::new(JumpMode));
        self.modes.push(Arc::new(SwimMode));
        self.modes.push(Arc::new(ClimbMode));
        if self.caps.opens_doors {
            self.modes.push(Arc::new(DoorMode));
        }
        if self.caps.can_fly {
            self.modes.push(Arc::new(FlyMode));
        }
        if self.caps.can_dig {
            self.modes.push(Arc::new(DigMode));
        }
        self
    }

    /// Register a provider of candidate links, queried once at `build`.
    pub fn link_source(mut self, source: Arc<dyn LinkSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn trial_config(mut self, config: TrialConfig) -> Self {
        self.trial_config = config;
        self
    }

    /// Cap on links per itinerary, bounding assembly depth.  Zero restricts
    /// the search to the origin's own domain.
    pub fn max_links(mut self, max_links: usize) -> Self {
        self.max_links = max_links;
        self
    }

    /// Bound on the per-search local chunk cache.
    pub fn max_local_chunks(mut self, max_local_chunks: usize) -> Self {
        self.max_local_chunks = max_local_chunks;
        self
    }

    /// Validate, query link sources, and initialize an `Idle` session.
    pub fn build(self, ctx: &EngineContext) -> SearchResult<SearchSession> {
        if self.modes.is_empty() {
            return Err(SearchError::NoModes);
        }
        if self.trial_config.cells_per_increment == 0 {
            return Err(TrekError::Config(
                "cells_per_increment must be non-zero".into(),
            )
            .into());
        }

        // Link discovery happens now, against the snapshot — a session never
        // sees permissions change mid-search.
        let registry = LinkRegistry::build(&self.sources, &self.caps);
        let allowed: ModeSet = self.modes.iter().map(|m| m.mode_type()).collect();

        Ok(SearchSession {
            id: SessionId::INVALID,
            caps: self.caps,
            goal: self.goal,
            modes: self.modes,
            registry: Some(registry),
            allowed,
            records: ctx.records().cloned(),
            trial_config: self.trial_config,
            max_links: self.max_links,
            scope: TerrainScope::new(Arc::clone(ctx.store()), self.max_local_chunks),
            trial: None,
            sink: Arc::clone(ctx.events()),
            shared: Arc::new(Shared::new()),
            started: None,
            deadline: None,
            last_expanded: 0,
        })
    }
}
