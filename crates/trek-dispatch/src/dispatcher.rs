//! The cooperative, budgeted dispatcher.
//!
//! # Scheduling model
//!
//! One `tick` advances a bounded batch of sessions by one increment each,
//! round-robin, splitting a global cell-expansion budget evenly across the
//! batch.  Wall-clock progress is therefore roughly proportional to the
//! number of active sessions — an expensive search cannot starve cheap
//! ones, and the aggregate workload per tick is capped regardless of how
//! many sessions are registered.  The central cache is pruned once per
//! tick, here, so no separate timer is needed.
//!
//! Suspension points are exactly the increment boundaries inside the
//! sessions; nothing in this module blocks.
//!
//! With the `parallel` feature the batch advances on Rayon's pool.  Each
//! session exclusively owns its frontier and scope, so batch members never
//! share mutable state; results are folded back in submission order either
//! way, keeping tick reports deterministic.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use std::time::{Duration, Instant};

use trek_core::{SessionId, TrekError, TrekResult};
use trek_session::{EngineContext, SearchSession, SessionHandle, SessionTick};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Per-tick scheduling bounds.
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Sessions advanced per tick, at most.
    pub sessions_per_tick: usize,

    /// Global node-expansion budget per tick, split evenly across the
    /// batch.
    pub cells_per_tick: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            sessions_per_tick: 16,
            cells_per_tick:    2048,
        }
    }
}

// ── TickReport ────────────────────────────────────────────────────────────────

/// What one `tick` did, for diagnostics and tests.
#[derive(Copy, Clone, Default, Debug)]
pub struct TickReport {
    /// Sessions given an increment this tick.
    pub sessions: usize,
    /// Node expansions performed across the batch.
    pub expanded: u64,
    /// Batch members blocked on unproduced terrain.
    pub waiting: usize,
    /// Batch members that reached a terminal state and were retired.
    pub finished: usize,
    /// Cache entries dropped by the TTL prune.
    pub pruned: usize,
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Owns every submitted session and time-slices them across ticks.
///
/// The dispatcher itself has no thread; the host (or a
/// [`TickDriver`][crate::TickDriver]) calls [`Dispatcher::tick`] on
/// whatever cadence it runs its loop.  Callers interact with submitted
/// sessions only through their [`SessionHandle`]s.
pub struct Dispatcher {
    config: DispatchConfig,
    context: EngineContext,
    sessions: BTreeMap<SessionId, SearchSession>,
    next_id: u64,
    /// Round-robin resume point: the tick after this id runs first.
    cursor: SessionId,
}

impl Dispatcher {
    pub fn new(context: EngineContext, config: DispatchConfig) -> TrekResult<Self> {
        if config.sessions_per_tick == 0 {
            return Err(TrekError::Config("sessions_per_tick must be non-zero".into()));
        }
        if config.cells_per_tick == 0 {
            return Err(TrekError::Config("cells_per_tick must be non-zero".into()));
        }
        Ok(Self {
            config,
            context,
            sessions: BTreeMap::new(),
            next_id: 0,
            cursor: SessionId(0),
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Number of sessions currently registered (running or waiting).
    pub fn active(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_idle(&self) -> bool {
        self.sessions.is_empty()
    }

    // ── Submission ────────────────────────────────────────────────────────

    /// Take ownership of an initialized session and start it.
    ///
    /// The session moves `Idle → Running` immediately; its first increment
    /// runs on a subsequent tick.  A session that terminates during start —
    /// a goal unsatisfiable by construction — is never registered; its
    /// handle already holds the `Errored` result.
    pub fn search(
        &mut self,
        mut session: SearchSession,
        timeout: Option<Duration>,
    ) -> SessionHandle {
        let id = SessionId(self.next_id);
        self.next_id += 1;

        let handle = session.begin(id, timeout);
        if !handle.state().is_terminal() {
            self.sessions.insert(id, session);
        }
        handle
    }

    // ── The tick ──────────────────────────────────────────────────────────

    /// Prune the cache, then advance one round-robin batch.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport {
            pruned: self.context.store().prune(Instant::now()),
            ..TickReport::default()
        };
        if self.sessions.is_empty() {
            return report;
        }

        // Batch size is additionally capped by the cell budget so the even
        // split below never hands out zero-cell increments.
        let batch_len = self
            .config
            .sessions_per_tick
            .min(self.sessions.len())
            .min(self.config.cells_per_tick);

        let ids: Vec<SessionId> = self
            .sessions
            .range((Excluded(self.cursor), Unbounded))
            .map(|(id, _)| *id)
            .chain(self.sessions.range(..=self.cursor).map(|(id, _)| *id))
            .take(batch_len)
            .collect();
        self.cursor = *ids.last().unwrap();

        // The batch is lifted out of the registry so each session is
        // exclusively owned while it advances (a hard requirement for the
        // parallel path, and free for the serial one).
        let mut batch: Vec<(SessionId, SearchSession)> = ids
            .into_iter()
            .map(|id| {
                let session = self.sessions.remove(&id).unwrap();
                (id, session)
            })
            .collect();

        let per_session = (self.config.cells_per_tick / batch.len()).max(1);

        #[cfg(not(feature = "parallel"))]
        let ticks: Vec<SessionTick> = batch
            .iter_mut()
            .map(|(_, session)| session.advance(per_session))
            .collect();

        #[cfg(feature = "parallel")]
        let ticks: Vec<SessionTick> = {
            use rayon::prelude::*;
            batch
                .par_iter_mut()
                .map(|(_, session)| session.advance(per_session))
                .collect()
        };

        for ((id, session), tick) in batch.into_iter().zip(ticks) {
            report.sessions += 1;
            match tick {
                SessionTick::Finished(_) => report.finished += 1,
                SessionTick::Waiting => {
                    report.waiting += 1;
                    self.sessions.insert(id, session);
                }
                SessionTick::Advanced { expanded } => {
                    report.expanded += expanded;
                    self.sessions.insert(id, session);
                }
            }
        }
        report
    }
}
