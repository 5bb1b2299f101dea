//! `PathTrial` — resumable best-first search within one domain.
//!
//! # Why resumable
//!
//! Dozens of searches share a bounded per-tick budget, and none of them may
//! monopolize a worker slot.  The trial therefore keeps its frontier and
//! visited map across calls: `advance` pops and expands at most
//! `cells_per_increment` nodes, then returns control.  Cancellation and
//! deadlines are the caller's concern, applied between increments.
//!
//! # Algorithm
//!
//! Classic best-first relaxation: score = accumulated cost + admissible
//! heuristic ([`Goal::heuristic`]).  Every registered capability expands
//! the popped node; overlapping proposals for one destination keep the
//! cheapest.  Stale heap entries (superseded by a better relaxation) are
//! skipped on pop, keyed by comparing the popped score against the node's
//! current best score.  Ties break on `Cell` order, so a re-run over the
//! same snapshot pops identically.
//!
//! # Pending terrain
//!
//! If any capability hit an unproduced chunk while expanding a node, every
//! proposal from that expansion is discarded, the node is pushed back with
//! its old score, and the trial reports [`TrialStep::AwaitingTerrain`].
//! Capabilities are pure, so re-expanding later is safe.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use trek_core::{Cell, Cost, ModeType, TrekError};
use trek_mode::{Mode, ModeProbe};
use trek_terrain::TerrainScope;

use crate::error::SearchResult;
use crate::goal::Goal;
use crate::path::{Path, Step};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Tunables for one trial.
#[derive(Clone, Debug)]
pub struct TrialConfig {
    /// Node expansions per `advance` call before yielding.
    pub cells_per_increment: usize,

    /// Hard ceiling on a path's accumulated cost; frontier nodes beyond it
    /// are discarded.  `None` = unbounded.
    pub max_cost: Option<Cost>,

    /// Safety net on total expansions, guarding against unbounded frontier
    /// growth on open terrain.  `None` = unbounded.
    pub max_expansions: Option<u64>,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            cells_per_increment: 200,
            max_cost:            None,
            max_expansions:      Some(500_000),
        }
    }
}

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// Terminal outcome of a trial.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TrialEnd {
    /// A goal-satisfying node was popped; [`PathTrial::take_path`] yields
    /// the route.
    Reached,
    /// The frontier emptied (or every remaining node exceeded the budget):
    /// no route exists within bounds.
    Exhausted,
    /// The caller requested cancellation — always distinct from
    /// exhaustion.
    Canceled,
}

/// Result of one `advance` call.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TrialStep {
    /// Budget consumed, more work remains.
    Continue,
    /// Blocked on a chunk the privileged thread has not produced yet.
    AwaitingTerrain,
    /// The trial reached a terminal state.
    Done(TrialEnd),
}

/// Counters exposed for diagnostics and budget verification.
#[derive(Copy, Clone, Default, Debug)]
pub struct TrialStats {
    /// Nodes expanded (popped and not stale).
    pub expanded: u64,
    /// Proposals accepted into the frontier.
    pub generated: u64,
    /// `advance` calls that did any work.
    pub increments: u64,
    /// Largest number of expansions inside a single increment.
    pub max_expansions_per_increment: u64,
}

// ── PathTrial ─────────────────────────────────────────────────────────────────

struct NodeRecord {
    g: Cost,
    parent: Option<Cell>,
    mode: ModeType,
    closed: bool,
}

/// A resumable best-first search from one origin toward a goal, inside one
/// domain.
pub struct PathTrial {
    origin: Cell,
    goal: Goal,
    config: TrialConfig,

    /// Min-heap over `(score, cell)`; `Cell` order breaks ties
    /// deterministically.
    frontier: BinaryHeap<Reverse<(Cost, Cell)>>,
    nodes: FxHashMap<Cell, NodeRecord>,

    end: Option<TrialEnd>,
    /// The goal-satisfying cell, once reached.
    reached: Option<Cell>,
    stats: TrialStats,
}

impl PathTrial {
    /// Set up a trial.  A cell goal must live in the origin's domain —
    /// cross-domain routing is the assembler's job, not this trial's.
    pub fn new(origin: Cell, goal: Goal, config: TrialConfig) -> SearchResult<Self> {
        if let Goal::Cell(target) = &goal {
            if target.domain != origin.domain {
                return Err(TrekError::DomainMismatch {
                    cell: *target,
                    expected: origin.domain,
                }
                .into());
            }
        }

        let mut trial = Self {
            origin,
            goal,
            config,
            frontier: BinaryHeap::new(),
            nodes: FxHashMap::default(),
            end: None,
            reached: None,
            stats: TrialStats::default(),
        };

        let h = trial.goal.heuristic(origin);
        trial.nodes.insert(
            origin,
            NodeRecord {
                g: Cost::ZERO,
                parent: None,
                mode: ModeType::Walk,
                closed: false,
            },
        );
        trial.frontier.push(Reverse((h, origin)));
        Ok(trial)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn origin(&self) -> Cell {
        self.origin
    }

    #[inline]
    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    #[inline]
    pub fn end(&self) -> Option<TrialEnd> {
        self.end
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.end.is_some()
    }

    #[inline]
    pub fn stats(&self) -> TrialStats {
        self.stats
    }

    /// Cost of the found route, while the trial state is still alive.
    pub fn reached_cost(&self) -> Option<Cost> {
        let cell = self.reached?;
        Some(self.nodes.get(&cell)?.g)
    }

    // ── Control ───────────────────────────────────────────────────────────

    /// Mark the trial canceled.  Idempotent; a finished trial keeps its
    /// original outcome.
    pub fn cancel(&mut self) {
        if self.end.is_none() {
            self.end = Some(TrialEnd::Canceled);
        }
    }

    /// Run one increment: expand up to `budget.min(cells_per_increment)`
    /// nodes, then yield.
    pub fn advance(
        &mut self,
        modes: &[Arc<dyn Mode>],
        terrain: &mut TerrainScope,
        probe: &mut dyn ModeProbe,
        budget: usize,
    ) -> TrialStep {
        if let Some(end) = self.end {
            return TrialStep::Done(end);
        }

        let budget = budget.min(self.config.cells_per_increment).max(1);
        let mut expanded_now: u64 = 0;
        self.stats.increments += 1;

        let step = loop {
            if expanded_now as usize >= budget {
                break TrialStep::Continue;
            }
            if let Some(cap) = self.config.max_expansions {
                if self.stats.expanded >= cap {
                    self.end = Some(TrialEnd::Exhausted);
                    break TrialStep::Done(TrialEnd::Exhausted);
                }
            }

            let Some(Reverse((score, cell))) = self.frontier.pop() else {
                self.end = Some(TrialEnd::Exhausted);
                break TrialStep::Done(TrialEnd::Exhausted);
            };

            // Skip entries superseded by a better relaxation, and nodes
            // already expanded.
            let current_score = {
                let record = &self.nodes[&cell];
                if record.closed {
                    continue;
                }
                record.g + self.goal.heuristic(cell)
            };
            if score != current_score {
                continue;
            }

            if self.goal.satisfied_by(cell) {
                self.reached = Some(cell);
                self.end = Some(TrialEnd::Reached);
                break TrialStep::Done(TrialEnd::Reached);
            }

            // ── Expand through every capability ───────────────────────────
            let mut options = Vec::new();
            for mode in modes {
                options.extend(mode.expand(cell, terrain, probe));
            }
            if terrain.take_pending_hit() {
                // The expansion saw an unproduced chunk: discard all of it,
                // requeue the node untouched, and yield.  Capabilities are
                // pure, so the retry is exact.
                self.frontier.push(Reverse((score, cell)));
                break TrialStep::AwaitingTerrain;
            }

            self.nodes.get_mut(&cell).unwrap().closed = true;
            expanded_now += 1;
            self.stats.expanded += 1;

            let g = self.nodes[&cell].g;
            for option in options {
                probe.accepted(cell, &option);
                debug_assert!(
                    option.cost > Cost::ZERO && option.cost.is_finite(),
                    "capability proposed a non-positive cost"
                );
                let tentative = g + option.cost;
                if let Some(max) = self.config.max_cost {
                    if tentative > max {
                        continue;
                    }
                }

                let improved = match self.nodes.get(&option.destination) {
                    Some(existing) => !existing.closed && tentative < existing.g,
                    None => true,
                };
                if improved {
                    self.nodes.insert(
                        option.destination,
                        NodeRecord {
                            g: tentative,
                            parent: Some(cell),
                            mode: option.mode,
                            closed: false,
                        },
                    );
                    let score = tentative + self.goal.heuristic(option.destination);
                    self.frontier.push(Reverse((score, option.destination)));
                    self.stats.generated += 1;
                }
            }
        };

        self.stats.max_expansions_per_increment =
            self.stats.max_expansions_per_increment.max(expanded_now);
        step
    }

    /// Reconstruct the found path.  `None` unless the trial ended
    /// [`TrialEnd::Reached`].
    pub fn take_path(&self) -> Option<Path> {
        let reached = self.reached?;
        let cost = self.nodes.get(&reached)?.g;

        let mut steps = Vec::new();
        let mut cursor = Some(reached);
        while let Some(cell) = cursor {
            let record = self.nodes.get(&cell)?;
            steps.push(Step {
                location: cell,
                mode: record.mode,
            });
            cursor = record.parent;
        }
        steps.reverse();
        Some(Path::new(steps, cost))
    }
}
