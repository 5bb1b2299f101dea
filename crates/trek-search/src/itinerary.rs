//! Cross-domain itinerary assembly.
//!
//! # Model
//!
//! An itinerary is a chain of path legs joined by links.  The assembler
//! explores the link graph best-first: every *branch* is an arrival state
//! (a cell plus the links taken to get there), and every *leg* is a
//! resumable [`PathTrial`] from a branch toward either the goal or the
//! origin of a further link.  Legs compete on an admissible lower bound —
//! accumulated cost plus straight-line estimate — so the cheapest-looking
//! continuation always runs next, and any leg whose bound reaches the best
//! complete itinerary's cost is pruned unrun.
//!
//! # Cost accounting
//!
//! Link costs live at itinerary level: a leg path's cost covers exactly its
//! own steps, and [`Itinerary::total_cost`] adds the links on top.  This
//! convention is applied uniformly and asserted in tests.
//!
//! # Reporting
//!
//! The first complete itinerary is surfaced as
//! [`ItineraryNotice::Found`] while exploration continues on branches that
//! could still beat it; each strict improvement surfaces as
//! [`ItineraryNotice::Improved`] — never a silent replacement, since the
//! consumer may already be walking the first route.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use trek_core::{Cell, Cost, ModeSet};
use trek_link::{Link, LinkRegistry};
use trek_mode::{Mode, ModeProbe};
use trek_terrain::TerrainScope;

use crate::error::{SearchError, SearchResult};
use crate::goal::Goal;
use crate::path::{Path, Revalidation};
use crate::record::{PathRecord, PathRecordManager};
use crate::trial::{PathTrial, TrialConfig, TrialEnd, TrialStep};

// ── Itinerary ─────────────────────────────────────────────────────────────────

/// A realized end-to-end route: path legs joined by links.
///
/// Every leg except the last carries the link taken after it; the final leg
/// ends at the goal.
#[derive(Clone, Debug)]
pub struct Itinerary {
    legs: Vec<(Path, Option<Link>)>,
}

impl Itinerary {
    fn new(legs: Vec<(Path, Option<Link>)>) -> Self {
        debug_assert!(!legs.is_empty());
        debug_assert!(legs.last().is_some_and(|(_, link)| link.is_none()));
        Self { legs }
    }

    #[inline]
    pub fn legs(&self) -> &[(Path, Option<Link>)] {
        &self.legs
    }

    pub fn origin(&self) -> Option<Cell> {
        self.legs.first().and_then(|(path, _)| path.origin())
    }

    pub fn destination(&self) -> Option<Cell> {
        self.legs.last().and_then(|(path, _)| path.destination())
    }

    /// Number of links taken.
    pub fn link_count(&self) -> usize {
        self.legs.iter().filter(|(_, link)| link.is_some()).count()
    }

    /// Sum of every leg's path cost plus every link's fixed cost.
    pub fn total_cost(&self) -> Cost {
        self.legs
            .iter()
            .map(|(path, link)| {
                path.cost() + link.as_ref().map_or(Cost::ZERO, |l| l.cost)
            })
            .sum()
    }
}

// ── Outcomes & notices ────────────────────────────────────────────────────────

/// Terminal outcome of an assembly.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ItineraryEnd {
    /// At least one complete itinerary exists; the best one is held in
    /// [`ItineraryTrial::take_result`].
    Found,
    /// Every branch dead-ended: no route within bounds.
    Exhausted,
    /// Canceled by the caller.
    Canceled,
}

/// Result of one `advance` call.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ItineraryStep {
    Continue,
    AwaitingTerrain,
    Done(ItineraryEnd),
}

/// Progress surfaced while the assembly keeps running, drained by the
/// session for the diagnostic event stream.
#[derive(Clone, Debug)]
pub enum ItineraryNotice {
    /// A leg search ran its first increment.
    LegStarted { origin: Cell },
    /// A leg search reached a terminal state.
    LegEnded { origin: Cell, end: TrialEnd },
    /// The first complete itinerary.
    Found(Itinerary),
    /// A strictly cheaper itinerary superseding the previously reported one.
    Improved(Itinerary),
}

// ── Internal structure ────────────────────────────────────────────────────────

struct ParentEdge {
    branch: usize,
    link_idx: usize,
    leg_path: Path,
}

/// An arrival state in the link graph.
struct Branch {
    at: Cell,
    /// Accumulated cost: every leg path and link up to `at`.
    cost: Cost,
    parent: Option<ParentEdge>,
}

enum LegTarget {
    Goal,
    Link(usize),
}

enum LegWork {
    /// A recorded path waiting for revalidation against live terrain.
    Replay(Path),
    Search(PathTrial),
}

struct Leg {
    branch: usize,
    target: LegTarget,
    work: LegWork,
    bound: Cost,
    dead: bool,
    /// Whether a `LegStarted` notice has been emitted.
    started: bool,
}

// ── ItineraryTrial ────────────────────────────────────────────────────────────

/// Best-first assembly of [`PathTrial`]s across links.
pub struct ItineraryTrial {
    goal: Goal,
    registry: LinkRegistry,
    records: Option<Arc<dyn PathRecordManager>>,
    allowed: ModeSet,
    trial_config: TrialConfig,
    /// Hard cap on links per itinerary, bounding branch depth.
    max_links: usize,

    branches: Vec<Branch>,
    legs: Vec<Leg>,
    /// Min-heap over `(bound, leg index)` — cheapest continuation first.
    work: BinaryHeap<Reverse<(Cost, usize)>>,

    best: Option<Itinerary>,
    best_cost: Cost,
    notices: Vec<ItineraryNotice>,
    end: Option<ItineraryEnd>,
}

impl ItineraryTrial {
    /// Set up an assembly from `origin` toward `goal`.
    ///
    /// A domain-reachability goal naming the origin's own domain is a usage
    /// error: the caller is already there, and failing the search instead
    /// would mask the bug.
    pub fn new(
        origin: Cell,
        goal: Goal,
        registry: LinkRegistry,
        allowed: ModeSet,
        records: Option<Arc<dyn PathRecordManager>>,
        trial_config: TrialConfig,
        max_links: usize,
    ) -> SearchResult<Self> {
        if let Goal::Domain(domain) = goal {
            if domain == origin.domain {
                return Err(SearchError::GoalAlreadySatisfied {
                    origin,
                    goal: domain,
                });
            }
        }

        let mut trial = Self {
            goal,
            registry,
            records,
            allowed,
            trial_config,
            max_links,
            branches: vec![Branch {
                at: origin,
                cost: Cost::ZERO,
                parent: None,
            }],
            legs: Vec::new(),
            work: BinaryHeap::new(),
            best: None,
            best_cost: Cost::INFINITE,
            notices: Vec::new(),
            end: None,
        };
        trial.spawn_legs(0);
        Ok(trial)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn end(&self) -> Option<ItineraryEnd> {
        self.end
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.end.is_some()
    }

    /// The best complete itinerary found so far.
    pub fn take_result(&mut self) -> Option<Itinerary> {
        self.best.take()
    }

    pub fn best_cost(&self) -> Option<Cost> {
        self.best.as_ref().map(|_| self.best_cost)
    }

    /// Drain route discoveries accumulated since the last call.
    pub fn take_notices(&mut self) -> Vec<ItineraryNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Total node expansions across every leg searched so far.  The
    /// dispatcher reads this to account sessions against its global
    /// per-tick budget.
    pub fn expanded(&self) -> u64 {
        self.legs
            .iter()
            .map(|leg| match &leg.work {
                LegWork::Search(trial) => trial.stats().expanded,
                LegWork::Replay(_) => 0,
            })
            .sum()
    }

    // ── Control ───────────────────────────────────────────────────────────

    /// Mark the assembly canceled.  Idempotent.
    pub fn cancel(&mut self) {
        if self.end.is_none() {
            self.end = Some(ItineraryEnd::Canceled);
        }
    }

    /// Run one increment of the most promising unfinished leg.
    pub fn advance(
        &mut self,
        modes: &[Arc<dyn Mode>],
        terrain: &mut TerrainScope,
        probe: &mut dyn ModeProbe,
        budget: usize,
    ) -> ItineraryStep {
        if let Some(end) = self.end {
            return ItineraryStep::Done(end);
        }

        // ── Pick the cheapest live leg ────────────────────────────────────
        let (bound, idx) = loop {
            let Some(&Reverse((bound, idx))) = self.work.peek() else {
                let end = match self.best {
                    Some(_) => ItineraryEnd::Found,
                    None => ItineraryEnd::Exhausted,
                };
                self.end = Some(end);
                return ItineraryStep::Done(end);
            };
            if self.best.is_some() && bound >= self.best_cost {
                // The heap is bound-ordered: everything left is dominated
                // by the best complete itinerary.
                self.end = Some(ItineraryEnd::Found);
                return ItineraryStep::Done(ItineraryEnd::Found);
            }
            self.work.pop();
            if !self.legs[idx].dead {
                break (bound, idx);
            }
        };

        if !self.legs[idx].started {
            self.legs[idx].started = true;
            let origin = self.branches[self.legs[idx].branch].at;
            self.notices.push(ItineraryNotice::LegStarted { origin });
        }

        // ── Run it (narrow borrow, decide afterwards) ─────────────────────
        enum LegOutcome {
            Yield(ItineraryStep),
            Completed(Path),
            Rebuild,
            Dead,
        }

        let outcome = match &mut self.legs[idx].work {
            LegWork::Replay(path) => match path.revalidate(terrain, modes) {
                Revalidation::Valid => LegOutcome::Completed(path.clone()),
                Revalidation::Incomplete => LegOutcome::Yield(ItineraryStep::AwaitingTerrain),
                Revalidation::Invalid => LegOutcome::Rebuild,
            },
            LegWork::Search(trial) => match trial.advance(modes, terrain, probe, budget) {
                TrialStep::Continue => LegOutcome::Yield(ItineraryStep::Continue),
                TrialStep::AwaitingTerrain => {
                    LegOutcome::Yield(ItineraryStep::AwaitingTerrain)
                }
                TrialStep::Done(TrialEnd::Reached) => match trial.take_path() {
                    Some(path) => LegOutcome::Completed(path),
                    None => {
                        debug_assert!(false, "reached trial must yield a path");
                        LegOutcome::Dead
                    }
                },
                TrialStep::Done(TrialEnd::Exhausted | TrialEnd::Canceled) => LegOutcome::Dead,
            },
        };

        match outcome {
            LegOutcome::Yield(step) => {
                self.work.push(Reverse((bound, idx)));
                step
            }
            LegOutcome::Dead => {
                self.legs[idx].dead = true;
                let origin = self.branches[self.legs[idx].branch].at;
                self.notices.push(ItineraryNotice::LegEnded {
                    origin,
                    end: TrialEnd::Exhausted,
                });
                ItineraryStep::Continue
            }
            LegOutcome::Rebuild => {
                // A recorded path no longer survives the world; search
                // afresh under the same bound.
                let origin = self.branches[self.legs[idx].branch].at;
                let leg_goal = self.leg_goal(&self.legs[idx].target);
                match PathTrial::new(origin, leg_goal, self.trial_config.clone()) {
                    Ok(fresh) => {
                        self.legs[idx].work = LegWork::Search(fresh);
                        self.work.push(Reverse((bound, idx)));
                    }
                    Err(err) => {
                        debug_assert!(false, "leg trial rebuild failed: {err}");
                        log::error!("leg trial rebuild failed: {err}");
                        self.legs[idx].dead = true;
                    }
                }
                ItineraryStep::Continue
            }
            LegOutcome::Completed(path) => {
                self.legs[idx].dead = true;
                let origin = self.branches[self.legs[idx].branch].at;
                self.notices.push(ItineraryNotice::LegEnded {
                    origin,
                    end: TrialEnd::Reached,
                });
                if let Some(records) = self.records.clone() {
                    self.store_record(idx, &path, records);
                }
                self.complete_leg(idx, path);
                ItineraryStep::Continue
            }
        }
    }

    // ── Leg lifecycle ─────────────────────────────────────────────────────

    /// Create the outgoing legs of a branch: one toward the goal (when the
    /// goal can terminate in this domain) and one per unused candidate
    /// link.
    fn spawn_legs(&mut self, branch_idx: usize) {
        let at = self.branches[branch_idx].at;
        let base = self.branches[branch_idx].cost;

        // A domain goal is satisfied by arrival, never by a leg.
        let goal_leg = !matches!(self.goal, Goal::Domain(_))
            && self.goal.reachable_within(at.domain);
        if goal_leg {
            let bound = base + self.goal.heuristic(at);
            self.push_leg(branch_idx, LegTarget::Goal, bound);
        }

        if self.link_depth(branch_idx) < self.max_links {
            for link_idx in self.registry.candidates_from(at) {
                if self.link_used(branch_idx, link_idx) {
                    continue;
                }
                let link = self.registry.get(link_idx);
                let bound =
                    base + Cost::new(at.distance_to(link.origin)) + link.cost;
                self.push_leg(branch_idx, LegTarget::Link(link_idx), bound);
            }
        }
    }

    fn push_leg(&mut self, branch_idx: usize, target: LegTarget, bound: Cost) {
        let at = self.branches[branch_idx].at;
        let leg_goal = self.leg_goal(&target);

        // A recorded path may stand in for the search, pending
        // revalidation against live terrain.
        let replay = match (&self.records, &leg_goal) {
            (Some(records), Goal::Cell(dest)) => records.lookup(at, *dest, self.allowed),
            _ => None,
        };

        let work = match replay {
            Some(path) => LegWork::Replay(path),
            None => match PathTrial::new(at, leg_goal, self.trial_config.clone()) {
                Ok(trial) => LegWork::Search(trial),
                Err(err) => {
                    // Leg targets are same-domain by construction.
                    debug_assert!(false, "leg trial construction failed: {err}");
                    log::error!("leg trial construction failed: {err}");
                    return;
                }
            },
        };

        let idx = self.legs.len();
        self.legs.push(Leg {
            branch: branch_idx,
            target,
            work,
            bound,
            dead: false,
            started: false,
        });
        self.work.push(Reverse((bound, idx)));
    }

    fn leg_goal(&self, target: &LegTarget) -> Goal {
        match target {
            LegTarget::Goal => self.goal.clone(),
            LegTarget::Link(idx) => Goal::Cell(self.registry.get(*idx).origin),
        }
    }

    /// A leg finished with `path`; fold it into the branch structure.
    fn complete_leg(&mut self, idx: usize, path: Path) {
        let branch_idx = self.legs[idx].branch;
        let base = self.branches[branch_idx].cost;

        match self.legs[idx].target {
            LegTarget::Goal => {
                let total = base + path.cost();
                self.offer(branch_idx, path, total);
            }
            LegTarget::Link(link_idx) => {
                let link = self.registry.get(link_idx).clone();
                let arrival = link.destination;
                let cost = base + path.cost() + link.cost;
                if self.best.is_some() && cost >= self.best_cost {
                    return; // dominated before it even lands
                }

                let new_branch = self.branches.len();
                self.branches.push(Branch {
                    at: arrival,
                    cost,
                    parent: Some(ParentEdge {
                        branch: branch_idx,
                        link_idx,
                        leg_path: path,
                    }),
                });

                if self.goal.satisfied_by(arrival) {
                    self.offer(new_branch, Path::trivial(arrival), cost);
                } else {
                    self.spawn_legs(new_branch);
                }
            }
        }
    }

    /// Consider a complete itinerary ending at `branch` with `final_path`.
    fn offer(&mut self, branch: usize, final_path: Path, total: Cost) {
        if total >= self.best_cost {
            return;
        }
        let itinerary = self.assemble(branch, final_path);
        debug_assert!(
            (itinerary.total_cost().0 - total.0).abs() < 1e-9,
            "leg/link accounting drifted"
        );

        let first = self.best.is_none();
        self.best_cost = total;
        self.best = Some(itinerary.clone());
        self.notices.push(if first {
            ItineraryNotice::Found(itinerary)
        } else {
            ItineraryNotice::Improved(itinerary)
        });
    }

    fn assemble(&self, branch: usize, final_path: Path) -> Itinerary {
        let mut legs = vec![(final_path, None)];
        let mut cursor = branch;
        while let Some(edge) = &self.branches[cursor].parent {
            legs.push((
                edge.leg_path.clone(),
                Some(self.registry.get(edge.link_idx).clone()),
            ));
            cursor = edge.branch;
        }
        legs.reverse();
        Itinerary::new(legs)
    }

    fn store_record(&self, idx: usize, path: &Path, records: Arc<dyn PathRecordManager>) {
        // Only fixed-destination legs are reusable as records.
        if let (Some(origin), Some(destination)) = (path.origin(), path.destination()) {
            if matches!(self.leg_goal(&self.legs[idx].target), Goal::Cell(_)) {
                records.record(&PathRecord {
                    origin,
                    destination,
                    modes: path.mode_set(),
                    path: path.clone(),
                });
            }
        }
    }

    // ── Branch ancestry ───────────────────────────────────────────────────

    fn link_depth(&self, mut branch: usize) -> usize {
        let mut depth = 0;
        while let Some(edge) = &self.branches[branch].parent {
            depth += 1;
            branch = edge.branch;
        }
        depth
    }

    fn link_used(&self, mut branch: usize, link_idx: usize) -> bool {
        while let Some(edge) = &self.branches[branch].parent {
            if edge.link_idx == link_idx {
                return true;
            }
            branch = edge.branch;
        }
        false
    }
}
