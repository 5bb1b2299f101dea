//! Realized paths.

use std::fmt;
use std::sync::Arc;

use trek_core::{Cell, Cost, ModeSet, ModeType};
use trek_mode::{Mode, NoopProbe};
use trek_terrain::TerrainScope;

/// One vertex of a realized path: a location and the mode that reached it.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    pub location: Cell,
    /// How this step was entered.  The origin step has no incoming move;
    /// it carries [`ModeType::Walk`] by convention and is excluded from
    /// [`Path::mode_set`].
    pub mode: ModeType,
}

/// An ordered sequence of steps through one domain, plus its total cost.
///
/// Origin is the first step, destination the last.  The invalid sentinel
/// ([`Path::invalid`]) has no steps and infinite cost.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    steps: Vec<Step>,
    cost: Cost,
}

/// Outcome of re-checking a recorded path against current terrain.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Revalidation {
    /// Every step is still traversable by its mode.
    Valid,
    /// Some step is no longer traversable; discard the record.
    Invalid,
    /// A chunk needed for the check is still pending — try again after the
    /// next yield.
    Incomplete,
}

impl Path {
    /// Build from an already-ordered step sequence.  `steps` must be
    /// non-empty and `cost` finite for a real path.
    pub fn new(steps: Vec<Step>, cost: Cost) -> Self {
        debug_assert!(!steps.is_empty(), "a real path has at least its origin");
        debug_assert!(cost.is_finite(), "a real path has finite cost");
        Self { steps, cost }
    }

    /// The invalid sentinel: no steps, infinite cost.
    pub fn invalid() -> Self {
        Self {
            steps: Vec::new(),
            cost: Cost::INFINITE,
        }
    }

    /// A zero-cost path standing at `at` — the final leg of an itinerary
    /// whose last link already satisfied the goal.
    pub fn trivial(at: Cell) -> Self {
        Self {
            steps: vec![Step {
                location: at,
                mode: ModeType::Walk,
            }],
            cost: Cost::ZERO,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.steps.is_empty() && self.cost.is_finite()
    }

    pub fn origin(&self) -> Option<Cell> {
        self.steps.first().map(|s| s.location)
    }

    pub fn destination(&self) -> Option<Cell> {
        self.steps.last().map(|s| s.location)
    }

    #[inline]
    pub fn cost(&self) -> Cost {
        self.cost
    }

    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The modes used along this path, excluding the origin step's
    /// conventional tag.  This is the key recorded paths are filtered by.
    pub fn mode_set(&self) -> ModeSet {
        self.steps.iter().skip(1).map(|s| s.mode).collect()
    }

    /// Re-check every transition against current terrain.
    ///
    /// For each consecutive pair, the capability matching the step's mode
    /// must still propose that exact destination.  Used to decide whether a
    /// recorded path may be replayed instead of searched afresh.
    pub fn revalidate(
        &self,
        terrain: &mut TerrainScope,
        modes: &[Arc<dyn Mode>],
    ) -> Revalidation {
        for pair in self.steps.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let Some(mode) = modes.iter().find(|m| m.mode_type() == to.mode) else {
                // The mode that built this path is no longer registered.
                return Revalidation::Invalid;
            };

            let options = mode.expand(from.location, terrain, &mut NoopProbe);
            if terrain.take_pending_hit() {
                return Revalidation::Incomplete;
            }
            if !options.iter().any(|o| o.destination == to.location) {
                return Revalidation::Invalid;
            }
        }
        Revalidation::Valid
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.origin(), self.destination()) {
            (Some(a), Some(b)) => {
                write!(f, "path {a} → {b} ({} steps, cost {})", self.len(), self.cost)
            }
            _ => f.write_str("path <invalid>"),
        }
    }
}
