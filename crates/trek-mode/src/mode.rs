//! The `Mode` trait — the main extension point for movement capabilities.

use trek_core::{Cell, ModeType};
use trek_terrain::TerrainScope;

use crate::MoveOption;

/// A pluggable movement capability.
///
/// Given a cell, propose every neighbor this capability can reach in one
/// step, with its traversal cost.  Implementations must be side-effect-free
/// with respect to search state: for the same terrain snapshot, the same
/// origin always yields the same proposals, so a trial can safely re-expand
/// a node after yielding for a pending chunk.
///
/// # Accept / reject
///
/// Every candidate neighbor a capability *evaluates* is either accepted
/// (returned as a [`MoveOption`]) or rejected (reported through the
/// [`ModeProbe`]).  Rejection carries no cost and never blocks another
/// capability's proposal for the same neighbor.  A candidate whose terrain
/// is still pending is neither — the capability stays silent and the trial
/// retries the node later.
///
/// # Thread safety
///
/// Capabilities are registered once per session and shared with the
/// session's execution context, which may live on a worker pool, so
/// implementations must be `Send + Sync`.  Per-search state belongs in the
/// trial, never in the capability.
pub trait Mode: Send + Sync {
    /// The tag applied to steps this capability produces.
    fn mode_type(&self) -> ModeType;

    /// Propose reachable neighbors of `origin`.
    fn expand(
        &self,
        origin: Cell,
        terrain: &mut TerrainScope,
        probe: &mut dyn ModeProbe,
    ) -> Vec<MoveOption>;
}

/// Observer for candidate outcomes, feeding the diagnostic event stream.
///
/// Capabilities report rejections; the trial reports each accepted proposal
/// once per expansion.  The default implementations ignore everything, so
/// capabilities can be called with a [`NoopProbe`] when nobody is watching.
pub trait ModeProbe {
    fn accepted(&mut self, _origin: Cell, _option: &MoveOption) {}

    fn rejected(&mut self, _origin: Cell, _candidate: Cell, _mode: ModeType) {}
}

/// A [`ModeProbe`] that discards all reports.
pub struct NoopProbe;

impl ModeProbe for NoopProbe {}

// ── Shared geometry helpers ───────────────────────────────────────────────────
//
// All helpers answer `None` while a needed chunk is still pending; the
// caller then skips the candidate without accepting or rejecting it.

/// `true` if a body can occupy `cell` (no capability needed).
pub(crate) fn passable(terrain: &mut TerrainScope, cell: Cell) -> Option<bool> {
    Some(terrain.kind(cell)?.is_passable())
}

/// `true` if a two-cell-tall body standing at `feet` fits.
pub(crate) fn body_fits(terrain: &mut TerrainScope, feet: Cell) -> Option<bool> {
    Some(passable(terrain, feet)? && passable(terrain, feet.above())?)
}

/// `true` if the block under `feet` supports standing.
pub(crate) fn floored(terrain: &mut TerrainScope, feet: Cell) -> Option<bool> {
    Some(terrain.kind(feet.below())?.is_floor())
}
