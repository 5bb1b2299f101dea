//! Step-ups and bounded drops.

use trek_core::{Cell, Cost, ModeType};
use trek_terrain::TerrainScope;

use crate::mode::{Mode, ModeProbe, body_fits, floored, passable};
use crate::MoveOption;

/// Cost of a one-block step-up.
const STEP_UP: f64 = 2.0;
/// Cost of a drop, per block fallen, on top of the horizontal step.
const DROP_PER_BLOCK: f64 = 0.5;
/// Deepest drop this capability will propose.
const MAX_DROP: i32 = 3;

/// One-block step-ups onto adjacent higher ground, and controlled drops of
/// up to [`MAX_DROP`] blocks off adjacent edges.
pub struct JumpMode;

impl Mode for JumpMode {
    fn mode_type(&self) -> ModeType {
        ModeType::Jump
    }

    fn expand(
        &self,
        origin: Cell,
        terrain: &mut TerrainScope,
        probe: &mut dyn ModeProbe,
    ) -> Vec<MoveOption> {
        let mut out = Vec::new();

        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            // ── Step-up ───────────────────────────────────────────────────
            let up = origin.offset(dx, 1, dz);
            let verdict = (|| {
                // Clearance over the jumper's head, then a landing column.
                let ok = passable(terrain, origin.offset(0, 2, 0))?
                    && body_fits(terrain, up)?
                    && floored(terrain, up)?;
                Some(ok)
            })();
            match verdict {
                Some(true)  => out.push(MoveOption::new(up, Cost::new(STEP_UP), ModeType::Jump)),
                Some(false) => probe.rejected(origin, up, ModeType::Jump),
                None        => {}
            }

            // ── Drop ──────────────────────────────────────────────────────
            // The step-off column must be open at walking height; then scan
            // down for the first floor within range.
            match drop_landing(terrain, origin, dx, dz) {
                Some(Ok((dest, depth))) => {
                    let cost = 1.0 + DROP_PER_BLOCK * depth as f64;
                    out.push(MoveOption::new(dest, Cost::new(cost), ModeType::Jump));
                }
                Some(Err(probed)) => probe.rejected(origin, probed, ModeType::Jump),
                None => {}
            }
        }

        out
    }
}

/// Find the landing cell for a drop off the edge toward `(dx, dz)`.
///
/// `None` — terrain pending.  `Some(Err(cell))` — no valid landing; `cell`
/// is the representative rejected candidate.  `Some(Ok((dest, depth)))` —
/// land at `dest` after falling `depth` blocks.
fn drop_landing(
    terrain: &mut TerrainScope,
    origin: Cell,
    dx: i32,
    dz: i32,
) -> Option<Result<(Cell, i32), Cell>> {
    let step_off = origin.offset(dx, 0, dz);
    if !body_fits(terrain, step_off)? {
        return Some(Err(step_off));
    }
    // A floored step-off is WalkMode's candidate, not a drop.
    if floored(terrain, step_off)? {
        return Some(Err(step_off));
    }

    let mut feet = step_off;
    for depth in 1..=MAX_DROP {
        feet = feet.below();
        if !passable(terrain, feet)? {
            // Fell onto something impassable before finding a floor.
            return Some(Err(feet));
        }
        if floored(terrain, feet)? {
            return Some(Ok((feet, depth)));
        }
    }
    Some(Err(feet))
}
