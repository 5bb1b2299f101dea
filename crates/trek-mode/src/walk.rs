//! Ground movement: cardinal steps and corner-guarded diagonals.

use trek_core::{Cell, Cost, ModeType};
use trek_terrain::TerrainScope;

use crate::mode::{Mode, ModeProbe, body_fits, floored};
use crate::MoveOption;

/// Cost of one cardinal step on foot.
const STEP: f64 = 1.0;
/// Cost of one diagonal step: √2 × STEP.
const DIAGONAL: f64 = std::f64::consts::SQRT_2;

/// Ordinary walking on solid ground.
///
/// Cardinal steps require the destination column to fit a body with a floor
/// beneath it.  Diagonal steps additionally require both flanking cardinal
/// columns to be open, so a body never clips a corner.
pub struct WalkMode;

impl Mode for WalkMode {
    fn mode_type(&self) -> ModeType {
        ModeType::Walk
    }

    fn expand(
        &self,
        origin: Cell,
        terrain: &mut TerrainScope,
        probe: &mut dyn ModeProbe,
    ) -> Vec<MoveOption> {
        let mut out = Vec::new();

        // ── Cardinals ─────────────────────────────────────────────────────
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let dest = origin.offset(dx, 0, dz);
            match walkable(terrain, dest) {
                Some(true)  => out.push(MoveOption::new(dest, Cost::new(STEP), ModeType::Walk)),
                Some(false) => probe.rejected(origin, dest, ModeType::Walk),
                None        => {}
            }
        }

        // ── Diagonals ─────────────────────────────────────────────────────
        for (dx, dz) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
            let dest = origin.offset(dx, 0, dz);
            let verdict = (|| {
                let open = walkable(terrain, dest)?
                    && body_fits(terrain, origin.offset(dx, 0, 0))?
                    && body_fits(terrain, origin.offset(0, 0, dz))?;
                Some(open)
            })();
            match verdict {
                Some(true)  => out.push(MoveOption::new(dest, Cost::new(DIAGONAL), ModeType::Walk)),
                Some(false) => probe.rejected(origin, dest, ModeType::Walk),
                None        => {}
            }
        }

        out
    }
}

fn walkable(terrain: &mut TerrainScope, feet: Cell) -> Option<bool> {
    Some(body_fits(terrain, feet)? && floored(terrain, feet)?)
}
