//! Vertical movement on climbable surfaces.

use trek_core::{Cell, Cost, ModeType};
use trek_terrain::TerrainScope;

use crate::mode::{Mode, ModeProbe, passable};
use crate::MoveOption;

/// Cost of hauling up one block.
const ASCEND: f64 = 2.0;
/// Cost of letting down one block.
const DESCEND: f64 = 1.5;

/// Climbing ladders and vines: strictly vertical movement anchored to a
/// climbable cell.  Horizontal mounting of a climbable surface is ordinary
/// walking (climbable cells are passable).
pub struct ClimbMode;

impl Mode for ClimbMode {
    fn mode_type(&self) -> ModeType {
        ModeType::Climb
    }

    fn expand(
        &self,
        origin: Cell,
        terrain: &mut TerrainScope,
        probe: &mut dyn ModeProbe,
    ) -> Vec<MoveOption> {
        let anchored = match terrain.kind(origin) {
            Some(kind) => kind.is_climbable(),
            None => return Vec::new(),
        };

        let mut out = Vec::new();

        // ── Up: needs an anchor here and open space above ─────────────────
        let up = origin.above();
        if anchored {
            match passable(terrain, up) {
                Some(true)  => out.push(MoveOption::new(up, Cost::new(ASCEND), ModeType::Climb)),
                Some(false) => probe.rejected(origin, up, ModeType::Climb),
                None        => {}
            }
        }

        // ── Down: needs a climbable cell below to hold onto ───────────────
        let down = origin.below();
        let verdict = (|| {
            let below = terrain.kind(down)?;
            Some(below.is_climbable() && (anchored || terrain.kind(origin)?.is_passable()))
        })();
        match verdict {
            Some(true)  => out.push(MoveOption::new(down, Cost::new(DESCEND), ModeType::Climb)),
            Some(false) => probe.rejected(origin, down, ModeType::Climb),
            None        => {}
        }

        out
    }
}
