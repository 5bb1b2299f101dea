//! Movement through liquid.

use trek_core::{Cell, Cost, ModeType};
use trek_terrain::TerrainScope;

use crate::mode::{Mode, ModeProbe};
use crate::MoveOption;

/// Cost of one swum cell — liquid is slow.
const STROKE: f64 = 2.0;

/// Swimming: axis movement while immersed.
///
/// Applies only when the origin cell is liquid; on dry origins the
/// capability proposes nothing (surfacing onto land is WalkMode's step out
/// of a liquid-topped column).
pub struct SwimMode;

impl Mode for SwimMode {
    fn mode_type(&self) -> ModeType {
        ModeType::Swim
    }

    fn expand(
        &self,
        origin: Cell,
        terrain: &mut TerrainScope,
        probe: &mut dyn ModeProbe,
    ) -> Vec<MoveOption> {
        match terrain.kind(origin) {
            Some(kind) if kind.is_liquid() => {}
            // Dry origin or pending chunk: not this capability's cell.
            _ => return Vec::new(),
        }

        let mut out = Vec::new();
        for (dx, dy, dz) in [
            (1, 0, 0),
            (-1, 0, 0),
            (0, 0, 1),
            (0, 0, -1),
            (0, 1, 0),
            (0, -1, 0),
        ] {
            let dest = origin.offset(dx, dy, dz);
            let verdict = (|| {
                let feet = terrain.kind(dest)?;
                let head = terrain.kind(dest.above())?;
                // Stay immersed, or surface into breathable space.
                Some(feet.is_liquid() && (head.is_liquid() || head.is_passable()))
            })();
            match verdict {
                Some(true)  => out.push(MoveOption::new(dest, Cost::new(STROKE), ModeType::Swim)),
                Some(false) => probe.rejected(origin, dest, ModeType::Swim),
                None        => {}
            }
        }
        out
    }
}
