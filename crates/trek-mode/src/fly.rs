//! Free flight through open space.

use trek_core::{Cell, Cost, ModeType};
use trek_terrain::TerrainScope;

use crate::mode::{Mode, ModeProbe, body_fits};
use crate::MoveOption;

/// Cost of one flown cell, any axis.
const GLIDE: f64 = 1.0;

/// Flight: axis movement through any passable space, no floor required.
///
/// Only registered for requesters that can actually fly.
pub struct FlyMode;

impl Mode for FlyMode {
    fn mode_type(&self) -> ModeType {
        ModeType::Fly
    }

    fn expand(
        &self,
        origin: Cell,
        terrain: &mut TerrainScope,
        probe: &mut dyn ModeProbe,
    ) -> Vec<MoveOption> {
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
            match body_fits(terrain, dest) {
                Some(true)  => out.push(MoveOption::new(dest, Cost::new(GLIDE), ModeType::Fly)),
                Some(false) => probe.rejected(origin, dest, ModeType::Fly),
                None        => {}
            }
        }
        out
    }
}
