//! Passage through closed doors.

use trek_core::{Cell, Cost, ModeType};
use trek_terrain::{BlockKind, TerrainScope};

use crate::mode::{Mode, ModeProbe, floored};
use crate::MoveOption;

/// Cost of opening and stepping through a door.
const THROUGH: f64 = 1.5;

/// Stepping through a closed door.
///
/// Open doors are passable and need no capability; this one is registered
/// only for requesters entitled to operate doors, and it proposes the step
/// WalkMode refuses: a destination whose body column contains a closed
/// door.
pub struct DoorMode;

impl Mode for DoorMode {
    fn mode_type(&self) -> ModeType {
        ModeType::Door
    }

    fn expand(
        &self,
        origin: Cell,
        terrain: &mut TerrainScope,
        probe: &mut dyn ModeProbe,
    ) -> Vec<MoveOption> {
        let mut out = Vec::new();

        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let dest = origin.offset(dx, 0, dz);
            let verdict = (|| {
                let feet = terrain.kind(dest)?;
                let head = terrain.kind(dest.above())?;

                let feet_open = feet.is_passable() || feet == BlockKind::DoorClosed;
                let head_open = head.is_passable() || head == BlockKind::DoorClosed;
                let any_door =
                    feet == BlockKind::DoorClosed || head == BlockKind::DoorClosed;

                Some(any_door && feet_open && head_open && floored(terrain, dest)?)
            })();
            match verdict {
                Some(true)  => out.push(MoveOption::new(dest, Cost::new(THROUGH), ModeType::Door)),
                Some(false) => probe.rejected(origin, dest, ModeType::Door),
                None        => {}
            }
        }

        out
    }
}
