//! Breaking through solid terrain.

use trek_core::{Cell, Cost, ModeType};
use trek_terrain::TerrainScope;

use crate::mode::{Mode, ModeProbe, floored};
use crate::MoveOption;

/// Cost per block broken, on top of the movement itself.
const BREAK: f64 = 5.0;

/// Tunneling: horizontal passage through breakable blocks, and digging
/// straight down.  Expensive by design of the cost table, so the frontier
/// only reaches for it when open routes are worse.
///
/// Only registered for requesters permitted to modify terrain.
pub struct DigMode;

impl Mode for DigMode {
    fn mode_type(&self) -> ModeType {
        ModeType::Dig
    }

    fn expand(
        &self,
        origin: Cell,
        terrain: &mut TerrainScope,
        probe: &mut dyn ModeProbe,
    ) -> Vec<MoveOption> {
        let mut out = Vec::new();

        // ── Horizontal tunneling ──────────────────────────────────────────
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let dest = origin.offset(dx, 0, dz);
            let verdict = (|| {
                let feet = terrain.kind(dest)?;
                let head = terrain.kind(dest.above())?;

                let feet_ok = feet.is_passable() || feet.is_diggable();
                let head_ok = head.is_passable() || head.is_diggable();
                let dug = feet.is_diggable() as u32 + head.is_diggable() as u32;

                if dug == 0 || !feet_ok || !head_ok || !floored(terrain, dest)? {
                    return Some(None);
                }
                Some(Some(1.0 + BREAK * dug as f64))
            })();
            match verdict {
                Some(Some(cost)) => {
                    out.push(MoveOption::new(dest, Cost::new(cost), ModeType::Dig));
                }
                Some(None) => probe.rejected(origin, dest, ModeType::Dig),
                None => {}
            }
        }

        // ── Straight down ─────────────────────────────────────────────────
        let down = origin.below();
        let verdict = (|| {
            let below = terrain.kind(down)?;
            // The dug-out cell must itself rest on something.
            Some(below.is_diggable() && floored(terrain, down)?)
        })();
        match verdict {
            Some(true) => out.push(MoveOption::new(
                down,
                Cost::new(1.0 + BREAK),
                ModeType::Dig,
            )),
            Some(false) => probe.rejected(origin, down, ModeType::Dig),
            None => {}
        }

        out
    }
}
