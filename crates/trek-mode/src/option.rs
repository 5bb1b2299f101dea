//! `MoveOption` — one candidate transition out of a cell.

use trek_core::{Cell, Cost, ModeType};

/// A transition a capability proposes from one origin cell.
///
/// Produced during node expansion and consumed by the trial's relaxation;
/// when several capabilities propose the same destination, the lowest-cost
/// option wins.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveOption {
    pub destination: Cell,
    pub cost: Cost,
    pub mode: ModeType,
}

impl MoveOption {
    #[inline]
    pub fn new(destination: Cell, cost: Cost, mode: ModeType) -> Self {
        debug_assert!(
            cost.is_finite() && cost > Cost::ZERO,
            "a proposal must carry a positive finite cost"
        );
        Self {
            destination,
            cost,
            mode,
        }
    }
}
