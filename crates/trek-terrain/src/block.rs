//! Terrain block classification.
//!
//! The search core never sees the host's real block palette.  The oracle
//! collapses every block into one of these kinds, which is exactly the
//! granularity the built-in movement capabilities reason about.

/// Classification of one terrain cell.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockKind {
    /// Open space a body can occupy.
    #[default]
    Air,
    /// Full solid block: supports standing, blocks passage, can be dug.
    Solid,
    /// Liquid: swimmable, not standable.
    Liquid,
    /// Climbable surface occupying the cell (ladder, vine).
    Climbable,
    /// A closed door: blocks passage unless the requester opens doors.
    DoorClosed,
    /// An open door: passable like air.
    DoorOpen,
    /// Terrain that could not be produced (ungenerated, out of world).
    /// Rejects every movement proposal; never an error.
    Unavailable,
}

impl BlockKind {
    /// `true` if a body can occupy this cell without any special capability.
    #[inline]
    pub const fn is_passable(self) -> bool {
        matches!(
            self,
            BlockKind::Air | BlockKind::Climbable | BlockKind::DoorOpen
        )
    }

    /// `true` if a body standing in the cell above is supported.
    #[inline]
    pub const fn is_floor(self) -> bool {
        matches!(self, BlockKind::Solid | BlockKind::DoorClosed)
    }

    #[inline]
    pub const fn is_liquid(self) -> bool {
        matches!(self, BlockKind::Liquid)
    }

    #[inline]
    pub const fn is_climbable(self) -> bool {
        matches!(self, BlockKind::Climbable)
    }

    /// `true` for any door block, open or closed.
    #[inline]
    pub const fn is_door(self) -> bool {
        matches!(self, BlockKind::DoorClosed | BlockKind::DoorOpen)
    }

    /// `true` if the block can be broken through by the dig capability.
    #[inline]
    pub const fn is_diggable(self) -> bool {
        matches!(self, BlockKind::Solid)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BlockKind::Air         => "air",
            BlockKind::Solid       => "solid",
            BlockKind::Liquid      => "liquid",
            BlockKind::Climbable   => "climbable",
            BlockKind::DoorClosed  => "door-closed",
            BlockKind::DoorOpen    => "door-open",
            BlockKind::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
