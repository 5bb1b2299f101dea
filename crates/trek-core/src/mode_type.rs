//! Movement mode tags and mode-set membership.
//!
//! `ModeType` is a closed enumeration: a step in a realized path is tagged
//! with exactly one of these so consumers (animation, permission checks,
//! path-record filtering) can reason about *how* the step was taken without
//! knowing which capability implementation produced it.

use std::fmt;

/// The means by which one path step is traversed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeType {
    /// Ordinary ground movement, including diagonals.
    Walk,
    /// A one-block step-up or a controlled drop.
    Jump,
    /// Movement through liquid.
    Swim,
    /// Free movement through air.  Requires flight.
    Fly,
    /// Vertical movement on a climbable surface.
    Climb,
    /// Passage through a door block.
    Door,
    /// Breaking through solid terrain.
    Dig,
    /// Traversal over liquid in a vessel.  Tag only — the expansion logic
    /// needs vehicle state that lives host-side.
    Boat,
}

impl ModeType {
    /// Every variant, in bit order.
    pub const ALL: [ModeType; 8] = [
        ModeType::Walk,
        ModeType::Jump,
        ModeType::Swim,
        ModeType::Fly,
        ModeType::Climb,
        ModeType::Door,
        ModeType::Dig,
        ModeType::Boat,
    ];

    /// Position of this mode in a [`ModeSet`] bitmask.  Stable across
    /// versions: recorded paths depend on it.
    #[inline]
    pub const fn bit(self) -> u16 {
        1 << self as u16
    }

    /// `true` for modes any requester may use without special permission.
    #[inline]
    pub const fn common(self) -> bool {
        match self {
            ModeType::Walk
            | ModeType::Jump
            | ModeType::Swim
            | ModeType::Climb
            | ModeType::Door => true,
            ModeType::Fly | ModeType::Dig | ModeType::Boat => false,
        }
    }

    /// Human-readable label, useful for logs and event payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            ModeType::Walk  => "walk",
            ModeType::Jump  => "jump",
            ModeType::Swim  => "swim",
            ModeType::Fly   => "fly",
            ModeType::Climb => "climb",
            ModeType::Door  => "door",
            ModeType::Dig   => "dig",
            ModeType::Boat  => "boat",
        }
    }
}

impl fmt::Display for ModeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ModeSet ───────────────────────────────────────────────────────────────────

/// A set of [`ModeType`]s as a `u16` bitmask.
///
/// Recorded paths are keyed by the mode set they were searched with, so a
/// future request may only reuse a record whose constituent modes are all
/// allowed — `is_subset_of` is the membership test for that.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeSet(pub u16);

impl ModeSet {
    pub const EMPTY: ModeSet = ModeSet(0);

    /// The set of all common (permission-free) modes.
    pub fn all_common() -> ModeSet {
        ModeType::ALL
            .iter()
            .filter(|m| m.common())
            .copied()
            .collect()
    }

    #[inline]
    pub fn insert(&mut self, mode: ModeType) {
        self.0 |= mode.bit();
    }

    #[inline]
    pub const fn with(self, mode: ModeType) -> ModeSet {
        ModeSet(self.0 | mode.bit())
    }

    #[inline]
    pub const fn contains(self, mode: ModeType) -> bool {
        self.0 & mode.bit() != 0
    }

    #[inline]
    pub const fn union(self, other: ModeSet) -> ModeSet {
        ModeSet(self.0 | other.0)
    }

    /// `true` if every mode in `self` is also in `other`.
    #[inline]
    pub const fn is_subset_of(self, other: ModeSet) -> bool {
        self.0 & !other.0 == 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of modes in the set.
    #[inline]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub fn iter(self) -> impl Iterator<Item = ModeType> {
        ModeType::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl FromIterator<ModeType> for ModeSet {
    fn from_iter<I: IntoIterator<Item = ModeType>>(iter: I) -> Self {
        let mut set = ModeSet::EMPTY;
        for mode in iter {
            set.insert(mode);
        }
        set
    }
}

impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, mode) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            f.write_str(mode.as_str())?;
        }
        write!(f, "}}")
    }
}
