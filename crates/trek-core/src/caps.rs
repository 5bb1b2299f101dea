//! Requester capability snapshot.

use crate::{Cell, ModeSet, ModeType};

/// Read-only snapshot of what one requester can do, taken once when a
/// session is initialized.
///
/// Everything a search needs to know about the requester lives here —
/// sessions, capability registration, and link discovery all read the same
/// snapshot, so a mid-search change of permissions cannot skew one search's
/// view of itself.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capabilities {
    /// Where the requester currently stands.
    pub origin: Cell,
    pub can_fly: bool,
    pub can_dig: bool,
    pub has_boat: bool,
    pub opens_doors: bool,
    /// Host-defined permission nodes, consulted for permission-gated links.
    pub permissions: Vec<String>,
}

impl Capabilities {
    /// A pedestrian snapshot: common movement only, doors allowed.
    pub fn new(origin: Cell) -> Self {
        Self {
            origin,
            can_fly: false,
            can_dig: false,
            has_boat: false,
            opens_doors: true,
            permissions: Vec::new(),
        }
    }

    pub fn has_permission(&self, node: &str) -> bool {
        self.permissions.iter().any(|p| p == node)
    }

    /// The mode set this requester is entitled to use.
    pub fn allowed_modes(&self) -> ModeSet {
        let mut set = ModeSet::all_common();
        if !self.opens_doors {
            set.0 &= !ModeType::Door.bit();
        }
        if self.can_fly {
            set.insert(ModeType::Fly);
        }
        if self.can_dig {
            set.insert(ModeType::Dig);
        }
        if self.has_boat {
            set.insert(ModeType::Boat);
        }
        set
    }
}
