//! The `Link` type and its discovery trait.

use trek_core::{Capabilities, Cell, Cost, ModeType};

/// A directed, fixed-cost edge between two cells, possibly across domains.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    /// Where the requester must stand to take the link.
    pub origin: Cell,
    /// Where the link deposits the requester.
    pub destination: Cell,
    /// Fixed traversal cost, accounted at itinerary level — never folded
    /// into an adjoining path's steps.
    pub cost: Cost,
    /// How taking this link is tagged in the realized route.
    pub mode: ModeType,
    /// Permission node required to take the link, if any.
    pub permission: Option<String>,
    /// Action the requester must be prompted to perform on arrival at the
    /// origin (press a button, pay a toll).  Carried through for the host;
    /// the search core only transports it.
    pub prompt: Option<String>,
}

impl Link {
    /// `true` if the link hops between domains.
    #[inline]
    pub fn crosses_domains(&self) -> bool {
        self.origin.domain != self.destination.domain
    }

    /// `true` if `caps` satisfies the link's permission gate.
    pub fn usable_by(&self, caps: &Capabilities) -> bool {
        match &self.permission {
            None => true,
            Some(node) => caps.has_permission(node),
        }
    }
}

/// A provider of candidate links, implemented by the host integration
/// (portal plugins, configured teleports, door registries).
///
/// Queried once per session initialization so each search sees a snapshot
/// consistent with the requester's state at that moment.  Implementations
/// may pre-filter on `caps` themselves; the registry applies the permission
/// gate regardless.
pub trait LinkSource: Send + Sync {
    fn links_for(&self, caps: &Capabilities) -> Vec<Link>;
}

impl<F> LinkSource for F
where
    F: Fn(&Capabilities) -> Vec<Link> + Send + Sync,
{
    fn links_for(&self, caps: &Capabilities) -> Vec<Link> {
        self(caps)
    }
}
