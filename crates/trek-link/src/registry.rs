//! Spatially indexed link lookup for one session.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use trek_core::{Capabilities, Cell, DomainId};

use crate::link::{Link, LinkSource};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored per domain: the link's origin point with its index into the
/// registry's link table.
#[derive(Clone)]
struct LinkEntry {
    point: [i32; 3],
    idx: usize,
}

impl RTreeObject for LinkEntry {
    type Envelope = AABB<[i32; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for LinkEntry {
    /// Squared Euclidean distance in cell space.
    fn distance_2(&self, point: &[i32; 3]) -> i32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── LinkRegistry ──────────────────────────────────────────────────────────────

/// All links one session may take, indexed by origin domain.
///
/// Rebuilt per session — link discovery is cheap and depends on requester
/// state, so caching across sessions would serve stale permissions.
pub struct LinkRegistry {
    links: Vec<Link>,
    by_domain: FxHashMap<DomainId, RTree<LinkEntry>>,
}

impl LinkRegistry {
    /// Query every source for `caps` and index the usable links.
    pub fn build(sources: &[std::sync::Arc<dyn LinkSource>], caps: &Capabilities) -> Self {
        let mut links = Vec::new();
        for source in sources {
            links.extend(
                source
                    .links_for(caps)
                    .into_iter()
                    .filter(|link| link.usable_by(caps)),
            );
        }

        let mut per_domain: FxHashMap<DomainId, Vec<LinkEntry>> = FxHashMap::default();
        for (idx, link) in links.iter().enumerate() {
            per_domain
                .entry(link.origin.domain)
                .or_default()
                .push(LinkEntry {
                    point: [link.origin.x, link.origin.y, link.origin.z],
                    idx,
                });
        }

        let by_domain = per_domain
            .into_iter()
            .map(|(domain, entries)| (domain, RTree::bulk_load(entries)))
            .collect();

        Self { links, by_domain }
    }

    /// An empty registry — same-domain searches with no tunnels.
    pub fn empty() -> Self {
        Self {
            links: Vec::new(),
            by_domain: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn get(&self, idx: usize) -> &Link {
        &self.links[idx]
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Candidate links leaving `from`'s domain, nearest origin first.
    ///
    /// Nearest-first matters: the assembler seeds its frontier in this
    /// order, so the cheapest-looking jumps are explored before far ones.
    pub fn candidates_from(&self, from: Cell) -> Vec<usize> {
        match self.by_domain.get(&from.domain) {
            None => Vec::new(),
            Some(tree) => tree
                .nearest_neighbor_iter(&[from.x, from.y, from.z])
                .map(|entry| entry.idx)
                .collect(),
        }
    }

    /// Iterate all indexed links.
    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }
}
