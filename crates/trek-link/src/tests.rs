//! Unit tests for link discovery and the registry index.

use std::sync::Arc;

use trek_core::{Capabilities, Cell, Cost, DomainId, ModeType};

use crate::{Link, LinkRegistry, LinkSource};

const D0: DomainId = DomainId(0);
const D1: DomainId = DomainId(1);

fn link(origin: Cell, destination: Cell) -> Link {
    Link {
        origin,
        destination,
        cost: Cost::new(1.0),
        mode: ModeType::Walk,
        permission: None,
        prompt: None,
    }
}

fn source_of(links: Vec<Link>) -> Arc<dyn LinkSource> {
    Arc::new(move |_caps: &Capabilities| links.clone())
}

#[cfg(test)]
mod registry_tests {
    use super::*;

    #[test]
    fn indexes_links_by_origin_domain() {
        let portal_out = link(Cell::new(0, 0, 0, D0), Cell::new(0, 0, 0, D1));
        let portal_back = link(Cell::new(0, 0, 0, D1), Cell::new(0, 0, 0, D0));
        let sources = vec![source_of(vec![portal_out, portal_back])];
        let caps = Capabilities::new(Cell::new(5, 0, 5, D0));

        let registry = LinkRegistry::build(&sources, &caps);
        assert_eq!(registry.len(), 2);

        let from_d0 = registry.candidates_from(Cell::new(5, 0, 5, D0));
        assert_eq!(from_d0.len(), 1);
        assert_eq!(registry.get(from_d0[0]).destination.domain, D1);

        let from_d1 = registry.candidates_from(Cell::new(0, 0, 0, D1));
        assert_eq!(from_d1.len(), 1);
        assert_eq!(registry.get(from_d1[0]).destination.domain, D0);
    }

    #[test]
    fn candidates_are_nearest_first() {
        let near = link(Cell::new(2, 0, 0, D0), Cell::new(0, 0, 0, D1));
        let far = link(Cell::new(50, 0, 0, D0), Cell::new(0, 0, 0, D1));
        let sources = vec![source_of(vec![far.clone(), near.clone()])];
        let caps = Capabilities::new(Cell::new(0, 0, 0, D0));

        let registry = LinkRegistry::build(&sources, &caps);
        let order = registry.candidates_from(Cell::new(0, 0, 0, D0));
        assert_eq!(registry.get(order[0]).origin, near.origin);
        assert_eq!(registry.get(order[1]).origin, far.origin);
    }

    #[test]
    fn permission_gated_links_are_filtered() {
        let mut gated = link(Cell::new(0, 0, 0, D0), Cell::new(0, 0, 0, D1));
        gated.permission = Some("trek.use.vip-portal".into());
        let sources = vec![source_of(vec![gated])];

        let plain = Capabilities::new(Cell::new(0, 0, 0, D0));
        assert!(LinkRegistry::build(&sources, &plain).is_empty());

        let mut vip = Capabilities::new(Cell::new(0, 0, 0, D0));
        vip.permissions.push("trek.use.vip-portal".into());
        assert_eq!(LinkRegistry::build(&sources, &vip).len(), 1);
    }

    #[test]
    fn unknown_domain_has_no_candidates() {
        let registry = LinkRegistry::empty();
        assert!(registry.candidates_from(Cell::new(0, 0, 0, D0)).is_empty());
    }

    #[test]
    fn crosses_domains_flag() {
        let portal = link(Cell::new(0, 0, 0, D0), Cell::new(0, 0, 0, D1));
        let teleport = link(Cell::new(0, 0, 0, D0), Cell::new(90, 0, 0, D0));
        assert!(portal.crosses_domains());
        assert!(!teleport.crosses_domains());
    }
}
