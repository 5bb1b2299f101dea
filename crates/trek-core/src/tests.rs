//! Unit tests for trek-core value types.

use crate::{Cell, ChunkId, Cost, DomainId, ModeSet, ModeType};

const D0: DomainId = DomainId(0);

// ── Cell & chunk math ─────────────────────────────────────────────────────────

#[cfg(test)]
mod cell_tests {
    use super::*;

    #[test]
    fn chunk_of_positive_coords() {
        let c = Cell::new(17, 64, 31, D0);
        assert_eq!(c.chunk(), ChunkId::new(D0, 1, 1));
        assert_eq!(c.chunk_offset(), (1, 15));
    }

    #[test]
    fn chunk_of_negative_coords() {
        // Arithmetic shift: x = -1 belongs to chunk -1, offset 15.
        let c = Cell::new(-1, 0, -16, D0);
        assert_eq!(c.chunk(), ChunkId::new(D0, -1, -1));
        assert_eq!(c.chunk_offset(), (15, 0));

        let c2 = Cell::new(-17, 0, -33, D0);
        assert_eq!(c2.chunk(), ChunkId::new(D0, -2, -3));
    }

    #[test]
    fn chunk_boundary_is_exact() {
        assert_eq!(Cell::new(15, 0, 0, D0).chunk().cx, 0);
        assert_eq!(Cell::new(16, 0, 0, D0).chunk().cx, 1);
        assert_eq!(Cell::new(-16, 0, 0, D0).chunk().cx, -1);
        assert_eq!(Cell::new(-17, 0, 0, D0).chunk().cx, -2);
    }

    #[test]
    fn distances() {
        let a = Cell::new(0, 0, 0, D0);
        let b = Cell::new(3, 4, 0, D0);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-12);
        assert_eq!(a.chebyshev_to(b), 4);
    }

    #[test]
    fn neighbors_are_eight_distinct_chunks() {
        let id = ChunkId::new(D0, 0, 0);
        let n = id.neighbors();
        assert_eq!(n.len(), 8);
        for chunk in n {
            assert_ne!(chunk, id);
            assert!(chunk.cx.abs() <= 1 && chunk.cz.abs() <= 1);
        }
        // All distinct.
        for i in 0..8 {
            for j in (i + 1)..8 {
                assert_ne!(n[i], n[j]);
            }
        }
    }

    #[test]
    fn ordering_is_total_and_deterministic() {
        let mut cells = vec![
            Cell::new(1, 0, 0, D0),
            Cell::new(0, 2, 0, D0),
            Cell::new(0, 0, 0, D0),
        ];
        cells.sort();
        assert_eq!(cells[0], Cell::new(0, 0, 0, D0));
        assert_eq!(cells[2], Cell::new(1, 0, 0, D0));
    }
}

// ── ModeType & ModeSet ────────────────────────────────────────────────────────

#[cfg(test)]
mod mode_tests {
    use super::*;

    #[test]
    fn bits_are_distinct() {
        let mut seen = 0u16;
        for mode in ModeType::ALL {
            assert_eq!(seen & mode.bit(), 0, "bit collision for {mode}");
            seen |= mode.bit();
        }
    }

    #[test]
    fn common_flags() {
        assert!(ModeType::Walk.common());
        assert!(ModeType::Swim.common());
        assert!(!ModeType::Fly.common());
        assert!(!ModeType::Dig.common());
        assert!(!ModeType::Boat.common());
    }

    #[test]
    fn set_membership() {
        let mut set = ModeSet::EMPTY;
        assert!(set.is_empty());
        set.insert(ModeType::Walk);
        set.insert(ModeType::Climb);
        assert!(set.contains(ModeType::Walk));
        assert!(!set.contains(ModeType::Fly));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn subset_filtering() {
        let recorded: ModeSet = [ModeType::Walk, ModeType::Jump].into_iter().collect();
        let allowed = ModeSet::all_common();
        assert!(recorded.is_subset_of(allowed));

        let with_fly = recorded.with(ModeType::Fly);
        assert!(!with_fly.is_subset_of(allowed));
        assert!(recorded.is_subset_of(with_fly));
    }

    #[test]
    fn all_common_excludes_gated_modes() {
        let common = ModeSet::all_common();
        assert!(common.contains(ModeType::Walk));
        assert!(common.contains(ModeType::Door));
        assert!(!common.contains(ModeType::Fly));
        assert!(!common.contains(ModeType::Boat));
    }
}

// ── Cost ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cost_tests {
    use super::*;

    #[test]
    fn ordering_puts_infinite_last() {
        let mut costs = vec![Cost::INFINITE, Cost::new(2.0), Cost::new(0.5)];
        costs.sort();
        assert_eq!(costs[0], Cost::new(0.5));
        assert_eq!(costs[2], Cost::INFINITE);
    }

    #[test]
    fn addition_and_sum() {
        let total: Cost = [Cost::new(1.0), Cost::new(2.5)].into_iter().sum();
        assert_eq!(total, Cost::new(3.5));

        let mut c = Cost::new(1.0);
        c += Cost::new(0.5);
        assert_eq!(c, Cost::new(1.5));
    }

    #[test]
    fn infinite_absorbs() {
        assert_eq!(Cost::INFINITE + Cost::new(1.0), Cost::INFINITE);
        assert!(!(Cost::INFINITE).is_finite());
    }
}
