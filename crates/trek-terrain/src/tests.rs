//! Unit tests for trek-terrain.
//!
//! All tests hand-build a `FlatWorld` so they run without any host.

use std::sync::Arc;
use std::time::{Duration, Instant};

use trek_core::{Cell, ChunkId, DomainId};

use crate::{
    BlockKind, BlockQuery, CacheConfig, ChunkRequest, FlatWorld, TerrainChunk, TerrainScope,
    TerrainStore,
};

const D0: DomainId = DomainId(0);

fn flat_world() -> FlatWorld {
    // Solid ground below y = 4, air above, captured range [0, 16).
    FlatWorld::new(4, 0, 16)
}

fn small_store(per_search: usize, searches: usize) -> Arc<TerrainStore> {
    Arc::new(
        TerrainStore::new(CacheConfig {
            max_chunks_per_search:   per_search,
            max_concurrent_searches: searches,
            ttl:                     Duration::from_secs(10),
        })
        .unwrap(),
    )
}

// ── Chunk snapshots ───────────────────────────────────────────────────────────

#[cfg(test)]
mod chunk_tests {
    use super::*;

    #[test]
    fn capture_classifies_floor_and_air() {
        let world = flat_world();
        let chunk = TerrainChunk::capture(ChunkId::new(D0, 0, 0), &world);
        assert_eq!(chunk.block_at(Cell::new(3, 3, 3, D0)), BlockKind::Solid);
        assert_eq!(chunk.block_at(Cell::new(3, 4, 3, D0)), BlockKind::Air);
    }

    #[test]
    fn capture_honors_overrides() {
        let mut world = flat_world();
        world.set(Cell::new(5, 4, 5, D0), BlockKind::Liquid);
        let chunk = TerrainChunk::capture(ChunkId::new(D0, 0, 0), &world);
        assert_eq!(chunk.block_at(Cell::new(5, 4, 5, D0)), BlockKind::Liquid);
    }

    #[test]
    fn above_captured_range_is_open_sky() {
        let world = flat_world();
        let chunk = TerrainChunk::capture(ChunkId::new(D0, 0, 0), &world);
        assert_eq!(chunk.block_at(Cell::new(0, 100, 0, D0)), BlockKind::Air);
        assert_eq!(
            chunk.block_at(Cell::new(0, -5, 0, D0)),
            BlockKind::Unavailable
        );
    }

    #[test]
    fn unavailable_chunk_rejects_everything() {
        let chunk = TerrainChunk::unavailable(ChunkId::new(D0, 2, 2));
        assert!(chunk.is_unavailable());
        assert_eq!(
            chunk.block_at(Cell::new(40, 8, 40, D0)),
            BlockKind::Unavailable
        );
    }

    #[test]
    fn negative_chunk_coordinates_index_correctly() {
        let mut world = flat_world();
        world.set(Cell::new(-1, 4, -1, D0), BlockKind::Solid);
        let chunk = TerrainChunk::capture(ChunkId::new(D0, -1, -1), &world);
        assert_eq!(chunk.block_at(Cell::new(-1, 4, -1, D0)), BlockKind::Solid);
        assert_eq!(chunk.block_at(Cell::new(-16, 4, -16, D0)), BlockKind::Air);
    }
}

// ── Central store: coalescing, service, eviction, TTL ─────────────────────────

#[cfg(test)]
mod store_tests {
    use super::*;

    #[test]
    fn miss_then_service_then_hit() {
        let store = small_store(4, 4);
        let world = flat_world();
        let id = ChunkId::new(D0, 0, 0);

        let ChunkRequest::Pending(future) = store.request(id) else {
            panic!("first request must miss");
        };
        assert!(future.poll().is_none());

        store.service(&world, usize::MAX);
        let chunk = future.poll().expect("future fulfilled by service");
        assert!(!chunk.is_unavailable());

        let ChunkRequest::Ready(again) = store.request(id) else {
            panic!("second request must hit");
        };
        assert!(Arc::ptr_eq(&chunk, &again));
    }

    #[test]
    fn duplicate_requests_coalesce() {
        let store = small_store(4, 4);
        let id = ChunkId::new(D0, 0, 0);

        let ChunkRequest::Pending(a) = store.request(id) else {
            panic!()
        };
        let queued_after_first = store.queued_len();
        let ChunkRequest::Pending(b) = store.request(id) else {
            panic!()
        };

        // No duplicate production task was queued.
        assert_eq!(store.queued_len(), queued_after_first);

        store.service(&flat_world(), usize::MAX);
        let ca = a.poll().unwrap();
        let cb = b.poll().unwrap();
        assert!(Arc::ptr_eq(&ca, &cb), "both futures resolve to one chunk");
    }

    #[test]
    fn one_miss_prefetches_the_eight_neighbors() {
        let store = small_store(16, 16);
        store.request(ChunkId::new(D0, 0, 0));
        assert_eq!(store.queued_len(), 9, "requested chunk + 8 neighbors");
    }

    #[test]
    fn service_budget_is_respected() {
        let store = small_store(16, 16);
        store.request(ChunkId::new(D0, 0, 0)); // queues 9
        let produced = store.service(&flat_world(), 3);
        assert_eq!(produced, 3);
        assert_eq!(store.queued_len(), 6);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn unavailable_chunk_still_fulfills_future() {
        let store = small_store(4, 4);
        let mut world = flat_world();
        let id = ChunkId::new(D0, 0, 0);
        world.remove_chunk(id);

        let ChunkRequest::Pending(future) = store.request(id) else {
            panic!()
        };
        store.service(&world, usize::MAX);
        let chunk = future.poll().expect("unavailable still resolves");
        assert!(chunk.is_unavailable());
    }

    #[test]
    fn eviction_is_oldest_first() {
        // Capacity 9 × 1 = 9: exactly one request's neighborhood (itself
        // plus 8 prefetched neighbors).
        let store = small_store(9, 1);
        let world = flat_world();

        // Two far-apart requests so their neighborhoods don't overlap.
        // Draining fully after each keeps insertion order deterministic:
        // all of A's neighborhood is strictly older than all of B's.
        store.request(ChunkId::new(D0, 0, 0));
        store.service(&world, usize::MAX);
        store.request(ChunkId::new(D0, 100, 0));
        store.service(&world, usize::MAX);

        assert_eq!(store.len(), 9, "capacity bound holds");
        // A's neighborhood is the oldest nine insertions — all evicted.
        assert!(!store.contains(ChunkId::new(D0, 0, 0)));
        assert!(!store.contains(ChunkId::new(D0, 1, 1)));
        // B's neighborhood survives intact.
        assert!(store.contains(ChunkId::new(D0, 100, 0)));
        assert!(store.contains(ChunkId::new(D0, 101, 1)));
    }

    #[test]
    fn prune_removes_only_expired_entries() {
        let store = small_store(64, 4);
        let world = flat_world();
        store.request(ChunkId::new(D0, 0, 0));
        store.service(&world, usize::MAX);
        let populated = store.len();
        assert!(populated > 0);

        // Nothing is older than the TTL yet.
        assert_eq!(store.prune(Instant::now()), 0);
        assert_eq!(store.len(), populated);

        // Pretend 11 s passed: everything expires.
        let later = Instant::now() + Duration::from_secs(11);
        assert_eq!(store.prune(later), populated);
        assert!(store.is_empty());
    }

    #[test]
    fn zero_capacity_config_is_rejected() {
        let result = TerrainStore::new(CacheConfig {
            max_chunks_per_search:   0,
            max_concurrent_searches: 8,
            ttl:                     Duration::from_secs(10),
        });
        assert!(result.is_err());
    }
}

// ── Per-search scope ──────────────────────────────────────────────────────────

#[cfg(test)]
mod scope_tests {
    use super::*;

    #[test]
    fn pending_then_known_after_service_and_poll() {
        let store = small_store(8, 2);
        let world = flat_world();
        let mut scope = TerrainScope::new(Arc::clone(&store), 8);
        let cell = Cell::new(1, 4, 1, D0);

        assert_eq!(scope.query(cell), BlockQuery::Pending);
        assert!(scope.take_pending_hit());
        assert!(scope.has_waits());

        store.service(&world, usize::MAX);
        assert!(scope.poll_waits());
        assert!(!scope.has_waits());
        assert_eq!(scope.query(cell), BlockQuery::Known(BlockKind::Air));
        assert!(!scope.take_pending_hit());
    }

    #[test]
    fn kind_maps_pending_to_none() {
        let store = small_store(8, 2);
        let mut scope = TerrainScope::new(Arc::clone(&store), 8);
        let cell = Cell::new(0, 4, 0, D0);

        assert_eq!(scope.kind(cell), None);
        store.service(&flat_world(), usize::MAX);
        scope.poll_waits();
        assert_eq!(scope.kind(cell), Some(BlockKind::Air));
    }

    #[test]
    fn local_tier_answers_without_touching_store() {
        let store = small_store(8, 2);
        let world = flat_world();
        let mut scope = TerrainScope::new(Arc::clone(&store), 8);
        let cell = Cell::new(0, 2, 0, D0);

        scope.query(cell);
        store.service(&world, usize::MAX);
        scope.poll_waits();
        assert_eq!(scope.query(cell), BlockQuery::Known(BlockKind::Solid));

        // Even if the central tier expires the chunk, the scope's snapshot
        // keeps answering for the rest of this search.
        store.prune(Instant::now() + Duration::from_secs(60));
        assert_eq!(scope.query(cell), BlockQuery::Known(BlockKind::Solid));
    }

    #[test]
    fn local_tier_is_fifo_bounded() {
        let store = small_store(64, 4);
        let world = flat_world();
        let mut scope = TerrainScope::new(Arc::clone(&store), 2);

        for cx in [0, 50, 100] {
            let cell = Cell::new(cx * 16, 4, 0, D0);
            scope.query(cell);
            store.service(&world, usize::MAX);
            scope.poll_waits();
        }
        assert!(scope.local_len() <= 2);
    }

    #[test]
    fn clear_discards_all_search_state() {
        let store = small_store(8, 2);
        let mut scope = TerrainScope::new(Arc::clone(&store), 8);
        scope.query(Cell::new(0, 4, 0, D0));
        scope.clear();
        assert_eq!(scope.local_len(), 0);
        assert!(!scope.has_waits());
        assert!(!scope.take_pending_hit());
    }
}
