//! `TerrainStore` — the shared central chunk cache.
//!
//! # Why this exists
//!
//! Every concurrent search wants the same thing — chunk snapshots — and the
//! only producer is the privileged thread.  The store sits between them:
//! worker-side `request` answers hits immediately and turns misses into
//! queued production work; privileged-side `service` drains that queue.
//! Duplicate concurrent requests for one chunk coalesce into a single queue
//! entry whose [`ChunkFuture`] is shared by every waiter.
//!
//! # Locking
//!
//! One mutex guards the chunk map, the insertion-order heap, the pending
//! set, and the request queue as a unit; none of them is ever observed
//! partially updated.  Chunk *production* (the oracle reads) happens outside
//! the lock so workers keep making progress while the privileged thread
//! assembles a snapshot.
//!
//! # Eviction
//!
//! Capacity eviction and TTL pruning both walk a min-heap ordered by
//! insertion sequence (oldest first).  Heap entries are lazily invalidated:
//! an entry whose sequence no longer matches the live map entry is skipped.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use trek_core::ChunkId;

use crate::chunk::TerrainChunk;
use crate::error::{TerrainError, TerrainResult};
use crate::oracle::TerrainOracle;

// ── ChunkFuture ───────────────────────────────────────────────────────────────

/// A promise for a chunk that has been queued for production.
///
/// Cloned freely; all clones share one slot.  Fulfilled exactly once by the
/// privileged thread, after which every holder's `poll` answers the same
/// `Arc`.  Workers never block on this — they poll at increment boundaries.
#[derive(Clone)]
pub struct ChunkFuture {
    slot: Arc<OnceLock<Arc<TerrainChunk>>>,
}

impl ChunkFuture {
    fn new() -> Self {
        Self {
            slot: Arc::new(OnceLock::new()),
        }
    }

    /// The chunk, if production has completed.
    #[inline]
    pub fn poll(&self) -> Option<Arc<TerrainChunk>> {
        self.slot.get().cloned()
    }

    fn fulfill(&self, chunk: Arc<TerrainChunk>) {
        let already_set = self.slot.set(chunk).is_err();
        debug_assert!(!already_set, "chunk future fulfilled twice");
    }
}

/// Answer to a worker-side chunk request.
pub enum ChunkRequest {
    /// Cache hit — the snapshot is immediately usable.
    Ready(Arc<TerrainChunk>),
    /// Miss — production is queued; poll the future at yield points.
    Pending(ChunkFuture),
}

// ── CacheConfig ───────────────────────────────────────────────────────────────

/// Sizing and lifetime knobs for the central cache.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Local-cache bound per search; also one factor of the central bound.
    pub max_chunks_per_search: usize,

    /// Expected concurrent search ceiling; the other factor.
    pub max_concurrent_searches: usize,

    /// How long a cached snapshot may serve before the per-tick prune drops
    /// it.  Bounds staleness against a mutating world.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_chunks_per_search:   64,
            max_concurrent_searches: 16,
            ttl:                     Duration::from_secs(10),
        }
    }
}

impl CacheConfig {
    /// Central cache bound: `max_chunks_per_search × max_concurrent_searches`.
    #[inline]
    pub fn central_capacity(&self) -> usize {
        self.max_chunks_per_search * self.max_concurrent_searches
    }
}

// ── TerrainStore ──────────────────────────────────────────────────────────────

struct CachedChunk {
    payload:  Arc<TerrainChunk>,
    inserted: Instant,
    /// Insertion sequence; identifies the live age-heap entry for this id.
    seq: u64,
}

#[derive(Default)]
struct StoreState {
    chunks:  FxHashMap<ChunkId, CachedChunk>,
    /// Min-heap over `(insertion seq, id)` — oldest entry on top.
    age:     BinaryHeap<Reverse<(u64, ChunkId)>>,
    /// Chunks queued for production.  Invariant: one entry per chunk id,
    /// mirrored one-to-one by `queue`.
    pending: FxHashMap<ChunkId, ChunkFuture>,
    queue:   VecDeque<ChunkId>,
    next_seq: u64,
}

/// The shared central chunk cache.  One per engine; `Arc`-shared between
/// every search scope and the privileged-thread service task.
pub struct TerrainStore {
    state:    Mutex<StoreState>,
    capacity: usize,
    ttl:      Duration,
}

impl TerrainStore {
    pub fn new(config: CacheConfig) -> TerrainResult<Self> {
        if config.central_capacity() == 0 {
            return Err(TerrainError::Config(
                "central cache capacity must be non-zero".into(),
            ));
        }
        if config.ttl.is_zero() {
            return Err(TerrainError::Config("chunk TTL must be non-zero".into()));
        }
        Ok(Self {
            state:    Mutex::new(StoreState::default()),
            capacity: config.central_capacity(),
            ttl:      config.ttl,
        })
    }

    // ── Worker side ───────────────────────────────────────────────────────

    /// Look up `id`, queueing production (plus neighbor prefetch) on a miss.
    ///
    /// A chunk is queued at most once concurrently: a second request while
    /// the first is still pending receives a clone of the same future.
    pub fn request(&self, id: ChunkId) -> ChunkRequest {
        let mut state = self.state.lock().unwrap();

        if let Some(cached) = state.chunks.get(&id) {
            return ChunkRequest::Ready(Arc::clone(&cached.payload));
        }

        let future = state.enqueue(id);
        for neighbor in id.neighbors() {
            if !state.chunks.contains_key(&neighbor) {
                state.enqueue(neighbor);
            }
        }
        ChunkRequest::Pending(future)
    }

    // ── Privileged side ───────────────────────────────────────────────────

    /// Produce up to `max_chunks` queued chunks from `oracle`.
    ///
    /// This is the only call site of the oracle in the entire engine; the
    /// host runs it on its privileged thread.  Returns the number produced.
    pub fn service(&self, oracle: &dyn TerrainOracle, max_chunks: usize) -> usize {
        let mut produced = 0;
        while produced < max_chunks {
            let Some(id) = self.state.lock().unwrap().queue.pop_front() else {
                break;
            };

            // Oracle reads happen outside the lock: assembling a column is
            // the slow part and workers must keep polling meanwhile.
            let chunk = Arc::new(if oracle.chunk_available(id) {
                TerrainChunk::capture(id, oracle)
            } else {
                TerrainChunk::unavailable(id)
            });

            let mut state = self.state.lock().unwrap();
            match state.pending.remove(&id) {
                Some(future) => future.fulfill(Arc::clone(&chunk)),
                None => {
                    // A queued id must have a pending future.
                    debug_assert!(false, "queued chunk {id} had no pending future");
                    log::warn!("terrain store: queued chunk {id} had no pending future");
                }
            }
            state.insert(id, chunk, self.capacity);
            produced += 1;
        }
        produced
    }

    /// Drop every entry older than the TTL.  Called once per dispatcher
    /// tick.  Returns the number removed.
    pub fn prune(&self, now: Instant) -> usize {
        let mut state = self.state.lock().unwrap();
        let mut removed = 0;
        while let Some(&Reverse((seq, id))) = state.age.peek() {
            match state.chunks.get(&id) {
                Some(c) if c.seq == seq => {
                    if now.saturating_duration_since(c.inserted) >= self.ttl {
                        state.age.pop();
                        state.chunks.remove(&id);
                        removed += 1;
                    } else {
                        // Heap is insertion-ordered, so everything younger
                        // than the top is fresh too.
                        break;
                    }
                }
                // Stale heap entry for an evicted or reinserted chunk.
                _ => {
                    state.age.pop();
                }
            }
        }
        removed
    }

    // ── Introspection ─────────────────────────────────────────────────────

    /// Number of cached chunks.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of chunks queued for production.
    pub fn queued_len(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }

    pub fn contains(&self, id: ChunkId) -> bool {
        self.state.lock().unwrap().chunks.contains_key(&id)
    }
}

impl StoreState {
    /// Queue `id` for production, deduplicating against in-flight requests.
    fn enqueue(&mut self, id: ChunkId) -> ChunkFuture {
        if let Some(future) = self.pending.get(&id) {
            return future.clone();
        }
        let future = ChunkFuture::new();
        self.pending.insert(id, future.clone());
        self.queue.push_back(id);
        future
    }

    fn insert(&mut self, id: ChunkId, payload: Arc<TerrainChunk>, capacity: usize) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.age.push(Reverse((seq, id)));
        self.chunks.insert(
            id,
            CachedChunk {
                payload,
                inserted: Instant::now(),
                seq,
            },
        );

        // Oldest-first capacity eviction, skipping stale heap entries.
        while self.chunks.len() > capacity {
            let Some(Reverse((old_seq, old_id))) = self.age.pop() else {
                break;
            };
            if self
                .chunks
                .get(&old_id)
                .is_some_and(|c| c.seq == old_seq)
            {
                self.chunks.remove(&old_id);
            }
        }
    }
}
