//! `TerrainScope` — the per-search front of the two-tier cache.
//!
//! A scope is owned by exactly one search's execution context, so its local
//! map needs no locking; only a miss reaches the central store's mutex.
//! It is created when the search starts and discarded (or [`clear`]ed) when
//! the search ends.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use trek_core::{Cell, ChunkId};

use crate::block::BlockKind;
use crate::chunk::TerrainChunk;
use crate::store::{ChunkFuture, ChunkRequest, TerrainStore};

/// Answer to a terrain query from a movement capability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockQuery {
    /// The block kind is known (possibly [`BlockKind::Unavailable`], which
    /// capabilities treat as a rejection).
    Known(BlockKind),
    /// The chunk is queued for production on the privileged thread; ask
    /// again after the next yield.
    Pending,
}

/// Per-search chunk cache layered over the shared [`TerrainStore`].
pub struct TerrainScope {
    store: Arc<TerrainStore>,
    local: FxHashMap<ChunkId, Arc<TerrainChunk>>,
    /// Local insertion order for FIFO bounding.
    order: VecDeque<ChunkId>,
    /// Futures this search is waiting on, deduplicated by chunk id.
    waits: Vec<(ChunkId, ChunkFuture)>,
    max_local: usize,
    /// Set whenever a query answered `Pending` since the last
    /// [`take_pending_hit`]; the trial uses it to requeue the node it was
    /// expanding and yield.
    pending_hit: bool,
}

impl TerrainScope {
    pub fn new(store: Arc<TerrainStore>, max_local: usize) -> Self {
        Self {
            store,
            local: FxHashMap::default(),
            order: VecDeque::new(),
            waits: Vec::new(),
            max_local: max_local.max(1),
            pending_hit: false,
        }
    }

    /// Full query: local tier, then central tier, queueing production on a
    /// complete miss.
    pub fn query(&mut self, cell: Cell) -> BlockQuery {
        let id = cell.chunk();

        if let Some(chunk) = self.local.get(&id) {
            return BlockQuery::Known(chunk.block_at(cell));
        }

        match self.store.request(id) {
            ChunkRequest::Ready(chunk) => {
                let kind = chunk.block_at(cell);
                self.insert_local(id, chunk);
                BlockQuery::Known(kind)
            }
            ChunkRequest::Pending(future) => {
                if !self.waits.iter().any(|(wid, _)| *wid == id) {
                    self.waits.push((id, future));
                }
                self.pending_hit = true;
                BlockQuery::Pending
            }
        }
    }

    /// Convenience for capability code: `None` means "cannot know yet" and
    /// the proposal must simply not be emitted this increment.
    #[inline]
    pub fn kind(&mut self, cell: Cell) -> Option<BlockKind> {
        match self.query(cell) {
            BlockQuery::Known(kind) => Some(kind),
            BlockQuery::Pending => None,
        }
    }

    /// True if any query answered `Pending` since the last call; resets.
    pub fn take_pending_hit(&mut self) -> bool {
        std::mem::take(&mut self.pending_hit)
    }

    /// Move resolved waits into the local tier.  Returns `true` if at least
    /// one resolved — i.e. the search can make progress again.
    pub fn poll_waits(&mut self) -> bool {
        let mut any = false;
        let mut i = 0;
        while i < self.waits.len() {
            if let Some(chunk) = self.waits[i].1.poll() {
                let (id, _) = self.waits.swap_remove(i);
                self.insert_local(id, chunk);
                any = true;
            } else {
                i += 1;
            }
        }
        any
    }

    /// True while this search is blocked on at least one unproduced chunk.
    pub fn has_waits(&self) -> bool {
        !self.waits.is_empty()
    }

    pub fn local_len(&self) -> usize {
        self.local.len()
    }

    /// Drop all per-search state.  Called at search end.
    pub fn clear(&mut self) {
        self.local.clear();
        self.order.clear();
        self.waits.clear();
        self.pending_hit = false;
    }

    fn insert_local(&mut self, id: ChunkId, chunk: Arc<TerrainChunk>) {
        if self.local.insert(id, chunk).is_none() {
            self.order.push_back(id);
            while self.local.len() > self.max_local {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.local.remove(&oldest);
            }
        }
    }
}
