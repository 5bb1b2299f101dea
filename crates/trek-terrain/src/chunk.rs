//! Immutable terrain chunk snapshots.
//!
//! A chunk is a 16×16 full-height column of one domain, captured once on the
//! privileged thread and then shared immutably (`Arc`) between the central
//! cache and any number of per-search scopes.  The world may mutate after
//! capture; staleness is bounded by the central cache's TTL.

use trek_core::{CHUNK_WIDTH, Cell, ChunkId};

use crate::BlockKind;
use crate::oracle::TerrainOracle;

/// A dense snapshot of one chunk's blocks.
///
/// Layout: y-major, then z, then x — vertical neighbors of a cell are
/// `16 * 16` apart, horizontal neighbors adjacent, which matches the mostly
/// horizontal access pattern of ground-based movement capabilities.
pub struct TerrainChunk {
    pub id: ChunkId,
    /// Lowest block y captured (inclusive).
    pub min_y: i32,
    /// Highest block y captured (exclusive).
    pub max_y: i32,
    /// `(max_y - min_y) * 16 * 16` kinds; empty iff `unavailable`.
    blocks: Box<[BlockKind]>,
    /// Set when the oracle could not produce this chunk.  Every lookup
    /// answers [`BlockKind::Unavailable`].
    unavailable: bool,
}

impl TerrainChunk {
    /// Capture a chunk by reading every block from the oracle.
    ///
    /// Must only be called from the privileged thread (the store's
    /// `service` task is the single call site).
    pub fn capture(id: ChunkId, oracle: &dyn TerrainOracle) -> Self {
        let (min_y, max_y) = oracle.y_range(id.domain);
        debug_assert!(min_y < max_y, "oracle returned empty y-range");

        let height = (max_y - min_y) as usize;
        let mut blocks = Vec::with_capacity(height * 16 * 16);
        let base_x = id.cx * CHUNK_WIDTH;
        let base_z = id.cz * CHUNK_WIDTH;
        for y in min_y..max_y {
            for z in 0..CHUNK_WIDTH {
                for x in 0..CHUNK_WIDTH {
                    blocks.push(oracle.block_at(Cell::new(
                        base_x + x,
                        y,
                        base_z + z,
                        id.domain,
                    )));
                }
            }
        }

        Self {
            id,
            min_y,
            max_y,
            blocks: blocks.into_boxed_slice(),
            unavailable: false,
        }
    }

    /// A chunk the oracle could not produce.  Fulfills outstanding futures
    /// with an explicit answer so searches reject instead of stalling.
    pub fn unavailable(id: ChunkId) -> Self {
        Self {
            id,
            min_y: 0,
            max_y: 0,
            blocks: Box::new([]),
            unavailable: true,
        }
    }

    #[inline]
    pub fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    /// Kind of the block at `cell`, which must fall inside this chunk's
    /// column.  Above the captured range is open sky; below it is
    /// unavailable.
    pub fn block_at(&self, cell: Cell) -> BlockKind {
        debug_assert_eq!(cell.chunk(), self.id, "cell {cell} outside chunk {}", self.id);

        if self.unavailable {
            return BlockKind::Unavailable;
        }
        if cell.y >= self.max_y {
            return BlockKind::Air;
        }
        if cell.y < self.min_y {
            return BlockKind::Unavailable;
        }

        let (ox, oz) = cell.chunk_offset();
        let idx = ((cell.y - self.min_y) * CHUNK_WIDTH + oz) * CHUNK_WIDTH + ox;
        self.blocks[idx as usize]
    }
}
