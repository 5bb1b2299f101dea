//! The `TerrainOracle` trait — the host's raw terrain source.

use rustc_hash::FxHashMap;

use trek_core::{Cell, ChunkId, DomainId};

use crate::BlockKind;

/// Raw terrain access, implemented by the host integration.
///
/// # Thread affinity
///
/// Implementations are only ever called from inside
/// [`TerrainStore::service`][crate::TerrainStore::service], which the host
/// runs on its privileged thread (the main tick loop).  Worker-side code
/// reaches terrain exclusively through [`TerrainScope`][crate::TerrainScope];
/// nothing in this crate sends an oracle across threads, so the trait
/// requires neither `Send` nor `Sync`.
pub trait TerrainOracle {
    /// Classify the block at `cell`.
    fn block_at(&self, cell: Cell) -> BlockKind;

    /// Captured vertical extent of `domain`: `[min_y, max_y)`.
    fn y_range(&self, domain: DomainId) -> (i32, i32);

    /// `false` if the chunk cannot be produced at all (ungenerated terrain,
    /// unloaded region).  The store then caches an explicit unavailable
    /// chunk instead of calling `block_at`.
    fn chunk_available(&self, _chunk: ChunkId) -> bool {
        true
    }
}

// ── FlatWorld ─────────────────────────────────────────────────────────────────

/// A simple in-memory oracle: solid ground below `floor_y`, air above, with
/// individual block overrides.
///
/// The reference oracle for tests and examples throughout the workspace —
/// hand-build exactly the terrain a scenario needs, no host required.
pub struct FlatWorld {
    /// Top of the solid ground, exclusive: blocks with `y < floor_y` are
    /// solid, the rest air (before overrides).
    pub floor_y: i32,
    min_y: i32,
    max_y: i32,
    overrides: FxHashMap<Cell, BlockKind>,
    missing_chunks: Vec<ChunkId>,
}

impl FlatWorld {
    pub fn new(floor_y: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            floor_y,
            min_y,
            max_y,
            overrides: FxHashMap::default(),
            missing_chunks: Vec::new(),
        }
    }

    /// Override a single block.
    pub fn set(&mut self, cell: Cell, kind: BlockKind) -> &mut Self {
        self.overrides.insert(cell, kind);
        self
    }

    /// Fill the cuboid `[a, b]` (inclusive corners, same domain) with `kind`.
    pub fn fill(&mut self, a: Cell, b: Cell, kind: BlockKind) -> &mut Self {
        debug_assert_eq!(a.domain, b.domain);
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                for z in a.z.min(b.z)..=a.z.max(b.z) {
                    self.overrides
                        .insert(Cell::new(x, y, z, a.domain), kind);
                }
            }
        }
        self
    }

    /// Mark a chunk as unproducible.
    pub fn remove_chunk(&mut self, chunk: ChunkId) -> &mut Self {
        self.missing_chunks.push(chunk);
        self
    }
}

impl TerrainOracle for FlatWorld {
    fn block_at(&self, cell: Cell) -> BlockKind {
        if let Some(&kind) = self.overrides.get(&cell) {
            return kind;
        }
        if cell.y < self.floor_y {
            BlockKind::Solid
        } else {
            BlockKind::Air
        }
    }

    fn y_range(&self, _domain: DomainId) -> (i32, i32) {
        (self.min_y, self.max_y)
    }

    fn chunk_available(&self, chunk: ChunkId) -> bool {
        !self.missing_chunks.contains(&chunk)
    }
}
