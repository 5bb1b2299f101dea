//! `trek-terrain` — terrain data access for the trek route-search engine.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`block`]  | `BlockKind` — terrain classification and passability       |
//! | [`chunk`]  | `TerrainChunk` — a 16×16 full-height column snapshot       |
//! | [`oracle`] | `TerrainOracle` trait, `FlatWorld` reference implementation|
//! | [`store`]  | `TerrainStore` — shared central cache, `ChunkFuture`       |
//! | [`scope`]  | `TerrainScope` — per-search local cache, `BlockQuery`      |
//! | [`error`]  | `TerrainError`, `TerrainResult<T>`                         |
//!
//! # Threading model
//!
//! Raw terrain can only be read on the host's privileged thread, but path
//! searches run on workers.  The two tiers bridge that gap:
//!
//! ```text
//! worker                      shared                      privileged thread
//! ──────                      ──────                      ─────────────────
//! TerrainScope::query ──miss──▶ TerrainStore::request
//!                               (dedup + prefetch,
//!                                queue + ChunkFuture) ───▶ TerrainStore::service
//!                                                          (oracle reads,
//! TerrainScope::poll_waits ◀── future fulfilled ◀──────────  insert + evict)
//! ```
//!
//! Workers never block on a future — they poll it at increment boundaries
//! and yield in between.  The store's single mutex guards the chunk map, the
//! age heap, and the pending set together, so no reader ever observes a
//! partially updated index.

pub mod block;
pub mod chunk;
pub mod error;
pub mod oracle;
pub mod scope;
pub mod store;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use block::BlockKind;
pub use chunk::TerrainChunk;
pub use error::{TerrainError, TerrainResult};
pub use oracle::{FlatWorld, TerrainOracle};
pub use scope::{BlockQuery, TerrainScope};
pub use store::{CacheConfig, ChunkFuture, ChunkRequest, TerrainStore};
