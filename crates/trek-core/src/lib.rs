//! `trek-core` — foundational value types for the `trek` route-search engine.
//!
//! This crate is a dependency of every other `trek-*` crate.  It intentionally
//! has no `trek-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                            |
//! |---------------|-----------------------------------------------------|
//! | [`ids`]       | `DomainId`, `SessionId`, `TaskId`                   |
//! | [`cell`]      | `Cell`, `ChunkId`, chunk coordinate math            |
//! | [`mode_type`] | `ModeType` enum, `ModeSet` bitmask                  |
//! | [`cost`]      | `Cost` — total-ordered `f64` for frontier heaps     |
//! | [`caps`]      | `Capabilities` — per-requester snapshot             |
//! | [`error`]     | `TrekError`, `TrekResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                    |
//! |---------|-----------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types. |

pub mod caps;
pub mod cell;
pub mod cost;
pub mod error;
pub mod ids;
pub mod mode_type;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use caps::Capabilities;
pub use cell::{CHUNK_WIDTH, Cell, ChunkId};
pub use cost::Cost;
pub use error::{TrekError, TrekResult};
pub use ids::{DomainId, SessionId, TaskId};
pub use mode_type::{ModeSet, ModeType};
