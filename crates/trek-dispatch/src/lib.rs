//! `trek-dispatch` — cooperative scheduling of concurrent searches.
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`dispatcher`] | `Dispatcher`, `DispatchConfig`, `TickReport`          |
//! | [`host`]       | `HostScheduler` binding, `bind`, `TickDriver`         |
//!
//! # Execution contexts
//!
//! Two contexts drive an engine:
//!
//! - the **privileged thread** — the only context allowed to read raw
//!   terrain; it runs [`TerrainStore::service`][trek_terrain::TerrainStore]
//!   on some cadence;
//! - the **tick context** — whatever calls [`Dispatcher::tick`], which
//!   advances a bounded, budgeted, round-robin batch of sessions by one
//!   increment each and prunes the cache.
//!
//! Hosts with a task scheduler wire both through [`host::bind`]; anything
//! else spawns a [`TickDriver`], whose single thread plays both roles.
//! Cross-context flow is entirely future/promise handoff inside the
//! terrain store — no search code ever blocks on a lock held across an
//! increment.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Advance each tick's session batch on Rayon's pool.       |

pub mod dispatcher;
pub mod host;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use dispatcher::{DispatchConfig, Dispatcher, TickReport};
pub use host::{EngineTasks, HostScheduler, TickDriver, bind};
