//! `trek-link` — links ("tunnels", "ports") between and within domains.
//!
//! A link is a directed, fixed-cost edge whose endpoints may sit in
//! different domains: a door between worlds, a portal, a configured
//! teleport.  Which links exist for a given search depends on the requester
//! (permissions, inventory), so they are discovered fresh through
//! [`LinkSource`]s at session initialization and indexed in a
//! [`LinkRegistry`] for the itinerary assembler.
//!
//! # Crate layout
//!
//! | Module       | Contents                                       |
//! |--------------|------------------------------------------------|
//! | [`link`]     | `Link`, `LinkSource`                           |
//! | [`registry`] | `LinkRegistry` — per-domain R-tree index       |

pub mod link;
pub mod registry;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use link::{Link, LinkSource};
pub use registry::LinkRegistry;
