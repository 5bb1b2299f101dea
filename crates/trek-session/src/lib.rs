//! `trek-session` — search lifecycle and observability for the trek engine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`context`] | `EngineContext` — shared collaborators, passed explicitly |
//! | [`state`]   | `SessionState` — the session state machine                |
//! | [`result`]  | `SessionResult`, `Failure`                                |
//! | [`events`]  | `SearchEvent`, `EventSink`, `NoopSink`, `ChannelSink`     |
//! | [`session`] | `SearchSession`, `SessionBuilder`, `SessionHandle`        |
//!
//! # How a search runs
//!
//! ```text
//! SessionBuilder::build(&ctx)          initialization: snapshot caps,
//!         │                            register modes, query link sources
//!         ▼
//! Dispatcher::search(session, timeout) Idle → Running, handle returned
//!         │
//!         ▼  (dispatcher calls advance between yields)
//! SessionHandle::result()              blocks until Succeeded / Failed /
//!                                      Errored / Canceled
//! ```
//!
//! `SessionHandle::stop` requests cancellation; the session observes it at
//! its next yield point.  All search outcomes travel as [`SessionResult`]
//! values — nothing in this crate panics across a task boundary.

pub mod context;
pub mod events;
pub mod result;
pub mod session;
pub mod state;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use context::EngineContext;
pub use events::{ChannelSink, EventSink, NoopSink, SearchEvent};
pub use result::{Failure, SessionResult};
pub use session::{SearchSession, SessionBuilder, SessionHandle, SessionTick};
pub use state::SessionState;
