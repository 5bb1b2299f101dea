//! `trek-search` — the search core of the trek engine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`path`]      | `Step`, `Path`, revalidation against live terrain       |
//! | [`goal`]      | `Goal` — cell, domain-reachability, or predicate        |
//! | [`trial`]     | `PathTrial` — resumable budgeted best-first search      |
//! | [`itinerary`] | `Itinerary`, `ItineraryTrial` — cross-domain assembly   |
//! | [`record`]    | `PathRecordManager` collaborator, `MemoryRecords`       |
//! | [`error`]     | `SearchError`, `SearchResult<T>`                        |
//!
//! # Execution model
//!
//! Nothing in this crate owns a thread.  A trial is a resumable state
//! machine: `advance` runs at most one increment's worth of expansions and
//! returns control — `Continue` (more work), `AwaitingTerrain` (blocked on a
//! chunk the privileged thread hasn't produced), or `Done`.  The dispatcher
//! decides when each trial runs again; cancellation and deadlines are
//! observed between increments, never inside one.

pub mod error;
pub mod goal;
pub mod itinerary;
pub mod path;
pub mod record;
pub mod trial;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{SearchError, SearchResult};
pub use goal::Goal;
pub use itinerary::{Itinerary, ItineraryEnd, ItineraryNotice, ItineraryStep, ItineraryTrial};
pub use path::{Path, Revalidation, Step};
pub use record::{MemoryRecords, PathRecord, PathRecordManager};
pub use trial::{PathTrial, TrialConfig, TrialEnd, TrialStats, TrialStep};
