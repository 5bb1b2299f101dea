//! `trek-mode` — movement capabilities for the trek route-search engine.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`option`] | `MoveOption` — one proposed transition                    |
//! | [`mode`]   | `Mode` trait, `ModeProbe`, shared geometry helpers        |
//! | [`walk`]   | Ground movement, cardinal + guarded diagonals             |
//! | [`jump`]   | One-block step-ups and bounded drops                      |
//! | [`swim`]   | Movement through liquid                                   |
//! | [`fly`]    | Free axis movement through open space                     |
//! | [`climb`]  | Vertical movement on climbable surfaces                   |
//! | [`door`]   | Passage through closed doors                              |
//! | [`dig`]    | Breaking through solid terrain at high cost               |
//!
//! # Contract
//!
//! A capability proposes transitions; it never mutates search state and it
//! never fails.  A terrain cell it cannot see yet (chunk still pending)
//! simply produces no proposal this increment — the trial re-expands the
//! node once the chunk arrives.  A cell that is permanently unknowable
//! ([`BlockKind::Unavailable`][trek_terrain::BlockKind]) is an ordinary
//! rejection.
//!
//! Capability gating (who may fly, who may dig) is not decided here: the
//! session registers exactly the capabilities its requester is entitled to.

pub mod climb;
pub mod dig;
pub mod door;
pub mod fly;
pub mod jump;
pub mod mode;
pub mod option;
pub mod swim;
pub mod walk;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use climb::ClimbMode;
pub use dig::DigMode;
pub use door::DoorMode;
pub use fly::FlyMode;
pub use jump::JumpMode;
pub use mode::{Mode, ModeProbe, NoopProbe};
pub use option::MoveOption;
pub use swim::SwimMode;
pub use walk::WalkMode;
