//! Framework error type.
//!
//! Sub-crates define their own error enums and either convert into
//! `TrekError` via `From` impls or wrap it as one variant.  Both patterns
//! are acceptable; prefer whichever keeps error sites clean.

use thiserror::Error;

use crate::{Cell, DomainId};

/// The top-level error type for `trek-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum TrekError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cell {cell} is not in domain {expected}")]
    DomainMismatch { cell: Cell, expected: DomainId },
}

/// Shorthand result type for all `trek-*` crates.
pub type TrekResult<T> = Result<T, TrekError>;
