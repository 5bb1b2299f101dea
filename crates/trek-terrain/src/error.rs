//! Terrain-subsystem error type.

use thiserror::Error;

/// Errors produced by `trek-terrain`.
///
/// Deliberately small: a missing or unproducible chunk is *data* (an
/// unavailable chunk, a pending query), never an error — see
/// [`TerrainChunk::unavailable`][crate::TerrainChunk::unavailable].
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("terrain cache configuration error: {0}")]
    Config(String),
}

pub type TerrainResult<T> = Result<T, TerrainError>;
