//! Fatal generation errors.
//!
//! Only configuration problems are errors. Per-attempt placement failures
//! are recoverable and never surface here.

use thiserror::Error;

/// Problem with the template library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    #[error("template library is empty")]
    Empty,
    #[error("no spawn template in library")]
    MissingSpawn,
    #[error("spawn template '{0}' has no sockets")]
    SpawnWithoutSockets(String),
    #[error("duplicate template id '{0}'")]
    DuplicateId(String),
    #[error("template '{0}' has zero spawn weight")]
    ZeroWeight(String),
    #[error("template '{template}' weight {weight} exceeds the maximum of {max}")]
    WeightTooLarge { template: String, weight: u32, max: u32 },
    #[error("template '{0}' has an empty footprint")]
    EmptyFootprint(String),
    #[error("template '{template}' socket {socket} facing is not a unit vector")]
    NonUnitFacing { template: String, socket: usize },
}

/// Problem with the generation parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("room count must include the spawn module (got {0})")]
    RoomCountTooSmall(u32),
    #[error("placement attempt budget must be at least 1")]
    ZeroAttemptBudget,
    #[error("cell size must be finite and positive (got {0})")]
    InvalidCellSize(f32),
    #[error("gallery spawn probability must be within [0, 1] (got {0})")]
    InvalidSpawnProbability(f32),
    #[error("gallery content for slot '{0}' names no template")]
    EmptyContentTemplate(String),
}

/// A fatal error that aborts the whole run before anything is confirmed.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid generation parameters: {}", join(.0))]
    InvalidParams(Vec<ConfigError>),
    #[error("invalid template library: {}", join(.0))]
    InvalidLibrary(Vec<LibraryError>),
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn join<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
