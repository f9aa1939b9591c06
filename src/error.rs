// src/error.rs

use thiserror::Error;

/// Errors raised at the edges of the simulator: identifier parsing,
/// configuration loading, export and saved-run persistence.
///
/// The engine itself is total and never returns one of these.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown policy id: {0}")]
    UnknownPolicy(String),

    #[error("unknown demand pattern: {0}")]
    UnknownPattern(String),

    #[error("unknown scenario id: {0}")]
    UnknownScenario(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("saved run not found: {0}")]
    RunNotFound(String),

    #[error("run ids are ASCII letters and digits only, got {0:?}")]
    InvalidRunId(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
