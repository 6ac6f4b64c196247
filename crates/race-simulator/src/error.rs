//! Simulator error types.

use race_domain::DomainError;
use thiserror::Error;

/// Result alias for simulator operations.
pub type Result<T> = std::result::Result<T, SimulatorError>;

/// Errors raised while generating, loading or saving result sets.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("Invalid simulator config: {0}")]
    InvalidConfig(String),

    #[error("Noise distribution error: {0}")]
    Noise(#[from] rand_distr::NormalError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
