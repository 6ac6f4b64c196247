//! Analytics error types.

use race_domain::{DomainError, EntityKind};
use thiserror::Error;

/// Analytics errors.
///
/// All of these are local validation failures; retrying with the same input
/// yields the same error.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Season window bounds are inverted
    #[error("Invalid season range: year_min {year_min} is after year_max {year_max}")]
    InvalidRange {
        /// Requested first season
        year_min: i32,
        /// Requested last season
        year_max: i32,
    },

    /// Scoring mode needs team context that was not supplied
    #[error("Missing team context: {0}")]
    MissingContext(String),

    /// An id has no entry in the name tables
    #[error("Unknown entity: {kind} with id {id}")]
    UnknownEntity {
        /// Driver or constructor
        kind: EntityKind,
        /// Raw id
        id: u32,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Data conversion error
    #[error("Data conversion error: {0}")]
    Conversion(#[from] serde_json::Error),
}

impl From<DomainError> for AnalyticsError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::UnknownEntity { kind, id } => Self::UnknownEntity { kind, id },
            DomainError::InvalidRange { year_min, year_max } => {
                Self::InvalidRange { year_min, year_max }
            }
        }
    }
}

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
