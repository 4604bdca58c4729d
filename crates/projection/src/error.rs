//! Error types for CRS lookup and projection.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProjectionError>;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Unknown CRS: {0}")]
    UnknownCrs(String),

    #[error("Invalid definition for {name}: {reason}")]
    InvalidDefinition { name: String, reason: String },

    #[error("Unsupported projection parameter: {0}")]
    Unsupported(String),

    #[error("Coordinate outside projection domain: {0}")]
    OutOfDomain(String),
}
