//! Error types for the ingestion crate.

use std::fmt;

use las_parser::LasError;
use projection::ProjectionError;
use thiserror::Error;

/// Which loader a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Uncompressed LAS
    Las,
    /// LASzip-compressed LAZ
    Laz,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Las => write!(f, "LAS"),
            FileKind::Laz => write!(f, "LAZ"),
        }
    }
}

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error(transparent)]
    Las(#[from] LasError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scene placement failed: {0}")]
    Placement(String),

    /// Single user-facing wrapper for any failure inside a load.
    #[error("Failed to load {kind} file: {source}")]
    LoadFailed {
        kind: FileKind,
        source: Box<IngestionError>,
    },
}

impl IngestionError {
    /// Wrap into [`IngestionError::LoadFailed`], unless already wrapped.
    pub fn into_load_failed(self, kind: FileKind) -> Self {
        match self {
            wrapped @ IngestionError::LoadFailed { .. } => wrapped,
            other => IngestionError::LoadFailed {
                kind,
                source: Box::new(other),
            },
        }
    }

    /// The underlying failure, looking through [`IngestionError::LoadFailed`].
    pub fn cause(&self) -> &IngestionError {
        match self {
            IngestionError::LoadFailed { source, .. } => source.cause(),
            other => other,
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failed_message() {
        let err = IngestionError::from(LasError::EmptyFile).into_load_failed(FileKind::Las);
        assert_eq!(
            err.to_string(),
            "Failed to load LAS file: No point records found in file"
        );
        assert!(matches!(err.cause(), IngestionError::Las(LasError::EmptyFile)));
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let err = IngestionError::from(LasError::LazVlrNotFound)
            .into_load_failed(FileKind::Laz)
            .into_load_failed(FileKind::Las);
        assert_eq!(err.to_string(), "Failed to load LAZ file: laszip vlr not found");
    }
}
