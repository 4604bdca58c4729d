//! Error types for LAS/LAZ parsing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LasError>;

#[derive(Debug, Error)]
pub enum LasError {
    #[error("{0}")]
    Format(String),

    #[error("Unsupported LAS version: {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("Unsupported point data record format: {0}")]
    UnsupportedFormat(u8),

    #[error("No point records found in file")]
    EmptyFile,

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Point decode error: {0}")]
    Decode(String),

    #[error("LASzip error: {0}")]
    LasZip(String),

    #[error("laszip vlr not found")]
    LazVlrNotFound,
}

impl From<laz::LasZipError> for LasError {
    fn from(err: laz::LasZipError) -> Self {
        LasError::LasZip(err.to_string())
    }
}
