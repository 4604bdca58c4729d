//! LAS/LAZ point-cloud file reader (ASPRS LAS 1.0 - 1.4).
//!
//! This crate provides the binary side of LIDAR ingestion: the public header
//! block, variable-length records, and record-at-a-time access to the point
//! data, either straight from the file bytes or through the LASzip
//! decompressor.

pub mod error;
pub mod header;
pub mod laszip;
pub mod source;
pub mod vlr;

pub use error::{LasError, Result};
pub use header::{parse_and_validate, parse_header, validate_header, LasHeader};
pub use laszip::LazPointSource;
pub use source::{PointSource, RawPointSource, MIN_RECORD_LENGTH};
pub use vlr::{read_vlrs, Vlr};
