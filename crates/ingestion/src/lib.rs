//! LIDAR point-cloud ingestion library.
//!
//! Loads LAS and LAZ files into an immutable [`PointCloud`]: the header is
//! parsed and validated, every point is reprojected from the source CRS into
//! the target CRS, and positions are normalized to the cloud's own minimum.
//!
//! # Architecture
//!
//! - [`las_parser`] decodes the header, VLRs and point records
//! - [`projection`] reprojects X/Y between registered CRS definitions
//! - [`decoder`] turns records into structure-of-arrays buffers
//! - [`placement`] aligns a cloud with the Web Mercator tile grid
//!
//! ```no_run
//! # async fn example(bytes: bytes::Bytes) -> ingestion::Result<()> {
//! let cloud = ingestion::load_compressed(bytes, None, None).await?;
//! println!("{}", cloud.metadata());
//! # Ok(())
//! # }
//! ```

pub mod classification;
pub mod config;
pub mod decoder;
pub mod error;
mod loader;
pub mod placement;
mod pointcloud;

// Re-exports
pub use classification::{classification_color, classification_name, classification_rgb};
pub use config::{LoaderConfig, PlacementConfig, DEFAULT_SOURCE_CRS, DEFAULT_TARGET_CRS};
pub use decoder::{decode_points, DecodedPoints};
pub use error::{FileKind, IngestionError, Result};
pub use loader::{kind_from_extension, kind_from_header, load_compressed, load_raw, Loader};
pub use placement::{grid_to_world, world_to_grid, ScenePlacement};
pub use pointcloud::{Metadata, PointCloud};
