//! Coordinate reference system transformations.
//!
//! Implements map projections from scratch without external dependencies.
//! Named CRS definitions live in a process-wide registry; points move between
//! two of them by inverse-projecting to geodetic lon/lat and forward-projecting
//! into the target. Datum shifts are not modelled.

pub mod definition;
pub mod ellipsoid;
pub mod error;
pub mod geographic;
pub mod lambert;
pub mod mercator;
pub mod registry;
pub mod transform;

pub use definition::{CrsDefinition, Projection};
pub use ellipsoid::Ellipsoid;
pub use error::{ProjectionError, Result};
pub use geographic::Geographic;
pub use lambert::LambertConformal;
pub use mercator::Mercator;
pub use registry::{is_registered, lookup, register, register_defaults};
pub use transform::{transform, CrsTransformer};
