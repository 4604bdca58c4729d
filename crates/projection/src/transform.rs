//! Point transformation between two registered CRSs.

use std::sync::Arc;

use crate::definition::CrsDefinition;
use crate::error::{ProjectionError, Result};
use crate::registry::lookup;

/// A resolved source → target pair, looked up once and reused per point.
#[derive(Debug, Clone)]
pub struct CrsTransformer {
    source: Arc<CrsDefinition>,
    target: Arc<CrsDefinition>,
    identity: bool,
}

impl CrsTransformer {
    /// Resolve both definitions. Fails with [`ProjectionError::UnknownCrs`] if
    /// either name was never registered.
    pub fn new(source: &str, target: &str) -> Result<Self> {
        let source = lookup(source)?;
        let target = lookup(target)?;
        let identity = source.name == target.name;
        Ok(Self {
            source,
            target,
            identity,
        })
    }

    pub fn source(&self) -> &CrsDefinition {
        &self.source
    }

    pub fn target(&self) -> &CrsDefinition {
        &self.target
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Transform one planar coordinate.
    #[inline]
    pub fn transform(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        if self.identity {
            return Ok((x, y));
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::OutOfDomain(format!(
                "non-finite input ({}, {})",
                x, y
            )));
        }
        let (lon, lat) = self.source.projection.inverse(x, y)?;
        self.target.projection.forward(lon, lat)
    }

    /// The reverse transformer.
    pub fn inverse(&self) -> Self {
        Self {
            source: Arc::clone(&self.target),
            target: Arc::clone(&self.source),
            identity: self.identity,
        }
    }
}

/// Transform a single planar coordinate between two named CRSs.
pub fn transform(source: &str, target: &str, x: f64, y: f64) -> Result<(f64, f64)> {
    CrsTransformer::new(source, target)?.transform(x, y)
}
