//! Process-wide registry of named CRS definitions.
//!
//! The built-in codes (EPSG:2154, EPSG:3857, EPSG:4326) are registered the
//! first time the registry is touched, so lookups never race an explicit
//! [`register_defaults`] call. Aliases such as EPSG:900913 and CRS:84 share
//! the canonical definition.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use lidar_common::CrsCode;
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::definition::CrsDefinition;
use crate::error::{ProjectionError, Result};

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<CrsDefinition>>>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for code in CrsCode::all() {
        match CrsDefinition::from_proj_string(code.as_str(), code.proj_definition()) {
            Ok(def) => {
                let def = Arc::new(def);
                for alias in code.aliases() {
                    map.insert(normalize(alias), Arc::clone(&def));
                }
                map.insert(normalize(code.as_str()), def);
            }
            Err(e) => warn!(crs = %code, error = %e, "Built-in CRS definition rejected"),
        }
    }
    debug!(count = map.len(), "Registered built-in CRS definitions");
    RwLock::new(map)
});

fn normalize(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

/// Register the built-in definitions. Idempotent; only the first call in the
/// process does any work.
pub fn register_defaults() {
    Lazy::force(&REGISTRY);
}

/// Register (or replace) a named definition.
///
/// Registering the same name with the same definition string is a no-op.
pub fn register(name: &str, proj_string: &str) -> Result<()> {
    let key = normalize(name);
    if key.is_empty() {
        return Err(ProjectionError::InvalidDefinition {
            name: name.to_string(),
            reason: "empty name".to_string(),
        });
    }

    {
        let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = registry.get(&key) {
            if existing.proj_string.trim() == proj_string.trim() {
                return Ok(());
            }
        }
    }

    let def = CrsDefinition::from_proj_string(&key, proj_string)?;
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    if registry.insert(key.clone(), Arc::new(def)).is_some() {
        warn!(crs = %key, "Replaced existing CRS definition");
    } else {
        debug!(crs = %key, "Registered CRS definition");
    }
    Ok(())
}

/// Resolve a registered definition by name (case-insensitive).
pub fn lookup(name: &str) -> Result<Arc<CrsDefinition>> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    registry
        .get(&normalize(name))
        .cloned()
        .ok_or_else(|| ProjectionError::UnknownCrs(name.to_string()))
}

pub fn is_registered(name: &str) -> bool {
    lookup(name).is_ok()
}
