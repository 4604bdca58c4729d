//! Named CRS definitions parsed from PROJ-style strings.
//!
//! Only the subset needed for the supported projections is understood:
//!
//! ```text
//! +proj=lcc|merc|longlat  +lat_0 +lat_1 +lat_2 +lat_ts +lon_0 +x_0 +y_0
//! +k/+k_0  +a +b +rf  +ellps=GRS80|WGS84|sphere  +datum=WGS84
//! +units=m  +towgs84=0,0,0,...  +no_defs +type +wktext +nadgrids=@null
//! ```

use std::collections::HashMap;

use crate::ellipsoid::Ellipsoid;
use crate::error::{ProjectionError, Result};
use crate::geographic::Geographic;
use crate::lambert::LambertConformal;
use crate::mercator::Mercator;

/// Parameters accepted without affecting the math.
const IGNORED_PARAMS: &[&str] = &["no_defs", "type", "wktext", "nadgrids", "datum"];

/// Concrete projection behind a definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    LambertConformal(LambertConformal),
    Mercator(Mercator),
    Geographic(Geographic),
}

impl Projection {
    /// Geodetic (lon, lat) radians to CRS coordinates.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        match self {
            Projection::LambertConformal(p) => p.forward(lon, lat),
            Projection::Mercator(p) => p.forward(lon, lat),
            Projection::Geographic(p) => p.forward(lon, lat),
        }
    }

    /// CRS coordinates to geodetic (lon, lat) radians.
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        match self {
            Projection::LambertConformal(p) => p.inverse(x, y),
            Projection::Mercator(p) => p.inverse(x, y),
            Projection::Geographic(p) => p.inverse(x, y),
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, Projection::Geographic(_))
    }
}

/// A registered CRS: its name, source text and parsed projection.
#[derive(Debug, Clone, PartialEq)]
pub struct CrsDefinition {
    pub name: String,
    pub proj_string: String,
    pub projection: Projection,
}

impl CrsDefinition {
    /// Parse a PROJ-style definition string.
    pub fn from_proj_string(name: &str, proj_string: &str) -> Result<Self> {
        let invalid = |reason: String| ProjectionError::InvalidDefinition {
            name: name.to_string(),
            reason,
        };

        let params = parse_params(proj_string).map_err(&invalid)?;

        for key in params.keys() {
            if !is_known_param(key) {
                return Err(ProjectionError::Unsupported(format!("+{}", key)));
            }
        }

        let proj = params
            .get("proj")
            .and_then(|v| *v)
            .ok_or_else(|| invalid("missing +proj".to_string()))?;

        let number = |key: &str, default: f64| -> Result<f64> {
            match params.get(key) {
                None => Ok(default),
                Some(None) => Err(invalid(format!("+{} needs a value", key))),
                Some(Some(v)) => v
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("+{}={} is not a number", key, v))),
            }
        };

        let ellipsoid = parse_ellipsoid(&params, &number, &invalid)?;
        check_units(&params)?;
        check_towgs84(&params, &invalid)?;

        let projection = match proj {
            "lcc" => {
                let lat1 = number("lat_1", f64::NAN)?;
                if lat1.is_nan() {
                    return Err(invalid("lcc requires +lat_1".to_string()));
                }
                let lat2 = number("lat_2", lat1)?;
                let lat0 = number("lat_0", 0.0)?;
                let k0 = number("k_0", number("k", 1.0)?)?;
                Projection::LambertConformal(LambertConformal::new(
                    ellipsoid,
                    lat0,
                    number("lon_0", 0.0)?,
                    lat1,
                    lat2,
                    number("x_0", 0.0)?,
                    number("y_0", 0.0)?,
                    k0,
                )?)
            }
            "merc" => {
                let lon0 = number("lon_0", 0.0)?;
                let x0 = number("x_0", 0.0)?;
                let y0 = number("y_0", 0.0)?;
                if params.contains_key("lat_ts") {
                    Projection::Mercator(Mercator::with_true_scale(
                        ellipsoid,
                        number("lat_ts", 0.0)?,
                        lon0,
                        x0,
                        y0,
                    ))
                } else {
                    let k0 = number("k_0", number("k", 1.0)?)?;
                    Projection::Mercator(Mercator::new(ellipsoid, lon0, x0, y0, k0))
                }
            }
            "longlat" | "latlong" | "lonlat" | "latlon" => {
                Projection::Geographic(Geographic::new(ellipsoid))
            }
            other => return Err(ProjectionError::Unsupported(format!("+proj={}", other))),
        };

        Ok(Self {
            name: name.to_string(),
            proj_string: proj_string.to_string(),
            projection,
        })
    }

    pub fn is_geographic(&self) -> bool {
        self.projection.is_geographic()
    }
}

fn is_known_param(key: &str) -> bool {
    matches!(
        key,
        "proj" | "lat_0" | "lat_1" | "lat_2" | "lat_ts" | "lon_0" | "x_0" | "y_0" | "k" | "k_0"
            | "a" | "b" | "rf" | "ellps" | "units" | "towgs84"
    ) || IGNORED_PARAMS.contains(&key)
}

/// Split `+key=value +flag` tokens into a map.
fn parse_params(s: &str) -> std::result::Result<HashMap<&str, Option<&str>>, String> {
    let mut params = HashMap::new();
    for token in s.split_whitespace() {
        let token = token
            .strip_prefix('+')
            .ok_or_else(|| format!("token '{}' does not start with '+'", token))?;
        let (key, value) = match token.split_once('=') {
            Some((k, v)) => (k, Some(v)),
            None => (token, None),
        };
        if key.is_empty() {
            return Err("empty parameter name".to_string());
        }
        params.insert(key, value);
    }
    if params.is_empty() {
        return Err("empty definition".to_string());
    }
    Ok(params)
}

fn parse_ellipsoid<N, I>(
    params: &HashMap<&str, Option<&str>>,
    number: &N,
    invalid: &I,
) -> Result<Ellipsoid>
where
    N: Fn(&str, f64) -> Result<f64>,
    I: Fn(String) -> ProjectionError,
{
    if params.contains_key("a") {
        let a = number("a", 0.0)?;
        if a <= 0.0 {
            return Err(invalid(format!("semi-major axis {} must be positive", a)));
        }
        if params.contains_key("b") {
            return Ok(Ellipsoid::from_axes(a, number("b", a)?));
        }
        if params.contains_key("rf") {
            return Ok(Ellipsoid::from_inverse_flattening(a, number("rf", 0.0)?));
        }
        return Ok(Ellipsoid::sphere(a));
    }

    match params.get("ellps") {
        Some(Some(name)) => {
            Ellipsoid::by_name(name).ok_or_else(|| ProjectionError::Unsupported(format!("+ellps={}", name)))
        }
        Some(None) => Err(invalid("+ellps needs a value".to_string())),
        None => match params.get("datum") {
            None | Some(Some("WGS84")) => Ok(Ellipsoid::wgs84()),
            Some(Some(other)) => Err(ProjectionError::Unsupported(format!("+datum={}", other))),
            Some(None) => Err(invalid("+datum needs a value".to_string())),
        },
    }
}

fn check_units(params: &HashMap<&str, Option<&str>>) -> Result<()> {
    match params.get("units") {
        None | Some(Some("m")) => Ok(()),
        Some(Some(other)) => Err(ProjectionError::Unsupported(format!("+units={}", other))),
        Some(None) => Err(ProjectionError::Unsupported("+units".to_string())),
    }
}

/// Datum shifts are not modelled; only an all-zero `+towgs84` is accepted.
fn check_towgs84<I>(params: &HashMap<&str, Option<&str>>, invalid: &I) -> Result<()>
where
    I: Fn(String) -> ProjectionError,
{
    let Some(value) = params.get("towgs84") else {
        return Ok(());
    };
    let value = (*value).ok_or_else(|| invalid("+towgs84 needs a value".to_string()))?;
    for part in value.split(',') {
        let v: f64 = part
            .trim()
            .parse()
            .map_err(|_| invalid(format!("+towgs84 component '{}' is not a number", part)))?;
        if v != 0.0 {
            return Err(ProjectionError::Unsupported(format!("+towgs84={}", value)));
        }
    }
    Ok(())
}
