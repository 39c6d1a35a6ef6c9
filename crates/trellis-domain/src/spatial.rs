//! Spatial point values

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Coordinate reference system of a [`Point`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// 2D cartesian (SRID 7203)
    #[serde(rename = "cartesian")]
    Cartesian,
    /// 3D cartesian (SRID 9157)
    #[serde(rename = "cartesian-3d")]
    Cartesian3D,
    /// 2D WGS-84 geographic (SRID 4326)
    #[serde(rename = "wgs-84")]
    Wgs84,
    /// 3D WGS-84 geographic (SRID 4979)
    #[serde(rename = "wgs-84-3d")]
    Wgs84_3D,
}

impl Crs {
    /// Name of the CRS as used in exported documents
    pub fn name(&self) -> &'static str {
        match self {
            Crs::Cartesian => "cartesian",
            Crs::Cartesian3D => "cartesian-3d",
            Crs::Wgs84 => "wgs-84",
            Crs::Wgs84_3D => "wgs-84-3d",
        }
    }

    /// Parse a CRS name (case-insensitive)
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        match name.to_lowercase().as_str() {
            "cartesian" => Ok(Crs::Cartesian),
            "cartesian-3d" => Ok(Crs::Cartesian3D),
            "wgs-84" => Ok(Crs::Wgs84),
            "wgs-84-3d" => Ok(Crs::Wgs84_3D),
            _ => Err(DomainError::UnknownCrs(name.to_string())),
        }
    }

    /// Spatial reference id
    pub fn srid(&self) -> u32 {
        match self {
            Crs::Cartesian => 7203,
            Crs::Cartesian3D => 9157,
            Crs::Wgs84 => 4326,
            Crs::Wgs84_3D => 4979,
        }
    }

    /// Whether coordinates are longitude/latitude(/height)
    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Wgs84 | Crs::Wgs84_3D)
    }

    /// Whether points carry a third coordinate
    pub fn is_3d(&self) -> bool {
        matches!(self, Crs::Cartesian3D | Crs::Wgs84_3D)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A point in a 2D or 3D coordinate reference system
///
/// For geographic systems `x` is the longitude and `y` the latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    crs: Crs,
    x: f64,
    y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    z: Option<f64>,
}

impl Point {
    /// Create a point, checking that the dimension matches the CRS
    pub fn new(crs: Crs, x: f64, y: f64, z: Option<f64>) -> Result<Self, DomainError> {
        if crs.is_3d() != z.is_some() {
            return Err(DomainError::InvalidPoint(format!(
                "{} expects {} coordinates",
                crs,
                if crs.is_3d() { 3 } else { 2 }
            )));
        }
        Ok(Self { crs, x, y, z })
    }

    /// 2D cartesian point
    pub fn cartesian(x: f64, y: f64) -> Self {
        Self { crs: Crs::Cartesian, x, y, z: None }
    }

    /// 3D cartesian point
    pub fn cartesian_3d(x: f64, y: f64, z: f64) -> Self {
        Self { crs: Crs::Cartesian3D, x, y, z: Some(z) }
    }

    /// 2D WGS-84 point
    pub fn wgs84(longitude: f64, latitude: f64) -> Self {
        Self { crs: Crs::Wgs84, x: longitude, y: latitude, z: None }
    }

    /// 3D WGS-84 point
    pub fn wgs84_3d(longitude: f64, latitude: f64, height: f64) -> Self {
        Self { crs: Crs::Wgs84_3D, x: longitude, y: latitude, z: Some(height) }
    }

    /// Coordinate reference system
    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// First coordinate
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Second coordinate
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Third coordinate, for 3D systems
    pub fn z(&self) -> Option<f64> {
        self.z
    }
}
