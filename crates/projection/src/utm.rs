//! UTM zone derivation from geographic coordinates.
//!
//! UTM divides the world into 60 zones, each 6 degrees of longitude wide,
//! with a northern and southern variant split at the equator.

use std::fmt;

/// Hemisphere of a UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    North,
    South,
}

/// A UTM zone identifier: zone number (1-60) plus hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtmZone {
    pub zone: u8,
    pub hemisphere: Hemisphere,
}

impl UtmZone {
    /// Derive the UTM zone for a geographic point.
    ///
    /// Zone 1 starts at 180°W and each zone is 6° wide. The zone number is
    /// clamped to [1, 60]: at the antimeridian, or slightly beyond it due
    /// to floating error, the result degrades to the nearest valid zone
    /// rather than failing.
    pub fn for_point(lon: f64, lat: f64) -> Self {
        let raw = ((lon + 180.0) / 6.0).floor() as i64 + 1;
        let zone = raw.clamp(1, 60) as u8;
        let hemisphere = if lat < 0.0 {
            Hemisphere::South
        } else {
            Hemisphere::North
        };
        Self { zone, hemisphere }
    }

    /// EPSG code for the zone: 326xx northern, 327xx southern.
    pub fn epsg(&self) -> u32 {
        match self.hemisphere {
            Hemisphere::North => 32600 + self.zone as u32,
            Hemisphere::South => 32700 + self.zone as u32,
        }
    }

    /// Central meridian of the zone in degrees.
    ///
    /// Zone N covers longitudes (N-1)*6 - 180 to N*6 - 180; the central
    /// meridian is the middle of that band.
    pub fn central_meridian(&self) -> f64 {
        (self.zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
    }

    pub fn is_south(&self) -> bool {
        self.hemisphere == Hemisphere::South
    }

    /// CRS authority string, e.g. "EPSG:32648".
    pub fn crs(&self) -> String {
        format!("EPSG:{}", self.epsg())
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.hemisphere {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
        };
        write!(f, "{}{}", self.zone, suffix)
    }
}

/// Compute the zone number and EPSG-like code for a geographic point.
pub fn compute_zone(lon: f64, lat: f64) -> (u8, u32) {
    let zone = UtmZone::for_point(lon, lat);
    (zone.zone, zone.epsg())
}
