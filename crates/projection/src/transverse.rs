//! Transverse Mercator projection on the WGS84 ellipsoid.
//!
//! UTM is a transverse Mercator with scale factor 0.9996 at the central
//! meridian, a 500 km false easting and a 10 000 km false northing south of
//! the equator. Forward and inverse transforms follow the standard series
//! expansions (Snyder, "Map Projections: A Working Manual", eqs. 8-9..8-25).
//!
//! A standard UTM zone assumes geometry stays within a narrow band around
//! the central meridian. Country boundaries regularly break that
//! assumption (a coastline reaching into the neighbouring zone, or a
//! multi-part territory straddling the antimeridian), so projections are
//! also available with widened validity limits that never clip such
//! geometry.

use std::f64::consts::PI;

use crate::utm::{Hemisphere, UtmZone};

/// WGS84 semi-major axis (meters).
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// UTM scale factor at the central meridian.
pub const UTM_SCALE_FACTOR: f64 = 0.9996;
/// UTM false easting (meters).
pub const UTM_FALSE_EASTING: f64 = 500_000.0;
/// False northing applied south of the equator (meters).
pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Half-width of the x validity range a standard UTM zone assumes (meters).
pub const STANDARD_ZONE_HALF_WIDTH: f64 = 1_250_000.0;
/// Half-width of the widened validity range (meters), over an order of
/// magnitude larger than the standard zone band.
pub const WIDENED_HALF_WIDTH: f64 = 20_000_000.0;

/// Transverse Mercator projection parameters.
///
/// Coordinates are (x = easting, y = northing) in meters; geographic input
/// is (x = longitude, y = latitude) in degrees.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    /// Central meridian in degrees.
    pub central_meridian: f64,
    /// Scale factor at the central meridian.
    pub scale_factor: f64,
    /// False easting in meters.
    pub false_easting: f64,
    /// False northing in meters.
    pub false_northing: f64,
    /// x validity range in meters.
    pub x_limits: (f64, f64),
    /// y validity range in meters.
    pub y_limits: (f64, f64),
    /// First eccentricity squared.
    e2: f64,
    /// Second eccentricity squared.
    ep2: f64,
}

impl TransverseMercator {
    fn for_zone(zone: UtmZone, half_width: f64) -> Self {
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let false_northing = match zone.hemisphere {
            Hemisphere::North => 0.0,
            Hemisphere::South => UTM_FALSE_NORTHING_SOUTH,
        };
        Self {
            central_meridian: zone.central_meridian(),
            scale_factor: UTM_SCALE_FACTOR,
            false_easting: UTM_FALSE_EASTING,
            false_northing,
            x_limits: (UTM_FALSE_EASTING - half_width, UTM_FALSE_EASTING + half_width),
            y_limits: (false_northing - half_width, false_northing + half_width),
            e2,
            ep2: e2 / (1.0 - e2),
        }
    }

    /// Standard UTM projection for a zone, with the usual validity limits.
    pub fn utm(zone: UtmZone) -> Self {
        Self::for_zone(zone, STANDARD_ZONE_HALF_WIDTH)
    }

    /// UTM projection with widened validity limits, for geometries that
    /// extend past the nominal zone band.
    pub fn utm_unbounded(zone: UtmZone) -> Self {
        Self::for_zone(zone, WIDENED_HALF_WIDTH)
    }

    /// Size of the x validity range in meters.
    pub fn x_range(&self) -> f64 {
        self.x_limits.1 - self.x_limits.0
    }

    /// Whether a projected point lies inside the validity limits.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_limits.0 && x <= self.x_limits.1 && y >= self.y_limits.0 && y <= self.y_limits.1
    }

    /// Project geographic coordinates (degrees) to easting/northing (meters).
    ///
    /// NaN input is a caller precondition violation and is not handled.
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let phi = lat.to_radians();
        // Normalize the longitude difference so geometry on the far side of
        // the antimeridian projects continuously.
        let mut dlam = (lon - self.central_meridian).to_radians();
        while dlam > PI {
            dlam -= 2.0 * PI;
        }
        while dlam < -PI {
            dlam += 2.0 * PI;
        }

        let e2 = self.e2;
        let ep2 = self.ep2;
        let k0 = self.scale_factor;

        let sin_phi = phi.sin();
        let cos_phi = phi.cos();
        let tan_phi = phi.tan();

        let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = dlam * cos_phi;
        let m = self.meridional_arc(phi);

        let x = k0
            * n
            * (a
                + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
            + self.false_easting;
        let y = k0
            * (m + n
                * tan_phi
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0))
            + self.false_northing;

        (x, y)
    }

    /// Inverse transform: easting/northing (meters) to (lon, lat) degrees.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let e2 = self.e2;
        let ep2 = self.ep2;
        let k0 = self.scale_factor;

        let m = (y - self.false_northing) / k0;
        let mu = m
            / (WGS84_A
                * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

        // Footpoint latitude.
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let sin1 = phi1.sin();
        let cos1 = phi1.cos();
        let tan1 = phi1.tan();

        let c1 = ep2 * cos1 * cos1;
        let t1 = tan1 * tan1;
        let n1 = WGS84_A / (1.0 - e2 * sin1 * sin1).sqrt();
        let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin1 * sin1).powf(1.5);
        let d = (x - self.false_easting) / (n1 * k0);

        let lat = phi1
            - (n1 * tan1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let lon = self.central_meridian.to_radians()
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos1;

        (lon.to_degrees(), lat.to_degrees())
    }

    /// Meridional arc length from the equator (Snyder eq. 3-21).
    fn meridional_arc(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        WGS84_A
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(n: u8, hemisphere: Hemisphere) -> UtmZone {
        UtmZone { zone: n, hemisphere }
    }

    #[test]
    fn test_central_meridian_easting() {
        // Zone 13 is centered on 105°W: any point on the central meridian
        // projects to the false easting.
        let proj = TransverseMercator::utm_unbounded(zone(13, Hemisphere::North));
        for lat in [0.0, 12.5, 27.0, 45.0, 71.0] {
            let (x, _) = proj.forward(-105.0, lat);
            assert!(
                (x - 500_000.0).abs() < 1.0,
                "easting at central meridian, lat {lat}: {x}"
            );
        }
    }

    #[test]
    fn test_southern_false_northing() {
        let proj = TransverseMercator::utm_unbounded(zone(23, Hemisphere::South));
        let (_, y) = proj.forward(-45.0, 0.0);
        assert!(y >= 9_000_000.0, "equator northing in the south: {y}");
    }

    #[test]
    fn test_widened_limits() {
        let standard = TransverseMercator::utm(zone(48, Hemisphere::North));
        let widened = TransverseMercator::utm_unbounded(zone(48, Hemisphere::North));
        assert!(widened.x_range() >= 10.0 * standard.x_range());

        // A point well past the standard band is still inside the widened
        // limits instead of being clipped.
        let (x, y) = widened.forward(130.0, 5.0);
        assert!(!standard.contains(x, y));
        assert!(widened.contains(x, y));
    }

    #[test]
    fn test_meridional_arc_anchor() {
        // The WGS84 meridional arc to 45°N is 4 984 944.4 m; scaled by k0
        // that pins the northing on the central meridian.
        let proj = TransverseMercator::utm(zone(31, Hemisphere::North));
        let (_, y) = proj.forward(3.0, 45.0);
        assert!(
            (y - 4_984_944.4 * UTM_SCALE_FACTOR).abs() < 10.0,
            "northing at 45N: {y}"
        );
    }

    #[test]
    fn test_forward_inverse_roundtrip() {
        let proj = TransverseMercator::utm_unbounded(zone(48, Hemisphere::North));
        for (lon, lat) in [(103.8, 1.3), (104.0, 1.5), (101.5, 4.0), (108.0, -2.0)] {
            let (x, y) = proj.forward(lon, lat);
            let (lon2, lat2) = proj.inverse(x, y);
            assert!((lon - lon2).abs() < 1e-7, "lon roundtrip: {lon} vs {lon2}");
            assert!((lat - lat2).abs() < 1e-7, "lat roundtrip: {lat} vs {lat2}");
        }
    }

    #[test]
    fn test_antimeridian_continuity() {
        // Fiji-style geometry: points either side of the antimeridian must
        // land on the same side of the projected plane, not 360° apart.
        let proj = TransverseMercator::utm_unbounded(zone(60, Hemisphere::South));
        let (x_west, _) = proj.forward(179.8, -17.0);
        let (x_east, _) = proj.forward(-179.8, -17.0);
        assert!(
            (x_east - x_west).abs() < 100_000.0,
            "antimeridian neighbours split apart: {x_west} vs {x_east}"
        );
        assert!(x_east > x_west);
    }
}
