//! Conversions between WGS84 geodetic coordinates and a local east-north-up (ENU) frame.

use bevy_math::DVec3;

/// WGS84 semi-major axis in meters.
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 semi-minor axis in meters.
const WGS84_B: f64 = 6_356_752.314_245;

/// A geodetic position: latitude and longitude in degrees, altitude in meters above the
/// ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LatLonAlt {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Altitude in meters.
    pub alt: f64,
}

impl LatLonAlt {
    /// Create a new geodetic position.
    pub fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self { lat, lon, alt }
    }

    /// Earth-centered, earth-fixed cartesian coordinates of this position.
    pub fn to_ecef(&self) -> DVec3 {
        let a2 = WGS84_A * WGS84_A;
        let b2 = WGS84_B * WGS84_B;

        let (sin_lat, cos_lat) = self.lat.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.lon.to_radians().sin_cos();

        let l = 1.0 / (a2 * cos_lat * cos_lat + b2 * sin_lat * sin_lat).sqrt();
        let horizontal = (a2 * l + self.alt) * cos_lat;

        DVec3::new(
            horizontal * cos_lon,
            horizontal * sin_lon,
            (b2 * l + self.alt) * sin_lat,
        )
    }

    /// Position of `self` in the ENU frame anchored at `reference`. X is east, Y is north, and Z
    /// is up, all in meters.
    pub fn to_enu(&self, reference: &LatLonAlt) -> DVec3 {
        ecef_to_enu(self.to_ecef(), reference)
    }
}

/// Express an ECEF position in the ENU frame anchored at `reference`.
pub fn ecef_to_enu(ecef: DVec3, reference: &LatLonAlt) -> DVec3 {
    let d = ecef - reference.to_ecef();

    let (sin_lat, cos_lat) = reference.lat.to_radians().sin_cos();
    let (sin_lon, cos_lon) = reference.lon.to_radians().sin_cos();

    DVec3::new(
        -sin_lon * d.x + cos_lon * d.y,
        -sin_lat * cos_lon * d.x - sin_lat * sin_lon * d.y + cos_lat * d.z,
        cos_lat * cos_lon * d.x + cos_lat * sin_lon * d.y + sin_lat * d.z,
    )
}
