//! Fundamental geodetic and simulation types.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per degree of latitude (equirectangular approximation).
const METERS_PER_DEG: f64 = 111_139.0;

/// Geodetic position: latitude/longitude in degrees, altitude in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPos {
    pub lat: f64,
    pub lon: f64,
    pub alt_m: f64,
}

/// A 2D geofence vertex (no altitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoVertex {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPos {
    pub fn new(lat: f64, lon: f64, alt_m: f64) -> Self {
        Self { lat, lon, alt_m }
    }

    /// Horizontal ground distance to another position in meters.
    ///
    /// Equirectangular approximation — adequate for the tens-of-kilometers
    /// operating area this engine simulates.
    pub fn distance_m(&self, other: &GeoPos) -> f64 {
        let dy = (self.lat - other.lat) * METERS_PER_DEG;
        let dx = (self.lon - other.lon) * METERS_PER_DEG * self.lat.to_radians().cos();
        (dx * dx + dy * dy).sqrt()
    }

    /// Slant (3D) distance to another position in meters.
    pub fn distance_3d_m(&self, other: &GeoPos) -> f64 {
        let d = self.distance_m(other);
        let dz = self.alt_m - other.alt_m;
        (d * d + dz * dz).sqrt()
    }

    /// Initial great-circle bearing to another position, degrees from North.
    pub fn bearing_to_deg(&self, other: &GeoPos) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlon = (other.lon - self.lon).to_radians();
        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }

    /// Great-circle destination from this position along `bearing_deg` for
    /// `distance_m` meters. Altitude is carried over unchanged.
    pub fn destination(&self, bearing_deg: f64, distance_m: f64) -> GeoPos {
        let d = distance_m / EARTH_RADIUS_M;
        let brng = bearing_deg.to_radians();
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * d.cos() + lat1.cos() * d.sin() * brng.cos()).asin();
        let lon2 = lon1
            + (brng.sin() * d.sin() * lat1.cos()).atan2(d.cos() - lat1.sin() * lat2.sin());
        // Normalize longitude to -180..180.
        let lon2 = (lon2 + 3.0 * std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI)
            - std::f64::consts::PI;

        GeoPos {
            lat: lat2.to_degrees(),
            lon: lon2.to_degrees(),
            alt_m: self.alt_m,
        }
    }

    /// Same horizontal position at a different altitude.
    pub fn at_altitude(&self, alt_m: f64) -> GeoPos {
        GeoPos { alt_m, ..*self }
    }
}

/// Even-odd ray cast: is the point inside the polygon described by `poly`?
///
/// Vertices are taken in order; the polygon closes itself. Fewer than three
/// vertices can never contain a point.
pub fn point_in_polygon(point: &GeoPos, poly: &[GeoVertex]) -> bool {
    if poly.len() < 3 {
        return false;
    }
    let (x, y) = (point.lat, point.lon);
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (xi, yi) = (poly[i].lat, poly[i].lon);
        let (xj, yj) = (poly[j].lat, poly[j].lon);
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the fixed tick rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt();
    }
}
