//! Geographic primitives - coordinates, weighted samples, bounds
//!
//! Degrees everywhere. The only projection is the Web-Mercator pixel space used
//! by the native canvas.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Meters per degree, applied to both axes (city-scale approximation)
pub const METERS_PER_DEGREE: f64 = 111_300.0;

/// Tile edge in pixels for the Web-Mercator world
pub const TILE_SIZE: f64 = 256.0;

/// (latitude, longitude) pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[cfg(test)]
    /// Planar distance in meters under the degree approximation
    pub fn approx_distance_m(&self, other: &Coordinate) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt() * METERS_PER_DEGREE
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

/// One sample of a heat-style layer; `weight` is in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedPoint {
    pub lat: f64,
    pub lon: f64,
    pub weight: f64,
}

impl WeightedPoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// Axis-aligned box given by two opposite corners, in any order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub corner_a: Coordinate,
    pub corner_b: Coordinate,
}

impl Bounds {
    pub fn new(corner_a: Coordinate, corner_b: Coordinate) -> Self {
        Self { corner_a, corner_b }
    }

    pub fn south_west(&self) -> Coordinate {
        Coordinate::new(
            self.corner_a.lat.min(self.corner_b.lat),
            self.corner_a.lon.min(self.corner_b.lon),
        )
    }

    pub fn north_east(&self) -> Coordinate {
        Coordinate::new(
            self.corner_a.lat.max(self.corner_b.lat),
            self.corner_a.lon.max(self.corner_b.lon),
        )
    }

    #[cfg(test)]
    pub fn contains(&self, c: &Coordinate) -> bool {
        let sw = self.south_west();
        let ne = self.north_east();
        c.lat >= sw.lat && c.lat <= ne.lat && c.lon >= sw.lon && c.lon <= ne.lon
    }
}

/// Project to Web-Mercator world pixels at the given zoom
pub fn project(c: &Coordinate, zoom: f64) -> [f64; 2] {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lat = c.lat.clamp(-85.051_128_78, 85.051_128_78).to_radians();
    let x = (c.lon + 180.0) / 360.0 * scale;
    let y = (1.0 - ((PI / 4.0 + lat / 2.0).tan()).ln() / PI) / 2.0 * scale;
    [x, y]
}

/// Inverse of [`project`]
pub fn unproject(p: [f64; 2], zoom: f64) -> Coordinate {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lon = p[0] / scale * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * p[1] / scale);
    let lat = n.sinh().atan().to_degrees();
    Coordinate::new(lat, lon)
}
