// src/geo.rs
// Coordinates, great-circle distance and search bounding boxes

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

const METERS_PER_DEGREE_LAT: f64 = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside the valid lat/lng ranges.
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(format!("latitude {lat} is out of range"));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(format!("longitude {lng} is out of range"));
        }
        Ok(Self { lat, lng })
    }

    /// Haversine distance in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_phi = (other.lat - self.lat).to_radians();
        let d_lambda = (other.lng - self.lng).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_METERS * c
    }

    /// Format as "lat,lng" for geocoding query strings.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Lat/lng rectangle used to prefilter candidates before exact distance checks.
///
/// A box that crosses the antimeridian has `min_lng > max_lng`; its longitude
/// span is then `lng >= min_lng OR lng <= max_lng`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Smallest box that contains every point within `radius_meters` of `center`.
    pub fn around(center: &Coordinate, radius_meters: f64) -> Self {
        let d_lat = radius_meters / METERS_PER_DEGREE_LAT;
        let min_lat = (center.lat - d_lat).max(-90.0);
        let max_lat = (center.lat + d_lat).min(90.0);

        // Longitude degrees shrink toward the poles; widen to the full range there.
        let cos_lat = center.lat.to_radians().cos();
        if cos_lat <= 1e-9 || max_lat >= 90.0 || min_lat <= -90.0 {
            return Self { min_lat, max_lat, min_lng: -180.0, max_lng: 180.0 };
        }
        let d_lng = radius_meters / (METERS_PER_DEGREE_LAT * cos_lat);
        if d_lng >= 180.0 {
            return Self { min_lat, max_lat, min_lng: -180.0, max_lng: 180.0 };
        }

        let mut min_lng = center.lng - d_lng;
        let mut max_lng = center.lng + d_lng;
        if min_lng < -180.0 {
            min_lng += 360.0;
        }
        if max_lng > 180.0 {
            max_lng -= 360.0;
        }

        Self { min_lat, max_lat, min_lng, max_lng }
    }

    /// True when the longitude span wraps across ±180°.
    pub fn crosses_antimeridian(&self) -> bool {
        self.min_lng > self.max_lng
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        if !(self.min_lat..=self.max_lat).contains(&point.lat) {
            return false;
        }
        if self.crosses_antimeridian() {
            point.lng >= self.min_lng || point.lng <= self.max_lng
        } else {
            (self.min_lng..=self.max_lng).contains(&point.lng)
        }
    }
}
