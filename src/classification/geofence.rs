// src/classification/geofence.rs
//! Coarse coordinate tests used as the last-resort country classifier.
//!
//! Canada is approximated as a union of latitude/longitude bands inside an
//! outer box. North of 60°N everything inside the box is Canada; below that
//! the bands narrow by longitude as latitude drops toward the border so that
//! northern US states (Washington, Minnesota, Michigan, New York, Maine) stay
//! outside. This is a safety net for listings with missing metadata, not a
//! geocoder.

use crate::models::Coordinates;
use crate::utils::constants::{
    NORTH_AMERICA_LAT_MAX, NORTH_AMERICA_LAT_MIN, NORTH_AMERICA_LON_MAX, NORTH_AMERICA_LON_MIN,
};

/// Half-open in latitude (`lat_min <= lat < lat_max`), closed in longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLonBand {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl LatLonBand {
    pub const fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    pub fn contains(&self, coords: Coordinates) -> bool {
        coords.lat >= self.lat_min
            && coords.lat < self.lat_max
            && coords.lon >= self.lon_min
            && coords.lon <= self.lon_max
    }
}

pub const CANADA_OUTER: LatLonBand = LatLonBand::new(41.7, 85.0, -141.0, -52.0);

pub const CANADA_BANDS: [LatLonBand; 14] = [
    // North of 60°N
    LatLonBand::new(60.0, 85.0, -141.0, -52.0),
    // 49th parallel and up
    LatLonBand::new(49.0, 60.0, -141.0, -52.0),
    // Southern Vancouver Island, clear of the Olympic Peninsula tip
    LatLonBand::new(48.4, 49.0, -124.8, -123.8),
    LatLonBand::new(48.2, 49.0, -123.8, -123.2),
    // North shore of Lake Superior and everything east of it
    LatLonBand::new(48.0, 49.0, -89.5, -52.0),
    LatLonBand::new(47.5, 48.0, -89.5, -84.0),
    // North channel of Lake Huron
    LatLonBand::new(46.3, 48.0, -84.0, -82.4),
    // Ontario and Quebec above New York and Vermont
    LatLonBand::new(45.0, 48.0, -82.4, -71.5),
    // Quebec above the New Hampshire tip
    LatLonBand::new(45.3, 48.0, -71.5, -71.1),
    // Quebec above Maine
    LatLonBand::new(47.5, 48.0, -71.1, -52.0),
    // Maritimes east of Maine
    LatLonBand::new(45.0, 48.0, -67.0, -52.0),
    LatLonBand::new(43.4, 45.0, -66.5, -52.0),
    // Southern Ontario peninsula between Lake Huron and the Niagara river
    LatLonBand::new(42.2, 45.0, -82.4, -79.1),
    // North shore of Lake Ontario
    LatLonBand::new(43.6, 45.0, -79.1, -76.3),
];

/// Alaska panhandle carved back out of the 49°N–60°N band.
pub const CANADA_EXCLUSIONS: [LatLonBand; 2] = [
    LatLonBand::new(54.6, 58.0, -136.0, -130.0),
    LatLonBand::new(58.0, 60.0, -141.0, -134.0),
];

pub fn is_likely_canada(coords: Coordinates) -> bool {
    if !CANADA_OUTER.contains(coords) {
        return false;
    }
    if CANADA_EXCLUSIONS.iter().any(|band| band.contains(coords)) {
        return false;
    }
    CANADA_BANDS.iter().any(|band| band.contains(coords))
}

/// Broad US-or-Canada box (18°N–85°N, 179°W–50°W).
pub fn is_in_north_america(coords: Coordinates) -> bool {
    coords.lat >= NORTH_AMERICA_LAT_MIN
        && coords.lat < NORTH_AMERICA_LAT_MAX
        && coords.lon >= NORTH_AMERICA_LON_MIN
        && coords.lon <= NORTH_AMERICA_LON_MAX
}
