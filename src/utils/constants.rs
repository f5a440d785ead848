// src/utils/constants.rs

/// Filter/count views retained by the engine before the oldest is evicted.
pub const DEFAULT_FILTER_CACHE_SIZE: usize = 5;

/// Record sets whose grouping is retained by the engine.
pub const GROUP_CACHE_SIZE: usize = 2;

/// Broad US-or-Canada box used by the geofence and the plausibility test.
pub const NORTH_AMERICA_LAT_MIN: f64 = 18.0;
pub const NORTH_AMERICA_LAT_MAX: f64 = 85.0;
pub const NORTH_AMERICA_LON_MIN: f64 = -179.0;
pub const NORTH_AMERICA_LON_MAX: f64 = -50.0;

/// Map viewport defaults (centre of the lower 48).
pub const DEFAULT_CENTER_LAT: f64 = 39.5;
pub const DEFAULT_CENTER_LON: f64 = -98.5;
pub const DEFAULT_ZOOM: f64 = 4.0;
pub const DEFAULT_ZOOM_MOBILE: f64 = 3.25;
pub const FOCUSED_ZOOM: f64 = 15.0;
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 20.0;
