// src/display/query.rs
//! Map page URL state: repeated filter keys plus an optional `lat`/`lon`/`zoom`
//! centre.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::models::{Dimension, FilterState};
use crate::utils::constants::{
    DEFAULT_CENTER_LAT, DEFAULT_CENTER_LON, DEFAULT_ZOOM, DEFAULT_ZOOM_MOBILE, FOCUSED_ZOOM,
    MAX_ZOOM, MIN_ZOOM,
};

fn query_pairs(query: &str) -> form_urlencoded::Parse<'_> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
}

impl FilterState {
    /// Reads `country`, `state`, `unitType` and `rateRange` (each repeatable).
    /// Unknown keys and blank values are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut filter = FilterState::new();
        for (key, value) in query_pairs(query) {
            if let Some(dimension) = Dimension::from_query_key(&key) {
                filter.insert(dimension, &value);
            }
        }
        filter
    }

    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for dimension in Dimension::ALL {
            for value in self.values(dimension) {
                serializer.append_pair(dimension.query_key(), value);
            }
        }
        serializer.finish()
    }
}

/// Where the map starts. An explicit centre from the URL disables fitting to
/// the filtered markers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewport {
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
    pub fit_bounds: bool,
    pub centered_from_url: bool,
}

fn parse_finite(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

impl MapViewport {
    pub fn from_query(query: &str, mobile: bool) -> Self {
        let mut lat = None;
        let mut lon = None;
        let mut zoom = None;
        let mut has_state_filter = false;

        for (key, value) in query_pairs(query) {
            match &*key {
                "lat" => lat = Some(value.into_owned()),
                "lon" => lon = Some(value.into_owned()),
                "zoom" => zoom = Some(value.into_owned()),
                "state" if !value.trim().is_empty() => has_state_filter = true,
                _ => {}
            }
        }

        match (parse_finite(lat.as_deref()), parse_finite(lon.as_deref())) {
            (Some(lat), Some(lon)) => {
                let zoom = parse_finite(zoom.as_deref())
                    .filter(|z| (MIN_ZOOM..=MAX_ZOOM).contains(z))
                    .unwrap_or(FOCUSED_ZOOM);
                Self {
                    lat,
                    lon,
                    zoom,
                    fit_bounds: false,
                    centered_from_url: true,
                }
            }
            _ => Self {
                lat: DEFAULT_CENTER_LAT,
                lon: DEFAULT_CENTER_LON,
                zoom: if mobile { DEFAULT_ZOOM_MOBILE } else { DEFAULT_ZOOM },
                fit_bounds: has_state_filter,
                centered_from_url: false,
            },
        }
    }
}
