// src/display/markers.rs
use serde::{Deserialize, Serialize};

use crate::aggregation::rate::rough_rate_label;
use crate::models::{AggregatedProperty, CanonicalKey};
use crate::normalization::state::full_state_name;

/// What the map layer needs for one pin. Exact rates are never exposed,
/// only the coarse label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub key: CanonicalKey,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub state: Option<String>,
    pub unit_types: Vec<String>,
    pub rate_category: Option<String>,
    pub rate_label: Option<String>,
}

impl MapMarker {
    /// `None` for properties without coordinates.
    pub fn from_property(property: &AggregatedProperty) -> Option<Self> {
        let coordinates = property.coordinates?;
        let unit_types = if property.all_unit_types.is_empty() {
            property
                .representative
                .unit_type_text()
                .map(|unit_type| vec![unit_type.to_string()])
                .unwrap_or_default()
        } else {
            property.all_unit_types.clone()
        };

        Some(Self {
            key: property.key.clone(),
            name: property.display_name().to_string(),
            lat: coordinates.lat,
            lon: coordinates.lon,
            state: property.representative.state_text().map(full_state_name),
            unit_types,
            rate_category: property.rate_category.clone(),
            rate_label: property.rate_range.as_ref().map(rough_rate_label),
        })
    }
}

pub fn build_markers(properties: &[AggregatedProperty]) -> Vec<MapMarker> {
    properties.iter().filter_map(MapMarker::from_property).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl MarkerBounds {
    pub fn center(&self) -> (f64, f64) {
        ((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }
}

/// Smallest box enclosing every marker, used to fit the map to a state filter.
pub fn marker_bounds(markers: &[MapMarker]) -> Option<MarkerBounds> {
    markers.iter().fold(None, |bounds: Option<MarkerBounds>, marker| {
        Some(match bounds {
            None => MarkerBounds {
                south: marker.lat,
                west: marker.lon,
                north: marker.lat,
                east: marker.lon,
            },
            Some(b) => MarkerBounds {
                south: b.south.min(marker.lat),
                west: b.west.min(marker.lon),
                north: b.north.max(marker.lat),
                east: b.east.max(marker.lon),
            },
        })
    })
}
