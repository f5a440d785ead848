pub mod markers;
pub mod query;

pub use markers::{build_markers, marker_bounds, MapMarker, MarkerBounds};
pub use query::MapViewport;
