pub mod filter;
pub mod property;

pub use filter::{Dimension, FacetCount, FacetCounts, FilterState, UndeterminedCountryPolicy};
pub use property::{AggregatedProperty, CanonicalKey, Coordinates, RateRange, RawRecord};
