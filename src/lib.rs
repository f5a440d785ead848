// src/lib.rs
pub mod aggregation;
pub mod classification;
pub mod display;
pub mod engine;
pub mod facets;
pub mod models;
pub mod normalization;
pub mod source;
pub mod utils;

pub use engine::{FacetEngine, FacetView};
pub use models::{AggregatedProperty, Dimension, FacetCounts, FilterState, RawRecord};
