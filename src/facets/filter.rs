// src/facets/filter.rs
use crate::facets::predicates::FilterPlan;
use crate::models::{AggregatedProperty, FilterState, UndeterminedCountryPolicy};
use crate::utils::logging::{ProcessingLogger, Stage};

/// Properties passing all four predicates. Mappability is not considered.
pub fn filter(
    properties: &[AggregatedProperty],
    filter_state: &FilterState,
    undetermined: UndeterminedCountryPolicy,
) -> Vec<AggregatedProperty> {
    let plan = FilterPlan::new(filter_state, undetermined);
    properties
        .iter()
        .filter(|property| plan.passes(property))
        .cloned()
        .collect()
}

pub fn is_mappable(property: &AggregatedProperty) -> bool {
    property.coordinates.is_some()
}

/// The set shown on the map: filtered first, then restricted to properties
/// with coordinates.
pub fn filter_displayed(
    properties: &[AggregatedProperty],
    filter_state: &FilterState,
    undetermined: UndeterminedCountryPolicy,
) -> Vec<AggregatedProperty> {
    let logger = ProcessingLogger::new(Stage::Filtering);
    let matched = filter(properties, filter_state, undetermined);
    let matched_count = matched.len();
    let displayed: Vec<AggregatedProperty> = matched.into_iter().filter(is_mappable).collect();
    logger.log_filter_results(properties.len(), matched_count, displayed.len());
    displayed
}
