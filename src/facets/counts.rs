// src/facets/counts.rs
//! Independent facet counting. The count for value `v` of dimension `D` is the
//! number of properties that would pass the filter if `D` were constrained to
//! exactly `{v}` and every other dimension kept its current selection. A
//! dimension's own selection never feeds into its own counts.

use std::collections::BTreeSet;

use crate::aggregation::dedupe::{resolve_all, PropertyGroup};
use crate::facets::filter::is_mappable;
use crate::facets::options::options_for;
use crate::facets::predicates::FilterPlan;
use crate::models::{
    AggregatedProperty, Dimension, FacetCount, FacetCounts, FilterState, UndeterminedCountryPolicy,
};
use crate::normalization::StateMatcher;
use crate::utils::logging::{ProcessingLogger, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountOptions {
    pub undetermined: UndeterminedCountryPolicy,
    /// Only count properties that could be placed on the map.
    pub require_coordinates: bool,
}

impl Default for CountOptions {
    fn default() -> Self {
        Self {
            undetermined: UndeterminedCountryPolicy::default(),
            require_coordinates: true,
        }
    }
}

impl CountOptions {
    fn eligible(&self, property: &AggregatedProperty) -> bool {
        !self.require_coordinates || is_mappable(property)
    }
}

pub fn compute_facet_counts(
    groups: &[PropertyGroup],
    filter: &FilterState,
    options: CountOptions,
) -> FacetCounts {
    let logger = ProcessingLogger::new(Stage::Counting);
    logger.log_start(&format!("{} properties", groups.len()));

    let resolved = resolve_all(groups, &StateMatcher::new(&filter.states));
    let mut counts = FacetCounts::default();
    let mut total_options = 0usize;

    for dimension in Dimension::ALL {
        let values = options_for(dimension, groups, filter);
        total_options += values.len();
        let dimension_counts = match dimension {
            Dimension::State => count_states(groups, filter, &values, options),
            _ => count_with_fixed_representatives(&resolved, filter, dimension, &values, options),
        };
        logger.log_phase(dimension.label(), Some(&format!("{} options", values.len())));
        counts.set(dimension, dimension_counts);
    }

    logger.log_counts_complete(total_options);
    counts
}

/// Counting for dimensions that do not influence representative choice: one
/// pass relaxed on `dimension`, then one predicate per option.
fn count_with_fixed_representatives(
    resolved: &[AggregatedProperty],
    filter: &FilterState,
    dimension: Dimension,
    values: &[String],
    options: CountOptions,
) -> Vec<FacetCount> {
    let relaxed = FilterPlan::new(&filter.relaxed(dimension), options.undetermined);
    let candidates: Vec<&AggregatedProperty> = resolved
        .iter()
        .filter(|property| relaxed.passes(property) && options.eligible(property))
        .collect();

    values
        .iter()
        .map(|value| {
            let plan = FilterPlan::new(&filter.with_only(dimension, value), options.undetermined);
            let count = candidates
                .iter()
                .filter(|property| plan.passes_dimension(property, dimension))
                .count();
            FacetCount {
                value: value.clone(),
                count,
            }
        })
        .collect()
}

/// Selecting a state can change which member represents a property, and with
/// it the country and unit-type fallback. Each option re-resolves the groups.
fn count_states(
    groups: &[PropertyGroup],
    filter: &FilterState,
    values: &[String],
    options: CountOptions,
) -> Vec<FacetCount> {
    values
        .iter()
        .map(|value| {
            let only: BTreeSet<String> = std::iter::once(value.clone()).collect();
            let matcher = StateMatcher::new(&only);
            let plan = FilterPlan::new(&filter.with_only(Dimension::State, value), options.undetermined);
            let count = groups
                .iter()
                .filter_map(|group| group.resolve(&matcher))
                .filter(|property| plan.passes(property) && options.eligible(property))
                .count();
            FacetCount {
                value: value.clone(),
                count,
            }
        })
        .collect()
}
