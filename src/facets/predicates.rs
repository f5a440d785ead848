// src/facets/predicates.rs
//! The four dimension predicates. A [`FilterPlan`] precomputes what each one
//! needs from a [`FilterState`] so the same plan can be applied to many
//! properties. Filtering and counting both go through it.

use std::collections::BTreeSet;

use crate::classification::{plausibly_north_american, Country};
use crate::models::{AggregatedProperty, Dimension, FilterState, UndeterminedCountryPolicy};
use crate::normalization::StateMatcher;

#[derive(Debug, Clone, PartialEq, Eq)]
enum CountrySelection {
    Any,
    /// Both countries selected, so no country narrowing was requested.
    NorthAmerica,
    /// Only these countries. Empty when every selected value was unknown.
    Only(BTreeSet<Country>),
}

impl CountrySelection {
    fn from_filter(countries: &BTreeSet<String>) -> Self {
        if countries.is_empty() {
            return CountrySelection::Any;
        }
        let selected: BTreeSet<Country> = countries
            .iter()
            .filter_map(|value| Country::from_alias(value))
            .collect();
        if Country::ALL.iter().all(|c| selected.contains(c)) {
            CountrySelection::NorthAmerica
        } else {
            CountrySelection::Only(selected)
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterPlan {
    countries: CountrySelection,
    undetermined: UndeterminedCountryPolicy,
    states: StateMatcher,
    unit_types: BTreeSet<String>,
    rate_categories: BTreeSet<String>,
}

impl FilterPlan {
    pub fn new(filter: &FilterState, undetermined: UndeterminedCountryPolicy) -> Self {
        Self {
            countries: CountrySelection::from_filter(&filter.countries),
            undetermined,
            states: StateMatcher::new(&filter.states),
            unit_types: filter.unit_types.clone(),
            rate_categories: filter.rate_categories.clone(),
        }
    }

    pub fn passes(&self, property: &AggregatedProperty) -> bool {
        Dimension::ALL
            .iter()
            .all(|dimension| self.passes_dimension(property, *dimension))
    }

    /// All predicates except the one for `skipped`.
    pub fn passes_except(&self, property: &AggregatedProperty, skipped: Dimension) -> bool {
        Dimension::ALL
            .iter()
            .filter(|dimension| **dimension != skipped)
            .all(|dimension| self.passes_dimension(property, *dimension))
    }

    pub fn passes_dimension(&self, property: &AggregatedProperty, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Country => self.passes_country(property),
            Dimension::State => self.states.matches(property.representative.state.as_deref()),
            Dimension::UnitType => self.passes_unit_type(property),
            Dimension::RateCategory => self.passes_rate_category(property),
        }
    }

    fn passes_country(&self, property: &AggregatedProperty) -> bool {
        match &self.countries {
            CountrySelection::Any => true,
            CountrySelection::NorthAmerica => {
                property.country.is_some()
                    || (self.undetermined == UndeterminedCountryPolicy::IncludePlausible
                        && plausibly_north_american(&property.representative))
            }
            CountrySelection::Only(selected) => property
                .country
                .map(|country| selected.contains(&country))
                .unwrap_or(false),
        }
    }

    fn passes_unit_type(&self, property: &AggregatedProperty) -> bool {
        if self.unit_types.is_empty() {
            return true;
        }
        if property.all_unit_types.is_empty() {
            return property
                .representative
                .unit_type_text()
                .map(|unit_type| self.unit_types.contains(unit_type))
                .unwrap_or(false);
        }
        property
            .all_unit_types
            .iter()
            .any(|unit_type| self.unit_types.contains(unit_type))
    }

    fn passes_rate_category(&self, property: &AggregatedProperty) -> bool {
        if self.rate_categories.is_empty() {
            return true;
        }
        property
            .rate_category
            .as_ref()
            .map(|category| self.rate_categories.contains(category))
            .unwrap_or(false)
    }
}

/// One predicate evaluated directly against a filter state.
pub fn matches_dimension(
    property: &AggregatedProperty,
    filter: &FilterState,
    dimension: Dimension,
    undetermined: UndeterminedCountryPolicy,
) -> bool {
    FilterPlan::new(filter, undetermined).passes_dimension(property, dimension)
}
