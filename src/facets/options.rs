// src/facets/options.rs
//! Selectable values per dimension, in display order.

use std::collections::BTreeSet;

use crate::aggregation::dedupe::PropertyGroup;
use crate::aggregation::rate::{is_standard_category, RATE_CATEGORIES};
use crate::classification::{classify_country, Country};
use crate::models::{Dimension, FilterState, RawRecord};
use crate::normalization::state::{split_states, state_facet_label};

pub fn country_options() -> Vec<String> {
    Country::ALL.iter().map(|c| c.code().to_string()).collect()
}

/// The one country the filter narrows to, if exactly one is selected.
fn single_selected_country(filter: &FilterState) -> Option<Country> {
    let selected: BTreeSet<Country> = filter
        .countries
        .iter()
        .filter_map(|value| Country::from_alias(value))
        .collect();
    if selected.len() == 1 {
        selected.into_iter().next()
    } else {
        None
    }
}

pub fn state_options(groups: &[PropertyGroup], filter: &FilterState) -> Vec<String> {
    let country = single_selected_country(filter);
    let contributes = |record: &RawRecord| match country {
        Some(country) => classify_country(record) == Some(country),
        None => true,
    };

    groups
        .iter()
        .flat_map(|group| group.members.iter())
        .filter(|record| contributes(*record))
        .filter_map(RawRecord::state_text)
        .flat_map(split_states)
        .filter_map(state_facet_label)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn unit_type_options(groups: &[PropertyGroup]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|group| group.all_unit_types.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The standard bands in band order, then any other supplied categories.
pub fn rate_category_options(groups: &[PropertyGroup]) -> Vec<String> {
    let extra: BTreeSet<String> = groups
        .iter()
        .filter_map(|group| group.rate_category.as_deref())
        .filter(|category| !is_standard_category(category))
        .map(str::to_string)
        .collect();

    RATE_CATEGORIES
        .iter()
        .map(|c| c.to_string())
        .chain(extra)
        .collect()
}

pub fn options_for(dimension: Dimension, groups: &[PropertyGroup], filter: &FilterState) -> Vec<String> {
    match dimension {
        Dimension::Country => country_options(),
        Dimension::State => state_options(groups, filter),
        Dimension::UnitType => unit_type_options(groups),
        Dimension::RateCategory => rate_category_options(groups),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::group_records;

    fn groups() -> Vec<PropertyGroup> {
        group_records(&[
            RawRecord::named("Border Camp").with_state("WA, ID").with_unit_type("Tent"),
            RawRecord::named("Lake Lodge").with_state("ON").with_unit_type("Cabin"),
            RawRecord::named("Lake Lodge").with_state("mn").with_rate(420.0),
            RawRecord::named("Desert Rest").with_state("Arizona").with_rate_category("Call for pricing"),
            RawRecord::named("Island Stay").with_state("Puerto Rico").with_country("US"),
        ])
    }

    #[test]
    fn test_state_options_expand_split_and_drop_provinces() {
        let options = state_options(&groups(), &FilterState::new());
        assert_eq!(
            options,
            vec!["Arizona", "Idaho", "Minnesota", "Puerto Rico", "Washington"]
        );
    }

    #[test]
    fn test_state_options_follow_single_country() {
        let canada = FilterState::new().select(Dimension::Country, "CA");
        // Ontario is the only Canadian record and provinces are never options
        assert!(state_options(&groups(), &canada).is_empty());

        let both = FilterState::new()
            .select(Dimension::Country, "US")
            .select(Dimension::Country, "CA");
        assert_eq!(state_options(&groups(), &both).len(), 5);
    }

    #[test]
    fn test_unit_type_and_rate_options() {
        let groups = groups();
        assert_eq!(unit_type_options(&groups), vec!["Cabin", "Tent"]);

        let rates = rate_category_options(&groups);
        assert_eq!(&rates[..5], &RATE_CATEGORIES.map(str::to_string)[..]);
        assert_eq!(rates[5], "Call for pricing");
        assert_eq!(country_options(), vec!["US", "CA"]);
    }
}
