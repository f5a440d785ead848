// src/aggregation/dedupe.rs
use std::collections::{BTreeSet, HashMap};

use crate::aggregation::rate::categorize;
use crate::aggregation::representative::select_representative;
use crate::classification::classify_country;
use crate::models::{AggregatedProperty, CanonicalKey, RateRange, RawRecord};
use crate::normalization::{canonical_key_for, StateMatcher};
use crate::utils::logging::{ProcessingLogger, Stage};

/// All records sharing one canonical key, plus the attributes that do not
/// depend on the active state filter. The representative is chosen later by
/// [`PropertyGroup::resolve`], since it snaps to the selected state.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyGroup {
    pub key: CanonicalKey,
    /// Members in input order.
    pub members: Vec<RawRecord>,
    pub all_unit_types: Vec<String>,
    pub rate_range: Option<RateRange>,
    pub rate_category: Option<String>,
}

impl PropertyGroup {
    fn from_members(key: CanonicalKey, members: Vec<RawRecord>) -> Self {
        let all_unit_types: Vec<String> = members
            .iter()
            .filter_map(RawRecord::unit_type_text)
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rate_range = RateRange::from_rates(members.iter().filter_map(RawRecord::finite_rate));

        // A supplied category wins over one derived from the rates
        let rate_category = members
            .iter()
            .find_map(RawRecord::rate_category_text)
            .map(str::to_string)
            .or_else(|| {
                rate_range
                    .and_then(|range| categorize(Some(range.midpoint())))
                    .map(str::to_string)
            });

        Self {
            key,
            members,
            all_unit_types,
            rate_range,
            rate_category,
        }
    }

    /// The aggregated property as seen under a state filter.
    pub fn resolve(&self, state_matcher: &StateMatcher) -> Option<AggregatedProperty> {
        let representative = select_representative(&self.members, state_matcher)?;
        Some(AggregatedProperty {
            key: self.key.clone(),
            representative: representative.clone(),
            all_unit_types: self.all_unit_types.clone(),
            rate_range: self.rate_range,
            rate_category: self.rate_category.clone(),
            coordinates: representative.coordinates(),
            country: classify_country(representative),
            record_count: self.members.len(),
        })
    }
}

/// Groups records by canonical key, in order of first appearance. Records
/// without a usable name are dropped.
pub fn group_records(records: &[RawRecord]) -> Vec<PropertyGroup> {
    let logger = ProcessingLogger::new(Stage::Grouping);
    logger.log_start(&format!("{} raw records", records.len()));

    let mut index_by_key: HashMap<CanonicalKey, usize> = HashMap::new();
    let mut buckets: Vec<(CanonicalKey, Vec<RawRecord>)> = Vec::new();
    let mut dropped = 0usize;

    for record in records {
        let Some(key) = canonical_key_for(record) else {
            dropped += 1;
            continue;
        };
        match index_by_key.get(&key) {
            Some(&idx) => buckets[idx].1.push(record.clone()),
            None => {
                index_by_key.insert(key.clone(), buckets.len());
                buckets.push((key, vec![record.clone()]));
            }
        }
    }
    logger.log_phase("Bucketing", Some(&format!("{} keys", buckets.len())));

    let groups: Vec<PropertyGroup> = buckets
        .into_iter()
        .map(|(key, members)| PropertyGroup::from_members(key, members))
        .collect();

    logger.log_grouping_complete(records.len(), dropped, groups.len());
    groups
}

pub fn resolve_all(groups: &[PropertyGroup], state_matcher: &StateMatcher) -> Vec<AggregatedProperty> {
    groups
        .iter()
        .filter_map(|group| group.resolve(state_matcher))
        .collect()
}

/// One aggregated property per canonical key, with representatives chosen
/// against `active_states`.
pub fn aggregate(records: &[RawRecord], active_states: &BTreeSet<String>) -> Vec<AggregatedProperty> {
    let groups = group_records(records);
    resolve_all(&groups, &StateMatcher::new(active_states))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::Country;

    fn states(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn pine_ridge() -> Vec<RawRecord> {
        vec![
            RawRecord::named("Pine Ridge").with_state("TX").with_rate(120.0),
            RawRecord::named("pine ridge ")
                .with_state("Texas")
                .with_rate(180.0)
                .with_unit_type("Yurt"),
        ]
    }

    #[test]
    fn test_pine_ridge_merges_into_one_property() {
        let properties = aggregate(&pine_ridge(), &BTreeSet::new());
        assert_eq!(properties.len(), 1);

        let property = &properties[0];
        assert_eq!(property.key.as_str(), "pine ridge");
        assert_eq!(property.rate_range, Some(RateRange { min: 120.0, max: 180.0 }));
        assert_eq!(property.rate_category.as_deref(), Some("$150-$249"));
        assert_eq!(property.all_unit_types, vec!["Yurt".to_string()]);
        assert_eq!(property.record_count, 2);
        assert_eq!(property.country, Some(Country::UnitedStates));
        assert!(property.coordinates.is_none());
    }

    #[test]
    fn test_supplied_category_wins() {
        let records = vec![
            RawRecord::named("Glamp Hollow").with_rate(600.0),
            RawRecord::named("Glamp Hollow").with_rate_category("  "),
            RawRecord::named("Glamp Hollow").with_rate_category("$250-$399"),
        ];
        let groups = group_records(&records);
        assert_eq!(groups[0].rate_category.as_deref(), Some("$250-$399"));
    }

    #[test]
    fn test_unusable_rates_are_unknown() {
        let records = vec![
            RawRecord::named("Foggy Creek").with_rate(f64::NAN),
            RawRecord::named("Foggy Creek"),
        ];
        let groups = group_records(&records);
        assert!(groups[0].rate_range.is_none());
        assert!(groups[0].rate_category.is_none());
    }

    #[test]
    fn test_unit_types_sorted_and_case_sensitive() {
        let records = vec![
            RawRecord::named("Camp A").with_unit_type("Tent"),
            RawRecord::named("camp a").with_unit_type("Cabin"),
            RawRecord::named("CAMP A").with_unit_type("tent"),
            RawRecord::named("Camp A").with_unit_type("Tent"),
            RawRecord::named("Camp A").with_unit_type(" "),
        ];
        let groups = group_records(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].all_unit_types, vec!["Cabin", "Tent", "tent"]);
    }

    #[test]
    fn test_unnamed_records_dropped_and_order_kept() {
        let records = vec![
            RawRecord::named("Zion Tents"),
            RawRecord::default().with_state("UT"),
            RawRecord::named("   "),
            RawRecord::named("Acadia Domes"),
            RawRecord::named("zion tents"),
        ];
        let groups = group_records(&records);
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["zion tents", "acadia domes"]);
        assert_eq!(groups[0].members.len(), 2);
    }

    #[test]
    fn test_aggregation_is_idempotent_and_bounded() {
        let mut records = pine_ridge();
        records.push(RawRecord::named("Cedar Flats").with_rate(300.0).with_unit_type("Cabin"));
        records.push(RawRecord::named("cedar flats").with_rate(90.0).with_unit_type("A-Frame"));
        records.push(RawRecord::named("Cedar Flats "));

        let first = aggregate(&records, &states(&["TX"]));
        let second = aggregate(&records, &states(&["TX"]));
        assert_eq!(first, second);

        let distinct: BTreeSet<_> = records.iter().filter_map(canonical_key_for).collect();
        assert!(first.len() <= distinct.len());
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_representative_follows_state_filter() {
        let records = vec![
            RawRecord::named("Under Canvas").with_state("MT").with_coordinates(45.0, -111.0),
            RawRecord::named("Under Canvas").with_state("UT").with_coordinates(38.5, -109.5),
        ];
        let groups = group_records(&records);

        let unfiltered = groups[0].resolve(&StateMatcher::new(&BTreeSet::new())).unwrap();
        assert_eq!(unfiltered.representative.state.as_deref(), Some("MT"));

        let utah = groups[0].resolve(&StateMatcher::new(&states(&["Utah"]))).unwrap();
        assert_eq!(utah.representative.state.as_deref(), Some("UT"));
        assert_eq!(utah.coordinates.map(|c| c.lat), Some(38.5));
    }
}
