// src/engine.rs
//! Entry point tying grouping, filtering, counting and map output together,
//! with bounded memoization. Cached and uncached results are identical; the
//! caches only skip recomputation.

use log::{debug, info};
use lru::LruCache;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::aggregation::dedupe::{group_records, resolve_all, PropertyGroup};
use crate::display::markers::{build_markers, marker_bounds, MapMarker, MarkerBounds};
use crate::facets::counts::{compute_facet_counts, CountOptions};
use crate::facets::filter::filter_displayed;
use crate::models::{AggregatedProperty, FacetCounts, FilterState, RawRecord};
use crate::normalization::StateMatcher;
use crate::utils::constants::GROUP_CACHE_SIZE;
use crate::utils::engine_config::EngineConfig;
use crate::utils::logging::{ProcessingLogger, Stage};

/// Everything the map page renders for one (records, filter) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetView {
    /// Filtered properties that can be placed on the map.
    pub displayed: Vec<AggregatedProperty>,
    pub markers: Vec<MapMarker>,
    /// Set only while a state filter is active, for fitting the map.
    pub bounds: Option<MarkerBounds>,
    pub counts: FacetCounts,
    /// Distinct properties in the record set before filtering.
    pub total_properties: usize,
}

/// Builds a view from already grouped records. No caching.
pub fn compute_view(groups: &[PropertyGroup], filter: &FilterState, options: CountOptions) -> FacetView {
    let properties = resolve_all(groups, &StateMatcher::new(&filter.states));
    let displayed = filter_displayed(&properties, filter, options.undetermined);
    let markers = build_markers(&displayed);
    let bounds = if filter.states.is_empty() {
        None
    } else {
        marker_bounds(&markers)
    };
    let counts = compute_facet_counts(groups, filter, options);

    FacetView {
        displayed,
        markers,
        bounds,
        counts,
        total_properties: groups.len(),
    }
}

/// SHA-256 of the JSON form of `value`.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    match serde_json::to_vec(value) {
        Ok(bytes) => Some(hex::encode(Sha256::digest(&bytes))),
        Err(e) => {
            debug!("Skipping cache for unserializable input: {}", e);
            None
        }
    }
}

pub struct FacetEngine {
    options: CountOptions,
    group_cache: LruCache<String, Arc<Vec<PropertyGroup>>>,
    view_cache: LruCache<String, Arc<FacetView>>,
    hits: usize,
    misses: usize,
}

impl FacetEngine {
    pub fn new(config: &EngineConfig) -> Self {
        let view_capacity =
            NonZeroUsize::new(config.filter_cache_size).unwrap_or(NonZeroUsize::MIN);
        let group_capacity = NonZeroUsize::new(GROUP_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        info!("Initializing FacetEngine with view cache size: {}", view_capacity);

        Self {
            options: CountOptions {
                undetermined: config.undetermined_country,
                require_coordinates: config.counts_require_coordinates,
            },
            group_cache: LruCache::new(group_capacity),
            view_cache: LruCache::new(view_capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn options(&self) -> CountOptions {
        self.options
    }

    /// Grouping for a record set, shared between filter changes.
    fn groups_for(
        &mut self,
        records: &[RawRecord],
        records_key: Option<&String>,
    ) -> Arc<Vec<PropertyGroup>> {
        if let Some(key) = records_key {
            if let Some(groups) = self.group_cache.peek(key) {
                debug!("Reusing grouping for record set {}", &key[..12]);
                return groups.clone();
            }
        }
        let groups = Arc::new(group_records(records));
        if let Some(key) = records_key {
            self.group_cache.put(key.clone(), groups.clone());
        }
        groups
    }

    /// Lookups do not refresh an entry, so eviction is oldest-inserted first.
    pub fn process(&mut self, records: &[RawRecord], filter: &FilterState) -> Arc<FacetView> {
        let records_key = fingerprint(records);
        let options = self.options;
        let view_key = records_key.as_ref().and_then(|key| {
            fingerprint(&(key, filter, options.undetermined, options.require_coordinates))
        });

        if let Some(key) = &view_key {
            if let Some(view) = self.view_cache.peek(key) {
                let view = view.clone();
                self.record_hit();
                return view;
            }
        }
        self.misses += 1;

        let groups = self.groups_for(records, records_key.as_ref());
        let view = Arc::new(compute_view(&groups, filter, self.options));
        if let Some(key) = view_key {
            self.view_cache.put(key, view.clone());
        }
        view
    }

    fn record_hit(&mut self) {
        self.hits += 1;
        if self.hits % 100 == 0 {
            ProcessingLogger::new(Stage::Filtering).log_cache_results(self.hits, self.misses);
        }
    }

    /// (hits, misses, cached views)
    pub fn cache_stats(&self) -> (usize, usize, usize) {
        (self.hits, self.misses, self.view_cache.len())
    }

    pub fn clear(&mut self) {
        self.group_cache.clear();
        self.view_cache.clear();
        info!("FacetEngine caches cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dimension, UndeterminedCountryPolicy};

    fn records() -> Vec<RawRecord> {
        vec![
            RawRecord::named("Under Canvas")
                .with_state("MT")
                .with_coordinates(45.0, -111.0)
                .with_unit_type("Safari Tent")
                .with_rate(320.0),
            RawRecord::named("under canvas")
                .with_state("UT")
                .with_coordinates(38.5, -109.5)
                .with_unit_type("Safari Tent"),
            RawRecord::named("Hill Country Huts")
                .with_state("TX")
                .with_coordinates(30.2, -98.1)
                .with_unit_type("Cabin")
                .with_rate(140.0),
            RawRecord::named("Lake Yurts").with_state("MN").with_unit_type("Yurt"),
        ]
    }

    fn engine(cache_size: usize) -> FacetEngine {
        FacetEngine::new(&EngineConfig {
            filter_cache_size: cache_size,
            ..EngineConfig::default()
        })
    }

    #[test]
    fn test_view_contents() {
        let mut engine = engine(5);
        let utah = FilterState::new().select(Dimension::State, "Utah");
        let view = engine.process(&records(), &utah);

        assert_eq!(view.total_properties, 3);
        assert_eq!(view.displayed.len(), 1);
        assert_eq!(view.markers[0].state.as_deref(), Some("Utah"));
        let bounds = view.bounds.unwrap();
        assert_eq!((bounds.south, bounds.west), (38.5, -109.5));
        assert_eq!(view.counts.count(Dimension::State, "Montana"), Some(1));

        let unfiltered = engine.process(&records(), &FilterState::new());
        assert!(unfiltered.bounds.is_none());
        assert_eq!(unfiltered.displayed.len(), 2);
    }

    #[test]
    fn test_cached_output_matches_uncached() {
        let mut engine = engine(5);
        let filter = FilterState::new().select(Dimension::UnitType, "Cabin");

        let first = engine.process(&records(), &filter);
        let second = engine.process(&records(), &filter);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cache_stats(), (1, 1, 1));

        let groups = group_records(&records());
        let uncached = compute_view(&groups, &filter, engine.options());
        assert_eq!(*first, uncached);
    }

    #[test]
    fn test_oldest_view_evicted_first() {
        let mut engine = engine(2);
        let records = records();
        let a = FilterState::new().select(Dimension::State, "Texas");
        let b = FilterState::new().select(Dimension::State, "Utah");
        let c = FilterState::new().select(Dimension::State, "Montana");

        engine.process(&records, &a);
        engine.process(&records, &b);
        // A lookup does not refresh `a`
        engine.process(&records, &a);
        engine.process(&records, &c);
        assert_eq!(engine.cache_stats(), (1, 3, 2));

        engine.process(&records, &b);
        assert_eq!(engine.cache_stats().0, 2);
        engine.process(&records, &a);
        assert_eq!(engine.cache_stats().1, 4);
    }

    #[test]
    fn test_undetermined_policy_reaches_counts() {
        let filter = FilterState::new()
            .select(Dimension::Country, "US")
            .select(Dimension::Country, "CA");
        // No country, no coordinates, no two-letter state
        let records = vec![RawRecord::named("Mystery Camp")
            .with_state("Lakes Region")
            .with_unit_type("Yurt")];
        let config = EngineConfig {
            counts_require_coordinates: false,
            ..EngineConfig::default()
        };

        let mut include = FacetEngine::new(&config);
        let mut exclude = FacetEngine::new(&EngineConfig {
            undetermined_country: UndeterminedCountryPolicy::Exclude,
            ..config.clone()
        });
        let included = include.process(&records, &filter);
        let excluded = exclude.process(&records, &filter);
        assert_eq!(included.counts.count(Dimension::UnitType, "Yurt"), Some(1));
        assert_eq!(excluded.counts.count(Dimension::UnitType, "Yurt"), Some(0));
        // Neither policy admits it to a single-country count
        assert_eq!(included.counts.count(Dimension::Country, "US"), Some(0));

        include.clear();
        assert_eq!(include.cache_stats().2, 0);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = fingerprint(&records()).unwrap();
        let b = fingerprint(&records()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(Some(a), fingerprint(&records()[..1]));
    }
}
