// src/models/filter.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One filterable facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Country,
    State,
    UnitType,
    RateCategory,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Country,
        Dimension::State,
        Dimension::UnitType,
        Dimension::RateCategory,
    ];

    /// Repeated query-string key used by the map page URL.
    pub fn query_key(&self) -> &'static str {
        match self {
            Dimension::Country => "country",
            Dimension::State => "state",
            Dimension::UnitType => "unitType",
            Dimension::RateCategory => "rateRange",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Country => "Country",
            Dimension::State => "State",
            Dimension::UnitType => "Unit type",
            Dimension::RateCategory => "Rate",
        }
    }

    pub fn from_query_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.query_key() == key)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Active selections. An empty set means "no constraint" on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub countries: BTreeSet<String>,
    #[serde(default)]
    pub states: BTreeSet<String>,
    #[serde(default)]
    pub unit_types: BTreeSet<String>,
    #[serde(default)]
    pub rate_categories: BTreeSet<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::Country => &self.countries,
            Dimension::State => &self.states,
            Dimension::UnitType => &self.unit_types,
            Dimension::RateCategory => &self.rate_categories,
        }
    }

    fn values_mut(&mut self, dimension: Dimension) -> &mut BTreeSet<String> {
        match dimension {
            Dimension::Country => &mut self.countries,
            Dimension::State => &mut self.states,
            Dimension::UnitType => &mut self.unit_types,
            Dimension::RateCategory => &mut self.rate_categories,
        }
    }

    /// Adds a selection; blank values are ignored.
    pub fn select(mut self, dimension: Dimension, value: &str) -> Self {
        self.insert(dimension, value);
        self
    }

    pub fn insert(&mut self, dimension: Dimension, value: &str) {
        if !value.trim().is_empty() {
            self.values_mut(dimension).insert(value.to_string());
        }
    }

    /// Same state with `dimension` constrained to exactly `value`.
    pub fn with_only(&self, dimension: Dimension, value: &str) -> Self {
        let mut next = self.clone();
        let values = next.values_mut(dimension);
        values.clear();
        values.insert(value.to_string());
        next
    }

    /// Same state with `dimension` unconstrained.
    pub fn relaxed(&self, dimension: Dimension) -> Self {
        let mut next = self.clone();
        next.values_mut(dimension).clear();
        next
    }

    pub fn is_unconstrained(&self) -> bool {
        Dimension::ALL.iter().all(|d| self.values(*d).is_empty())
    }
}

/// What to do with properties whose country cannot be determined when the
/// user has selected both countries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndeterminedCountryPolicy {
    /// Keep them if nothing about the record contradicts a North American location.
    #[default]
    IncludePlausible,
    Exclude,
}

impl FromStr for UndeterminedCountryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "include" | "include_plausible" | "permissive" => Ok(Self::IncludePlausible),
            "exclude" | "strict" => Ok(Self::Exclude),
            other => Err(format!("unknown undetermined-country policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: String,
    pub count: usize,
}

/// Per-option counts for every dimension, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCounts {
    pub country: Vec<FacetCount>,
    pub state: Vec<FacetCount>,
    pub unit_type: Vec<FacetCount>,
    pub rate_category: Vec<FacetCount>,
}

impl FacetCounts {
    pub fn get(&self, dimension: Dimension) -> &[FacetCount] {
        match dimension {
            Dimension::Country => &self.country,
            Dimension::State => &self.state,
            Dimension::UnitType => &self.unit_type,
            Dimension::RateCategory => &self.rate_category,
        }
    }

    pub(crate) fn set(&mut self, dimension: Dimension, counts: Vec<FacetCount>) {
        match dimension {
            Dimension::Country => self.country = counts,
            Dimension::State => self.state = counts,
            Dimension::UnitType => self.unit_type = counts,
            Dimension::RateCategory => self.rate_category = counts,
        }
    }

    pub fn count(&self, dimension: Dimension, value: &str) -> Option<usize> {
        self.get(dimension)
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_only_and_relaxed() {
        let state = FilterState::new()
            .select(Dimension::State, "Texas")
            .select(Dimension::State, "Utah")
            .select(Dimension::UnitType, "Yurt");

        let only = state.with_only(Dimension::State, "Oregon");
        assert_eq!(only.states.len(), 1);
        assert!(only.states.contains("Oregon"));
        assert_eq!(only.unit_types, state.unit_types);

        let relaxed = state.relaxed(Dimension::UnitType);
        assert!(relaxed.unit_types.is_empty());
        assert_eq!(relaxed.states, state.states);
        assert!(!relaxed.is_unconstrained());
        assert!(FilterState::new().is_unconstrained());
    }

    #[test]
    fn test_blank_selections_ignored() {
        let state = FilterState::new().select(Dimension::Country, "  ");
        assert!(state.countries.is_empty());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "Exclude".parse::<UndeterminedCountryPolicy>().unwrap(),
            UndeterminedCountryPolicy::Exclude
        );
        assert_eq!(
            "include".parse::<UndeterminedCountryPolicy>().unwrap(),
            UndeterminedCountryPolicy::IncludePlausible
        );
        assert!("sometimes".parse::<UndeterminedCountryPolicy>().is_err());
    }

    #[test]
    fn test_dimension_query_keys() {
        for dimension in Dimension::ALL {
            assert_eq!(Dimension::from_query_key(dimension.query_key()), Some(dimension));
        }
        assert_eq!(Dimension::from_query_key("lat"), None);
    }
}
