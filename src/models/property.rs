// src/models/property.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::classification::country::Country;

/// One ingested row as supplied by the data source. Several rows may describe
/// the same physical property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "property_name", default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lon: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub unit_type: Option<String>,
    #[serde(
        rename = "avg__rate__next_12_months_",
        alias = "rate",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub rate_category: Option<String>,
}

impl RawRecord {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }

    pub fn with_country(mut self, country: &str) -> Self {
        self.country = Some(country.to_string());
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    pub fn with_unit_type(mut self, unit_type: &str) -> Self {
        self.unit_type = Some(unit_type.to_string());
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn with_rate_category(mut self, category: &str) -> Self {
        self.rate_category = Some(category.to_string());
        self
    }

    /// Valid coordinates for this record, or `None` when either half is
    /// missing, non-finite or out of range.
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::resolve(self.lat, self.lon)
    }

    /// The rate when it is usable for aggregation.
    pub fn finite_rate(&self) -> Option<f64> {
        self.rate.filter(|r| r.is_finite())
    }

    pub fn state_text(&self) -> Option<&str> {
        non_blank(self.state.as_deref())
    }

    pub fn country_text(&self) -> Option<&str> {
        non_blank(self.country.as_deref())
    }

    pub fn unit_type_text(&self) -> Option<&str> {
        non_blank(self.unit_type.as_deref())
    }

    pub fn rate_category_text(&self) -> Option<&str> {
        non_blank(self.rate_category.as_deref())
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A resolvable map location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn resolve(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        let (lat, lon) = (lat?, lon?);
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self { lat, lon })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateRange {
    pub min: f64,
    pub max: f64,
}

impl RateRange {
    /// Builds the range over finite values; `None` when there are none.
    pub fn from_rates<I: IntoIterator<Item = f64>>(rates: I) -> Option<Self> {
        rates
            .into_iter()
            .filter(|r| r.is_finite())
            .fold(None, |range: Option<RateRange>, rate| match range {
                None => Some(RateRange { min: rate, max: rate }),
                Some(r) => Some(RateRange {
                    min: r.min.min(rate),
                    max: r.max.max(rate),
                }),
            })
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Normalized identity of a property; see `normalization::name::canonicalize`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The de-duplicated entity for one canonical key. Never mutated after it is
/// built; every filter pass derives a fresh view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedProperty {
    pub key: CanonicalKey,
    pub representative: RawRecord,
    pub all_unit_types: Vec<String>,
    pub rate_range: Option<RateRange>,
    pub rate_category: Option<String>,
    pub coordinates: Option<Coordinates>,
    /// Country of the representative record.
    pub country: Option<Country>,
    pub record_count: usize,
}

impl AggregatedProperty {
    pub fn display_name(&self) -> &str {
        self.representative
            .name
            .as_deref()
            .map(str::trim)
            .unwrap_or_else(|| self.key.as_str())
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}
