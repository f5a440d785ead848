// src/classification/country.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classification::geofence::{is_in_north_america, is_likely_canada};
use crate::models::RawRecord;
use crate::normalization::state::is_canadian_province;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "US")]
    UnitedStates,
    #[serde(rename = "CA")]
    Canada,
}

const US_ALIASES: [&str; 4] = ["US", "USA", "UNITED STATES", "UNITED STATES OF AMERICA"];
const CA_ALIASES: [&str; 3] = ["CA", "CAN", "CANADA"];

impl Country {
    pub const ALL: [Country; 2] = [Country::UnitedStates, Country::Canada];

    pub fn code(&self) -> &'static str {
        match self {
            Country::UnitedStates => "US",
            Country::Canada => "CA",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Country::UnitedStates => "United States",
            Country::Canada => "Canada",
        }
    }

    /// Resolves a country field or filter value through the known aliases.
    pub fn from_alias(value: &str) -> Option<Self> {
        let upper = value.trim().to_uppercase();
        if US_ALIASES.contains(&upper.as_str()) {
            Some(Country::UnitedStates)
        } else if CA_ALIASES.contains(&upper.as_str()) {
            Some(Country::Canada)
        } else {
            None
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Scraped data sometimes carries the literal text "null".
fn country_is_blank(record: &RawRecord) -> bool {
    match record.country_text() {
        None => true,
        Some(country) => country.eq_ignore_ascii_case("null"),
    }
}

fn is_two_letter_code(token: &str) -> bool {
    token.chars().count() == 2 && token.chars().all(|c| c.is_ascii_alphabetic())
}

/// Layered classification, first match wins:
/// 1. explicit country field aliases,
/// 2. Canadian province in the state field,
/// 3. bare two-letter state code with no country field,
/// 4. coordinate geofence (Canada bands, then the North-America box),
/// 5. undetermined.
pub fn classify_country(record: &RawRecord) -> Option<Country> {
    if let Some(country) = record.country_text().and_then(Country::from_alias) {
        return Some(country);
    }

    if let Some(state) = record.state_text() {
        if is_canadian_province(state) {
            return Some(Country::Canada);
        }
        if country_is_blank(record) && is_two_letter_code(state) {
            return Some(Country::UnitedStates);
        }
    }

    let coords = record.coordinates()?;
    if is_likely_canada(coords) {
        Some(Country::Canada)
    } else if is_in_north_america(coords) {
        Some(Country::UnitedStates)
    } else {
        None
    }
}

/// Permissive test used when both countries are selected: nothing on the
/// record contradicts a North American location.
pub fn plausibly_north_american(record: &RawRecord) -> bool {
    classify_country(record).is_some()
        || (record.coordinates().is_none() && country_is_blank(record))
}
