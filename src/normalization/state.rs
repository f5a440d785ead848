// src/normalization/state.rs
//! State and province vocabulary.
//!
//! Abbreviation expansion for filtering only covers US states (plus DC).
//! Canadian provinces are kept in a separate denylist so that a province code
//! such as `ON` never expands into a province name inside a US-market state
//! filter, and so provinces never show up as state facet options.

use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap, HashSet};

pub const US_STATES: [(&str, &str); 51] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
];

/// Denylist: never part of the US state vocabulary.
pub const CANADIAN_PROVINCES: [(&str, &str); 13] = [
    ("AB", "Alberta"),
    ("BC", "British Columbia"),
    ("MB", "Manitoba"),
    ("NB", "New Brunswick"),
    ("NL", "Newfoundland and Labrador"),
    ("NS", "Nova Scotia"),
    ("NT", "Northwest Territories"),
    ("NU", "Nunavut"),
    ("ON", "Ontario"),
    ("PE", "Prince Edward Island"),
    ("QC", "Quebec"),
    ("SK", "Saskatchewan"),
    ("YT", "Yukon"),
];

static US_NAME_BY_CODE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| US_STATES.iter().copied().collect());

static US_CODE_BY_LOWER_NAME: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    US_STATES
        .iter()
        .map(|(code, name)| (name.to_lowercase(), *code))
        .collect()
});

static PROVINCE_NAME_BY_CODE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| CANADIAN_PROVINCES.iter().copied().collect());

static PROVINCE_LOWER_NAMES: Lazy<HashSet<String>> = Lazy::new(|| {
    CANADIAN_PROVINCES
        .iter()
        .map(|(_, name)| name.to_lowercase())
        .collect()
});

fn title_case(token: &str) -> String {
    token
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_case_forms(variants: &mut HashSet<String>, token: &str) {
    variants.insert(token.to_string());
    variants.insert(token.to_uppercase());
    variants.insert(token.to_lowercase());
    variants.insert(title_case(token));
}

/// Full US state name for a two-letter code (any case).
pub fn us_state_name(code: &str) -> Option<&'static str> {
    US_NAME_BY_CODE.get(code.trim().to_uppercase().as_str()).copied()
}

/// Two-letter code for a full US state name (any case).
pub fn us_state_code(name: &str) -> Option<&'static str> {
    US_CODE_BY_LOWER_NAME.get(&name.trim().to_lowercase()).copied()
}

pub fn is_canadian_province_code(token: &str) -> bool {
    PROVINCE_NAME_BY_CODE.contains_key(token.trim().to_uppercase().as_str())
}

/// True for a province code or full province name, in any case.
pub fn is_canadian_province(token: &str) -> bool {
    is_canadian_province_code(token) || PROVINCE_LOWER_NAMES.contains(&token.trim().to_lowercase())
}

/// Every equivalent spelling of a state token: the token itself, its case
/// forms, and the case forms of its abbreviation or full name.
pub fn state_variants(token: &str) -> HashSet<String> {
    let mut variants = HashSet::new();
    let token = token.trim();
    if token.is_empty() {
        return variants;
    }

    push_case_forms(&mut variants, token);
    if let Some(code) = us_state_code(token) {
        push_case_forms(&mut variants, code);
    }
    if let Some(name) = us_state_name(token) {
        push_case_forms(&mut variants, name);
    }
    variants
}

/// Splits "TX, NM" / "TX; NM" style multi-state values into their parts.
pub fn split_states(value: &str) -> Vec<&str> {
    let separator = if value.contains(',') {
        Some(',')
    } else if value.contains(';') {
        Some(';')
    } else {
        None
    };
    match separator {
        Some(sep) => value
            .split(sep)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect(),
        None => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed]
            }
        }
    }
}

/// Precomputed union of variants for a set of filter states, so one filter
/// can be tested against many candidates cheaply.
#[derive(Debug, Clone, Default)]
pub struct StateMatcher {
    unconstrained: bool,
    variants: HashSet<String>,
}

impl StateMatcher {
    pub fn new(filter_states: &BTreeSet<String>) -> Self {
        let variants = filter_states
            .iter()
            .flat_map(|s| split_states(s))
            .flat_map(state_variants)
            .collect();
        Self {
            unconstrained: filter_states.is_empty(),
            variants,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.unconstrained
    }

    pub fn matches(&self, candidate: Option<&str>) -> bool {
        if self.unconstrained {
            return true;
        }
        let Some(candidate) = candidate.map(str::trim).filter(|c| !c.is_empty()) else {
            return false;
        };
        if self.matches_token(candidate) {
            return true;
        }
        let parts = split_states(candidate);
        parts.len() > 1 && parts.into_iter().any(|part| self.matches_token(part))
    }

    fn matches_token(&self, token: &str) -> bool {
        state_variants(token)
            .iter()
            .any(|variant| self.variants.contains(variant))
    }
}

/// True iff `filter_states` is empty or the candidate's variants intersect the
/// variants of any filter state.
pub fn matches_any_state(candidate: Option<&str>, filter_states: &BTreeSet<String>) -> bool {
    StateMatcher::new(filter_states).matches(candidate)
}

/// Display form: abbreviations (US or Canadian) expanded to full names,
/// multi-state values expanded part by part and joined with ", ".
pub fn full_state_name(state: &str) -> String {
    split_states(state)
        .into_iter()
        .map(|part| {
            let upper = part.to_uppercase();
            us_state_name(&upper)
                .or_else(|| PROVINCE_NAME_BY_CODE.get(upper.as_str()).copied())
                .map(str::to_string)
                .unwrap_or_else(|| part.to_string())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Label under which a state token is offered as a facet option: the full US
/// state name when known, the trimmed token otherwise, and `None` for blank
/// tokens and Canadian provinces.
pub fn state_facet_label(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if let Some(name) = us_state_name(token) {
        return Some(name.to_string());
    }
    if let Some(code) = us_state_code(token) {
        return us_state_name(code).map(str::to_string);
    }
    if is_canadian_province(token) {
        return None;
    }
    Some(token.to_string())
}
