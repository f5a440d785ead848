// src/aggregation/representative.rs
//! Choice of the record that supplies display fields for a merged property.
//!
//! The precedence lives in one ordered list. Members are folded in input
//! order; a challenger replaces the incumbent only when the first preference
//! that separates them favours the challenger. When no preference separates
//! them the earliest member stays.

use crate::models::RawRecord;
use crate::normalization::StateMatcher;

/// What the preferences look at for one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    pub matches_state: bool,
    pub has_coordinates: bool,
}

impl Standing {
    pub fn of(record: &RawRecord, state_matcher: &StateMatcher) -> Self {
        Self {
            matches_state: state_matcher.matches(record.state.as_deref()),
            has_coordinates: record.coordinates().is_some(),
        }
    }
}

pub struct Preference {
    pub name: &'static str,
    pub holds: fn(&Standing) -> bool,
}

fn matches_state_with_coordinates(standing: &Standing) -> bool {
    standing.matches_state && standing.has_coordinates
}

fn matches_state(standing: &Standing) -> bool {
    standing.matches_state
}

fn has_coordinates(standing: &Standing) -> bool {
    standing.has_coordinates
}

pub static REPRESENTATIVE_PREFERENCES: [Preference; 3] = [
    Preference {
        name: "state match with coordinates",
        holds: matches_state_with_coordinates,
    },
    Preference {
        name: "state match",
        holds: matches_state,
    },
    Preference {
        name: "coordinates",
        holds: has_coordinates,
    },
];

/// The preference that decides between two members, and whether the
/// challenger wins it. `None` when the members are tied on every preference.
pub fn deciding_preference(
    challenger: &Standing,
    incumbent: &Standing,
) -> Option<(&'static Preference, bool)> {
    REPRESENTATIVE_PREFERENCES.iter().find_map(|preference| {
        let challenger_holds = (preference.holds)(challenger);
        let incumbent_holds = (preference.holds)(incumbent);
        if challenger_holds != incumbent_holds {
            Some((preference, challenger_holds))
        } else {
            None
        }
    })
}

pub fn challenger_wins(challenger: &Standing, incumbent: &Standing) -> bool {
    matches!(deciding_preference(challenger, incumbent), Some((_, true)))
}

pub fn select_representative<'a>(
    members: &'a [RawRecord],
    state_matcher: &StateMatcher,
) -> Option<&'a RawRecord> {
    members
        .iter()
        .map(|member| (member, Standing::of(member, state_matcher)))
        .fold(None::<(&RawRecord, Standing)>, |best, candidate| match best {
            None => Some(candidate),
            Some(incumbent) if challenger_wins(&candidate.1, &incumbent.1) => Some(candidate),
            Some(incumbent) => Some(incumbent),
        })
        .map(|(member, _)| member)
}
