// src/normalization/name.rs
use crate::models::{CanonicalKey, RawRecord};

/// The only notion of "same property" used anywhere in the crate: surrounding
/// whitespace trimmed, lowercased. Punctuation is kept.
pub fn canonicalize(name: &str) -> CanonicalKey {
    CanonicalKey::new(name.trim().to_lowercase())
}

/// Key for a record, or `None` when the record has no usable name and must be
/// dropped before grouping.
pub fn canonical_key_for(record: &RawRecord) -> Option<CanonicalKey> {
    let name = record.name.as_deref()?;
    let key = canonicalize(name);
    if key.as_str().is_empty() {
        None
    } else {
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_trims_and_lowercases() {
        assert_eq!(canonicalize("  Pine Ridge ").as_str(), "pine ridge");
        assert_eq!(canonicalize("PINE RIDGE"), canonicalize("pine ridge "));
    }

    #[test]
    fn test_canonicalize_keeps_punctuation() {
        assert_eq!(canonicalize("Moab Under Canvas - Utah").as_str(), "moab under canvas - utah");
        assert_ne!(canonicalize("St. Clair"), canonicalize("St Clair"));
    }

    #[test]
    fn test_records_without_names_have_no_key() {
        assert!(canonical_key_for(&RawRecord::default()).is_none());
        assert!(canonical_key_for(&RawRecord::named("   ")).is_none());
        assert_eq!(
            canonical_key_for(&RawRecord::named("Yonder")).map(|k| k.to_string()),
            Some("yonder".to_string())
        );
    }
}
