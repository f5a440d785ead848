// src/source/mod.rs
//! Where raw records come from. The engine never performs I/O itself; callers
//! fetch through a [`RecordSource`], usually via a [`RequestCoordinator`] so
//! that a newer fetch cancels an older one.

pub mod coordinator;
pub mod file;
pub mod http;

use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::future::Future;

use crate::models::RawRecord;

pub use coordinator::{FetchOutcome, RequestCoordinator};
pub use file::FileRecordSource;
pub use http::HttpRecordSource;

pub trait RecordSource: Send + Sync + 'static {
    /// Human-readable origin for log lines.
    fn describe(&self) -> String;

    fn fetch(&self) -> impl Future<Output = Result<Vec<RawRecord>>> + Send;
}

fn default_success() -> bool {
    true
}

/// `{ success, data, count, error?, message? }` as returned by the property API.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    data: Vec<RawRecord>,
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Records(Vec<RawRecord>),
    Envelope(ApiEnvelope),
}

/// Decodes either a bare JSON array of records or the API envelope.
pub fn parse_payload(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let payload: Payload =
        serde_json::from_slice(bytes).context("Failed to parse property records payload")?;

    match payload {
        Payload::Records(records) => {
            debug!("Parsed bare record array with {} records", records.len());
            Ok(records)
        }
        Payload::Envelope(envelope) if !envelope.success => {
            let reason = envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| "no reason given".to_string());
            Err(anyhow!("Property source reported failure: {}", reason))
        }
        Payload::Envelope(envelope) => {
            if let Some(count) = envelope.count {
                if count != envelope.data.len() {
                    warn!(
                        "Property source count mismatch: envelope says {}, received {}",
                        count,
                        envelope.data.len()
                    );
                }
            }
            Ok(envelope.data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let json = br#"[{"property_name": "Aspen Yurts", "state": "CO"}, {"property_name": null}]"#;
        let records = parse_payload(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].state.as_deref(), Some("CO"));
        assert!(records[1].name.is_none());
    }

    #[test]
    fn test_parse_envelope() {
        let json = br#"{
            "success": true,
            "count": 1,
            "data": [{"property_name": "Bluff Cabins", "avg__rate__next_12_months_": "215.5"}]
        }"#;
        let records = parse_payload(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rate, Some(215.5));
    }

    #[test]
    fn test_failed_envelope_is_an_error() {
        let json = br#"{"success": false, "data": [], "error": "database unavailable"}"#;
        let err = parse_payload(json).unwrap_err();
        assert!(err.to_string().contains("database unavailable"));

        assert!(parse_payload(b"not json").is_err());
    }
}
