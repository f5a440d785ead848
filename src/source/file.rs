// src/source/file.rs
use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::models::RawRecord;
use crate::source::{parse_payload, RecordSource};

/// Reads a JSON export (bare array or API envelope) from disk.
#[derive(Debug, Clone)]
pub struct FileRecordSource {
    path: PathBuf,
}

impl FileRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for FileRecordSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read records from {}", self.path.display()))?;
        parse_payload(&bytes).with_context(|| format!("Invalid records in {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_reads_envelope_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"success": true, "count": 2, "data": [
                {{"property_name": "Moose Meadow", "state": "ME", "lat": 45.1, "lon": -69.3}},
                {{"property_name": "moose meadow", "unit_type": "Cabin"}}
            ]}}"#
        )
        .unwrap();

        let records = FileRecordSource::new(file.path()).fetch().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].unit_type.as_deref(), Some("Cabin"));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileRecordSource::new(dir.path().join("absent.json"));
        let err = source.fetch().await.unwrap_err();
        assert!(format!("{:#}", err).contains("absent.json"));
    }
}
