use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{Legislator, SessionAttribution};
use crate::pipeline::EngineConfig;

/// Load a registry snapshot (JSON array of legislators) from disk
pub fn load_registry_snapshot(path: &Path) -> Result<Vec<Legislator>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_registry_snapshot(&content)
        .with_context(|| format!("Invalid registry snapshot: {:?}", path))
}

/// Parse a registry snapshot JSON string
pub fn parse_registry_snapshot(json: &str) -> Result<Vec<Legislator>> {
    serde_json::from_str(json).context("Failed to parse registry snapshot JSON")
}

/// Read a plain-text transcript
pub fn read_transcript(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read transcript: {:?}", path))
}

/// Load an engine configuration file; missing sections take their defaults
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse engine config: {:?}", path))
}

/// Load a session attribution previously written by `parse`
pub fn load_session_attribution(path: &Path) -> Result<SessionAttribution> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse session attribution: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_registry_snapshot() {
        let json = r#"[
            {"id": "L1", "name": "Tuan Ahmad bin Ali", "constituency": "Kuala Terengganu", "sworn_in_date": "2022-12-19"},
            {"id": "L2", "canonicalName": "Puan Siti Zailah", "swornInDate": "2023-08-12"},
            {"id": "L3", "name": "Lim Guan Eng", "constituency": null}
        ]"#;

        let legislators = parse_registry_snapshot(json).unwrap();

        assert_eq!(legislators.len(), 3);
        assert_eq!(legislators[0].constituency.as_deref(), Some("Kuala Terengganu"));
        assert_eq!(
            legislators[0].sworn_in_date,
            NaiveDate::from_ymd_opt(2022, 12, 19)
        );
        assert_eq!(legislators[1].name, "Puan Siti Zailah");
        assert_eq!(legislators[1].constituency, None);
        assert_eq!(legislators[2].sworn_in_date, None);
    }

    #[test]
    fn test_invalid_snapshot_is_an_error() {
        assert!(parse_registry_snapshot(r#"{"id": "L1"}"#).is_err());
        assert!(parse_registry_snapshot(r#"[{"name": "No Id"}]"#).is_err());
    }

    #[test]
    fn test_load_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();

        let registry_path = dir.path().join("registry.json");
        std::fs::write(&registry_path, r#"[{"id": "L1", "name": "Ahmad"}]"#).unwrap();
        assert_eq!(load_registry_snapshot(&registry_path).unwrap().len(), 1);

        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"segment": {"boundary": "all_headers"}}"#).unwrap();
        let config = load_config(&config_path).unwrap();
        assert_eq!(
            config.segment.boundary,
            crate::stages::SegmentBoundary::AllHeaders
        );

        let transcript_path = dir.path().join("transcript.txt");
        std::fs::write(&transcript_path, "Tuan Ahmad [Kuala Terengganu]: Ya.").unwrap();
        assert!(read_transcript(&transcript_path).unwrap().starts_with("Tuan"));

        assert!(read_transcript(&dir.path().join("missing.txt")).is_err());
    }
}
