use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{CrossSessionParticipation, SessionAttribution};

/// Write any serializable value as pretty JSON
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

/// Machine-readable cross-session report
#[derive(Debug, Clone, Serialize)]
pub struct ParticipationReport {
    pub sessions_recorded: usize,
    /// Sessions skipped because they were already recorded
    pub duplicate_sessions: Vec<String>,
    pub participation: Vec<CrossSessionParticipation>,
}

impl ParticipationReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_json(self, path)
    }
}

/// Human-readable session report
pub struct AttributionReport<'a> {
    attribution: &'a SessionAttribution,
}

impl<'a> AttributionReport<'a> {
    pub fn new(attribution: &'a SessionAttribution) -> Self {
        Self { attribution }
    }

    /// Format the attribution as readable text
    pub fn format(&self) -> String {
        let attribution = self.attribution;
        let stats = &attribution.stats;
        let mut output = String::new();

        output.push_str(&format!(
            "Session {} ({})\n",
            attribution.session.session_id, attribution.session.session_date
        ));
        output.push_str(&format!(
            "{} speakers, {} speech instances, {} unmatched headers\n\n",
            stats.unique_speaker_count,
            stats.total_speech_instances,
            attribution.unmatched.len()
        ));

        for instance in &attribution.instances {
            let constituency = instance
                .constituency
                .as_deref()
                .map(|c| format!(" ({})", c))
                .unwrap_or_default();
            output.push_str(&format!(
                "[{}.{}] {}{}:\n",
                instance.session_speaking_order,
                instance.instance_number_for_legislator,
                instance.legislator_name,
                constituency
            ));
            for paragraph in instance.speech_text.split("\n\n") {
                output.push_str(&wrap_text(paragraph, 80));
                output.push('\n');
            }
            output.push('\n');
        }

        if !stats.top_speakers.is_empty() {
            output.push_str("Top speakers:\n");
            for (rank, tally) in stats.top_speakers.iter().enumerate() {
                output.push_str(&format!(
                    "{:>3}. {} - {} speeches\n",
                    rank + 1,
                    tally.legislator_name,
                    tally.total_speeches
                ));
            }
            output.push('\n');
        }

        if !attribution.unmatched.is_empty() {
            output.push_str("Unmatched headers:\n");
            for unmatched in &attribution.unmatched {
                output.push_str(&format!(
                    "  #{} {:?}: {}",
                    unmatched.order, unmatched.raw_header_text, unmatched.failure_reason
                ));
                if !unmatched.suggested_legislator_ids.is_empty() {
                    output.push_str(&format!(
                        " (suggestions: {})",
                        unmatched.suggested_legislator_ids.join(", ")
                    ));
                }
                output.push('\n');
            }
        }

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len + word_len + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word_len;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::{
        FailureReason, LegislatorTally, MatchMethod, ResolvedSpeakingInstance, SessionMetadata,
        SessionSpeechStats, UnmatchedSpeaker,
    };

    fn attribution() -> SessionAttribution {
        let tally = LegislatorTally {
            legislator_id: "L1".to_string(),
            legislator_name: "Ahmad".to_string(),
            speaking_order: 1,
            resolved_instances: 1,
            total_speeches: 2,
        };
        let date = NaiveDate::from_ymd_opt(2024, 2, 26).unwrap();
        SessionAttribution {
            session: SessionMetadata::new("DR-1", date),
            instances: vec![ResolvedSpeakingInstance {
                legislator_id: "L1".to_string(),
                legislator_name: "Ahmad".to_string(),
                constituency: Some("Kuala Terengganu".to_string()),
                session_speaking_order: 1,
                instance_number_for_legislator: 1,
                header_position: 0,
                header_length: 31,
                speech_text: "Saya bercakap.\n\nPerenggan kedua.".to_string(),
                matched_by: MatchMethod::Constituency,
            }],
            unmatched: vec![UnmatchedSpeaker {
                extracted_name: "Tuan Unknown".to_string(),
                extracted_constituency: Some("Nowhere".to_string()),
                failure_reason: FailureReason::ConstituencyNotRecognized,
                raw_header_text: "Tuan Unknown [Nowhere]:".to_string(),
                suggested_legislator_ids: vec!["L1".to_string()],
                order: 2,
            }],
            stats: SessionSpeechStats {
                session_id: "DR-1".to_string(),
                session_date: date,
                unique_speaker_count: 1,
                total_speech_instances: 2,
                per_legislator_counts: vec![tally.clone()],
                top_speakers: vec![tally],
            },
        }
    }

    #[test]
    fn test_format_report() {
        let attribution = attribution();
        let text = AttributionReport::new(&attribution).format();

        assert!(text.starts_with("Session DR-1 (2024-02-26)\n"));
        assert!(text.contains("[1.1] Ahmad (Kuala Terengganu):\nSaya bercakap.\nPerenggan kedua.\n"));
        assert!(text.contains("  1. Ahmad - 2 speeches"));
        assert!(text.contains(
            "#2 \"Tuan Unknown [Nowhere]:\": constituency not recognized (suggestions: L1)"
        ));
    }

    #[test]
    fn test_write_json_round_trips_attribution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let attribution = attribution();

        write_json(&attribution, &path).unwrap();
        let loaded = crate::io::load_session_attribution(&path).unwrap();

        assert_eq!(loaded.instances, attribution.instances);
        assert_eq!(loaded.unmatched, attribution.unmatched);
        assert_eq!(loaded.stats, attribution.stats);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"failure_reason\": \"constituency not recognized\""));
        assert!(raw.contains("\"matched_by\": \"constituency\""));
    }

    #[test]
    fn test_write_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.txt");
        let attribution = attribution();

        AttributionReport::new(&attribution).write_file(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Top speakers:"));
    }

    #[test]
    fn test_wrap_text() {
        let text = "This is a test of the text wrapping function that should wrap at 20 chars";
        let wrapped = wrap_text(text, 20);
        for line in wrapped.lines() {
            assert!(line.len() <= 20);
        }
        assert_eq!(wrap_text("", 20), "");
    }

    #[test]
    fn test_wrap_text_counts_characters() {
        // Seven characters but eleven bytes
        assert_eq!(wrap_text("ééé ééé", 7), "ééé ééé");
        assert_eq!(wrap_text("ééé ééé", 6), "ééé\nééé");
    }
}
