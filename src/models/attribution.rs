use std::fmt;

use serde::{Deserialize, Serialize};

use super::{SessionMetadata, SessionSpeechStats};

/// Stored as speech text when a header is followed by nothing
pub const NO_SPEECH_CONTENT: &str = "(No speech content captured)";

/// Which resolution rule justified attributing a header to a legislator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Single holder of the header's constituency
    Constituency,
    /// Constituency held by several legislators, narrowed down by name
    ConstituencyAndName,
    /// Exact normalized name
    ExactName,
    /// Unique word-boundary containment between normalized names
    NameContainment,
}

/// Why a header could not be attributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    #[serde(rename = "constituency not recognized")]
    ConstituencyNotRecognized,
    #[serde(rename = "constituency matched but name mismatch")]
    ConstituencyNameMismatch,
    #[serde(rename = "no constituency provided and name not found")]
    NameNotFound,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::ConstituencyNotRecognized => "constituency not recognized",
            FailureReason::ConstituencyNameMismatch => "constituency matched but name mismatch",
            FailureReason::NameNotFound => "no constituency provided and name not found",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attributed speech in a session; the canonical engine output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSpeakingInstance {
    pub legislator_id: String,
    pub legislator_name: String,
    /// Registry constituency, never the raw extracted string
    pub constituency: Option<String>,
    /// Rank of the legislator by first appearance in the session (1-based)
    pub session_speaking_order: u32,
    /// Occurrence count of this legislator up to and including this header
    pub instance_number_for_legislator: u32,
    pub header_position: usize,
    pub header_length: usize,
    pub speech_text: String,
    pub matched_by: MatchMethod,
}

impl ResolvedSpeakingInstance {
    pub fn has_speech(&self) -> bool {
        self.speech_text != NO_SPEECH_CONTENT
    }
}

/// Diagnostic for a header that could not be attributed, kept for human review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedSpeaker {
    pub extracted_name: String,
    pub extracted_constituency: Option<String>,
    pub failure_reason: FailureReason,
    pub raw_header_text: String,
    /// At most three registry ids, best first
    pub suggested_legislator_ids: Vec<String>,
    /// 1-based rank among all kept headers of the session
    pub order: u32,
}

/// Everything the engine produces for one transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAttribution {
    pub session: SessionMetadata,
    /// Sorted by header position
    pub instances: Vec<ResolvedSpeakingInstance>,
    pub unmatched: Vec<UnmatchedSpeaker>,
    pub stats: SessionSpeechStats,
}

impl SessionAttribution {
    /// Instances attributed to one legislator, in speaking order
    pub fn instances_for<'a>(
        &'a self,
        legislator_id: &'a str,
    ) -> impl Iterator<Item = &'a ResolvedSpeakingInstance> + 'a {
        self.instances
            .iter()
            .filter(move |i| i.legislator_id == legislator_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_serializes_to_review_strings() {
        let json = serde_json::to_string(&FailureReason::ConstituencyNotRecognized).unwrap();
        assert_eq!(json, "\"constituency not recognized\"");

        let parsed: FailureReason =
            serde_json::from_str("\"no constituency provided and name not found\"").unwrap();
        assert_eq!(parsed, FailureReason::NameNotFound);
        assert_eq!(
            FailureReason::ConstituencyNameMismatch.to_string(),
            "constituency matched but name mismatch"
        );
    }
}
