use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-legislator counts for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegislatorTally {
    pub legislator_id: String,
    pub legislator_name: String,
    /// First-appearance rank in the session
    pub speaking_order: u32,
    /// Headers attributed by the strict multi-pattern extraction
    pub resolved_instances: u32,
    /// Broad honorific-only count, at least 1
    pub total_speeches: u32,
}

/// Statistics for a single session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSpeechStats {
    pub session_id: String,
    pub session_date: NaiveDate,
    pub unique_speaker_count: usize,
    /// Sum of `total_speeches` over all legislators
    pub total_speech_instances: u32,
    /// In speaking order
    pub per_legislator_counts: Vec<LegislatorTally>,
    pub top_speakers: Vec<LegislatorTally>,
}

impl SessionSpeechStats {
    pub fn tally_for(&self, legislator_id: &str) -> Option<&LegislatorTally> {
        self.per_legislator_counts
            .iter()
            .find(|t| t.legislator_id == legislator_id)
    }
}

/// Participation of one legislator across many sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSessionParticipation {
    pub legislator_id: String,
    pub sessions_spoke: u32,
    pub total_speeches: u64,
    /// Sessions held on or after the sworn-in date
    pub eligible_sessions: u32,
    pub average_speeches: f64,
    /// Percentage of eligible sessions with at least one speech
    pub participation_rate: f64,
}

impl CrossSessionParticipation {
    pub fn from_counts(
        legislator_id: impl Into<String>,
        sessions_spoke: u32,
        total_speeches: u64,
        eligible_sessions: u32,
    ) -> Self {
        let average_speeches = if sessions_spoke > 0 {
            total_speeches as f64 / sessions_spoke as f64
        } else {
            0.0
        };
        let participation_rate = if eligible_sessions > 0 {
            sessions_spoke as f64 / eligible_sessions as f64 * 100.0
        } else {
            0.0
        };

        Self {
            legislator_id: legislator_id.into(),
            sessions_spoke,
            total_speeches,
            eligible_sessions,
            average_speeches,
            participation_rate,
        }
    }
}
