use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, info};

use crate::models::{LegislatorTally, ResolvedSpeakingInstance, SessionMetadata, SessionSpeechStats};
use crate::stages::stage0_scan::SpeakerHeaderMatcher;
use crate::stages::stage1_resolve::{Resolution, SpeakerResolver};

/// Configuration for per-session statistics
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub top_speakers_limit: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            top_speakers_limit: 10,
        }
    }
}

/// Per-session speech statistics
///
/// Two passes are combined: the unique-speaker pass over resolved instances
/// decides who spoke and in what order, and the broad honorific-only pass
/// counts every time a legislator took the floor.
pub struct SpeechStatisticsAggregator {
    config: StatsConfig,
}

impl SpeechStatisticsAggregator {
    pub fn new(config: StatsConfig) -> Self {
        Self { config }
    }

    /// Resolved-id tallies from the broad honorific-only pattern
    pub fn broad_counts(
        &self,
        transcript: &str,
        scanner: &SpeakerHeaderMatcher,
        resolver: &SpeakerResolver,
    ) -> HashMap<String, u32> {
        let mut counts: HashMap<String, u32> = HashMap::new();
        let matches = scanner.scan_broad(transcript);

        for header in &matches {
            if let Resolution::Resolved(speaker) = resolver.resolve(header) {
                *counts.entry(speaker.legislator_id).or_insert(0) += 1;
            }
        }

        debug!(
            "Broad pass: {} headers, {} legislators",
            matches.len(),
            counts.len()
        );
        counts
    }

    /// Combine resolved instances with broad counts into session statistics
    pub fn session_stats(
        &self,
        session: &SessionMetadata,
        instances: &[ResolvedSpeakingInstance],
        broad_counts: &HashMap<String, u32>,
    ) -> SessionSpeechStats {
        let mut tallies: Vec<LegislatorTally> = Vec::new();
        let mut index_of: HashMap<&str, usize> = HashMap::new();

        for instance in instances {
            match index_of.get(instance.legislator_id.as_str()) {
                Some(&index) => tallies[index].resolved_instances += 1,
                None => {
                    index_of.insert(instance.legislator_id.as_str(), tallies.len());
                    tallies.push(LegislatorTally {
                        legislator_id: instance.legislator_id.clone(),
                        legislator_name: instance.legislator_name.clone(),
                        speaking_order: instance.session_speaking_order,
                        resolved_instances: 1,
                        total_speeches: 0,
                    });
                }
            }
        }

        for tally in &mut tallies {
            let broad = broad_counts.get(&tally.legislator_id).copied().unwrap_or(0);
            tally.total_speeches = broad.max(1);
        }
        tallies.sort_by_key(|t| t.speaking_order);

        for (id, count) in broad_counts {
            if !index_of.contains_key(id.as_str()) {
                debug!(
                    "Broad pass counted {} headers for {} who has no resolved instance; ignored",
                    count, id
                );
            }
        }

        let mut top_speakers = tallies.clone();
        top_speakers.sort_by(|a, b| {
            b.total_speeches
                .cmp(&a.total_speeches)
                .then(a.speaking_order.cmp(&b.speaking_order))
        });
        top_speakers.truncate(self.config.top_speakers_limit);

        let total_speech_instances: u32 = tallies.iter().map(|t| t.total_speeches).sum();

        info!(
            "Session {}: {} unique speakers, {} speech instances",
            session.session_id,
            tallies.len(),
            total_speech_instances
        );

        SessionSpeechStats {
            session_id: session.session_id.clone(),
            session_date: session.session_date,
            unique_speaker_count: tallies.len(),
            total_speech_instances,
            per_legislator_counts: tallies,
            top_speakers,
        }
    }
}

impl Default for SpeechStatisticsAggregator {
    fn default() -> Self {
        Self::new(StatsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::MatchMethod;

    fn instance(id: &str, order: u32, number: u32) -> ResolvedSpeakingInstance {
        ResolvedSpeakingInstance {
            legislator_id: id.to_string(),
            legislator_name: format!("Name {}", id),
            constituency: None,
            session_speaking_order: order,
            instance_number_for_legislator: number,
            header_position: 0,
            header_length: 0,
            speech_text: "Speech.".to_string(),
            matched_by: MatchMethod::ExactName,
        }
    }

    fn session() -> SessionMetadata {
        SessionMetadata::new("DR-1", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    }

    #[test]
    fn test_total_speeches_uses_broad_count_with_floor_of_one() {
        let instances = vec![instance("L1", 1, 1), instance("L2", 2, 1), instance("L1", 1, 2)];
        let broad: HashMap<String, u32> = [("L1".to_string(), 5), ("L9".to_string(), 3)]
            .into_iter()
            .collect();

        let stats = SpeechStatisticsAggregator::default().session_stats(&session(), &instances, &broad);

        assert_eq!(stats.unique_speaker_count, 2);
        let l1 = stats.tally_for("L1").unwrap();
        assert_eq!(l1.resolved_instances, 2);
        assert_eq!(l1.total_speeches, 5);
        let l2 = stats.tally_for("L2").unwrap();
        assert_eq!(l2.total_speeches, 1);
        // L9 never resolved in the unique pass
        assert!(stats.tally_for("L9").is_none());
        assert_eq!(stats.total_speech_instances, 6);
    }

    #[test]
    fn test_top_speakers_order_and_limit() {
        let instances = vec![
            instance("L1", 1, 1),
            instance("L2", 2, 1),
            instance("L3", 3, 1),
        ];
        let broad: HashMap<String, u32> = [
            ("L1".to_string(), 2),
            ("L2".to_string(), 4),
            ("L3".to_string(), 2),
        ]
        .into_iter()
        .collect();

        let aggregator = SpeechStatisticsAggregator::new(StatsConfig {
            top_speakers_limit: 2,
        });
        let stats = aggregator.session_stats(&session(), &instances, &broad);

        let top: Vec<&str> = stats
            .top_speakers
            .iter()
            .map(|t| t.legislator_id.as_str())
            .collect();
        assert_eq!(top, vec!["L2", "L1"]);

        let per: Vec<&str> = stats
            .per_legislator_counts
            .iter()
            .map(|t| t.legislator_id.as_str())
            .collect();
        assert_eq!(per, vec!["L1", "L2", "L3"]);
    }

    #[test]
    fn test_empty_session() {
        let stats =
            SpeechStatisticsAggregator::default().session_stats(&session(), &[], &HashMap::new());
        assert_eq!(stats.unique_speaker_count, 0);
        assert_eq!(stats.total_speech_instances, 0);
        assert!(stats.top_speakers.is_empty());
        assert_eq!(stats.session_id, "DR-1");
    }
}
