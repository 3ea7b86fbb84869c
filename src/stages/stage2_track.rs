use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::{debug, info};

use crate::models::{HeaderMatch, UnmatchedSpeaker};
use crate::stages::stage1_resolve::{Resolution, ResolvedSpeaker, SpeakerResolver};

/// Configuration for header tracking
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Drop a header that starts inside the span of the previous kept header
    pub suppress_overlapping: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            suppress_overlapping: true,
        }
    }
}

/// A resolved header with its session ordering assigned
#[derive(Debug, Clone)]
pub struct TrackedInstance {
    pub header: HeaderMatch,
    pub speaker: ResolvedSpeaker,
    pub session_speaking_order: u32,
    pub instance_number: u32,
}

/// Output of the tracking stage
#[derive(Debug, Clone, Default)]
pub struct TrackedHeaders {
    /// Resolved headers in position order
    pub instances: Vec<TrackedInstance>,
    /// Unresolved headers in position order
    pub unmatched: Vec<UnmatchedSpeaker>,
    /// Sorted start offsets of every distinct header seen, skipped ones included
    pub boundaries: Vec<usize>,
    /// Matches dropped as officials or empty names
    pub skipped: usize,
    /// Matches dropped as duplicates of a kept header
    pub duplicates: usize,
}

/// Deduplicates, orders and numbers resolved headers
pub struct InstanceTracker {
    config: TrackerConfig,
}

impl InstanceTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    /// Resolve `matches` (in form priority order) and assign session ordering
    pub fn track(&self, matches: &[HeaderMatch], resolver: &SpeakerResolver) -> TrackedHeaders {
        let mut tracked = TrackedHeaders::default();
        let mut boundaries: HashSet<usize> = HashSet::new();
        let mut seen: HashSet<usize> = HashSet::new();
        let mut kept: Vec<(&HeaderMatch, Resolution)> = Vec::new();

        for header in matches {
            boundaries.insert(header.position);
            let resolution = resolver.resolve(header);
            if let Resolution::Skip(reason) = resolution {
                debug!("Skipped header at {} ({:?})", header.position, reason);
                tracked.skipped += 1;
                continue;
            }
            // Matches arrive in priority order, so the first one at a position wins
            if !seen.insert(header.position) {
                tracked.duplicates += 1;
                continue;
            }
            kept.push((header, resolution));
        }

        kept.sort_by_key(|(header, _)| header.position);

        if self.config.suppress_overlapping {
            let before = kept.len();
            let mut last_end = 0;
            kept.retain(|(header, _)| {
                if header.position < last_end {
                    debug!("Dropped overlapping header {:?}", header.raw_text);
                    return false;
                }
                last_end = header.end();
                true
            });
            tracked.duplicates += before - kept.len();
        }

        let mut speaking_order: HashMap<String, u32> = HashMap::new();
        let mut occurrences: HashMap<String, u32> = HashMap::new();

        for (index, (header, resolution)) in kept.into_iter().enumerate() {
            match resolution {
                Resolution::Resolved(speaker) => {
                    let next_order = speaking_order.len() as u32 + 1;
                    let order = *speaking_order
                        .entry(speaker.legislator_id.clone())
                        .or_insert(next_order);
                    let count = occurrences.entry(speaker.legislator_id.clone()).or_insert(0);
                    *count += 1;

                    tracked.instances.push(TrackedInstance {
                        header: header.clone(),
                        speaker,
                        session_speaking_order: order,
                        instance_number: *count,
                    });
                }
                Resolution::Unmatched(diagnosis) => {
                    tracked.unmatched.push(UnmatchedSpeaker {
                        extracted_name: diagnosis.extracted_name,
                        extracted_constituency: diagnosis.extracted_constituency,
                        failure_reason: diagnosis.failure_reason,
                        raw_header_text: header.raw_text.clone(),
                        suggested_legislator_ids: diagnosis.suggested_legislator_ids,
                        order: index as u32 + 1,
                    });
                }
                Resolution::Skip(_) => {}
            }
        }

        let mut boundaries: Vec<usize> = boundaries.into_iter().collect();
        boundaries.sort_unstable();
        tracked.boundaries = boundaries;

        info!(
            "Tracked {} resolved headers from {} speakers, {} unmatched, {} skipped, {} duplicates",
            tracked.instances.len(),
            speaking_order.len(),
            tracked.unmatched.len(),
            tracked.skipped,
            tracked.duplicates
        );

        tracked
    }
}

impl Default for InstanceTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{ConstituencyOverrides, LegislatorRegistry, NameNormalizer};
    use crate::models::{FailureReason, HeaderForm, Legislator};
    use crate::stages::stage1_resolve::ResolverConfig;

    fn registry(normalizer: &NameNormalizer) -> LegislatorRegistry {
        LegislatorRegistry::new(
            vec![
                Legislator::new("L1", "Ahmad").with_constituency("Kuala Terengganu"),
                Legislator::new("L2", "Siti Zailah").with_constituency("Rantau Panjang"),
            ],
            normalizer,
        )
        .unwrap()
    }

    fn header(position: usize, a: &str, b: Option<&str>, form: HeaderForm) -> HeaderMatch {
        let raw_text = match b {
            Some(b) => format!("{} [{}]:", a, b),
            None => format!("{}:", a),
        };
        HeaderMatch {
            position,
            length: raw_text.len(),
            raw_text,
            candidate_a: a.to_string(),
            candidate_b: b.map(str::to_string),
            form,
        }
    }

    fn track(matches: &[HeaderMatch], config: TrackerConfig) -> TrackedHeaders {
        let normalizer = NameNormalizer::default();
        let registry = registry(&normalizer);
        let overrides = ConstituencyOverrides::default();
        let resolver =
            SpeakerResolver::new(&registry, &normalizer, &overrides, &ResolverConfig::default());
        InstanceTracker::new(config).track(matches, &resolver)
    }

    #[test]
    fn test_first_match_at_position_wins() {
        let matches = vec![
            header(0, "Tuan Ahmad", Some("Kuala Terengganu"), HeaderForm::BracketedConstituency),
            header(0, "Tuan Siti Zailah", None, HeaderForm::TitleOnly),
        ];
        let tracked = track(&matches, TrackerConfig::default());

        assert_eq!(tracked.instances.len(), 1);
        assert_eq!(tracked.instances[0].speaker.legislator_id, "L1");
        assert_eq!(tracked.instances[0].header.form, HeaderForm::BracketedConstituency);
        assert_eq!(tracked.duplicates, 1);
    }

    #[test]
    fn test_speaking_order_and_instance_numbers() {
        // Arrive out of position order, as separate forms would
        let matches = vec![
            header(200, "Tuan Ahmad", Some("Kuala Terengganu"), HeaderForm::BracketedConstituency),
            header(0, "Tuan Ahmad", Some("Kuala Terengganu"), HeaderForm::BracketedConstituency),
            header(100, "Puan Siti Zailah", None, HeaderForm::TitleOnly),
        ];
        let tracked = track(&matches, TrackerConfig::default());

        let summary: Vec<(usize, &str, u32, u32)> = tracked
            .instances
            .iter()
            .map(|i| {
                (
                    i.header.position,
                    i.speaker.legislator_id.as_str(),
                    i.session_speaking_order,
                    i.instance_number,
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![(0, "L1", 1, 1), (100, "L2", 2, 1), (200, "L1", 1, 2)]
        );
    }

    #[test]
    fn test_unmatched_order_counts_all_kept_headers() {
        let matches = vec![
            header(0, "Tuan Ahmad", Some("Kuala Terengganu"), HeaderForm::BracketedConstituency),
            header(50, "Tuan Unknown", Some("Nowhere"), HeaderForm::BracketedConstituency),
            header(25, "Tuan Yang di-Pertua", None, HeaderForm::TitleOnly),
        ];
        let tracked = track(&matches, TrackerConfig::default());

        assert_eq!(tracked.instances.len(), 1);
        assert_eq!(tracked.unmatched.len(), 1);
        let unmatched = &tracked.unmatched[0];
        assert_eq!(unmatched.order, 2);
        assert_eq!(unmatched.failure_reason, FailureReason::ConstituencyNotRecognized);
        assert_eq!(unmatched.raw_header_text, "Tuan Unknown [Nowhere]:");

        // The chair header is skipped but still bounds speech
        assert_eq!(tracked.skipped, 1);
        assert_eq!(tracked.boundaries, vec![0, 25, 50]);
    }

    #[test]
    fn test_overlapping_headers_are_suppressed() {
        let matches = vec![
            header(0, "Dato' Sri Ahmad", Some("Kuala Terengganu"), HeaderForm::BracketedConstituency),
            header(6, "Sri Ahmad", Some("Kuala Terengganu"), HeaderForm::BracketedConstituency),
        ];

        let tracked = track(&matches, TrackerConfig::default());
        assert_eq!(tracked.instances.len(), 1);
        assert_eq!(tracked.instances[0].header.position, 0);

        let tracked = track(
            &matches,
            TrackerConfig {
                suppress_overlapping: false,
            },
        );
        assert_eq!(tracked.instances.len(), 2);
        assert_eq!(tracked.instances[1].instance_number, 2);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let tracked = track(&[], TrackerConfig::default());
        assert!(tracked.instances.is_empty());
        assert!(tracked.unmatched.is_empty());
        assert!(tracked.boundaries.is_empty());
    }
}
