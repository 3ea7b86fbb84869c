use serde::Deserialize;
use tracing::info;

use crate::models::{ResolvedSpeakingInstance, NO_SPEECH_CONTENT};
use crate::stages::stage2_track::TrackedHeaders;

/// Which headers end a speech
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentBoundary {
    /// Speech runs until the next resolved header
    #[default]
    ResolvedHeaders,
    /// Speech runs until the next detected header of any kind
    AllHeaders,
}

/// Configuration for speech segmentation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    pub boundary: SegmentBoundary,
}

/// Cuts speech text between headers
pub struct SpeechSegmenter {
    config: SegmentConfig,
}

impl SpeechSegmenter {
    pub fn new(config: SegmentConfig) -> Self {
        Self { config }
    }

    /// Build the final speaking instances, attaching each header's speech
    pub fn segment(
        &self,
        transcript: &str,
        tracked: &TrackedHeaders,
    ) -> Vec<ResolvedSpeakingInstance> {
        let instances: Vec<ResolvedSpeakingInstance> = tracked
            .instances
            .iter()
            .enumerate()
            .map(|(index, instance)| {
                let header = &instance.header;
                let start = header.end();
                let end = match self.config.boundary {
                    SegmentBoundary::ResolvedHeaders => tracked
                        .instances
                        .get(index + 1)
                        .map(|next| next.header.position),
                    SegmentBoundary::AllHeaders => tracked
                        .boundaries
                        .iter()
                        .copied()
                        .find(|&boundary| boundary >= start),
                }
                .unwrap_or(transcript.len());

                let raw = transcript.get(start..end).unwrap_or_default();

                ResolvedSpeakingInstance {
                    legislator_id: instance.speaker.legislator_id.clone(),
                    legislator_name: instance.speaker.legislator_name.clone(),
                    constituency: instance.speaker.constituency.clone(),
                    session_speaking_order: instance.session_speaking_order,
                    instance_number_for_legislator: instance.instance_number,
                    header_position: header.position,
                    header_length: header.length,
                    speech_text: clean_speech(raw),
                    matched_by: instance.speaker.matched_by,
                }
            })
            .collect();

        let empty = instances.iter().filter(|i| !i.has_speech()).count();
        info!(
            "Segmented {} speeches ({} without content)",
            instances.len(),
            empty
        );

        instances
    }
}

impl Default for SpeechSegmenter {
    fn default() -> Self {
        Self::new(SegmentConfig::default())
    }
}

/// Tidy raw speech text
///
/// Trailing whitespace is stripped from every line, runs of blank lines
/// collapse to one, and the result is trimmed. Empty speech becomes the
/// placeholder.
pub fn clean_speech(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = false;

    for line in raw.split('\n') {
        let line = line.trim_end();
        let blank = line.is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(line);
        previous_blank = blank;
    }

    let text = lines.join("\n");
    let text = text.trim();
    if text.is_empty() {
        NO_SPEECH_CONTENT.to_string()
    } else {
        text.to_string()
    }
}
