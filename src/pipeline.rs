use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;
use crate::matching::{
    default_overrides, ConstituencyOverrides, LegislatorRegistry, NameNormalizer, NormalizerConfig,
};
use crate::models::{
    HeaderForm, HeaderMatch, Legislator, SessionAttribution, SessionMetadata, UnmatchedSpeaker,
};
use crate::stages::{
    InstanceTracker, ResolverConfig, ScanConfig, SegmentConfig, SpeakerHeaderMatcher,
    SpeakerResolver, SpeechSegmenter, SpeechStatisticsAggregator, StatsConfig, TrackerConfig,
};

/// Full engine configuration; every section may be omitted in a config file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scan: ScanConfig,
    pub normalizer: NormalizerConfig,
    /// Transcript spelling -> registry spelling
    pub constituency_overrides: BTreeMap<String, String>,
    pub resolver: ResolverConfig,
    pub tracker: TrackerConfig,
    pub segment: SegmentConfig,
    pub stats: StatsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            normalizer: NormalizerConfig::default(),
            constituency_overrides: default_overrides(),
            resolver: ResolverConfig::default(),
            tracker: TrackerConfig::default(),
            segment: SegmentConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

/// Header counts for one form
#[derive(Debug, Clone, Serialize)]
pub struct FormCount {
    pub form: HeaderForm,
    pub label: String,
    pub matches: usize,
}

/// Diagnostic summary of a transcript, without segmentation or statistics
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub form_counts: Vec<FormCount>,
    pub broad_headers: usize,
    pub resolved: usize,
    pub unique_speakers: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub unmatched: Vec<UnmatchedSpeaker>,
}

/// Turns transcripts into speaker attributions
///
/// Holds everything that is independent of a particular registry snapshot:
/// compiled header patterns, the normalizer and the override dictionary. The
/// registry is built per parse and passed in by reference.
pub struct AttributionEngine {
    normalizer: NameNormalizer,
    overrides: ConstituencyOverrides,
    resolver_config: ResolverConfig,
    scanner: SpeakerHeaderMatcher,
    tracker: InstanceTracker,
    segmenter: SpeechSegmenter,
    aggregator: SpeechStatisticsAggregator,
}

impl AttributionEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let min_score = config.resolver.min_suggestion_score;
        if !(0.0..=1.0).contains(&min_score) {
            return Err(EngineError::InvalidConfig(format!(
                "min_suggestion_score must be within 0..=1, got {}",
                min_score
            )));
        }

        let normalizer = NameNormalizer::new(&config.normalizer);
        let overrides = ConstituencyOverrides::new(&config.constituency_overrides, &normalizer);

        info!(
            "Engine ready: {} constituency overrides, {}-byte scan chunks",
            overrides.len(),
            config.scan.chunk_size
        );

        Ok(Self {
            scanner: SpeakerHeaderMatcher::new(config.scan)?,
            normalizer,
            overrides,
            resolver_config: config.resolver,
            tracker: InstanceTracker::new(config.tracker),
            segmenter: SpeechSegmenter::new(config.segment),
            aggregator: SpeechStatisticsAggregator::new(config.stats),
        })
    }

    pub fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    /// Index a registry snapshot with this engine's normalizer
    pub fn build_registry(
        &self,
        legislators: Vec<Legislator>,
    ) -> Result<LegislatorRegistry, EngineError> {
        let registry = LegislatorRegistry::new(legislators, &self.normalizer)?;
        info!("Registry built with {} legislators", registry.len());
        Ok(registry)
    }

    pub fn resolver<'a>(&'a self, registry: &'a LegislatorRegistry) -> SpeakerResolver<'a> {
        SpeakerResolver::new(
            registry,
            &self.normalizer,
            &self.overrides,
            &self.resolver_config,
        )
    }

    /// Raw header matches, grouped by form in priority order
    pub fn scan(&self, transcript: &str) -> Vec<HeaderMatch> {
        self.scanner.scan(transcript)
    }

    /// Attribute every speech in one session transcript
    pub fn parse(
        &self,
        transcript: &str,
        registry: &LegislatorRegistry,
        session: &SessionMetadata,
    ) -> SessionAttribution {
        info!(
            "Parsing session {} ({} bytes)",
            session.session_id,
            transcript.len()
        );

        let resolver = self.resolver(registry);
        let matches = self.scanner.scan(transcript);
        let tracked = self.tracker.track(&matches, &resolver);
        let instances = self.segmenter.segment(transcript, &tracked);

        let broad = self
            .aggregator
            .broad_counts(transcript, &self.scanner, &resolver);
        let stats = self.aggregator.session_stats(session, &instances, &broad);

        SessionAttribution {
            session: session.clone(),
            instances,
            unmatched: tracked.unmatched,
            stats,
        }
    }

    /// Header detection and resolution summary for tuning patterns
    pub fn analyze(&self, transcript: &str, registry: &LegislatorRegistry) -> AnalysisReport {
        let resolver = self.resolver(registry);
        let matches = self.scanner.scan(transcript);

        let form_counts = self
            .scanner
            .patterns()
            .iter()
            .map(|pattern| FormCount {
                form: pattern.form,
                label: pattern.form.label().to_string(),
                matches: matches.iter().filter(|m| m.form == pattern.form).count(),
            })
            .collect();

        let tracked = self.tracker.track(&matches, &resolver);
        let mut speakers: Vec<&str> = tracked
            .instances
            .iter()
            .map(|i| i.speaker.legislator_id.as_str())
            .collect();
        speakers.sort_unstable();
        speakers.dedup();

        AnalysisReport {
            form_counts,
            broad_headers: self.scanner.scan_broad(transcript).len(),
            resolved: tracked.instances.len(),
            unique_speakers: speakers.len(),
            skipped: tracked.skipped,
            duplicates: tracked.duplicates,
            unmatched: tracked.unmatched,
        }
    }
}
