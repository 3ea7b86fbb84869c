pub mod aggregate;
pub mod error;
pub mod io;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use aggregate::{ParticipationLedger, SessionCredit};
pub use error::{AggregateError, EngineError, RegistryError};
pub use io::{
    load_config, load_registry_snapshot, load_session_attribution, read_transcript, write_json,
    AttributionReport, ParticipationReport,
};
pub use matching::{LegislatorRegistry, NameNormalizer, NormalizerConfig};
pub use models::{
    CrossSessionParticipation, FailureReason, HeaderForm, HeaderMatch, Legislator, MatchMethod,
    ResolvedSpeakingInstance, SessionAttribution, SessionMetadata, SessionSpeechStats,
    UnmatchedSpeaker,
};
pub use pipeline::{AnalysisReport, AttributionEngine, EngineConfig};
pub use stages::{
    ResolverConfig, ScanConfig, SegmentBoundary, SegmentConfig, StatsConfig, TrackerConfig,
};
