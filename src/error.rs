use thiserror::Error;

/// Errors raised while building a legislator registry from a snapshot
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate legislator id in registry snapshot: {id}")]
    DuplicateId { id: String },
}

/// Errors raised while folding session statistics into the participation ledger
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Session {session_id} references legislator {legislator_id} which is not in the registry")]
    UnknownLegislator {
        session_id: String,
        legislator_id: String,
    },

    #[error("Session {0} has already been recorded")]
    SessionAlreadyRecorded(String),
}

/// Errors raised while constructing or running the attribution engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to compile header pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
