use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use hansard_attribution::{
    load_config, load_registry_snapshot, load_session_attribution, read_transcript, write_json,
    AggregateError, AttributionEngine, AttributionReport, EngineConfig, ParticipationLedger,
    ParticipationReport, SessionMetadata,
};

#[derive(Parser)]
#[command(name = "hansard-attribution")]
#[command(author, version, about = "Speaker attribution for parliamentary transcripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attribute every speech in a session transcript
    Parse {
        /// Plain-text transcript
        #[arg(short, long)]
        transcript: PathBuf,

        /// Registry snapshot (JSON array of legislators)
        #[arg(short, long)]
        registry: PathBuf,

        /// Session identifier
        #[arg(long)]
        session_id: String,

        /// Session date (YYYY-MM-DD)
        #[arg(long)]
        session_date: NaiveDate,

        /// Output file for the session attribution (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for a human-readable report (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Engine configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report header detection and resolution without writing anything
    Analyze {
        /// Plain-text transcript
        #[arg(short, long)]
        transcript: PathBuf,

        /// Registry snapshot (JSON array of legislators)
        #[arg(short, long)]
        registry: PathBuf,

        /// Engine configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Fold session attributions into cross-session participation
    Aggregate {
        /// Registry snapshot (JSON array of legislators)
        #[arg(short, long)]
        registry: PathBuf,

        /// Session attribution files written by `parse`
        #[arg(short, long = "session", required = true)]
        sessions: Vec<PathBuf>,

        /// Output file for the participation report (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Engine configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            transcript,
            registry,
            session_id,
            session_date,
            output,
            human_readable,
            config,
            verbose,
        } => {
            setup_logging(verbose);
            parse_session(
                transcript,
                registry,
                SessionMetadata::new(session_id, session_date),
                output,
                human_readable,
                config,
            )
        }
        Commands::Analyze {
            transcript,
            registry,
            config,
            verbose,
        } => {
            setup_logging(verbose);
            analyze_transcript(transcript, registry, config)
        }
        Commands::Aggregate {
            registry,
            sessions,
            output,
            config,
            verbose,
        } => {
            setup_logging(verbose);
            aggregate_sessions(registry, sessions, output, config)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn build_engine(config: Option<&Path>) -> Result<AttributionEngine> {
    let config = match config {
        Some(path) => {
            info!("Loading engine config from {:?}", path);
            load_config(path)?
        }
        None => EngineConfig::default(),
    };
    AttributionEngine::new(config).context("Failed to build attribution engine")
}

fn parse_session(
    transcript_path: PathBuf,
    registry_path: PathBuf,
    session: SessionMetadata,
    output: PathBuf,
    human_readable: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let engine = build_engine(config.as_deref())?;

    info!("Loading registry from {:?}", registry_path);
    let registry = engine.build_registry(load_registry_snapshot(&registry_path)?)?;

    info!("Loading transcript from {:?}", transcript_path);
    let transcript = read_transcript(&transcript_path)?;

    let attribution = engine.parse(&transcript, &registry, &session);

    info!(
        "Attributed {} speeches to {} legislators; {} unmatched headers",
        attribution.instances.len(),
        attribution.stats.unique_speaker_count,
        attribution.unmatched.len()
    );

    write_json(&attribution, &output)?;
    info!("Wrote session attribution to {:?}", output);

    if let Some(path) = human_readable {
        AttributionReport::new(&attribution).write_file(&path)?;
        info!("Wrote human-readable report to {:?}", path);
    }

    Ok(())
}

fn analyze_transcript(
    transcript_path: PathBuf,
    registry_path: PathBuf,
    config: Option<PathBuf>,
) -> Result<()> {
    let engine = build_engine(config.as_deref())?;
    let registry = engine.build_registry(load_registry_snapshot(&registry_path)?)?;
    let transcript = read_transcript(&transcript_path)?;

    let report = engine.analyze(&transcript, &registry);

    println!("Transcript Analysis");
    println!("===================");
    println!("Transcript bytes: {}", transcript.len());
    println!("Registry legislators: {}", registry.len());
    println!();

    println!("Header Forms");
    println!("------------");
    for count in &report.form_counts {
        println!("{:<28} {}", count.label, count.matches);
    }
    println!("{:<28} {}", "Broad honorific pass", report.broad_headers);
    println!();

    println!("Resolution");
    println!("----------");
    println!("Resolved headers: {}", report.resolved);
    println!("Unique speakers: {}", report.unique_speakers);
    println!("Skipped (officials, empty names): {}", report.skipped);
    println!("Duplicate matches: {}", report.duplicates);
    println!("Unmatched headers: {}", report.unmatched.len());

    if !report.unmatched.is_empty() {
        println!();
        println!("Unmatched Headers");
        println!("-----------------");
        for unmatched in &report.unmatched {
            println!(
                "#{} {:?}: {}",
                unmatched.order, unmatched.raw_header_text, unmatched.failure_reason
            );
            if !unmatched.suggested_legislator_ids.is_empty() {
                println!(
                    "    suggestions: {}",
                    unmatched.suggested_legislator_ids.join(", ")
                );
            }
        }
    }

    Ok(())
}

fn aggregate_sessions(
    registry_path: PathBuf,
    sessions: Vec<PathBuf>,
    output: PathBuf,
    config: Option<PathBuf>,
) -> Result<()> {
    let engine = build_engine(config.as_deref())?;
    let registry = engine.build_registry(load_registry_snapshot(&registry_path)?)?;
    let mut ledger = ParticipationLedger::new(&registry);
    let mut duplicate_sessions = Vec::new();

    for path in &sessions {
        let attribution = load_session_attribution(path)?;
        match ledger.record_session(&attribution.stats) {
            Ok(_) => {}
            Err(AggregateError::SessionAlreadyRecorded(session_id)) => {
                warn!("Session {} appears more than once; skipping {:?}", session_id, path);
                duplicate_sessions.push(session_id);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to aggregate {:?}", path));
            }
        }
    }

    let report = ParticipationReport {
        sessions_recorded: ledger.sessions_recorded(),
        duplicate_sessions,
        participation: ledger.report(),
    };
    report.write_json(&output)?;

    info!(
        "Wrote participation for {} legislators over {} sessions to {:?}",
        report.participation.len(),
        report.sessions_recorded,
        output
    );

    Ok(())
}
