//! Cross-session participation.
//!
//! Sessions are folded in one at a time. A legislator earns credit for a
//! session only when it was held on or after their sworn-in date, and every
//! such session counts towards the eligible total whether they spoke or not.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::AggregateError;
use crate::matching::LegislatorRegistry;
use crate::models::{CrossSessionParticipation, SessionSpeechStats};

#[derive(Debug, Clone, Copy, Default)]
struct ParticipationCounter {
    sessions_spoke: u32,
    total_speeches: u64,
    eligible_sessions: u32,
}

/// What recording one session changed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionCredit {
    pub session_id: String,
    /// Legislators credited with speaking
    pub credited: Vec<String>,
    /// Speakers denied credit because the session predates their sworn-in date
    pub ineligible: Vec<String>,
    /// Legislators whose eligible-session count grew
    pub eligible: usize,
}

/// Running participation totals over many sessions
pub struct ParticipationLedger<'a> {
    registry: &'a LegislatorRegistry,
    counters: HashMap<String, ParticipationCounter>,
    recorded: HashSet<String>,
}

impl<'a> ParticipationLedger<'a> {
    pub fn new(registry: &'a LegislatorRegistry) -> Self {
        Self {
            registry,
            counters: HashMap::new(),
            recorded: HashSet::new(),
        }
    }

    /// Fold one session's statistics into the totals
    ///
    /// Every referenced legislator is validated before anything is updated,
    /// so a failed call leaves the ledger unchanged.
    pub fn record_session(
        &mut self,
        stats: &SessionSpeechStats,
    ) -> Result<SessionCredit, AggregateError> {
        if self.recorded.contains(&stats.session_id) {
            return Err(AggregateError::SessionAlreadyRecorded(
                stats.session_id.clone(),
            ));
        }

        if let Some(unknown) = stats
            .per_legislator_counts
            .iter()
            .find(|tally| !self.registry.contains(&tally.legislator_id))
        {
            return Err(AggregateError::UnknownLegislator {
                session_id: stats.session_id.clone(),
                legislator_id: unknown.legislator_id.clone(),
            });
        }

        let mut credit = SessionCredit {
            session_id: stats.session_id.clone(),
            credited: Vec::new(),
            ineligible: Vec::new(),
            eligible: 0,
        };

        for legislator in self.registry.legislators() {
            if legislator.is_eligible_on(stats.session_date) {
                self.counters
                    .entry(legislator.id.clone())
                    .or_default()
                    .eligible_sessions += 1;
                credit.eligible += 1;
            }
        }

        for tally in &stats.per_legislator_counts {
            let eligible = self
                .registry
                .get(&tally.legislator_id)
                .is_some_and(|l| l.is_eligible_on(stats.session_date));
            if !eligible {
                warn!(
                    "{} spoke in session {} dated before their sworn-in date; no credit given",
                    tally.legislator_id, stats.session_id
                );
                credit.ineligible.push(tally.legislator_id.clone());
                continue;
            }

            let counter = self
                .counters
                .entry(tally.legislator_id.clone())
                .or_default();
            counter.sessions_spoke += 1;
            counter.total_speeches += u64::from(tally.total_speeches);
            credit.credited.push(tally.legislator_id.clone());
        }

        self.recorded.insert(stats.session_id.clone());
        info!(
            "Recorded session {}: {} credited, {} ineligible",
            stats.session_id,
            credit.credited.len(),
            credit.ineligible.len()
        );

        Ok(credit)
    }

    pub fn sessions_recorded(&self) -> usize {
        self.recorded.len()
    }

    /// Participation for one legislator, `None` if not in the registry
    pub fn participation(&self, legislator_id: &str) -> Option<CrossSessionParticipation> {
        if !self.registry.contains(legislator_id) {
            return None;
        }
        let counter = self
            .counters
            .get(legislator_id)
            .copied()
            .unwrap_or_default();
        Some(CrossSessionParticipation::from_counts(
            legislator_id,
            counter.sessions_spoke,
            counter.total_speeches,
            counter.eligible_sessions,
        ))
    }

    /// Participation for every registry legislator, in registry order
    pub fn report(&self) -> Vec<CrossSessionParticipation> {
        self.registry
            .legislators()
            .filter_map(|l| self.participation(&l.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::matching::NameNormalizer;
    use crate::models::{Legislator, LegislatorTally};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn registry() -> LegislatorRegistry {
        LegislatorRegistry::new(
            vec![
                Legislator::new("L1", "Ahmad").sworn_in(date(2023, 1, 1)),
                Legislator::new("L2", "Siti").sworn_in(date(2024, 6, 1)),
                Legislator::new("L3", "Lim"),
            ],
            &NameNormalizer::default(),
        )
        .unwrap()
    }

    fn stats(session_id: &str, session_date: NaiveDate, counts: &[(&str, u32)]) -> SessionSpeechStats {
        let per_legislator_counts: Vec<LegislatorTally> = counts
            .iter()
            .enumerate()
            .map(|(i, (id, total))| LegislatorTally {
                legislator_id: id.to_string(),
                legislator_name: id.to_string(),
                speaking_order: i as u32 + 1,
                resolved_instances: 1,
                total_speeches: *total,
            })
            .collect();
        SessionSpeechStats {
            session_id: session_id.to_string(),
            session_date,
            unique_speaker_count: per_legislator_counts.len(),
            total_speech_instances: per_legislator_counts.iter().map(|t| t.total_speeches).sum(),
            top_speakers: per_legislator_counts.clone(),
            per_legislator_counts,
        }
    }

    #[test]
    fn test_sessions_before_sworn_in_earn_no_credit() {
        let registry = registry();
        let mut ledger = ParticipationLedger::new(&registry);

        let credit = ledger
            .record_session(&stats("S1", date(2024, 3, 1), &[("L1", 4), ("L2", 2)]))
            .unwrap();
        assert_eq!(credit.credited, vec!["L1"]);
        assert_eq!(credit.ineligible, vec!["L2"]);
        assert_eq!(credit.eligible, 2);

        ledger
            .record_session(&stats("S2", date(2024, 7, 1), &[("L1", 2), ("L2", 3)]))
            .unwrap();

        let l1 = ledger.participation("L1").unwrap();
        assert_eq!(l1.sessions_spoke, 2);
        assert_eq!(l1.total_speeches, 6);
        assert_eq!(l1.eligible_sessions, 2);
        assert!((l1.average_speeches - 3.0).abs() < 1e-9);
        assert!((l1.participation_rate - 100.0).abs() < 1e-9);

        let l2 = ledger.participation("L2").unwrap();
        assert_eq!(l2.sessions_spoke, 1);
        assert_eq!(l2.total_speeches, 3);
        assert_eq!(l2.eligible_sessions, 1);

        // No sworn-in date: eligible everywhere, never spoke
        let l3 = ledger.participation("L3").unwrap();
        assert_eq!(l3.eligible_sessions, 2);
        assert_eq!(l3.sessions_spoke, 0);
        assert_eq!(l3.participation_rate, 0.0);
        assert_eq!(l3.average_speeches, 0.0);
    }

    #[test]
    fn test_unknown_legislator_leaves_ledger_untouched() {
        let registry = registry();
        let mut ledger = ParticipationLedger::new(&registry);

        let err = ledger
            .record_session(&stats("S1", date(2024, 7, 1), &[("L1", 4), ("L99", 1)]))
            .unwrap_err();
        assert!(matches!(
            err,
            AggregateError::UnknownLegislator { ref legislator_id, .. } if legislator_id == "L99"
        ));

        let l1 = ledger.participation("L1").unwrap();
        assert_eq!(l1.sessions_spoke, 0);
        assert_eq!(l1.eligible_sessions, 0);
        assert_eq!(ledger.sessions_recorded(), 0);
    }

    #[test]
    fn test_same_session_twice_is_rejected() {
        let registry = registry();
        let mut ledger = ParticipationLedger::new(&registry);
        let session = stats("S1", date(2024, 7, 1), &[("L1", 4)]);

        ledger.record_session(&session).unwrap();
        let err = ledger.record_session(&session).unwrap_err();
        assert!(matches!(err, AggregateError::SessionAlreadyRecorded(ref id) if id == "S1"));
        assert_eq!(ledger.participation("L1").unwrap().total_speeches, 4);
    }

    #[test]
    fn test_report_covers_registry_in_order() {
        let registry = registry();
        let ledger = ParticipationLedger::new(&registry);
        let ids: Vec<String> = ledger.report().into_iter().map(|p| p.legislator_id).collect();
        assert_eq!(ids, vec!["L1", "L2", "L3"]);
        assert!(ledger.participation("nobody").is_none());
    }
}
