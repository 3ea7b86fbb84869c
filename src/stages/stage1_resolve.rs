use std::collections::HashSet;

use serde::Deserialize;
use tracing::debug;

use crate::matching::scoring::{self, contains_words, names_overlap, OverlapThresholds};
use crate::matching::{
    ConstituencyMatcher, ConstituencyOverrides, LegislatorRegistry, NameNormalizer, RegistryEntry,
};
use crate::models::{FailureReason, HeaderMatch, MatchMethod};

/// Configuration for speaker resolution
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Chair phrases; a header mentioning one is never attributed
    pub official_phrases: Vec<String>,
    /// Names of the current presiding officers
    pub official_names: Vec<String>,
    /// Words marking a bracketed group as an office rather than a constituency
    pub role_keywords: Vec<String>,
    pub min_suggestion_score: f64,
    pub min_shared_tokens: usize,
    pub min_token_chars: usize,
    pub max_suggestions: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let thresholds = OverlapThresholds::default();
        Self {
            official_phrases: [
                "yang di-pertua",
                "speaker",
                "pengerusi",
                "chairman",
                "yang dipertua",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            official_names: [
                "Tan Sri Dato' Dr. Johari bin Abdul",
                "Dato' Ramli bin Dato' Mohd Nor",
                "Puan Alice Lau Kiong Yieng",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            role_keywords: [
                "menteri",
                "speaker",
                "yang di-pertua",
                "senator",
                "pengerusi",
                "setiausaha parlimen",
                "minister",
                "chairman",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_suggestion_score: thresholds.min_score,
            min_shared_tokens: thresholds.min_shared_tokens,
            min_token_chars: thresholds.min_token_chars,
            max_suggestions: thresholds.max_suggestions,
        }
    }
}

impl ResolverConfig {
    pub fn thresholds(&self) -> OverlapThresholds {
        OverlapThresholds {
            min_score: self.min_suggestion_score,
            min_shared_tokens: self.min_shared_tokens,
            min_token_chars: self.min_token_chars,
            max_suggestions: self.max_suggestions,
        }
    }
}

/// A header attributed to a registry legislator
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSpeaker {
    pub legislator_id: String,
    pub legislator_name: String,
    /// Registry constituency
    pub constituency: Option<String>,
    pub matched_by: MatchMethod,
}

/// Why a header could not be attributed, with review hints
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub extracted_name: String,
    pub extracted_constituency: Option<String>,
    pub failure_reason: FailureReason,
    pub suggested_legislator_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Candidate name normalizes to nothing
    EmptyName,
    /// Presiding officer or chair role
    Official,
}

/// Outcome of resolving one header
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedSpeaker),
    Unmatched(Diagnosis),
    Skip(SkipReason),
}

/// Turns raw header matches into legislator attributions
pub struct SpeakerResolver<'a> {
    registry: &'a LegislatorRegistry,
    normalizer: &'a NameNormalizer,
    constituencies: ConstituencyMatcher<'a>,
    official_phrases: Vec<String>,
    official_names: HashSet<String>,
    role_keywords: Vec<String>,
    thresholds: OverlapThresholds,
}

impl<'a> SpeakerResolver<'a> {
    pub fn new(
        registry: &'a LegislatorRegistry,
        normalizer: &'a NameNormalizer,
        overrides: &'a ConstituencyOverrides,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            registry,
            normalizer,
            constituencies: ConstituencyMatcher::new(registry, normalizer, overrides),
            official_phrases: plain_forms(normalizer, &config.official_phrases),
            official_names: config
                .official_names
                .iter()
                .map(|n| normalizer.normalize(n))
                .filter(|n| !n.is_empty())
                .collect(),
            role_keywords: plain_forms(normalizer, &config.role_keywords),
            thresholds: config.thresholds(),
        }
    }

    /// Resolve one header match
    pub fn resolve(&self, header: &HeaderMatch) -> Resolution {
        if self.is_chair(&header.candidate_a)
            || header.candidate_b.as_deref().is_some_and(|b| self.is_chair(b))
        {
            debug!("Skipping chair header {:?}", header.raw_text);
            return Resolution::Skip(SkipReason::Official);
        }

        let (name_raw, constituency_raw) = self.classify(header);
        let name = self.normalizer.normalize(name_raw);
        if name.is_empty() {
            return Resolution::Skip(SkipReason::EmptyName);
        }
        if self.official_names.contains(&name) {
            debug!("Skipping presiding officer {:?}", name_raw);
            return Resolution::Skip(SkipReason::Official);
        }

        if let Some(constituency) = constituency_raw {
            let holders = self.constituencies.holders(constituency);
            match holders.as_slice() {
                [single] => return resolved(single, MatchMethod::Constituency),
                [] => {}
                several => {
                    return match pick_by_name(&name, several) {
                        Some(entry) => resolved(entry, MatchMethod::ConstituencyAndName),
                        None => Resolution::Unmatched(Diagnosis {
                            extracted_name: name_raw.to_string(),
                            extracted_constituency: Some(constituency.to_string()),
                            failure_reason: FailureReason::ConstituencyNameMismatch,
                            suggested_legislator_ids: several
                                .iter()
                                .take(self.thresholds.max_suggestions)
                                .map(|e| e.legislator.id.clone())
                                .collect(),
                        }),
                    };
                }
            }
        }

        let failure_reason = if constituency_raw.is_some() {
            FailureReason::ConstituencyNotRecognized
        } else {
            FailureReason::NameNotFound
        };

        match self.registry.find_by_name(&name).as_slice() {
            [single] => return resolved(single, MatchMethod::ExactName),
            [] => {}
            several => {
                debug!("Name {:?} belongs to {} legislators; not guessing", name, several.len());
                return Resolution::Unmatched(Diagnosis {
                    extracted_name: name_raw.to_string(),
                    extracted_constituency: constituency_raw.map(str::to_string),
                    failure_reason,
                    suggested_legislator_ids: several
                        .iter()
                        .take(self.thresholds.max_suggestions)
                        .map(|e| e.legislator.id.clone())
                        .collect(),
                });
            }
        }

        if let Some(entry) = self.unique_containment(&name) {
            return resolved(entry, MatchMethod::NameContainment);
        }

        debug!("Unmatched header {:?}: {}", header.raw_text, failure_reason);

        Resolution::Unmatched(Diagnosis {
            extracted_name: name_raw.to_string(),
            extracted_constituency: constituency_raw.map(str::to_string),
            failure_reason,
            suggested_legislator_ids: scoring::rank_suggestions(
                &name,
                self.registry,
                &self.thresholds,
            ),
        })
    }

    /// Decide which captured group is the name and which the constituency
    fn classify<'h>(&self, header: &'h HeaderMatch) -> (&'h str, Option<&'h str>) {
        let a = header.candidate_a.as_str();
        let Some(b) = header.candidate_b.as_deref() else {
            return (a, None);
        };

        if self.is_role(b) {
            (a, None)
        } else if self.constituencies.is_known(a) {
            // "[Constituency - Name]"
            (b, Some(a))
        } else if self.is_office(a) && !self.constituencies.is_known(b) {
            // "Menteri Kewangan [Tuan Lim Guan Eng]"
            (b, None)
        } else {
            (a, Some(b))
        }
    }

    fn is_office(&self, text: &str) -> bool {
        let plain = self.normalizer.normalize_constituency(text);
        self.role_keywords.iter().any(|k| contains_words(&plain, k))
    }

    /// An office, or a bare honorific with no name left after normalization
    fn is_role(&self, text: &str) -> bool {
        self.is_office(text) || self.normalizer.normalize(text).is_empty()
    }

    fn is_chair(&self, text: &str) -> bool {
        let plain = self.normalizer.normalize_constituency(text);
        self.official_phrases.iter().any(|p| contains_words(&plain, p))
    }

    fn unique_containment(&self, name: &str) -> Option<&'a RegistryEntry> {
        let mut hits = self
            .registry
            .iter()
            .filter(|e| names_overlap(name, &e.normalized_name));
        let first = hits.next()?;
        if hits.next().is_some() {
            debug!("Name {:?} overlaps several legislators; not guessing", name);
            return None;
        }
        Some(first)
    }
}

/// Phrases cleaned like constituencies, keeping honorific tokens
fn plain_forms(normalizer: &NameNormalizer, items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| normalizer.normalize_constituency(s))
        .filter(|s| !s.is_empty())
        .collect()
}

fn pick_by_name<'e>(name: &str, holders: &[&'e RegistryEntry]) -> Option<&'e RegistryEntry> {
    if let Some(exact) = holders.iter().copied().find(|e| e.normalized_name == name) {
        return Some(exact);
    }
    let mut hits = holders
        .iter()
        .copied()
        .filter(|e| names_overlap(name, &e.normalized_name));
    let first = hits.next()?;
    hits.next().is_none().then_some(first)
}

fn resolved(entry: &RegistryEntry, matched_by: MatchMethod) -> Resolution {
    Resolution::Resolved(ResolvedSpeaker {
        legislator_id: entry.legislator.id.clone(),
        legislator_name: entry.legislator.name.clone(),
        constituency: entry.legislator.constituency.clone(),
        matched_by,
    })
}
