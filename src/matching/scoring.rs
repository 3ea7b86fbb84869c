//! Fuzzy name scoring.
//!
//! Two heuristics live here: word-boundary containment, used as the last
//! resolution rule, and token overlap, used only to rank suggestions for
//! headers that could not be resolved.

use std::collections::HashSet;

use super::LegislatorRegistry;

/// Suggestions scoring below this are dropped
pub const MIN_SUGGESTION_SCORE: f64 = 0.3;
/// Suggestions must share at least this many tokens with the candidate
pub const MIN_SHARED_TOKENS: usize = 1;
/// Tokens shorter than this are ignored by overlap scoring
pub const MIN_TOKEN_CHARS: usize = 3;
/// Upper bound on suggestions attached to an unmatched speaker
pub const MAX_SUGGESTIONS: usize = 3;
/// Candidates shorter than this never containment-match
pub const MIN_CONTAINMENT_CHARS: usize = 3;

/// Thresholds for suggestion ranking
#[derive(Debug, Clone, Copy)]
pub struct OverlapThresholds {
    pub min_score: f64,
    pub min_shared_tokens: usize,
    pub min_token_chars: usize,
    pub max_suggestions: usize,
}

impl Default for OverlapThresholds {
    fn default() -> Self {
        Self {
            min_score: MIN_SUGGESTION_SCORE,
            min_shared_tokens: MIN_SHARED_TOKENS,
            min_token_chars: MIN_TOKEN_CHARS,
            max_suggestions: MAX_SUGGESTIONS,
        }
    }
}

/// Overlap between two normalized names
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapScore {
    pub shared_tokens: usize,
    /// `shared / max(candidate_tokens, registry_tokens)`
    pub score: f64,
}

fn significant_tokens<'t>(name: &'t str, min_chars: usize) -> HashSet<&'t str> {
    name.split_whitespace()
        .filter(|t| t.chars().count() >= min_chars)
        .collect()
}

/// Token overlap score between two normalized names
pub fn token_overlap(candidate: &str, registry_name: &str, min_token_chars: usize) -> OverlapScore {
    let a = significant_tokens(candidate, min_token_chars);
    let b = significant_tokens(registry_name, min_token_chars);
    let denominator = a.len().max(b.len());
    if denominator == 0 {
        return OverlapScore {
            shared_tokens: 0,
            score: 0.0,
        };
    }

    let shared_tokens = a.intersection(&b).count();
    OverlapScore {
        shared_tokens,
        score: shared_tokens as f64 / denominator as f64,
    }
}

/// Whether `needle` occurs in `haystack` as a run of whole words
pub fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    format!(" {} ", haystack).contains(&format!(" {} ", needle))
}

/// Containment in either direction between normalized names
pub fn names_overlap(candidate: &str, registry_name: &str) -> bool {
    if candidate.chars().count() < MIN_CONTAINMENT_CHARS || registry_name.is_empty() {
        return false;
    }
    contains_words(registry_name, candidate) || contains_words(candidate, registry_name)
}

/// Best registry ids for a normalized candidate name, best first
pub fn rank_suggestions(
    candidate: &str,
    registry: &LegislatorRegistry,
    thresholds: &OverlapThresholds,
) -> Vec<String> {
    let mut scored: Vec<(f64, usize, &str)> = registry
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let overlap = token_overlap(candidate, &entry.normalized_name, thresholds.min_token_chars);
            (overlap.shared_tokens >= thresholds.min_shared_tokens.max(1)
                && overlap.score >= thresholds.min_score)
                .then_some((overlap.score, index, entry.legislator.id.as_str()))
        })
        .collect();

    // Highest score first, registry order on ties
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

    scored
        .into_iter()
        .take(thresholds.max_suggestions)
        .map(|(_, _, id)| id.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::NameNormalizer;
    use crate::models::Legislator;

    #[test]
    fn test_token_overlap_score() {
        let s = token_overlap("ahmad fadhli shaari", "ahmad fadhli", MIN_TOKEN_CHARS);
        assert_eq!(s.shared_tokens, 2);
        assert!((s.score - 2.0 / 3.0).abs() < 1e-9);

        // Short tokens do not count
        let s = token_overlap("lo ah", "lo ah", MIN_TOKEN_CHARS);
        assert_eq!(s.shared_tokens, 0);
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn test_contains_words_respects_boundaries() {
        assert!(contains_words("ahmad ali bakar", "ali"));
        assert!(contains_words("ahmad ali bakar", "ali bakar"));
        assert!(!contains_words("khalid samad", "ali"));
        assert!(!contains_words("ahmad", ""));
    }

    #[test]
    fn test_names_overlap_either_direction() {
        assert!(names_overlap("guan eng", "lim guan eng"));
        assert!(names_overlap("lim guan eng chow", "lim guan eng"));
        assert!(!names_overlap("ng", "ng kor ming"));
    }

    #[test]
    fn test_rank_suggestions_thresholds_and_order() {
        let normalizer = NameNormalizer::default();
        let registry = LegislatorRegistry::new(
            vec![
                Legislator::new("L1", "Ahmad Fadhli Shaari"),
                Legislator::new("L2", "Ahmad Zahid Hamidi"),
                Legislator::new("L3", "Siti Zailah"),
                Legislator::new("L4", "Ahmad Maslan"),
                Legislator::new("L5", "Ahmad Amzad Hashim Ahmad Bakri Tahir"),
            ],
            &normalizer,
        )
        .unwrap();

        let suggestions = rank_suggestions("ahmad fadhli", &registry, &OverlapThresholds::default());
        // L1: 2/3, L4: 1/2, L2: 1/3, L5 below 0.3, L3 shares nothing
        assert_eq!(suggestions, vec!["L1", "L4", "L2"]);
    }

    #[test]
    fn test_rank_suggestions_empty_candidate() {
        let normalizer = NameNormalizer::default();
        let registry =
            LegislatorRegistry::new(vec![Legislator::new("L1", "Ahmad")], &normalizer).unwrap();
        assert!(rank_suggestions("", &registry, &OverlapThresholds::default()).is_empty());
    }
}
