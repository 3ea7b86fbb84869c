use std::collections::HashSet;

use serde::Deserialize;

/// Title and particle vocabulary used when canonicalizing names
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Honorific and office phrases stripped from names (multi-word allowed)
    pub honorifics: Vec<String>,
    /// Connective particles stripped from names
    pub particles: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            honorifics: [
                "yang amat berhormat",
                "yang berhormat",
                "yang mulia",
                "yab",
                "y.a.b",
                "yb",
                "y.b",
                "tun",
                "toh puan",
                "tan sri",
                "puan sri",
                "datuk seri",
                "dato seri",
                "dato sri",
                "datuk",
                "dato",
                "datin paduka",
                "datin",
                "tuan",
                "puan",
                "encik",
                "cik",
                "dr",
                "ir",
                "ts",
                "prof",
                "profesor",
                "haji",
                "hajah",
                "hj",
                "hjh",
                "ustaz",
                "ustazah",
                "kapten",
                "timbalan perdana menteri",
                "perdana menteri",
                "timbalan menteri",
                "menteri",
                "senator",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            particles: ["bin", "binti", "bte", "bt", "a/l", "a/p", "@"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Canonicalizes names and constituencies for comparison
///
/// Normalization lowercases, drops brackets and edge punctuation, removes
/// honorific phrases and particles, and collapses whitespace. It is pure and
/// idempotent: `normalize(normalize(x)) == normalize(x)`.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    /// Honorific phrases as token sequences, longest first
    titles: Vec<Vec<String>>,
    particles: HashSet<String>,
}

impl NameNormalizer {
    pub fn new(config: &NormalizerConfig) -> Self {
        let mut titles: Vec<Vec<String>> = config
            .honorifics
            .iter()
            .map(|h| clean_tokens(h))
            .filter(|t| !t.is_empty())
            .collect();
        titles.sort_by(|a, b| b.len().cmp(&a.len()));
        titles.dedup();

        let particles = config
            .particles
            .iter()
            .flat_map(|p| clean_tokens(p))
            .collect();

        Self { titles, particles }
    }

    /// Normalize a person's name (or a name-like role string)
    pub fn normalize(&self, text: &str) -> String {
        self.name_tokens(text).join(" ")
    }

    /// Normalized name split into tokens
    pub fn name_tokens(&self, text: &str) -> Vec<String> {
        let mut tokens = clean_tokens(text);

        // Removing one title can expose another ("tan datuk sri"), so strip to a fixpoint
        loop {
            let (stripped, changed) = self.strip_once(&tokens);
            tokens = stripped;
            if !changed {
                break;
            }
        }

        tokens
    }

    /// Normalize a constituency name: same cleanup, no title stripping
    pub fn normalize_constituency(&self, text: &str) -> String {
        clean_tokens(text).join(" ")
    }

    fn strip_once(&self, tokens: &[String]) -> (Vec<String>, bool) {
        let mut out = Vec::with_capacity(tokens.len());
        let mut changed = false;
        let mut i = 0;

        while i < tokens.len() {
            if let Some(title) = self.titles.iter().find(|t| tokens[i..].starts_with(t)) {
                i += title.len();
                changed = true;
            } else if self.particles.contains(&tokens[i]) {
                i += 1;
                changed = true;
            } else {
                out.push(tokens[i].clone());
                i += 1;
            }
        }

        (out, changed)
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default())
    }
}

fn is_bracket(c: char) -> bool {
    matches!(c, '[' | ']' | '(' | ')' | '{' | '}' | '<' | '>')
}

fn is_edge_punctuation(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | ':' | ';' | '!' | '?' | '"' | '\'' | '’' | '‘' | '“' | '”' | '-' | '–' | '—'
            | '*' | '_'
    )
}

/// Lowercase, drop brackets, split on whitespace and trim edge punctuation
fn clean_tokens(text: &str) -> Vec<String> {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .map(|c| if is_bracket(c) { ' ' } else { c })
        .collect();

    lowered
        .split_whitespace()
        .map(|t| t.trim_matches(is_edge_punctuation))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}
