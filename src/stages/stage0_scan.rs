use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::EngineError;
use crate::models::{HeaderForm, HeaderMatch};

/// Configuration for header scanning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Bytes of transcript searched per regex pass
    pub chunk_size: usize,
    /// Bytes shared by consecutive chunks; must exceed the longest header
    pub chunk_overlap: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            chunk_overlap: 512,
        }
    }
}

/// Capitalized name word: initials ("Y.B.", "M."), known abbreviations ("Dr."), words
///
/// Only listed abbreviations may end in a period, so one-word sentences such
/// as "Sila." or "Ya." are never taken as the start of a name.
const NAME_HEAD: &str = r"(?:\p{Lu}\.(?:\p{Lu}\.?)*|(?:Dr|Hj|Hjh|Mohd|Md|Muhd|Abd|Ir|Prof|Ts|Kapt|Kol|Lt|Sdr|Sdri)\.|\p{Lu}[\p{L}'’\-/@]*)";

/// Any name word, including lowercase connectives ("bin", "a/l", "di-Pertua")
const NAME_WORD: &str = r"(?:di-\p{L}+|\p{Lu}\.(?:\p{Lu}\.?)*|(?:Dr|Hj|Hjh|Mohd|Md|Muhd|Abd|Ir|Prof|Ts|Kapt|Kol|Lt|Sdr|Sdri)\.|\p{Lu}[\p{L}'’\-/@]*|(?:bin|binti|bte|bt|a/l|a/p|al|di)\b|@)";

/// Honorifics and offices that may open a header
const TITLE: &str = r"(?i:yang[ \t]+amat[ \t]+berhormat|yang[ \t]+berhormat|timbalan[ \t]+perdana[ \t]+menteri|perdana[ \t]+menteri|timbalan[ \t]+menteri|menteri|tan[ \t]+sri|puan[ \t]+sri|toh[ \t]+puan|datuk[ \t]+seri|dato['’]?[ \t]+seri|dato['’]?[ \t]+sri|datuk|dato['’]?|datin|tun|tuan|puan|encik|cik|dr\.?|y\.?a?\.?b\.?|ir\.?|prof\.?|senator)";

fn name_pattern() -> String {
    format!(r"{NAME_HEAD}(?:[ \t]+{NAME_WORD}){{0,9}}")
}

fn form_pattern(form: HeaderForm) -> String {
    let name = name_pattern();
    match form {
        HeaderForm::BracketedConstituency => {
            format!(r"\b({name})[ \t]*\[([^\[\]\n]+)\][ \t]*:")
        }
        HeaderForm::TitledParenthesized => {
            format!(r"\b({TITLE}[ \t]+{name})[ \t]*\(([^()\n]+)\)[ \t]*:")
        }
        HeaderForm::BracketedPair => {
            r"(?m)^[ \t]*\[([^\[\]\n]+?)[ \t]+[-–—][ \t]+([^\[\]\n]+?)[ \t]*\][ \t]*:".to_string()
        }
        HeaderForm::LineParenthesized => {
            format!(r"(?m)^[ \t]*({name})[ \t]*\(([^()\n]+)\)[ \t]*:")
        }
        HeaderForm::TitleOnly => format!(r"\b({TITLE}[ \t]+{name})[ \t]*:"),
    }
}

/// Relaxed honorific-only pattern for the all-instances count: a title, then
/// anything up to a colon on the same line
fn broad_pattern() -> String {
    format!(r"\b({TITLE}[ \t]+[^:\n]{{1,120}}?)[ \t]*:")
}

/// One header form with its explicit trust rank
#[derive(Debug, Clone)]
pub struct HeaderPattern {
    pub priority: u8,
    pub form: HeaderForm,
    regex: Regex,
}

impl HeaderPattern {
    pub fn new(form: HeaderForm) -> Result<Self, regex::Error> {
        Ok(Self {
            priority: form.priority(),
            form,
            regex: Regex::new(&form_pattern(form))?,
        })
    }
}

/// A slice of the transcript searched in one regex pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChunkSpan {
    start: usize,
    end: usize,
    /// Matches starting at or after this offset belong to the next chunk
    owned_end: usize,
}

/// Scans transcript text for speaker headers
///
/// Every form is applied independently across the whole transcript, in
/// priority order, so one physical header can be reported by several forms.
#[derive(Debug, Clone)]
pub struct SpeakerHeaderMatcher {
    patterns: Vec<HeaderPattern>,
    broad: Regex,
    config: ScanConfig,
}

impl SpeakerHeaderMatcher {
    pub fn new(config: ScanConfig) -> Result<Self, EngineError> {
        if config.chunk_size == 0 {
            return Err(EngineError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if config.chunk_overlap == 0 {
            return Err(EngineError::InvalidConfig(
                "chunk_overlap must be greater than zero".to_string(),
            ));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(EngineError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }

        let mut patterns = HeaderForm::ALL
            .iter()
            .map(|&form| HeaderPattern::new(form))
            .collect::<Result<Vec<_>, _>>()?;
        patterns.sort_by_key(|p| p.priority);

        Ok(Self {
            patterns,
            broad: Regex::new(&broad_pattern())?,
            config,
        })
    }

    pub fn patterns(&self) -> &[HeaderPattern] {
        &self.patterns
    }

    /// All header matches, grouped by form in priority order
    pub fn scan(&self, text: &str) -> Vec<HeaderMatch> {
        let spans = chunk_spans(text, &self.config);
        let mut matches = Vec::new();

        for pattern in &self.patterns {
            let before = matches.len();
            for span in &spans {
                scan_span(&pattern.regex, pattern.form, text, *span, false, &mut matches);
            }
            debug!(
                "Form {} ({}) matched {} headers",
                pattern.priority,
                pattern.form.label(),
                matches.len() - before
            );
        }

        matches
    }

    /// Matches of the relaxed honorific-only pattern
    ///
    /// A trailing `[..]` or `(..)` qualifier is split off into `candidate_b`.
    pub fn scan_broad(&self, text: &str) -> Vec<HeaderMatch> {
        let mut matches = Vec::new();
        for span in chunk_spans(text, &self.config) {
            scan_span(&self.broad, HeaderForm::TitleOnly, text, span, true, &mut matches);
        }
        matches
    }
}

fn scan_span(
    regex: &Regex,
    form: HeaderForm,
    text: &str,
    span: ChunkSpan,
    split_qualifier: bool,
    out: &mut Vec<HeaderMatch>,
) {
    // Searching the prefix from `span.start` keeps look-behind context (`^`, `\b`) intact
    let haystack = &text[..span.end];
    let mut at = span.start;

    while at < span.end {
        let Some(caps) = regex.captures_at(haystack, at) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };

        let lead = whole.as_str().len() - whole.as_str().trim_start().len();
        let position = whole.start() + lead;
        if position >= span.owned_end {
            break;
        }

        let group_a = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let group_b = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty());

        let (candidate_a, candidate_b) = if split_qualifier && group_b.is_none() {
            split_trailing_qualifier(group_a)
        } else {
            (group_a.to_string(), group_b.map(str::to_string))
        };

        out.push(HeaderMatch {
            position,
            length: whole.end() - position,
            raw_text: text[position..whole.end()].to_string(),
            candidate_a,
            candidate_b,
            form,
        });

        at = if whole.end() > at {
            whole.end()
        } else {
            ceil_char_boundary(text, at + 1)
        };
    }
}

/// "Tuan Ahmad [Kuala Terengganu]" -> ("Tuan Ahmad", Some("Kuala Terengganu"))
fn split_trailing_qualifier(text: &str) -> (String, Option<String>) {
    let text = text.trim();
    for (open, close) in [('[', ']'), ('(', ')')] {
        if let Some(inner_end) = text.strip_suffix(close) {
            if let Some(open_at) = inner_end.rfind(open) {
                let name = inner_end[..open_at].trim();
                let qualifier = inner_end[open_at + open.len_utf8()..].trim();
                if !name.is_empty() && !qualifier.is_empty() {
                    return (name.to_string(), Some(qualifier.to_string()));
                }
            }
        }
    }
    (text.to_string(), None)
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Split the transcript into overlapping, char-aligned spans
fn chunk_spans(text: &str, config: &ScanConfig) -> Vec<ChunkSpan> {
    let len = text.len();
    if len <= config.chunk_size {
        return vec![ChunkSpan {
            start: 0,
            end: len,
            owned_end: len,
        }];
    }

    let mut spans = Vec::new();
    let mut start = 0;
    loop {
        let mut end = floor_char_boundary(text, start + config.chunk_size);
        if end <= start {
            end = ceil_char_boundary(text, start + 1);
        }
        if end >= len {
            spans.push(ChunkSpan {
                start,
                end: len,
                owned_end: len,
            });
            break;
        }

        let mut owned_end = floor_char_boundary(text, end.saturating_sub(config.chunk_overlap));
        if owned_end <= start {
            owned_end = end;
        }
        spans.push(ChunkSpan {
            start,
            end,
            owned_end,
        });
        start = owned_end;
    }

    spans
}
