use serde::{Deserialize, Serialize};

/// Textual shape of a speaker header in a Hansard transcript
///
/// Forms are listed from most to least trusted. The explicit priority lives on
/// each variant rather than in any array order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderForm {
    /// `Name [Constituency]:`
    BracketedConstituency,
    /// `Title Name (Constituency):`
    TitledParenthesized,
    /// `[A - B]:` at line start, order of the two parts unknown
    BracketedPair,
    /// `Name (Constituency):` at line start, no honorific required
    LineParenthesized,
    /// `Title Name:` with no constituency
    TitleOnly,
}

impl HeaderForm {
    pub const ALL: [HeaderForm; 5] = [
        HeaderForm::BracketedConstituency,
        HeaderForm::TitledParenthesized,
        HeaderForm::BracketedPair,
        HeaderForm::LineParenthesized,
        HeaderForm::TitleOnly,
    ];

    /// Trust rank, 1 is highest
    pub fn priority(self) -> u8 {
        match self {
            HeaderForm::BracketedConstituency => 1,
            HeaderForm::TitledParenthesized => 2,
            HeaderForm::BracketedPair => 3,
            HeaderForm::LineParenthesized => 4,
            HeaderForm::TitleOnly => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HeaderForm::BracketedConstituency => "Name [Constituency]:",
            HeaderForm::TitledParenthesized => "Title Name (Constituency):",
            HeaderForm::BracketedPair => "[A - B]:",
            HeaderForm::LineParenthesized => "Name (Constituency):",
            HeaderForm::TitleOnly => "Title Name:",
        }
    }
}

/// Raw output of pattern scanning, before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    /// Absolute byte offset of the header's first non-blank character
    pub position: usize,
    /// Header length in bytes, measured from `position`
    pub length: usize,
    /// The header text as it appears in the transcript
    pub raw_text: String,
    /// First captured group
    pub candidate_a: String,
    /// Second captured group, when the form has one
    pub candidate_b: Option<String>,
    /// Pattern form that produced the match
    pub form: HeaderForm,
}

impl HeaderMatch {
    /// Byte offset just past the header (where speech begins)
    pub fn end(&self) -> usize {
        self.position + self.length
    }
}
