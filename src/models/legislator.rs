use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A canonical member-of-parliament record from the registry snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legislator {
    /// Stable identifier assigned by the persistence layer
    pub id: String,
    /// Canonical display name
    #[serde(alias = "canonicalName")]
    pub name: String,
    /// Constituency (kawasan) the legislator holds, if known
    #[serde(default)]
    pub constituency: Option<String>,
    /// Date the legislator was sworn in; sessions before it earn no credit
    #[serde(default, alias = "swornInDate")]
    pub sworn_in_date: Option<NaiveDate>,
}

impl Legislator {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            constituency: None,
            sworn_in_date: None,
        }
    }

    pub fn with_constituency(mut self, constituency: impl Into<String>) -> Self {
        self.constituency = Some(constituency.into());
        self
    }

    pub fn sworn_in(mut self, date: NaiveDate) -> Self {
        self.sworn_in_date = Some(date);
        self
    }

    /// Whether a session held on `session_date` falls inside the eligibility window
    pub fn is_eligible_on(&self, session_date: NaiveDate) -> bool {
        self.sworn_in_date.is_none_or(|sworn| session_date >= sworn)
    }
}

/// Identifies the sitting a transcript belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    #[serde(alias = "sessionId")]
    pub session_id: String,
    #[serde(alias = "sessionDate")]
    pub session_date: NaiveDate,
}

impl SessionMetadata {
    pub fn new(session_id: impl Into<String>, session_date: NaiveDate) -> Self {
        Self {
            session_id: session_id.into(),
            session_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot_entry_with_aliases() {
        let json = r#"{"id": "L1", "canonicalName": "Ahmad", "constituency": "Kuala Terengganu", "swornInDate": "2022-12-19"}"#;
        let legislator: Legislator = serde_json::from_str(json).unwrap();

        assert_eq!(legislator.id, "L1");
        assert_eq!(legislator.name, "Ahmad");
        assert_eq!(legislator.constituency.as_deref(), Some("Kuala Terengganu"));
        assert_eq!(
            legislator.sworn_in_date,
            NaiveDate::from_ymd_opt(2022, 12, 19)
        );
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let json = r#"{"id": "L2", "name": "Siti"}"#;
        let legislator: Legislator = serde_json::from_str(json).unwrap();

        assert!(legislator.constituency.is_none());
        assert!(legislator.sworn_in_date.is_none());
    }

    #[test]
    fn test_eligibility_window() {
        let sworn = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        let legislator = Legislator::new("L1", "Ahmad").sworn_in(sworn);

        assert!(!legislator.is_eligible_on(NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()));
        assert!(legislator.is_eligible_on(sworn));
        assert!(legislator.is_eligible_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));

        // No sworn-in date means always eligible
        let unknown = Legislator::new("L2", "Siti");
        assert!(unknown.is_eligible_on(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()));
    }
}
