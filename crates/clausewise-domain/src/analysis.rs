//! Analysis results and their parts

use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};

/// A single notable clause picked out of the analyzed text
///
/// Owned by its parent [`AnalysisResult`]; clauses have no identity of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// Short heading for the clause
    pub title: String,

    /// How hostile this clause is
    pub risk: RiskLevel,

    /// Plain-language explanation
    pub explanation: String,

    /// Exact text copied from the source, used for highlighting on the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
}

impl Clause {
    /// Whether the quote (if any) appears verbatim in `source`
    pub fn quote_matches(&self, source: &str) -> bool {
        match &self.quote {
            Some(quote) => !quote.is_empty() && source.contains(quote.as_str()),
            None => true,
        }
    }
}

/// Categories of personal data a service collects
///
/// Both lists behave as sets: duplicates collapse, first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCollection {
    /// Data used to track the user across apps and sites
    pub tracked: Vec<String>,

    /// Data linked to the user's identity
    pub linked: Vec<String>,
}

impl DataCollection {
    /// Build from raw category lists, trimming and de-duplicating each
    pub fn new<I, J>(tracked: I, linked: J) -> Self
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
    {
        Self {
            tracked: dedup(tracked),
            linked: dedup(linked),
        }
    }
}

fn dedup<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.trim().to_string();
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Which payload the model must return for a given persona
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Summary plus `data_collection` lists
    Standard,

    /// Persona-focused free-text summary, no data collection lists
    Focused,
}

impl ResponseShape {
    /// Whether `data_collection` is required in this shape
    pub fn requires_data_collection(&self) -> bool {
        matches!(self, ResponseShape::Standard)
    }
}

/// The validated outcome of one analysis request
///
/// Immutable once produced. `trust_score` is attached at response time and is
/// never part of what gets cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Overall rating for the document
    pub overall_risk: RiskLevel,

    /// Short summary of the document
    pub summary: String,

    /// Clauses worth the reader's attention, most important first
    pub notable_clauses: Vec<Clause>,

    /// Trust band label for the site the text came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_score: Option<String>,

    /// Data collection categories (standard persona only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_collection: Option<DataCollection>,
}

impl AnalysisResult {
    /// Return a copy carrying the given trust band label
    pub fn with_trust_score(mut self, label: impl Into<String>) -> Self {
        self.trust_score = Some(label.into());
        self
    }

    /// Count clauses at the given risk level
    pub fn clauses_at(&self, risk: RiskLevel) -> usize {
        self.notable_clauses.iter().filter(|c| c.risk == risk).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(quote: Option<&str>) -> Clause {
        Clause {
            title: "Data sale".to_string(),
            risk: RiskLevel::High,
            explanation: "They sell your data".to_string(),
            quote: quote.map(str::to_string),
        }
    }

    #[test]
    fn test_quote_matches() {
        let source = "You agree we may sell your data to third parties.";
        assert!(clause(Some("sell your data")).quote_matches(source));
        assert!(clause(None).quote_matches(source));
        assert!(!clause(Some("rent your data")).quote_matches(source));
        assert!(!clause(Some("")).quote_matches(source));
    }

    #[test]
    fn test_data_collection_dedups() {
        let dc = DataCollection::new(
            vec!["Location".into(), " Location ".into(), "Contacts".into()],
            vec!["Email".into(), "".into()],
        );
        assert_eq!(dc.tracked, vec!["Location", "Contacts"]);
        assert_eq!(dc.linked, vec!["Email"]);
    }

    #[test]
    fn test_serialize_omits_absent_optionals() {
        let result = AnalysisResult {
            overall_risk: RiskLevel::Low,
            summary: "Fine".to_string(),
            notable_clauses: vec![],
            trust_score: None,
            data_collection: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("trust_score").is_none());
        assert!(json.get("data_collection").is_none());
        assert_eq!(json["overall_risk"], "low");
    }

    #[test]
    fn test_with_trust_score() {
        let result = AnalysisResult {
            overall_risk: RiskLevel::Medium,
            summary: String::new(),
            notable_clauses: vec![clause(None), clause(None)],
            trust_score: None,
            data_collection: None,
        }
        .with_trust_score("Good (46-75)");
        assert_eq!(result.trust_score.as_deref(), Some("Good (46-75)"));
        assert_eq!(result.clauses_at(RiskLevel::High), 2);
        assert_eq!(result.clauses_at(RiskLevel::Low), 0);
    }
}
