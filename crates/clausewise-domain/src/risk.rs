//! Risk levels for documents and individual clauses

use serde::{Deserialize, Serialize};

/// How hostile a document or clause is to the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Nothing unusual
    Low,

    /// Worth reading carefully
    Medium,

    /// Clearly user-hostile terms
    High,
}

impl RiskLevel {
    /// Get the risk level as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Parse a risk level from its wire string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }

    /// Adjustment applied to a site's trust score when an analysis of that
    /// site comes back at this level
    pub fn trust_delta(&self) -> i32 {
        match self {
            RiskLevel::Low => 10,
            RiskLevel::Medium => -5,
            RiskLevel::High => -15,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid risk level: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            assert_eq!(RiskLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(RiskLevel::parse("HIGH"), None);
        assert!("severe".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_trust_deltas() {
        assert_eq!(RiskLevel::Low.trust_delta(), 10);
        assert_eq!(RiskLevel::Medium.trust_delta(), -5);
        assert_eq!(RiskLevel::High.trust_delta(), -15);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let parsed: RiskLevel = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(parsed, RiskLevel::High);
    }
}
