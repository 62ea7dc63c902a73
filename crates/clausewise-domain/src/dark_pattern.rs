//! Dark pattern reports from screenshot inspection

use serde::{Deserialize, Serialize};

/// One deceptive UI element found in a screenshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DarkPatternDetail {
    /// What the element looks like
    pub element_description: String,

    /// Category, e.g. "Confirmshaming" or "Fake Urgency"
    pub pattern_type: String,

    /// Why the element is deceptive
    pub explanation: String,

    /// Where on the screen it sits, if the model could tell
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_hint: Option<String>,
}

/// Outcome of a dark pattern inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DarkPatternReport {
    /// Whether anything deceptive was found
    pub has_dark_patterns: bool,

    /// Findings, in the order reported
    pub details: Vec<DarkPatternDetail>,
}
