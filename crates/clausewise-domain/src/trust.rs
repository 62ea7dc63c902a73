//! Trust scores - bounded per-site reputation
//!
//! A site starts neutral and drifts up or down as fresh analyses of its
//! documents come back. The number is never shown directly; readers see one
//! of four bands.

use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};

/// A per-site score in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustScore(u8);

impl TrustScore {
    /// Lowest possible score
    pub const MIN: u8 = 0;

    /// Highest possible score
    pub const MAX: u8 = 100;

    /// Score given to a site on first observation
    pub const NEUTRAL: TrustScore = TrustScore(50);

    /// Create a score, clamping into range
    pub fn new(value: i32) -> Self {
        TrustScore(value.clamp(Self::MIN as i32, Self::MAX as i32) as u8)
    }

    /// Raw score value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Apply the adjustment for an analysis that came back at `risk`
    pub fn adjust(self, risk: RiskLevel) -> Self {
        Self::new(self.0 as i32 + risk.trust_delta())
    }

    /// Band this score falls in
    pub fn band(&self) -> TrustBand {
        TrustBand::from_score(*self)
    }
}

impl Default for TrustScore {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Labelled ranges a trust score is rendered as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrustBand {
    /// 0-25
    Poor,
    /// 26-45
    Average,
    /// 46-75
    Good,
    /// 76-100
    Excellent,
}

impl TrustBand {
    /// Band for a score
    pub fn from_score(score: TrustScore) -> Self {
        match score.value() {
            76.. => TrustBand::Excellent,
            46..=75 => TrustBand::Good,
            26..=45 => TrustBand::Average,
            _ => TrustBand::Poor,
        }
    }

    /// Human-readable label including the range
    pub fn label(&self) -> &'static str {
        match self {
            TrustBand::Poor => "Poor (0-25)",
            TrustBand::Average => "Average (26-45)",
            TrustBand::Good => "Good (46-75)",
            TrustBand::Excellent => "Excellent (76-100)",
        }
    }
}

impl std::fmt::Display for TrustBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
