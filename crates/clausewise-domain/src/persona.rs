//! Personas - the lens an analysis is written for

use crate::analysis::ResponseShape;
use serde::{Deserialize, Serialize};

/// A named reader profile that biases prompt framing and risk emphasis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// General audience; asks for data collection categories
    #[default]
    Standard,

    /// A parent deciding whether a child may use the service
    Parent,

    /// Someone publishing their own work on the platform
    ContentCreator,

    /// A developer integrating with the service or its API
    Developer,

    /// Someone primarily concerned with personal data
    PrivacyAdvocate,
}

impl Persona {
    /// Every persona, in declaration order
    pub const ALL: [Persona; 5] = [
        Persona::Standard,
        Persona::Parent,
        Persona::ContentCreator,
        Persona::Developer,
        Persona::PrivacyAdvocate,
    ];

    /// Get the persona as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Standard => "standard",
            Persona::Parent => "parent",
            Persona::ContentCreator => "content_creator",
            Persona::Developer => "developer",
            Persona::PrivacyAdvocate => "privacy_advocate",
        }
    }

    /// Parse a persona from its wire string
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    /// The result shape the model is asked to produce for this persona
    pub fn response_shape(&self) -> ResponseShape {
        match self {
            Persona::Standard => ResponseShape::Standard,
            _ => ResponseShape::Focused,
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let allowed: Vec<&str> = Self::ALL.iter().map(|p| p.as_str()).collect();
            format!("Invalid persona '{}', expected one of: {}", s, allowed.join(", "))
        })
    }
}
