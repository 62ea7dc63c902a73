//! Provider-neutral generation requests
//!
//! A request is an ordered conversation of turns, each made of text and
//! inline binary parts, plus the format the caller expects back.

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    /// Caller-authored turn
    User,
    /// Model-authored turn
    Model,
}

impl TurnRole {
    /// Role name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// One piece of a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Plain text
    Text(String),

    /// Base64 payload with its MIME type, e.g. a screenshot
    InlineData {
        /// MIME type such as `image/png`
        mime_type: String,
        /// Base64-encoded bytes
        data: String,
    },
}

/// One turn of the conversation sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Who authored the turn
    pub role: TurnRole,
    /// Ordered parts
    pub parts: Vec<Part>,
}

impl Turn {
    /// Single-text user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Single-text model turn
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            parts: vec![Part::Text(text.into())],
        }
    }
}

/// What the caller expects the model to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Free text
    #[default]
    Text,
    /// A single JSON document
    Json,
}

impl ResponseFormat {
    /// MIME type to request from the provider
    pub fn mime_type(&self) -> &'static str {
        match self {
            ResponseFormat::Text => "text/plain",
            ResponseFormat::Json => "application/json",
        }
    }
}

/// A complete request to a language model
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationRequest {
    /// Conversation, oldest turn first
    pub turns: Vec<Turn>,
    /// Expected output format
    pub response_format: ResponseFormat,
}

impl GenerationRequest {
    /// One user turn with a single text part
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::user(prompt)],
            response_format: ResponseFormat::Text,
        }
    }

    /// Set the expected output format
    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// All text parts concatenated with newlines, for logging and matching
    pub fn flattened_text(&self) -> String {
        self.turns
            .iter()
            .flat_map(|turn| turn.parts.iter())
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Total characters of text across all turns
    pub fn text_len(&self) -> usize {
        self.turns
            .iter()
            .flat_map(|turn| turn.parts.iter())
            .map(|part| match part {
                Part::Text(text) => text.len(),
                Part::InlineData { .. } => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattened_text_skips_inline_data() {
        let request = GenerationRequest {
            turns: vec![Turn {
                role: TurnRole::User,
                parts: vec![
                    Part::Text("look at this".into()),
                    Part::InlineData {
                        mime_type: "image/png".into(),
                        data: "aGVsbG8=".into(),
                    },
                ],
            }],
            response_format: ResponseFormat::Json,
        };
        assert_eq!(request.flattened_text(), "look at this");
        assert_eq!(request.text_len(), 12);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ResponseFormat::Json.mime_type(), "application/json");
        assert_eq!(ResponseFormat::default(), ResponseFormat::Text);
    }
}
