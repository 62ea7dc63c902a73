//! Request bodies and their validation.
//!
//! Bodies are deserialized leniently (every field optional) so that a missing
//! field is reported the same way as an empty one: as a [`FieldError`] in a
//! 400 response rather than a generic deserialization failure.

use clausewise_analyzer::{AnalysisRequest, ChatRequest, ImagePayload};
use clausewise_domain::{ChatMessage, ChatPart, ChatRole, Persona};
use serde::{Deserialize, Serialize};

/// One reason a request was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Offending field, e.g. `history[1].role`
    pub field: String,
    /// What was wrong with it
    pub message: String,
}

impl FieldError {
    /// Create a field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Body of `POST /analyze`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeBody {
    /// Document text
    pub text: Option<String>,
    /// Page the text came from
    pub url: Option<String>,
    /// Persona wire name; `standard` when absent
    pub persona: Option<String>,
}

/// Body of `POST /chat`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatBody {
    /// Document text
    pub text: Option<String>,
    /// New question
    pub message: Option<String>,
    /// Earlier turns, oldest first
    pub history: Vec<HistoryEntry>,
}

/// One turn of chat history as sent by the client
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    /// `user` or `model`
    pub role: String,
    /// Text fragments
    pub parts: Vec<ChatPart>,
}

/// Body of `POST /detect-dark-patterns`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DarkPatternBody {
    /// Data URL or raw base64 screenshot
    #[serde(rename = "imageBase64")]
    pub image_base64: Option<String>,
}

fn required_text(value: Option<String>, field: &str, errors: &mut Vec<FieldError>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        Some(_) => {
            errors.push(FieldError::new(field, format!("{} must not be empty", field)));
            String::new()
        }
        None => {
            errors.push(FieldError::new(field, format!("{} is required", field)));
            String::new()
        }
    }
}

impl AnalyzeBody {
    /// Validate into an analysis request
    pub fn validate(self) -> Result<AnalysisRequest, Vec<FieldError>> {
        let mut errors = Vec::new();
        let text = required_text(self.text, "text", &mut errors);

        let persona = match self.persona.as_deref() {
            None => Persona::default(),
            Some(p) => p.parse::<Persona>().unwrap_or_else(|message| {
                errors.push(FieldError::new("persona", message));
                Persona::default()
            }),
        };

        let url = self.url.filter(|u| !u.trim().is_empty());

        if errors.is_empty() {
            Ok(AnalysisRequest { text, url, persona })
        } else {
            Err(errors)
        }
    }
}

impl ChatBody {
    /// Validate into a chat request
    pub fn validate(self) -> Result<ChatRequest, Vec<FieldError>> {
        let mut errors = Vec::new();
        let text = required_text(self.text, "text", &mut errors);
        let message = required_text(self.message, "message", &mut errors);

        let mut history = Vec::with_capacity(self.history.len());
        for (i, entry) in self.history.into_iter().enumerate() {
            match ChatRole::parse(&entry.role) {
                Some(role) => history.push(ChatMessage {
                    role,
                    parts: entry.parts,
                }),
                None => errors.push(FieldError::new(
                    format!("history[{}].role", i),
                    format!("Invalid role '{}', expected one of: user, model", entry.role),
                )),
            }
        }

        if errors.is_empty() {
            Ok(ChatRequest {
                text,
                message,
                history,
            })
        } else {
            Err(errors)
        }
    }
}

impl DarkPatternBody {
    /// Validate into a decoded image payload
    pub fn validate(self) -> Result<ImagePayload, Vec<FieldError>> {
        let raw = self
            .image_base64
            .ok_or_else(|| vec![FieldError::new("imageBase64", "imageBase64 is required")])?;

        ImagePayload::parse(&raw).map_err(|message| vec![FieldError::new("imageBase64", message)])
    }
}
