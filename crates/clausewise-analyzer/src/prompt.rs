//! LLM prompt engineering for document analysis, chat and screenshots

use crate::image::ImagePayload;
use clausewise_domain::{ChatMessage, ChatRole, Persona, ResponseShape};
use clausewise_llm::{GenerationRequest, Part, ResponseFormat, Turn, TurnRole};

/// Cut `text` to at most `max_chars` characters without splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Builds the analysis prompt for a document and persona
pub struct PromptBuilder<'a> {
    text: &'a str,
    persona: Persona,
    max_text_length: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(text: &'a str, persona: Persona, max_text_length: usize) -> Self {
        Self {
            text,
            persona,
            max_text_length,
        }
    }

    /// Build the complete analysis request
    pub fn build(&self) -> GenerationRequest {
        let mut prompt = String::new();

        // 1. Role for the chosen persona
        prompt.push_str(persona_role(self.persona));
        prompt.push_str("\n\n");

        // 2. Task and rules
        prompt.push_str(ANALYSIS_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 3. Output shape
        prompt.push_str(match self.persona.response_shape() {
            ResponseShape::Standard => STANDARD_SCHEMA,
            ResponseShape::Focused => FOCUSED_SCHEMA,
        });
        prompt.push_str("\n\n");

        // 4. The text to analyze
        prompt.push_str("Text to analyze:\n");
        prompt.push_str("---\n");
        prompt.push_str(truncate_chars(self.text, self.max_text_length));
        prompt.push_str("\n---\n\n");

        // 5. Output format reminder
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        GenerationRequest::text(prompt).with_format(ResponseFormat::Json)
    }
}

/// Role description for each persona
pub fn persona_role(persona: Persona) -> &'static str {
    match persona {
        Persona::Standard => {
            "You are a consumer-rights analyst reviewing Terms and Conditions for an ordinary user. \
             Flag anything that is unusual, one-sided, or hostile to the user."
        }
        Persona::Parent => {
            "You are a child-safety reviewer advising a parent. Focus on age requirements, \
             contact with strangers, content moderation, in-app purchases, and data collected from minors."
        }
        Persona::ContentCreator => {
            "You are an intellectual-property advisor for content creators. Focus on licenses granted \
             over uploaded work, ownership, monetization, takedowns, and account termination."
        }
        Persona::Developer => {
            "You are a software licensing reviewer for developers. Focus on API usage limits, \
             rate limits, liability, warranty disclaimers, code ownership, and breaking-change policies."
        }
        Persona::PrivacyAdvocate => {
            "You are a privacy advocate. Focus on data collection, sharing or selling of personal data, \
             tracking, retention periods, and the user's ability to opt out or delete their data. \
             Treat any sale or sharing of personal data with third parties as at least medium risk."
        }
    }
}

const ANALYSIS_INSTRUCTIONS: &str = r#"Analyze the following Terms and Conditions text.
Identify the overall risk level (low, medium, high) based on user-hostile clauses.
List notable clauses with their titles, risk levels, and explanations.

Rules:
- Every notable clause MUST include a "quote" copied character-for-character from the text
- Do not paraphrase, reorder, or fix typos inside a quote; it is used to highlight the page
- Keep quotes short: one sentence or less
- Order clauses from most to least important"#;

const STANDARD_SCHEMA: &str = r#"Also list the categories of personal data collected:
- "tracked": data used to track the user across other companies' apps and websites
- "linked": data linked to the user's identity
Use short category names such as "Location", "Contact Info", "Browsing History".
Keep "summary" to one sentence.

{
  "overall_risk": "low" | "medium" | "high",
  "summary": "string",
  "notable_clauses": [
    { "title": "string", "risk": "low" | "medium" | "high", "explanation": "string", "quote": "string" }
  ],
  "data_collection": { "tracked": ["string"], "linked": ["string"] }
}"#;

const FOCUSED_SCHEMA: &str = r#"Write "summary" as a short paragraph aimed at your audience.

{
  "overall_risk": "low" | "medium" | "high",
  "summary": "string",
  "notable_clauses": [
    { "title": "string", "risk": "low" | "medium" | "high", "explanation": "string", "quote": "string" }
  ]
}"#;

const OUTPUT_FORMAT_REMINDER: &str =
    "Remember: Return ONLY valid JSON, no markdown code blocks, no explanations.";

/// Example categories listed in the screenshot prompt
pub const DARK_PATTERN_CATEGORIES: [&str; 7] = [
    "Confirmshaming",
    "Fake Urgency",
    "Fake Scarcity",
    "Hidden Costs",
    "Pre-checked Boxes",
    "Misdirection",
    "Roach Motel",
];

/// Build the screenshot inspection request
pub fn build_vision_request(image: &ImagePayload) -> GenerationRequest {
    let mut instruction = String::from(
        "You are a UX auditor. Inspect this screenshot of a web page for dark patterns: \
         interface designs that trick users into doing things they did not intend.\n\n",
    );
    instruction.push_str("Examples of dark patterns:\n");
    for category in DARK_PATTERN_CATEGORIES {
        instruction.push_str("- ");
        instruction.push_str(category);
        instruction.push('\n');
    }
    instruction.push_str(VISION_SCHEMA);

    GenerationRequest {
        turns: vec![Turn {
            role: TurnRole::User,
            parts: vec![
                Part::Text(instruction),
                Part::InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                },
            ],
        }],
        response_format: ResponseFormat::Json,
    }
}

const VISION_SCHEMA: &str = r#"
Return ONLY valid JSON in the following format:
{
  "has_dark_patterns": true | false,
  "details": [
    {
      "element_description": "string",
      "pattern_type": "string",
      "explanation": "string",
      "location_hint": "string"
    }
  ]
}
If nothing deceptive is visible, return "has_dark_patterns": false and an empty "details" array."#;

/// Acknowledgment turn placed after the document in a chat
pub const CHAT_ACKNOWLEDGMENT: &str =
    "Understood. I have read the document and will answer questions about it.";

/// Build a chat request: document context, acknowledgment, history, new message
pub fn build_chat_request(
    text: &str,
    history: &[ChatMessage],
    message: &str,
    max_text_length: usize,
) -> GenerationRequest {
    let context = format!(
        "You are a helpful assistant answering questions about the following Terms and Conditions. \
         Answer only from the document; say so when it does not cover the question. \
         Keep answers short and plain.\n\nDocument:\n---\n{}\n---",
        truncate_chars(text, max_text_length)
    );

    let mut turns = Vec::with_capacity(history.len() + 3);
    turns.push(Turn::user(context));
    turns.push(Turn::model(CHAT_ACKNOWLEDGMENT));
    turns.extend(history.iter().map(|msg| Turn {
        role: match msg.role {
            ChatRole::User => TurnRole::User,
            ChatRole::Model => TurnRole::Model,
        },
        parts: msg.parts.iter().map(|p| Part::Text(p.text.clone())).collect(),
    }));
    turns.push(Turn::user(message));

    GenerationRequest {
        turns,
        response_format: ResponseFormat::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn test_prompt_includes_text() {
        let request = PromptBuilder::new("We may sell your data", Persona::Standard, 1000).build();
        let prompt = request.flattened_text();
        assert!(prompt.contains("We may sell your data"));
        assert_eq!(request.response_format, ResponseFormat::Json);
    }

    #[test]
    fn test_standard_prompt_asks_for_data_collection() {
        let prompt = PromptBuilder::new("Text", Persona::Standard, 1000)
            .build()
            .flattened_text();
        assert!(prompt.contains("data_collection"));
        assert!(prompt.contains("\"tracked\""));
        assert!(prompt.contains("\"quote\""));
    }

    #[test]
    fn test_focused_prompt_omits_data_collection() {
        for persona in [
            Persona::Parent,
            Persona::ContentCreator,
            Persona::Developer,
            Persona::PrivacyAdvocate,
        ] {
            let prompt = PromptBuilder::new("Text", persona, 1000).build().flattened_text();
            assert!(!prompt.contains("data_collection"), "{} prompt", persona);
            assert!(prompt.contains("\"quote\""));
            assert!(prompt.contains(persona_role(persona)));
        }
    }

    #[test]
    fn test_prompt_truncates_text() {
        let text = format!("{}TAIL", "a".repeat(100));
        let prompt = PromptBuilder::new(&text, Persona::Standard, 100)
            .build()
            .flattened_text();
        assert!(prompt.contains(&"a".repeat(100)));
        assert!(!prompt.contains("TAIL"));
    }

    #[test]
    fn test_vision_request_inlines_image() {
        let image = ImagePayload {
            mime_type: "image/jpeg".to_string(),
            data: "AAAA".to_string(),
        };
        let request = build_vision_request(&image);
        assert_eq!(request.turns.len(), 1);
        assert_eq!(request.turns[0].parts.len(), 2);
        assert!(matches!(
            &request.turns[0].parts[1],
            Part::InlineData { mime_type, data } if mime_type == "image/jpeg" && data == "AAAA"
        ));
        let text = request.flattened_text();
        for category in DARK_PATTERN_CATEGORIES {
            assert!(text.contains(category));
        }
        assert!(text.contains("has_dark_patterns"));
    }

    #[test]
    fn test_chat_request_turn_order() {
        let history = vec![
            ChatMessage::user("Can they sell my data?"),
            ChatMessage::model("Yes, section 4 allows it."),
        ];
        let request = build_chat_request("The terms", &history, "Can I opt out?", 1000);

        assert_eq!(request.response_format, ResponseFormat::Text);
        assert_eq!(request.turns.len(), 5);
        assert_eq!(request.turns[0].role, TurnRole::User);
        assert!(matches!(&request.turns[0].parts[0], Part::Text(t) if t.contains("The terms")));
        assert_eq!(request.turns[1], Turn::model(CHAT_ACKNOWLEDGMENT));
        assert_eq!(request.turns[2], Turn::user("Can they sell my data?"));
        assert_eq!(request.turns[3], Turn::model("Yes, section 4 allows it."));
        assert_eq!(request.turns[4], Turn::user("Can I opt out?"));
    }

    #[test]
    fn test_chat_request_truncates_context() {
        let text = format!("{}TAIL", "b".repeat(50));
        let request = build_chat_request(&text, &[], "question", 50);
        assert!(!request.flattened_text().contains("TAIL"));
    }
}
