//! Parse and validate model output
//!
//! The model is asked for JSON but nothing guarantees it. Output is checked
//! field by field and every problem is collected, so a rejection explains all
//! of what was wrong at once. There are no partial results: any issue fails
//! the whole parse.

use crate::error::{AnalyzerError, SchemaIssue};
use clausewise_domain::{
    AnalysisResult, Clause, DarkPatternDetail, DarkPatternReport, DataCollection, ResponseShape,
    RiskLevel,
};
use serde_json::{Map, Value};
use tracing::debug;

/// Parse an analysis response for the given shape
///
/// Quotes that are not exact substrings of `source` are dropped rather than
/// failing the parse, since the rest of the clause is still useful.
pub fn parse_analysis(
    response: &str,
    shape: ResponseShape,
    source: &str,
) -> Result<AnalysisResult, AnalyzerError> {
    let json = parse_json(response)?;
    let mut issues = Vec::new();
    let root = Reader::root(&json, &mut issues)?;

    let overall_risk = root.risk("overall_risk", &mut issues);
    let summary = root.string("summary", &mut issues);

    let mut notable_clauses = Vec::new();
    if let Some(items) = root.array("notable_clauses", &mut issues) {
        for (idx, item) in items.iter().enumerate() {
            let path = format!("notable_clauses[{}]", idx);
            if let Some(clause) = parse_clause(item, &path, &mut issues) {
                notable_clauses.push(clause);
            }
        }
    }

    let data_collection = if shape.requires_data_collection() {
        root.object("data_collection", &mut issues).and_then(|dc| {
            let tracked = dc.string_list("tracked", &mut issues);
            let linked = dc.string_list("linked", &mut issues);
            Some(DataCollection::new(tracked?, linked?))
        })
    } else {
        None
    };

    if !issues.is_empty() {
        return Err(AnalyzerError::SchemaMismatch(issues));
    }

    let (Some(overall_risk), Some(summary)) = (overall_risk, summary) else {
        return Err(AnalyzerError::schema("", "incomplete analysis"));
    };

    for clause in &mut notable_clauses {
        if !clause.quote_matches(source) {
            debug!("Dropping quote for '{}': not found in source text", clause.title);
            clause.quote = None;
        }
    }

    Ok(AnalysisResult {
        overall_risk,
        summary,
        notable_clauses,
        trust_score: None,
        data_collection,
    })
}

fn parse_clause(value: &Value, path: &str, issues: &mut Vec<SchemaIssue>) -> Option<Clause> {
    let reader = Reader::at(value, path, issues)?;
    let title = reader.string("title", issues);
    let risk = reader.risk("risk", issues);
    let explanation = reader.string("explanation", issues);
    let quote = reader.optional_string("quote", issues);

    Some(Clause {
        title: title?,
        risk: risk?,
        explanation: explanation?,
        quote: quote.filter(|q| !q.trim().is_empty()),
    })
}

/// Parse a screenshot inspection response
pub fn parse_dark_patterns(response: &str) -> Result<DarkPatternReport, AnalyzerError> {
    let json = parse_json(response)?;
    let mut issues = Vec::new();
    let root = Reader::root(&json, &mut issues)?;

    let has_dark_patterns = root.boolean("has_dark_patterns", &mut issues);
    let mut details = Vec::new();
    if let Some(items) = root.array("details", &mut issues) {
        for (idx, item) in items.iter().enumerate() {
            let path = format!("details[{}]", idx);
            let Some(reader) = Reader::at(item, &path, &mut issues) else {
                continue;
            };
            let element_description = reader.string("element_description", &mut issues);
            let pattern_type = reader.string("pattern_type", &mut issues);
            let explanation = reader.string("explanation", &mut issues);
            let location_hint = reader.optional_string("location_hint", &mut issues);
            if let (Some(element_description), Some(pattern_type), Some(explanation)) =
                (element_description, pattern_type, explanation)
            {
                details.push(DarkPatternDetail {
                    element_description,
                    pattern_type,
                    explanation,
                    location_hint,
                });
            }
        }
    }

    if !issues.is_empty() {
        return Err(AnalyzerError::SchemaMismatch(issues));
    }
    let Some(has_dark_patterns) = has_dark_patterns else {
        return Err(AnalyzerError::schema("has_dark_patterns", "missing"));
    };

    Ok(DarkPatternReport {
        has_dark_patterns,
        details,
    })
}

/// Parse JSON, tolerating a markdown code fence around it
fn parse_json(response: &str) -> Result<Value, AnalyzerError> {
    let json_str = extract_json(response);
    serde_json::from_str(json_str)
        .map_err(|e| AnalyzerError::schema("", format!("JSON parse error: {}", e)))
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Skip the opening fence line (```json or ```)
        let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
        body.trim_end().strip_suffix("```").unwrap_or(body).trim()
    } else {
        trimmed
    }
}

/// Field accessor over a JSON object that records issues with full paths
struct Reader<'a> {
    obj: &'a Map<String, Value>,
    path: String,
}

impl<'a> Reader<'a> {
    fn root(value: &'a Value, issues: &mut Vec<SchemaIssue>) -> Result<Self, AnalyzerError> {
        match Self::at(value, "", issues) {
            Some(reader) => Ok(reader),
            None => Err(AnalyzerError::SchemaMismatch(std::mem::take(issues))),
        }
    }

    fn at(value: &'a Value, path: &str, issues: &mut Vec<SchemaIssue>) -> Option<Self> {
        match value.as_object() {
            Some(obj) => Some(Self {
                obj,
                path: path.to_string(),
            }),
            None => {
                issues.push(SchemaIssue {
                    path: path.to_string(),
                    message: format!("expected object, got {}", type_name(value)),
                });
                None
            }
        }
    }

    fn field_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    fn issue(&self, key: &str, message: impl Into<String>, issues: &mut Vec<SchemaIssue>) {
        issues.push(SchemaIssue {
            path: self.field_path(key),
            message: message.into(),
        });
    }

    fn required(&self, key: &str, issues: &mut Vec<SchemaIssue>) -> Option<&'a Value> {
        match self.obj.get(key) {
            Some(Value::Null) | None => {
                self.issue(key, "required", issues);
                None
            }
            Some(value) => Some(value),
        }
    }

    fn string(&self, key: &str, issues: &mut Vec<SchemaIssue>) -> Option<String> {
        let value = self.required(key, issues)?;
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.issue(key, format!("expected string, got {}", type_name(value)), issues);
                None
            }
        }
    }

    fn optional_string(&self, key: &str, issues: &mut Vec<SchemaIssue>) -> Option<String> {
        match self.obj.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                self.issue(key, format!("expected string, got {}", type_name(other)), issues);
                None
            }
        }
    }

    fn boolean(&self, key: &str, issues: &mut Vec<SchemaIssue>) -> Option<bool> {
        let value = self.required(key, issues)?;
        match value.as_bool() {
            Some(b) => Some(b),
            None => {
                self.issue(key, format!("expected boolean, got {}", type_name(value)), issues);
                None
            }
        }
    }

    fn risk(&self, key: &str, issues: &mut Vec<SchemaIssue>) -> Option<RiskLevel> {
        let value = self.required(key, issues)?;
        match value.as_str().and_then(RiskLevel::parse) {
            Some(risk) => Some(risk),
            None => {
                self.issue(key, "expected one of 'low', 'medium', 'high'", issues);
                None
            }
        }
    }

    fn array(&self, key: &str, issues: &mut Vec<SchemaIssue>) -> Option<&'a Vec<Value>> {
        let value = self.required(key, issues)?;
        match value.as_array() {
            Some(items) => Some(items),
            None => {
                self.issue(key, format!("expected array, got {}", type_name(value)), issues);
                None
            }
        }
    }

    fn object(&self, key: &str, issues: &mut Vec<SchemaIssue>) -> Option<Reader<'a>> {
        let value = self.required(key, issues)?;
        Reader::at(value, &self.field_path(key), issues)
    }

    fn string_list(&self, key: &str, issues: &mut Vec<SchemaIssue>) -> Option<Vec<String>> {
        let items = self.array(key, issues)?;
        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (idx, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(s) => out.push(s.to_string()),
                None => {
                    ok = false;
                    issues.push(SchemaIssue {
                        path: format!("{}[{}]", self.field_path(key), idx),
                        message: format!("expected string, got {}", type_name(item)),
                    });
                }
            }
        }
        ok.then_some(out)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
