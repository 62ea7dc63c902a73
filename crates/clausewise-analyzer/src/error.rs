//! Error types for the Analyzer

use clausewise_llm::LlmError;
use clausewise_store::StoreError;
use thiserror::Error;

/// One way in which model output failed to match the expected shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// JSON path of the offending value, e.g. `notable_clauses[2].risk`
    pub path: String,
    /// What was wrong with it
    pub message: String,
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Errors that can occur during analysis
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Caller supplied unusable input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Model output was not JSON or did not match the expected shape
    #[error("Model output failed validation: {}", join_issues(.0))]
    SchemaMismatch(Vec<SchemaIssue>),

    /// Cache or trust store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

fn join_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl AnalyzerError {
    /// Shorthand for a single-issue schema mismatch
    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        AnalyzerError::SchemaMismatch(vec![SchemaIssue {
            path: path.into(),
            message: message.into(),
        }])
    }
}
