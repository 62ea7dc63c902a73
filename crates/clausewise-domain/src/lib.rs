//! Clausewise Domain Layer
//!
//! Value types shared by every other crate in the workspace. Nothing here
//! performs I/O; storage, model access and HTTP live in the outer crates.
//!
//! ## Key Concepts
//!
//! - **Risk level**: low / medium / high rating of a document or clause
//! - **Persona**: the lens an analysis is written for
//! - **Analysis result**: the validated outcome of one analysis request
//! - **Trust score**: a bounded per-site reputation derived from past results
//! - **Dark pattern report**: the outcome of a screenshot inspection

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod chat;
pub mod dark_pattern;
pub mod persona;
pub mod risk;
pub mod trust;

// Re-exports for convenience
pub use analysis::{AnalysisResult, Clause, DataCollection, ResponseShape};
pub use chat::{ChatMessage, ChatPart, ChatRole};
pub use dark_pattern::{DarkPatternDetail, DarkPatternReport};
pub use persona::Persona;
pub use risk::RiskLevel;
pub use trust::{TrustBand, TrustScore};
