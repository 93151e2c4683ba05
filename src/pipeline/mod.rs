// Question analysis: lightweight metadata extraction and prompt shaping.
//
// Everything here is pure string work. The heuristics are deliberately
// naive (keyword checks, length buckets); swapping in a real intent
// classifier only touches this module.

pub mod selector;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Summarization,
    Explanatory,
    Factual,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Summarization => "summarization",
            Intent::Explanatory => "explanatory",
            Intent::Factual => "factual",
            Intent::General => "general",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionMetadata {
    pub intent: Intent,
    pub keywords: Vec<String>,
    pub length: usize,
}

impl QuestionMetadata {
    /// Extract intent, keywords and length from a raw question.
    pub fn extract(question: &str) -> Self {
        let length = question.chars().count();

        // words longer than 5 chars, capped at 8
        let keywords: Vec<String> = question
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| w.chars().count() > 5)
            .take(8)
            .map(|w| w.to_lowercase())
            .collect();

        let qlower = question.to_lowercase();
        let intent = if ["summarize", "summary", "summarise"]
            .iter()
            .any(|kw| qlower.contains(kw))
        {
            Intent::Summarization
        } else if ["how", "why", "explain"].iter().any(|kw| qlower.contains(kw)) {
            Intent::Explanatory
        } else if ["list", "what", "who", "when"].iter().any(|kw| qlower.contains(kw)) {
            Intent::Factual
        } else {
            Intent::General
        };

        Self { intent, keywords, length }
    }
}

/// Build the instruction block handed to the answer engine alongside the
/// raw question. Surfaces intent and keyword cues so the engine can shape
/// retrieval and tone.
pub fn build_prompt(metadata: &QuestionMetadata, document_ids: &[String]) -> String {
    let keywords = if metadata.keywords.is_empty() {
        "none".to_string()
    } else {
        metadata.keywords.join(", ")
    };
    let corpus = if document_ids.is_empty() {
        "the full document corpus".to_string()
    } else {
        document_ids.join(", ")
    };

    format!(
        "You are an assistant answering based on provided documents.\n\
         Intent: {}\n\
         Keywords: {}\n\
         Documents: {}\n\n\
         Answer concisely and cite relevant document snippets if applicable.",
        metadata.intent.as_str(),
        keywords,
        corpus,
    )
}
