// Dynamic model selection.
//
// `select_model` is a pure function: identical inputs always pick the same
// engine identifier. Complexity is scored 0-100 from observable textual
// signals and mapped onto an ordered list of (threshold, model) tiers,
// cheapest first. Conservative scoring means ambiguous questions land in
// the cheaper tier; `prefer_quality` flips that bias for borderline scores.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{Intent, QuestionMetadata};
use crate::types::PipelineError;

/// Promotion applied to the score when quality is preferred over cost.
const QUALITY_BUMP: u32 = 10;

const ANALYTICAL_PHRASES: &[&str] = &[
    "compare",
    "contrast",
    "versus",
    " vs ",
    "difference between",
    "analyze",
    "analyse",
    "evaluate",
    "implication",
    "trade-off",
    "tradeoff",
    "pros and cons",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTier {
    /// Minimum complexity score for this tier.
    pub threshold: u32,
    pub model: String,
}

/// Ordered model tiers, cheapest first. Higher tiers map to strictly more
/// capable (and costlier) engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTiers {
    pub tiers: Vec<ModelTier>,
    #[serde(default)]
    pub prefer_quality: bool,
}

impl Default for ModelTiers {
    fn default() -> Self {
        Self {
            tiers: vec![
                ModelTier { threshold: 0, model: "gpt-4o-mini".to_string() },
                ModelTier { threshold: 40, model: "gpt-4o".to_string() },
                ModelTier { threshold: 75, model: "gpt-4-turbo".to_string() },
            ],
            prefer_quality: false,
        }
    }
}

impl FromStr for ModelTiers {
    type Err = PipelineError;

    /// Parse a `threshold:model` CSV, e.g. `0:small,40:medium,75:large`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tiers = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (threshold, model) = part.split_once(':').ok_or_else(|| {
                PipelineError::InvalidRequest(format!(
                    "model tier '{part}' is not in threshold:model form"
                ))
            })?;
            let threshold: u32 = threshold.trim().parse().map_err(|_| {
                PipelineError::InvalidRequest(format!(
                    "model tier threshold '{threshold}' is not a number"
                ))
            })?;
            let model = model.trim();
            if model.is_empty() {
                return Err(PipelineError::InvalidRequest(format!(
                    "model tier '{part}' has an empty model identifier"
                )));
            }
            tiers.push(ModelTier { threshold, model: model.to_string() });
        }
        if tiers.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "at least one model tier is required".to_string(),
            ));
        }
        tiers.sort_by_key(|t| t.threshold);
        Ok(Self { tiers, prefer_quality: false })
    }
}

/// Score a question's complexity from 0 (trivial lookup) to 100.
pub fn complexity_score(question: &str, metadata: &QuestionMetadata) -> u32 {
    let qlower = question.to_lowercase();
    let mut score = (metadata.length / 4).min(30) as u32;

    if ANALYTICAL_PHRASES.iter().any(|kw| qlower.contains(kw)) {
        score += 25;
    }

    // multi-part phrasing: several clauses or chained questions
    let clause_marks = qlower.matches('?').count()
        + qlower.matches(';').count()
        + qlower.matches(" and ").count();
    if clause_marks >= 2 {
        score += 15;
    }

    // summaries read whole documents regardless of question length
    if metadata.intent == Intent::Summarization {
        score += 35;
    }

    // keyword density: mostly long content words suggests a technical ask
    let words = question.split_whitespace().count().max(1);
    if metadata.keywords.len() * 100 / words >= 50 {
        score += 10;
    }

    score.min(100)
}

/// Pick the engine identifier for a question. Deterministic and free of
/// side effects for the same `(question, metadata, tiers)`.
pub fn select_model(question: &str, metadata: &QuestionMetadata, tiers: &ModelTiers) -> String {
    let mut score = complexity_score(question, metadata);
    if tiers.prefer_quality {
        score = (score + QUALITY_BUMP).min(100);
    }

    tiers
        .tiers
        .iter()
        .rev()
        .find(|t| t.threshold <= score)
        .or_else(|| tiers.tiers.first())
        .map(|t| t.model.clone())
        .unwrap_or_default()
}
