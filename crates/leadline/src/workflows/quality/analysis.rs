use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workflows::contacts::QualityStamp;

/// Which stage of the scoring pipeline raised a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSource {
    Validator,
    Pattern,
    Ai,
}

/// Human-readable issue or recommendation tagged with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityNote {
    pub source: IssueSource,
    pub message: String,
}

impl QualityNote {
    pub fn new(source: IssueSource, message: impl Into<String>) -> Self {
        Self {
            source,
            message: message.into(),
        }
    }

    pub fn validator(message: impl Into<String>) -> Self {
        Self::new(IssueSource::Validator, message)
    }

    pub fn ai(message: impl Into<String>) -> Self {
        Self::new(IssueSource::Ai, message)
    }
}

/// What the AI stage contributed, so "no signal" is never confused with "not suspicious".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AiSignal {
    /// A live endpoint answered with a parseable assessment.
    Assessed,
    /// The assessor runs without credentials and only applied its offline heuristic.
    Offline,
    /// The live call failed, timed out, or returned unusable output.
    Failed { reason: String },
}

/// Outcome of scoring one contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAnalysis {
    pub quality_score: u8,
    pub issues: Vec<QualityNote>,
    pub recommendations: Vec<QualityNote>,
    pub is_suspicious_by_pattern: bool,
    pub is_suspicious_by_ai: bool,
    pub ai_signal: AiSignal,
    pub ai_details: Option<Value>,
    pub normalized_phone: Option<String>,
}

impl QualityAnalysis {
    pub fn is_suspicious(&self) -> bool {
        self.is_suspicious_by_pattern || self.is_suspicious_by_ai
    }

    pub fn stamp(&self) -> QualityStamp {
        QualityStamp {
            quality_score: self.quality_score,
            is_suspicious: self.is_suspicious(),
            ai_details: self.ai_details.clone(),
        }
    }

    pub fn issues_from(&self, source: IssueSource) -> impl Iterator<Item = &QualityNote> {
        self.issues.iter().filter(move |note| note.source == source)
    }
}
