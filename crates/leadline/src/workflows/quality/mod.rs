//! Contact quality scoring: deterministic field validation plus an optional AI judgement.

mod analysis;
mod assessor;
mod config;
mod gemini;
mod prompt;
mod validator;

#[cfg(test)]
mod tests;

pub use analysis::{AiSignal, IssueSource, QualityAnalysis, QualityNote};
pub use assessor::{
    AiAssessment, AiJudgement, AiQualityAssessor, AssessmentError, AssessorMode, GenerativeClient,
};
pub use config::ScoringWeights;
pub use gemini::GeminiClient;
pub use validator::{
    suspicious_name_pattern, NameCompleteness, SuspiciousPattern, ValidationReport, Validator,
};

use tracing::{info, warn};

use crate::config::{AiConfig, ScoringConfig};
use crate::workflows::contacts::ContactDraft;

/// Combines the validator rubric with the AI assessor into a single 0-100 score.
#[derive(Debug, Clone)]
pub struct ContactScorer {
    validator: Validator,
    assessor: AiQualityAssessor,
    weights: ScoringWeights,
}

impl ContactScorer {
    pub fn new(validator: Validator, assessor: AiQualityAssessor, weights: ScoringWeights) -> Self {
        Self {
            validator,
            assessor,
            weights,
        }
    }

    pub fn from_config(scoring: &ScoringConfig, ai: &AiConfig) -> Self {
        Self::new(
            Validator::new(scoring.default_region),
            AiQualityAssessor::from_config(ai),
            scoring.weights.clone(),
        )
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn assessor(&self) -> &AiQualityAssessor {
        &self.assessor
    }

    /// Score a contact. Never fails: malformed input and AI outages surface as issues.
    pub async fn score(&self, draft: &ContactDraft) -> QualityAnalysis {
        let report = self.validator.validate(draft);
        let weights = &self.weights;

        let mut score = 0.0_f32;
        if report.phone_valid {
            score += weights.valid_phone;
        }
        if report.email_valid {
            score += weights.valid_email;
        }
        score += match report.name {
            NameCompleteness::Full => weights.complete_name,
            NameCompleteness::Partial => weights.partial_name(),
            NameCompleteness::Missing => 0.0,
        };
        if report.has_required_fields {
            score += weights.is_complete;
        }
        if report.is_suspicious_by_pattern() {
            score += weights.pattern_penalty();
        }

        let is_suspicious_by_pattern = report.is_suspicious_by_pattern();
        let normalized_phone = report.normalized_phone.clone();
        let mut issues = report.issues;
        let mut recommendations = report.recommendations;
        let mut is_suspicious_by_ai = false;
        let mut ai_details = None;

        let ai_signal = match self.assessor.assess(draft).await {
            Ok(judgement) => {
                if judgement.offline {
                    issues.push(QualityNote::ai(
                        "AI assessment skipped: assessor running in offline mode",
                    ));
                }
                let assessment = &judgement.assessment;
                if assessment.flags_suspicious() {
                    is_suspicious_by_ai = true;
                    score += weights.ai_suspicion_penalty;
                    let reason = assessment
                        .suspicion_reason
                        .as_deref()
                        .filter(|reason| !reason.trim().is_empty())
                        .unwrap_or("no reason given");
                    issues.push(QualityNote::ai(format!(
                        "AI flagged the contact as suspicious: {reason}"
                    )));
                    recommendations.push(QualityNote::ai(
                        "verify the contact manually before working it",
                    ));
                }
                issues.extend(assessment.quality_issues.iter().cloned().map(QualityNote::ai));
                recommendations.extend(
                    assessment
                        .recommendations
                        .iter()
                        .cloned()
                        .map(QualityNote::ai),
                );
                ai_details = judgement.details;

                if judgement.offline {
                    AiSignal::Offline
                } else {
                    AiSignal::Assessed
                }
            }
            Err(err) => {
                warn!(error = %err, "AI assessment failed; continuing with rule-based score");
                issues.push(QualityNote::ai(format!("AI assessment unavailable: {err}")));
                AiSignal::Failed {
                    reason: err.to_string(),
                }
            }
        };

        let quality_score = score.clamp(0.0, 100.0).round() as u8;
        info!(
            quality_score,
            issues = issues.len(),
            suspicious_pattern = is_suspicious_by_pattern,
            suspicious_ai = is_suspicious_by_ai,
            "contact scored"
        );

        QualityAnalysis {
            quality_score,
            issues,
            recommendations,
            is_suspicious_by_pattern,
            is_suspicious_by_ai,
            ai_signal,
            ai_details,
            normalized_phone,
        }
    }
}
