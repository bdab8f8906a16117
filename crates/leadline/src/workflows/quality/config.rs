use serde::{Deserialize, Serialize};

/// Rubric weights applied by the contact scorer.
///
/// Positive weights reward valid data; `ai_suspicion_penalty` is negative and applied in
/// full for an AI flag and at half weight for a name-pattern flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub valid_phone: f32,
    pub valid_email: f32,
    pub complete_name: f32,
    pub is_complete: f32,
    pub ai_suspicion_penalty: f32,
}

impl ScoringWeights {
    pub fn pattern_penalty(&self) -> f32 {
        self.ai_suspicion_penalty / 2.0
    }

    pub fn partial_name(&self) -> f32 {
        self.complete_name / 2.0
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            valid_phone: 30.0,
            valid_email: 20.0,
            complete_name: 20.0,
            is_complete: 20.0,
            ai_suspicion_penalty: -20.0,
        }
    }
}
