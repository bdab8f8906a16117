use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::gemini::GeminiClient;
use super::prompt::{build_assessment_prompt, extract_json_object};
use crate::config::AiConfig;
use crate::workflows::contacts::ContactDraft;

/// Text-generation endpoint used for supplemental contact assessment.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AssessmentError>;
}

/// Why an AI assessment produced no usable signal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    #[error("AI endpoint unreachable: {0}")]
    Transport(String),
    #[error("AI endpoint returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("AI assessment timed out after {0:?}")]
    Timeout(Duration),
    #[error("AI response contained no JSON object")]
    MissingJson,
    #[error("AI response JSON could not be parsed: {0}")]
    InvalidJson(String),
    #[error("AI client misconfigured: {0}")]
    Configuration(String),
}

/// Structured judgement requested from the model.
///
/// Models sometimes answer `null` for fields they have nothing to say about; those read as
/// the field's default instead of failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiAssessment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_genuine_person: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_suspicious: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suspicion_score: f64,
    #[serde(default)]
    pub suspicion_reason: Option<String>,
    #[serde(default)]
    pub data_completeness_score: Option<f64>,
    #[serde(default)]
    pub data_accuracy_score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quality_issues: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl AiAssessment {
    pub const SUSPICION_THRESHOLD: f64 = 0.7;

    pub fn flags_suspicious(&self) -> bool {
        self.is_suspicious || self.suspicion_score > Self::SUSPICION_THRESHOLD
    }
}

/// Parsed assessment plus the raw JSON payload kept for audit.
#[derive(Debug, Clone, PartialEq)]
pub struct AiJudgement {
    pub assessment: AiAssessment,
    /// Raw model JSON; absent for the offline stub.
    pub details: Option<Value>,
    pub offline: bool,
}

/// Capability decided once at startup: call the endpoint, or never touch the network.
#[derive(Clone)]
pub enum AssessorMode {
    Offline,
    Live(Arc<dyn GenerativeClient>),
}

impl fmt::Debug for AssessorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessorMode::Offline => write!(f, "Offline"),
            AssessorMode::Live(_) => write!(f, "Live"),
        }
    }
}

/// Wraps the generative endpoint with prompt construction, timeout, and response parsing.
#[derive(Debug, Clone)]
pub struct AiQualityAssessor {
    mode: AssessorMode,
    timeout: Duration,
}

impl AiQualityAssessor {
    pub fn new(mode: AssessorMode, timeout: Duration) -> Self {
        Self { mode, timeout }
    }

    pub fn offline() -> Self {
        Self::new(AssessorMode::Offline, Duration::from_secs(15))
    }

    /// Resolve the mode from configured credentials. Missing or unusable credentials fall
    /// back to offline mode for the lifetime of the process.
    pub fn from_config(config: &AiConfig) -> Self {
        let Some(api_key) = config.api_key.as_deref() else {
            warn!("GEMINI_API_KEY not set; AI quality assessor running offline");
            return Self::new(AssessorMode::Offline, config.timeout);
        };

        match GeminiClient::new(api_key, &config.model, &config.endpoint, config.timeout) {
            Ok(client) => {
                info!(model = %config.model, "AI quality assessor running live");
                Self::new(AssessorMode::Live(Arc::new(client)), config.timeout)
            }
            Err(err) => {
                warn!(error = %err, "AI client could not be built; assessor running offline");
                Self::new(AssessorMode::Offline, config.timeout)
            }
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.mode, AssessorMode::Live(_))
    }

    /// Single attempt, bounded by the configured timeout. Never retries.
    pub async fn assess(&self, draft: &ContactDraft) -> Result<AiJudgement, AssessmentError> {
        let client = match &self.mode {
            AssessorMode::Offline => return Ok(offline_judgement(draft)),
            AssessorMode::Live(client) => client,
        };

        let prompt = build_assessment_prompt(draft);
        let response = tokio::time::timeout(self.timeout, client.generate(&prompt))
            .await
            .map_err(|_| AssessmentError::Timeout(self.timeout))??;

        let details = extract_json_object(&response)?;
        let assessment: AiAssessment = serde_json::from_value(details.clone())
            .map_err(|err| AssessmentError::InvalidJson(err.to_string()))?;
        debug!(
            suspicious = assessment.flags_suspicious(),
            score = assessment.suspicion_score,
            "AI assessment parsed"
        );

        Ok(AiJudgement {
            assessment,
            details: Some(details),
            offline: false,
        })
    }
}

// Without credentials the only signal is the demo-name heuristic.
fn offline_judgement(draft: &ContactDraft) -> AiJudgement {
    let looks_like_demo = draft
        .trimmed_name()
        .map(|name| name.to_lowercase().contains("demo"))
        .unwrap_or(false);

    AiJudgement {
        assessment: AiAssessment {
            is_genuine_person: !looks_like_demo,
            is_suspicious: looks_like_demo,
            suspicion_score: if looks_like_demo { 1.0 } else { 0.0 },
            suspicion_reason: looks_like_demo
                .then(|| "offline heuristic: name references a demo record".to_string()),
            ..AiAssessment::default()
        },
        details: None,
        offline: true,
    }
}
