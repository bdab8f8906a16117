use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use phonenumber::country;

use crate::workflows::contacts::ContactDraft;
use crate::workflows::quality::{
    AiQualityAssessor, AssessmentError, AssessorMode, ContactScorer, GenerativeClient,
    ScoringWeights, Validator,
};

/// Canned reply used to stand in for the generative endpoint.
#[derive(Clone)]
pub(super) enum StubReply {
    Text(String),
    Fail(AssessmentError),
    Stall(Duration),
}

pub(super) struct StubClient {
    reply: StubReply,
    calls: AtomicUsize,
}

impl StubClient {
    pub(super) fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeClient for StubClient {
    async fn generate(&self, _prompt: &str) -> Result<String, AssessmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            StubReply::Text(text) => Ok(text.clone()),
            StubReply::Fail(err) => Err(err.clone()),
            StubReply::Stall(duration) => {
                tokio::time::sleep(*duration).await;
                Ok("{}".to_string())
            }
        }
    }
}

pub(super) fn validator() -> Validator {
    Validator::new(country::Id::MX)
}

pub(super) fn offline_scorer() -> ContactScorer {
    ContactScorer::new(
        validator(),
        AiQualityAssessor::offline(),
        ScoringWeights::default(),
    )
}

pub(super) fn live_assessor(client: Arc<StubClient>, timeout: Duration) -> AiQualityAssessor {
    AiQualityAssessor::new(AssessorMode::Live(client), timeout)
}

pub(super) fn live_scorer(client: Arc<StubClient>) -> ContactScorer {
    ContactScorer::new(
        validator(),
        live_assessor(client, Duration::from_secs(2)),
        ScoringWeights::default(),
    )
}

pub(super) fn complete_draft() -> ContactDraft {
    ContactDraft {
        name: Some("Ana Lopez".to_string()),
        phone: Some("+1 650-253-0000".to_string()),
        email: Some("ana.lopez@example.com".to_string()),
        source: Some("Website".to_string()),
        notes: None,
    }
}

pub(super) fn draft_named(name: &str) -> ContactDraft {
    ContactDraft {
        name: Some(name.to_string()),
        ..complete_draft()
    }
}

pub(super) fn clean_ai_reply() -> String {
    r#"{
        "is_genuine_person": true,
        "is_suspicious": false,
        "suspicion_score": 0.1,
        "suspicion_reason": "",
        "data_completeness_score": 0.9,
        "data_accuracy_score": 0.95,
        "quality_issues": [],
        "recommendations": ["confirm preferred contact hours"]
    }"#
    .to_string()
}

pub(super) fn suspicious_ai_reply() -> String {
    "```json\n{\"is_genuine_person\": false, \"is_suspicious\": true, \"suspicion_score\": 0.92, \
     \"suspicion_reason\": \"email domain is disposable\", \"quality_issues\": [\"disposable email\"], \
     \"recommendations\": [\"request a corporate email\"]}\n```"
        .to_string()
}
