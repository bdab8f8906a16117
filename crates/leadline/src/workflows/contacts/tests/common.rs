use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use phonenumber::country;

use crate::workflows::contacts::{
    ContactDeskService, ContactDraft, ContactStore, MemoryContactStore, NewAdvisor,
};
use crate::workflows::distribution::DistributionOptions;
use crate::workflows::quality::{
    AiQualityAssessor, AssessmentError, AssessorMode, ContactScorer, GenerativeClient,
    ScoringWeights, Validator,
};

pub(super) fn offline_scorer() -> ContactScorer {
    ContactScorer::new(
        Validator::new(country::Id::MX),
        AiQualityAssessor::offline(),
        ScoringWeights::default(),
    )
}

/// Generative endpoint that always gives the same answer.
pub(super) struct FixedReply(pub(super) Result<String, AssessmentError>);

#[async_trait]
impl GenerativeClient for FixedReply {
    async fn generate(&self, _prompt: &str) -> Result<String, AssessmentError> {
        self.0.clone()
    }
}

pub(super) fn live_scorer(reply: Result<String, AssessmentError>) -> ContactScorer {
    ContactScorer::new(
        Validator::new(country::Id::MX),
        AiQualityAssessor::new(
            AssessorMode::Live(Arc::new(FixedReply(reply))),
            Duration::from_secs(2),
        ),
        ScoringWeights::default(),
    )
}

pub(super) fn build_service() -> (Arc<ContactDeskService<MemoryContactStore>>, Arc<MemoryContactStore>) {
    let store = Arc::new(MemoryContactStore::new());
    let service = Arc::new(ContactDeskService::new(
        store.clone(),
        offline_scorer(),
        DistributionOptions::default(),
    ));
    (service, store)
}

pub(super) fn shared_service() -> Arc<ContactDeskService<dyn ContactStore>> {
    let store: Arc<dyn ContactStore> = Arc::new(MemoryContactStore::new());
    Arc::new(ContactDeskService::new(
        store,
        offline_scorer(),
        DistributionOptions::default(),
    ))
}

pub(super) fn draft(name: &str, phone: &str, email: Option<&str>) -> ContactDraft {
    ContactDraft {
        name: Some(name.to_string()),
        phone: Some(phone.to_string()),
        email: email.map(str::to_string),
        source: Some("Website".to_string()),
        notes: None,
    }
}

pub(super) fn advisor(name: &str, performance: f64, max: Option<u32>) -> NewAdvisor {
    NewAdvisor {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_ascii_lowercase().replace(' ', ".")),
        is_active: true,
        performance_score: performance,
        max_contacts: max,
    }
}
