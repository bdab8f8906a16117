use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    Advisor, AdvisorId, Contact, ContactDraft, ContactId, NewAdvisor, NewContact,
};
use super::repository::{ContactStore, StoreError};
use crate::workflows::distribution::{
    ContactDistributor, DistributionError, DistributionOptions, DistributionReport,
};
use crate::workflows::quality::{ContactScorer, QualityAnalysis};

const NAME_MAX_CHARS: usize = 100;

/// Contact as stored after intake, alongside the analysis that stamped it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredContact {
    pub contact: Contact,
    pub analysis: QualityAnalysis,
}

/// One entry of a bulk re-analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAnalysisEntry {
    pub contact_id: ContactId,
    pub name: String,
    pub analysis: QualityAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAnalysis {
    pub results: Vec<BulkAnalysisEntry>,
    pub processed: usize,
    pub suspicious: usize,
    pub average_score: Option<f64>,
    /// Requested ids with no stored contact.
    pub missing: Vec<ContactId>,
}

/// Score bands used by the health report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBuckets {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ScoreBuckets {
    fn record(&mut self, score: u8) {
        match score {
            70..=u8::MAX => self.high += 1,
            40..=69 => self.medium += 1,
            _ => self.low += 1,
        }
    }
}

/// Snapshot of data quality across the whole store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub total_contacts: usize,
    pub assigned_contacts: usize,
    pub unassigned_contacts: usize,
    pub suspicious_contacts: usize,
    pub invalid_phones: usize,
    pub average_quality_score: Option<f64>,
    pub score_buckets: ScoreBuckets,
    pub status_distribution: BTreeMap<String, usize>,
    pub active_advisors: usize,
    pub available_capacity: u32,
}

/// Per-advisor quality bands, coarser at the top than [`ScoreBuckets`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QualityDistribution {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

impl QualityDistribution {
    fn record(&mut self, score: u8) {
        match score {
            80..=u8::MAX => self.excellent += 1,
            60..=79 => self.good += 1,
            40..=59 => self.fair += 1,
            _ => self.poor += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorWorkload {
    pub advisor_id: AdvisorId,
    pub name: String,
    pub is_active: bool,
    pub current_contacts: u32,
    pub max_contacts: u32,
    pub available_capacity: u32,
    pub utilization: f64,
    pub status_distribution: BTreeMap<String, usize>,
    pub quality_distribution: QualityDistribution,
}

/// Area of the data set an improvement targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementKind {
    Cleanup,
    Validation,
    Enhancement,
    Distribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementPriority {
    High,
    Medium,
    Low,
}

/// One actionable suggestion derived from the health report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvement {
    pub kind: ImprovementKind,
    pub priority: ImprovementPriority,
    pub action: String,
    pub description: String,
    /// Route that carries out the action, when this service exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementReport {
    pub suggestions: Vec<Improvement>,
    pub health: DatabaseHealth,
}

impl DatabaseHealth {
    /// Suggestions ordered from most to least urgent.
    pub fn improvements(&self) -> Vec<Improvement> {
        let mut suggestions = Vec::new();
        if self.suspicious_contacts > 0 {
            suggestions.push(Improvement {
                kind: ImprovementKind::Cleanup,
                priority: ImprovementPriority::High,
                action: "Review suspicious contacts".to_string(),
                description: format!(
                    "{} contacts appear to be fake or suspicious",
                    self.suspicious_contacts
                ),
                endpoint: None,
            });
        }
        if self.invalid_phones > 0 {
            suggestions.push(Improvement {
                kind: ImprovementKind::Validation,
                priority: ImprovementPriority::High,
                action: "Fix invalid phone numbers".to_string(),
                description: format!(
                    "{} contacts have invalid phone numbers",
                    self.invalid_phones
                ),
                endpoint: None,
            });
        }
        if self.score_buckets.low > 0 {
            suggestions.push(Improvement {
                kind: ImprovementKind::Enhancement,
                priority: ImprovementPriority::Medium,
                action: "Improve data quality".to_string(),
                description: format!(
                    "{} contacts have poor data quality",
                    self.score_buckets.low
                ),
                endpoint: Some("/api/v1/contacts/bulk-analyze"),
            });
        }
        if self.unassigned_contacts > 0 {
            suggestions.push(Improvement {
                kind: ImprovementKind::Distribution,
                priority: ImprovementPriority::Low,
                action: "Distribute unassigned contacts".to_string(),
                description: format!(
                    "{} contacts are not assigned to advisors",
                    self.unassigned_contacts
                ),
                endpoint: Some("/api/v1/distribution"),
            });
        }
        suggestions
    }
}

/// Intake rejection for a contact that cannot be stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("name is required")]
    MissingName,
    #[error("name must be between 2 and 100 characters")]
    NameLength,
    #[error("phone is required")]
    MissingPhone,
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),
    #[error("invalid email format: {0}")]
    InvalidEmail(String),
}

/// Error raised by the contact desk service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContactServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Distribution(#[from] DistributionError),
}

/// Service composing the store, the scorer, and the distributor behind the caller-facing API.
pub struct ContactDeskService<S: ?Sized> {
    store: Arc<S>,
    scorer: Arc<ContactScorer>,
    distributor: ContactDistributor<S>,
    options: DistributionOptions,
}

impl<S> ContactDeskService<S>
where
    S: ContactStore + ?Sized,
{
    pub fn new(store: Arc<S>, scorer: ContactScorer, options: DistributionOptions) -> Self {
        Self {
            distributor: ContactDistributor::new(store.clone()),
            scorer: Arc::new(scorer),
            store,
            options,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn scorer(&self) -> &ContactScorer {
        &self.scorer
    }

    /// Score arbitrary contact data without persisting anything.
    pub async fn score_contact(&self, draft: &ContactDraft) -> QualityAnalysis {
        self.scorer.score(draft).await
    }

    /// Validate intake fields, score, and persist a new contact.
    pub async fn register_contact(
        &self,
        draft: ContactDraft,
    ) -> Result<RegisteredContact, ContactServiceError> {
        let name = draft
            .trimmed_name()
            .ok_or(IntakeError::MissingName)?
            .to_string();
        if !(2..=NAME_MAX_CHARS).contains(&name.chars().count()) {
            return Err(IntakeError::NameLength.into());
        }
        let raw_phone = draft
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
            .ok_or(IntakeError::MissingPhone)?
            .to_string();
        let phone = self
            .scorer
            .validator()
            .normalize_phone(&raw_phone)
            .ok_or(IntakeError::InvalidPhone(raw_phone))?;
        let email = non_blank(draft.email.as_deref());
        if let Some(email) = &email {
            if !self.scorer.validator().is_valid_email(email) {
                return Err(IntakeError::InvalidEmail(email.clone()).into());
            }
        }

        let analysis = self.scorer.score(&draft).await;

        let contact = self.store.insert_contact(NewContact {
            name,
            phone,
            email,
            source: non_blank(draft.source.as_deref()),
            notes: non_blank(draft.notes.as_deref()),
            quality: analysis.stamp(),
        })?;
        info!(
            contact = %contact.id,
            quality_score = contact.quality_score,
            suspicious = contact.is_suspicious,
            "contact registered"
        );

        Ok(RegisteredContact { contact, analysis })
    }

    /// Re-score a stored contact and persist the refreshed quality fields.
    pub async fn analyze_contact(
        &self,
        id: ContactId,
    ) -> Result<RegisteredContact, ContactServiceError> {
        let contact = self
            .store
            .fetch_contact(id)?
            .ok_or(StoreError::ContactNotFound(id))?;
        let analysis = self.scorer.score(&contact.draft()).await;
        let contact = self.store.update_contact_quality(id, analysis.stamp())?;
        Ok(RegisteredContact { contact, analysis })
    }

    /// Re-score several stored contacts one after another.
    pub async fn bulk_analyze(&self, ids: &[ContactId]) -> Result<BulkAnalysis, ContactServiceError> {
        let mut results = Vec::new();
        let mut missing = Vec::new();

        for id in ids {
            let Some(contact) = self.store.fetch_contact(*id)? else {
                missing.push(*id);
                continue;
            };
            let analysis = self.scorer.score(&contact.draft()).await;
            self.store.update_contact_quality(contact.id, analysis.stamp())?;
            results.push(BulkAnalysisEntry {
                contact_id: contact.id,
                name: contact.name,
                analysis,
            });
        }

        if !missing.is_empty() {
            warn!(missing = missing.len(), "bulk analysis skipped unknown contacts");
        }

        let suspicious = results
            .iter()
            .filter(|entry| entry.analysis.is_suspicious())
            .count();
        let average_score = average(results.iter().map(|entry| entry.analysis.quality_score));

        Ok(BulkAnalysis {
            processed: results.len(),
            results,
            suspicious,
            average_score,
            missing,
        })
    }

    /// Register an advisor, falling back to the configured default capacity.
    pub fn register_advisor(&self, advisor: NewAdvisor) -> Result<Advisor, ContactServiceError> {
        let advisor = self
            .store
            .insert_advisor(advisor, self.options.default_max_contacts)?;
        info!(advisor = %advisor.id, max_contacts = advisor.max_contacts, "advisor registered");
        Ok(advisor)
    }

    /// Create the two starter advisors when the store has none.
    pub fn seed_default_advisors(&self) -> Result<Vec<Advisor>, ContactServiceError> {
        if !self.store.list_advisors()?.is_empty() {
            return Ok(Vec::new());
        }

        let defaults = [
            ("Advisor Alfa", "alfa@example.com", 80.0, 50),
            ("Advisor Beta", "beta@example.com", 75.0, 40),
        ];
        defaults
            .into_iter()
            .map(|(name, email, performance_score, max_contacts)| {
                self.register_advisor(NewAdvisor {
                    name: name.to_string(),
                    email: email.to_string(),
                    is_active: true,
                    performance_score,
                    max_contacts: Some(max_contacts),
                })
            })
            .collect()
    }

    /// Assign every unassigned contact that fits within advisor capacity.
    pub fn distribute_contacts(&self) -> Result<DistributionReport, ContactServiceError> {
        Ok(self.distributor.distribute()?)
    }

    pub fn database_health(&self) -> Result<DatabaseHealth, ContactServiceError> {
        let contacts = self.store.list_contacts()?;
        let advisors = self.store.list_advisors()?;
        let validator = self.scorer.validator();

        let mut score_buckets = ScoreBuckets::default();
        let mut status_distribution = BTreeMap::new();
        let mut assigned_contacts = 0;
        let mut suspicious_contacts = 0;
        let mut invalid_phones = 0;
        for contact in &contacts {
            score_buckets.record(contact.quality_score);
            *status_distribution
                .entry(contact.status.label().to_string())
                .or_insert(0) += 1;
            if contact.assigned_advisor_id.is_some() {
                assigned_contacts += 1;
            }
            if contact.is_suspicious {
                suspicious_contacts += 1;
            }
            if validator.normalize_phone(&contact.phone).is_none() {
                invalid_phones += 1;
            }
        }

        let active: Vec<&Advisor> = advisors.iter().filter(|advisor| advisor.is_active).collect();

        Ok(DatabaseHealth {
            total_contacts: contacts.len(),
            assigned_contacts,
            unassigned_contacts: contacts.len() - assigned_contacts,
            suspicious_contacts,
            invalid_phones,
            average_quality_score: average(contacts.iter().map(|contact| contact.quality_score)),
            score_buckets,
            status_distribution,
            active_advisors: active.len(),
            available_capacity: active
                .iter()
                .map(|advisor| advisor.available_capacity())
                .sum(),
        })
    }

    /// Turn the current health report into prioritised follow-up actions.
    pub fn suggest_improvements(&self) -> Result<ImprovementReport, ContactServiceError> {
        let health = self.database_health()?;
        let suggestions = health.improvements();
        info!(suggestions = suggestions.len(), "improvement suggestions built");
        Ok(ImprovementReport {
            suggestions,
            health,
        })
    }

    pub fn advisor_workload(&self, id: AdvisorId) -> Result<AdvisorWorkload, ContactServiceError> {
        let advisor = self
            .store
            .fetch_advisor(id)?
            .ok_or(StoreError::AdvisorNotFound(id))?;
        let contacts: Vec<Contact> = self
            .store
            .list_contacts()?
            .into_iter()
            .filter(|contact| contact.assigned_advisor_id == Some(id))
            .collect();

        let mut status_distribution = BTreeMap::new();
        let mut quality_distribution = QualityDistribution::default();
        for contact in &contacts {
            *status_distribution
                .entry(contact.status.label().to_string())
                .or_insert(0) += 1;
            quality_distribution.record(contact.quality_score);
        }

        let utilization = if advisor.max_contacts == 0 {
            0.0
        } else {
            f64::from(advisor.current_contact_count) / f64::from(advisor.max_contacts)
        };

        Ok(AdvisorWorkload {
            advisor_id: advisor.id,
            available_capacity: advisor.available_capacity(),
            name: advisor.name,
            is_active: advisor.is_active,
            current_contacts: advisor.current_contact_count,
            max_contacts: advisor.max_contacts,
            utilization,
            status_distribution,
            quality_distribution,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn average(scores: impl Iterator<Item = u8>) -> Option<f64> {
    let (sum, count) = scores.fold((0u64, 0u64), |(sum, count), score| {
        (sum + u64::from(score), count + 1)
    });
    (count > 0).then(|| sum as f64 / count as f64)
}
