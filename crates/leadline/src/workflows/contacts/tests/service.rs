use std::sync::Arc;

use super::common::*;
use crate::workflows::contacts::{
    ContactDeskService, ContactId, ContactServiceError, ContactStore, ImprovementKind,
    ImprovementPriority, IntakeError, MemoryContactStore, StoreError,
};
use crate::workflows::distribution::{DistributionError, DistributionOptions, PlanningError};
use crate::workflows::quality::{AiSignal, AssessmentError};

#[tokio::test]
async fn registration_normalizes_phone_and_stamps_quality() {
    let (service, store) = build_service();

    let registered = service
        .register_contact(draft("Ana Lopez", "+1 (650) 253-0000", Some("ana@example.com")))
        .await
        .expect("contact registered");

    assert_eq!(registered.contact.phone, "+16502530000");
    assert_eq!(registered.contact.quality_score, 90);
    assert!(!registered.contact.is_suspicious);
    let stored = store
        .fetch_contact(registered.contact.id)
        .expect("fetch")
        .expect("present");
    assert_eq!(stored, registered.contact);
}

#[tokio::test]
async fn suspicious_names_are_stored_flagged() {
    let (service, _) = build_service();

    let registered = service
        .register_contact(draft("test123", "+1 650-253-0001", None))
        .await
        .expect("contact registered");

    assert!(registered.contact.is_suspicious);
    assert!(registered.analysis.is_suspicious_by_pattern);
}

#[tokio::test]
async fn intake_rejects_phones_that_do_not_normalize() {
    let (service, store) = build_service();

    let too_short = service.register_contact(draft("Ana Lopez", "12", None)).await;
    let extension = service
        .register_contact(draft("Ana Lopez", " ext. 42 ", None))
        .await;

    assert_eq!(
        too_short,
        Err(ContactServiceError::Intake(IntakeError::InvalidPhone(
            "12".to_string()
        )))
    );
    assert_eq!(
        extension,
        Err(ContactServiceError::Intake(IntakeError::InvalidPhone(
            "ext. 42".to_string()
        )))
    );
    assert!(store.list_contacts().expect("contacts").is_empty());
}

#[tokio::test]
async fn intake_rejects_missing_fields() {
    let (service, _) = build_service();

    let missing_name = service.register_contact(draft("  ", "+16502530000", None)).await;
    let missing_phone = service.register_contact(draft("Ana Lopez", "", None)).await;
    let bad_email = service
        .register_contact(draft("Ana Lopez", "+16502530000", Some("ana@")))
        .await;

    assert_eq!(
        missing_name,
        Err(ContactServiceError::Intake(IntakeError::MissingName))
    );
    assert_eq!(
        missing_phone,
        Err(ContactServiceError::Intake(IntakeError::MissingPhone))
    );
    assert!(matches!(
        bad_email,
        Err(ContactServiceError::Intake(IntakeError::InvalidEmail(_)))
    ));
}

#[tokio::test]
async fn duplicate_phone_is_a_conflict() {
    let (service, _) = build_service();
    service
        .register_contact(draft("Ana Lopez", "+16502530000", None))
        .await
        .expect("first registration");

    let duplicate = service
        .register_contact(draft("Ana Lopez Twin", "+1 650 253 0000", None))
        .await;

    assert!(matches!(
        duplicate,
        Err(ContactServiceError::Store(StoreError::Conflict(_)))
    ));
}

#[tokio::test]
async fn analysis_refreshes_stored_quality() {
    let (service, store) = build_service();
    let registered = service
        .register_contact(draft("Ana Lopez", "+16502530000", None))
        .await
        .expect("registered");
    store
        .update_contact_quality(
            registered.contact.id,
            crate::workflows::contacts::QualityStamp {
                quality_score: 5,
                is_suspicious: true,
                ai_details: None,
            },
        )
        .expect("quality overwritten");

    let refreshed = service
        .analyze_contact(registered.contact.id)
        .await
        .expect("analysis runs");

    assert_eq!(refreshed.contact.quality_score, 70);
    assert!(!refreshed.contact.is_suspicious);
}

#[tokio::test]
async fn reanalysis_without_ai_signal_clears_stored_ai_details() {
    let store = Arc::new(MemoryContactStore::new());
    let suspicious = r#"{"is_suspicious": true, "suspicion_score": 0.9, "suspicion_reason": "recycled number"}"#;
    let flagged_desk = ContactDeskService::new(
        store.clone(),
        live_scorer(Ok(suspicious.to_string())),
        DistributionOptions::default(),
    );
    let registered = flagged_desk
        .register_contact(draft("Ana Lopez", "+16502530000", Some("ana@example.com")))
        .await
        .expect("registered");
    assert!(registered.contact.is_suspicious);
    assert!(registered.contact.ai_details.is_some());

    let outage_desk = ContactDeskService::new(
        store.clone(),
        live_scorer(Err(AssessmentError::Transport("connection reset".to_string()))),
        DistributionOptions::default(),
    );
    let refreshed = outage_desk
        .analyze_contact(registered.contact.id)
        .await
        .expect("analysis runs");

    assert!(matches!(refreshed.analysis.ai_signal, AiSignal::Failed { .. }));
    assert!(!refreshed.contact.is_suspicious);
    assert!(refreshed.contact.ai_details.is_none());
    let stored = store
        .fetch_contact(registered.contact.id)
        .expect("fetch")
        .expect("present");
    assert!(!stored.is_suspicious);
    assert!(stored.ai_details.is_none());
}

#[tokio::test]
async fn analysis_of_unknown_contact_is_not_found() {
    let (service, _) = build_service();

    let result = service.analyze_contact(ContactId(404)).await;

    assert_eq!(
        result,
        Err(ContactServiceError::Store(StoreError::ContactNotFound(
            ContactId(404)
        )))
    );
}

#[tokio::test]
async fn bulk_analysis_reports_missing_ids() {
    let (service, _) = build_service();
    let first = service
        .register_contact(draft("Ana Lopez", "+16502530000", Some("ana@example.com")))
        .await
        .expect("registered");
    let second = service
        .register_contact(draft("DEMO", "+16502530001", None))
        .await
        .expect("registered");

    let summary = service
        .bulk_analyze(&[first.contact.id, ContactId(99), second.contact.id])
        .await
        .expect("bulk analysis");

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.missing, vec![ContactId(99)]);
    assert_eq!(summary.suspicious, 1);
    assert_eq!(summary.results[0].contact_id, first.contact.id);
    assert!(summary.average_score.is_some());
}

#[tokio::test]
async fn default_capacity_applies_to_advisors_without_one() {
    let (service, _) = build_service();

    let advisor = service
        .register_advisor(advisor("Gamma", 60.0, None))
        .expect("advisor registered");

    assert_eq!(advisor.max_contacts, 50);
}

#[tokio::test]
async fn default_advisors_are_seeded_once() {
    let (service, store) = build_service();

    let seeded = service.seed_default_advisors().expect("seeded");
    let again = service.seed_default_advisors().expect("second seed");

    assert_eq!(seeded.len(), 2);
    assert!(again.is_empty());
    let advisors = store.list_advisors().expect("advisors");
    assert_eq!(advisors[0].max_contacts, 50);
    assert_eq!(advisors[1].max_contacts, 40);
}

#[tokio::test]
async fn distribution_then_workload_and_health() {
    let service = shared_service();
    let alfa = service
        .register_advisor(advisor("Alfa", 80.0, Some(2)))
        .expect("alfa");
    service
        .register_advisor(advisor("Beta", 75.0, Some(1)))
        .expect("beta");
    for (index, name) in ["Ana Lopez", "Luis Perez", "Eva Ruiz", "maria"].iter().enumerate() {
        service
            .register_contact(draft(name, &format!("+1650253000{index}"), None))
            .await
            .expect("registered");
    }

    let report = service.distribute_contacts().expect("distributed");
    assert_eq!(report.assignments.len(), 3);
    assert_eq!(report.unassigned_contacts.len(), 1);

    let workload = service.advisor_workload(alfa.id).expect("workload");
    assert_eq!(workload.current_contacts, 2);
    assert_eq!(workload.available_capacity, 0);
    assert!((workload.utilization - 1.0).abs() < f64::EPSILON);
    assert_eq!(workload.status_distribution.get("New"), Some(&2));

    let health = service.database_health().expect("health");
    assert_eq!(health.total_contacts, 4);
    assert_eq!(health.assigned_contacts, 3);
    assert_eq!(health.unassigned_contacts, 1);
    assert_eq!(health.suspicious_contacts, 1);
    assert_eq!(health.invalid_phones, 0);
    assert_eq!(health.available_capacity, 0);
    assert_eq!(
        health.score_buckets.high + health.score_buckets.medium + health.score_buckets.low,
        4
    );
}

#[tokio::test]
async fn improvements_follow_the_health_report() {
    let (service, _) = build_service();
    let clean = service.suggest_improvements().expect("suggestions");
    assert!(clean.suggestions.is_empty());

    service
        .register_contact(draft("DEMO", "+16502530000", None))
        .await
        .expect("registered");

    let report = service.suggest_improvements().expect("suggestions");
    let first = report.suggestions.first().expect("cleanup suggested");
    assert_eq!(first.kind, ImprovementKind::Cleanup);
    assert_eq!(first.priority, ImprovementPriority::High);
    assert_eq!(first.description, "1 contacts appear to be fake or suspicious");
    let last = report.suggestions.last().expect("distribution suggested");
    assert_eq!(last.kind, ImprovementKind::Distribution);
    assert_eq!(last.endpoint, Some("/api/v1/distribution"));
    assert!(report
        .suggestions
        .windows(2)
        .all(|pair| pair[0].priority <= pair[1].priority));
    assert!(report
        .suggestions
        .iter()
        .all(|suggestion| suggestion.kind != ImprovementKind::Validation));
    assert_eq!(report.health.total_contacts, 1);
}

#[tokio::test]
async fn distribution_errors_keep_their_category() {
    let error: ContactServiceError =
        DistributionError::Planning(PlanningError::DuplicateContact(ContactId(1))).into();

    assert!(matches!(
        error,
        ContactServiceError::Distribution(DistributionError::Planning(_))
    ));
}
