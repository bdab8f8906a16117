use std::sync::Arc;

use super::common::*;
use crate::workflows::contacts::{ContactStore, MemoryContactStore, SqliteContactStore};
use crate::workflows::distribution::{
    ContactDistributor, DistributionError, NO_ADVISORS_MESSAGE, NO_CONTACTS_MESSAGE,
};

#[test]
fn reports_when_nothing_is_waiting() {
    let store = Arc::new(MemoryContactStore::new());
    store
        .insert_advisor(new_advisor("Alfa", 80.0, 5), 50)
        .expect("advisor");

    let report = ContactDistributor::new(store)
        .distribute()
        .expect("distribution runs");

    assert!(report.assignments.is_empty());
    assert_eq!(report.message, NO_CONTACTS_MESSAGE);
}

#[test]
fn reports_when_no_advisor_can_take_work() {
    let (store, _, _) = seeded_store(&[80, 20], &[]);

    let report = ContactDistributor::new(Arc::new(store))
        .distribute()
        .expect("distribution runs");

    assert_eq!(report.message, NO_ADVISORS_MESSAGE);
    assert_eq!(report.unassigned_contacts.len(), 2);
    assert!(!report.log.is_empty());
}

#[test]
fn distributes_and_summarises() {
    let (store, _, advisors) =
        seeded_store(&[95, 80, 40], &[("Alfa", 80.0, 1), ("Beta", 75.0, 1)]);
    let store = Arc::new(store);

    let report = ContactDistributor::new(store.clone())
        .distribute()
        .expect("distribution runs");

    assert_eq!(report.assignments.len(), 2);
    assert_eq!(report.unassigned_contacts.len(), 1);
    assert_eq!(report.unassigned_contacts[0].quality_score, 40);
    assert_eq!(report.message, "Distributed 2 contact(s); 1 left unassigned");
    assert_eq!(report.assignments[0].advisor_id, advisors[0].id);
    assert_eq!(load_of(&*store, advisors[1].id), 1);

    let rerun = ContactDistributor::new(store)
        .distribute()
        .expect("second run");
    assert_eq!(rerun.message, NO_ADVISORS_MESSAGE);
}

#[test]
fn works_through_a_trait_object_over_sqlite() {
    let store: Arc<dyn ContactStore> =
        Arc::new(SqliteContactStore::open_in_memory().expect("sqlite opens"));
    store
        .insert_contact(new_contact("Ana Lopez", "+525512345678", 90))
        .expect("contact");
    let advisor = store
        .insert_advisor(new_advisor("Alfa", 80.0, 3), 50)
        .expect("advisor");

    let report = ContactDistributor::new(store.clone())
        .distribute()
        .expect("distribution runs");

    assert_eq!(report.assignments.len(), 1);
    assert_eq!(load_of(&*store, advisor.id), 1);
}

#[test]
fn persistence_failures_surface_as_execution_errors() {
    let error = DistributionError::Execution(crate::workflows::distribution::ExecutionError {
        source: crate::workflows::contacts::StoreError::Unavailable("disk full".to_string()),
        failed_at: None,
        plan: Box::default(),
    });

    assert!(error.to_string().contains("disk full"));
}
