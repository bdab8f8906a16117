use chrono::{Duration, TimeZone, Utc};

use crate::workflows::contacts::{
    Advisor, AdvisorId, Contact, ContactId, ContactStatus, ContactStore, MemoryContactStore,
    NewAdvisor, NewContact, QualityStamp,
};

pub(super) fn contact(id: i64, score: u8, minutes_after_epoch: i64) -> Contact {
    let base = Utc
        .with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    Contact {
        id: ContactId(id),
        name: format!("Contact {id}"),
        phone: format!("+5255100000{id:02}"),
        email: None,
        source: Some("web".to_string()),
        notes: None,
        status: ContactStatus::New,
        quality_score: score,
        is_suspicious: false,
        ai_details: None,
        assigned_advisor_id: None,
        contact_count: 0,
        last_contact_date: None,
        created_at: base + Duration::minutes(minutes_after_epoch),
    }
}

pub(super) fn advisor(id: i64, performance: f64, current: u32, max: u32) -> Advisor {
    Advisor {
        id: AdvisorId(id),
        name: format!("Advisor {id}"),
        email: format!("advisor{id}@example.com"),
        is_active: true,
        performance_score: performance,
        current_contact_count: current,
        max_contacts: max,
    }
}

pub(super) fn new_contact(name: &str, phone: &str, score: u8) -> NewContact {
    NewContact {
        name: name.to_string(),
        phone: phone.to_string(),
        email: None,
        source: Some("web".to_string()),
        notes: None,
        quality: QualityStamp {
            quality_score: score,
            is_suspicious: false,
            ai_details: None,
        },
    }
}

pub(super) fn new_advisor(name: &str, performance: f64, max: u32) -> NewAdvisor {
    NewAdvisor {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_ascii_lowercase()),
        is_active: true,
        performance_score: performance,
        max_contacts: Some(max),
    }
}

/// Store seeded with one contact per score and one advisor per `(name, performance, max)`.
pub(super) fn seeded_store(
    scores: &[u8],
    advisors: &[(&str, f64, u32)],
) -> (MemoryContactStore, Vec<Contact>, Vec<Advisor>) {
    let store = MemoryContactStore::new();
    let contacts = scores
        .iter()
        .enumerate()
        .map(|(index, score)| {
            store
                .insert_contact(new_contact(
                    &format!("Lead {index}"),
                    &format!("+5255200000{index:02}"),
                    *score,
                ))
                .expect("contact inserted")
        })
        .collect();
    let advisors = advisors
        .iter()
        .map(|(name, performance, max)| {
            store
                .insert_advisor(new_advisor(name, *performance, *max), 50)
                .expect("advisor inserted")
        })
        .collect();
    (store, contacts, advisors)
}

pub(super) fn load_of(store: &dyn ContactStore, id: AdvisorId) -> u32 {
    store
        .fetch_advisor(id)
        .expect("fetch advisor")
        .expect("advisor present")
        .current_contact_count
}
