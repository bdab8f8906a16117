use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{
    Advisor, AdvisorId, Contact, ContactId, ContactStatus, NewAdvisor, NewContact, QualityStamp,
};
use super::repository::{ContactStore, StoreError, StoreTransaction};

/// Process-local store used by the demo CLI, tests, and servers without `DATABASE_PATH`.
///
/// A transaction holds the store lock for its whole lifetime and works on a copy of the
/// state, so concurrent batches are serialised and a failed batch leaves nothing behind.
#[derive(Debug, Default)]
pub struct MemoryContactStore {
    state: Mutex<StoreState>,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    contacts: BTreeMap<ContactId, Contact>,
    advisors: BTreeMap<AdvisorId, Advisor>,
    next_contact: i64,
    next_advisor: i64,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete a contact outright. Normal flows never hard-delete; this exists for
    /// fixtures that simulate a contact vanishing between planning and execution.
    pub fn remove_contact(&self, id: ContactId) -> Result<Option<Contact>, StoreError> {
        Ok(self.lock()?.contacts.remove(&id))
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("contact store lock poisoned".to_string()))
    }
}

impl StoreState {
    fn set_contact_advisor(
        &mut self,
        contact: ContactId,
        advisor: AdvisorId,
    ) -> Result<(), StoreError> {
        if !self.advisors.contains_key(&advisor) {
            return Err(StoreError::AdvisorNotFound(advisor));
        }
        let record = self
            .contacts
            .get_mut(&contact)
            .ok_or(StoreError::ContactNotFound(contact))?;
        if record.assigned_advisor_id.is_some() {
            return Err(StoreError::AlreadyAssigned(contact));
        }
        record.assigned_advisor_id = Some(advisor);
        Ok(())
    }

    fn increment_advisor_load(&mut self, advisor: AdvisorId, delta: u32) -> Result<(), StoreError> {
        let record = self
            .advisors
            .get_mut(&advisor)
            .ok_or(StoreError::AdvisorNotFound(advisor))?;
        let next = record.current_contact_count.saturating_add(delta);
        if next > record.max_contacts {
            return Err(StoreError::CapacityExceeded {
                advisor,
                current: record.current_contact_count,
                max: record.max_contacts,
                requested: delta,
            });
        }
        record.current_contact_count = next;
        Ok(())
    }
}

impl ContactStore for MemoryContactStore {
    fn insert_contact(&self, contact: NewContact) -> Result<Contact, StoreError> {
        let mut state = self.lock()?;
        if state
            .contacts
            .values()
            .any(|existing| existing.phone == contact.phone)
        {
            return Err(StoreError::Conflict(format!(
                "phone {} is already registered",
                contact.phone
            )));
        }

        state.next_contact += 1;
        let id = ContactId(state.next_contact);
        let record = Contact {
            id,
            name: contact.name,
            phone: contact.phone,
            email: contact.email,
            source: contact.source,
            notes: contact.notes,
            status: ContactStatus::New,
            quality_score: contact.quality.quality_score,
            is_suspicious: contact.quality.is_suspicious,
            ai_details: contact.quality.ai_details,
            assigned_advisor_id: None,
            contact_count: 0,
            last_contact_date: None,
            created_at: Utc::now(),
        };
        state.contacts.insert(id, record.clone());
        Ok(record)
    }

    fn insert_advisor(
        &self,
        advisor: NewAdvisor,
        max_contacts: u32,
    ) -> Result<Advisor, StoreError> {
        let mut state = self.lock()?;
        if state
            .advisors
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&advisor.email))
        {
            return Err(StoreError::Conflict(format!(
                "advisor email {} is already registered",
                advisor.email
            )));
        }

        state.next_advisor += 1;
        let id = AdvisorId(state.next_advisor);
        let record = Advisor {
            id,
            name: advisor.name,
            email: advisor.email,
            is_active: advisor.is_active,
            performance_score: advisor.performance_score,
            current_contact_count: 0,
            max_contacts: advisor.max_contacts.unwrap_or(max_contacts),
        };
        state.advisors.insert(id, record.clone());
        Ok(record)
    }

    fn fetch_contact(&self, id: ContactId) -> Result<Option<Contact>, StoreError> {
        Ok(self.lock()?.contacts.get(&id).cloned())
    }

    fn fetch_advisor(&self, id: AdvisorId) -> Result<Option<Advisor>, StoreError> {
        Ok(self.lock()?.advisors.get(&id).cloned())
    }

    fn list_contacts(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(self.lock()?.contacts.values().cloned().collect())
    }

    fn list_advisors(&self) -> Result<Vec<Advisor>, StoreError> {
        Ok(self.lock()?.advisors.values().cloned().collect())
    }

    fn update_contact_quality(
        &self,
        id: ContactId,
        quality: QualityStamp,
    ) -> Result<Contact, StoreError> {
        let mut state = self.lock()?;
        let record = state
            .contacts
            .get_mut(&id)
            .ok_or(StoreError::ContactNotFound(id))?;
        record.quality_score = quality.quality_score;
        record.is_suspicious = quality.is_suspicious;
        record.ai_details = quality.ai_details;
        Ok(record.clone())
    }

    fn find_unassigned_contacts(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(self
            .lock()?
            .contacts
            .values()
            .filter(|contact| contact.assigned_advisor_id.is_none())
            .cloned()
            .collect())
    }

    fn find_active_advisors(&self) -> Result<Vec<Advisor>, StoreError> {
        Ok(self
            .lock()?
            .advisors
            .values()
            .filter(|advisor| advisor.is_active)
            .cloned()
            .collect())
    }

    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError> {
        let guard = self.lock()?;
        let working = (*guard).clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

struct MemoryTransaction<'a> {
    guard: MutexGuard<'a, StoreState>,
    working: StoreState,
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn set_contact_advisor(
        &mut self,
        contact: ContactId,
        advisor: AdvisorId,
    ) -> Result<(), StoreError> {
        self.working.set_contact_advisor(contact, advisor)
    }

    fn increment_advisor_load(&mut self, advisor: AdvisorId, delta: u32) -> Result<(), StoreError> {
        self.working.increment_advisor_load(advisor, delta)
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
